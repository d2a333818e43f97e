use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::service::{optional_service_id, Service};

/// Photo cap applied when no configuration overrides it.
pub const DEFAULT_MAX_PHOTOS: usize = 3;

/// Coarse lead priority used to tag analytics events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
}

impl Default for Grade {
    fn default() -> Self {
        Grade::C
    }
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image attached to a lead. Never written to the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoAttachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Everything a visitor has entered during one funnel session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelData {
    #[serde(default, with = "optional_service_id")]
    pub service: Option<Service>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub addons: BTreeSet<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub timing: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub color_idea: Option<String>,
    #[serde(skip)]
    pub photos: Vec<PhotoAttachment>,
    #[serde(default)]
    pub grade: Grade,
}

impl FunnelData {
    /// Merges the provided fields, leaving every other field untouched.
    ///
    /// Blank strings clear the matching field. Returns `true` when anything
    /// actually changed.
    pub fn merge(&mut self, update: FunnelUpdate) -> bool {
        let before = self.clone();

        if let Some(service) = update.service {
            self.service = Some(service);
        }
        merge_text(&mut self.year, update.year);
        merge_text(&mut self.make, update.make);
        merge_text(&mut self.model, update.model);
        merge_text(&mut self.package, update.package);
        merge_text(&mut self.finish, update.finish);
        merge_text(&mut self.brand, update.brand);
        if let Some(addons) = update.addons {
            self.addons = addons;
        }
        merge_text(&mut self.condition, update.condition);
        merge_text(&mut self.timing, update.timing);
        merge_text(&mut self.phone, update.phone);
        merge_text(&mut self.name, update.name);
        merge_text(&mut self.color_idea, update.color_idea);
        if let Some(photos) = update.photos {
            self.photos = photos;
        }

        *self != before
    }

    /// Vehicle description when year, make, and model are all present.
    pub fn vehicle_label(&self) -> Option<String> {
        match (present(&self.year), present(&self.make), present(&self.model)) {
            (Some(year), Some(make), Some(model)) => Some(format!("{year} {make} {model}")),
            _ => None,
        }
    }

    pub fn service_id(&self) -> &'static str {
        self.service.map(Service::id).unwrap_or("")
    }
}

/// Partial update applied through [`FunnelData::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunnelUpdate {
    pub service: Option<Service>,
    pub year: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub package: Option<String>,
    pub finish: Option<String>,
    pub brand: Option<String>,
    pub addons: Option<BTreeSet<String>>,
    pub condition: Option<String>,
    pub timing: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub color_idea: Option<String>,
    pub photos: Option<Vec<PhotoAttachment>>,
}

impl FunnelUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn make(mut self, make: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn finish(mut self, finish: impl Into<String>) -> Self {
        self.finish = Some(finish.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn addons<I, S>(mut self, addons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addons = Some(addons.into_iter().map(Into::into).collect());
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn timing(mut self, timing: impl Into<String>) -> Self {
        self.timing = Some(timing.into());
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn color_idea(mut self, color_idea: impl Into<String>) -> Self {
        self.color_idea = Some(color_idea.into());
        self
    }

    pub fn photos(mut self, photos: Vec<PhotoAttachment>) -> Self {
        self.photos = Some(photos);
        self
    }
}

/// Returns the value when it is set and not blank.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

fn merge_text(slot: &mut Option<String>, incoming: Option<String>) {
    if let Some(value) = incoming {
        *slot = if value.is_empty() { None } else { Some(value) };
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_only_touches_provided_fields() {
        let mut data = FunnelData {
            service: Some(Service::Wrapping),
            ..FunnelData::default()
        };
        let changed = data.merge(FunnelUpdate::new().package("full_wrap"));

        assert!(changed);
        assert_eq!(
            data,
            FunnelData {
                service: Some(Service::Wrapping),
                package: Some("full_wrap".into()),
                ..FunnelData::default()
            }
        );
    }

    #[test]
    fn merge_with_blank_value_clears_field() {
        let mut data = FunnelData {
            model: Some("M3".into()),
            ..FunnelData::default()
        };
        data.merge(FunnelUpdate::new().model(""));
        assert_eq!(data.model, None);
    }

    #[test]
    fn merge_reports_no_change_for_identical_values() {
        let mut data = FunnelData {
            timing: Some("asap".into()),
            ..FunnelData::default()
        };
        assert!(!data.merge(FunnelUpdate::new().timing("asap")));
        assert!(!data.merge(FunnelUpdate::new()));
    }

    #[test]
    fn addons_never_hold_duplicates() {
        let mut data = FunnelData::default();
        data.merge(FunnelUpdate::new().addons(["engine_bay", "engine_bay", "ceramic_coating"]));
        assert_eq!(data.addons.len(), 2);
    }

    #[test]
    fn vehicle_label_requires_all_three_parts() {
        let mut data = FunnelData {
            year: Some("2022".into()),
            make: Some("BMW".into()),
            ..FunnelData::default()
        };
        assert_eq!(data.vehicle_label(), None);
        data.model = Some("M3".into());
        assert_eq!(data.vehicle_label().as_deref(), Some("2022 BMW M3"));
    }

    #[test]
    fn snapshot_json_skips_photos_and_accepts_blank_strings() {
        let data = FunnelData {
            service: Some(Service::Ppf),
            color_idea: Some("Satin blue".into()),
            photos: vec![PhotoAttachment::new("car.jpg", "image/jpeg", vec![1, 2, 3])],
            ..FunnelData::default()
        };
        let json = serde_json::to_string(&data).expect("serialize");
        assert!(json.contains("\"service\":\"ppf\""));
        assert!(json.contains("\"colorIdea\":\"Satin blue\""));
        assert!(!json.contains("photos"));

        let legacy = r#"{"service":"","year":"","make":"BMW","addons":[],"condition":"","timing":"asap","grade":"B"}"#;
        let restored: FunnelData = serde_json::from_str(legacy).expect("deserialize");
        assert_eq!(restored.service, None);
        assert_eq!(restored.year, None);
        assert_eq!(restored.make.as_deref(), Some("BMW"));
        assert_eq!(restored.timing.as_deref(), Some("asap"));
        assert_eq!(restored.grade, Grade::B);
    }

    #[test]
    fn default_grade_is_c() {
        assert_eq!(FunnelData::default().grade, Grade::C);
    }
}
