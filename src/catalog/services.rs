use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Service;
use crate::errors::Result;

/// A selectable option: stable id plus display copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl OptionItem {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Option sets for one service. Each variant only carries the fields that
/// service actually asks about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "lowercase")]
pub enum ServiceOptions {
    Wrapping {
        packages: Vec<OptionItem>,
        finishes: Vec<OptionItem>,
    },
    Ppf {
        packages: Vec<OptionItem>,
        brands: Vec<OptionItem>,
    },
    Detailing {
        packages: Vec<OptionItem>,
        addons: Vec<OptionItem>,
    },
}

impl ServiceOptions {
    pub fn service(&self) -> Service {
        match self {
            ServiceOptions::Wrapping { .. } => Service::Wrapping,
            ServiceOptions::Ppf { .. } => Service::Ppf,
            ServiceOptions::Detailing { .. } => Service::Detailing,
        }
    }

    pub fn packages(&self) -> &[OptionItem] {
        match self {
            ServiceOptions::Wrapping { packages, .. }
            | ServiceOptions::Ppf { packages, .. }
            | ServiceOptions::Detailing { packages, .. } => packages,
        }
    }

    pub fn finishes(&self) -> Option<&[OptionItem]> {
        match self {
            ServiceOptions::Wrapping { finishes, .. } => Some(finishes),
            ServiceOptions::Ppf { .. } | ServiceOptions::Detailing { .. } => None,
        }
    }

    pub fn brands(&self) -> Option<&[OptionItem]> {
        match self {
            ServiceOptions::Ppf { brands, .. } => Some(brands),
            ServiceOptions::Wrapping { .. } | ServiceOptions::Detailing { .. } => None,
        }
    }

    pub fn addons(&self) -> Option<&[OptionItem]> {
        match self {
            ServiceOptions::Detailing { addons, .. } => Some(addons),
            ServiceOptions::Wrapping { .. } | ServiceOptions::Ppf { .. } => None,
        }
    }
}

/// Read-only services configuration consumed by the package and condition steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesCatalog {
    pub services: Vec<ServiceOptions>,
    pub conditions: Vec<OptionItem>,
    pub timing: Vec<OptionItem>,
}

impl ServicesCatalog {
    /// Catalog shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            services: vec![
                ServiceOptions::Wrapping {
                    packages: vec![
                        OptionItem::new("full_wrap", "Full Wrap", "Complete color change, every panel"),
                        OptionItem::new("partial_wrap", "Partial Wrap", "Roof, hood, mirrors or accents"),
                        OptionItem::new("chrome_delete", "Chrome Delete", "Black out trim and badges"),
                    ],
                    finishes: vec![
                        OptionItem::new("gloss", "Gloss", "Deep shine, paint-like"),
                        OptionItem::new("matte", "Matte", "Flat, no reflection"),
                        OptionItem::new("satin", "Satin", "Soft sheen between gloss and matte"),
                        OptionItem::new("color_shift", "Color Shift", "Changes tone with the light"),
                    ],
                },
                ServiceOptions::Ppf {
                    packages: vec![
                        OptionItem::new("full_front", "Full Front", "Bumper, hood, fenders, mirrors"),
                        OptionItem::new("track_pack", "Track Pack", "Full front plus rockers and rear impact zones"),
                        OptionItem::new("full_body", "Full Body", "Every painted panel covered"),
                    ],
                    brands: vec![
                        OptionItem::new("xpel", "XPEL", "Self-healing, 10 year warranty"),
                        OptionItem::new("suntek", "SunTek", "High clarity, stain resistant"),
                        OptionItem::new("3m", "3M", "Proven Scotchgard film"),
                        OptionItem::new("no_preference", "No Preference", "Recommend the best fit"),
                    ],
                },
                ServiceOptions::Detailing {
                    packages: vec![
                        OptionItem::new("interior", "Interior", "Deep clean of cabin, seats and carpets"),
                        OptionItem::new("exterior", "Exterior", "Wash, decontamination and polish"),
                        OptionItem::new("full", "Full Detail", "Interior and exterior together"),
                    ],
                    addons: vec![
                        OptionItem::new("ceramic_coating", "Ceramic Coating", "Long-lasting gloss and protection"),
                        OptionItem::new("engine_bay", "Engine Bay", "Degrease and dress the engine bay"),
                        OptionItem::new("headlight_restoration", "Headlight Restoration", "Clear up faded lenses"),
                        OptionItem::new("odor_removal", "Odor Removal", "Ozone treatment for the cabin"),
                    ],
                },
            ],
            conditions: vec![
                OptionItem::new("new", "Brand New", "Fresh from the dealer"),
                OptionItem::new("good", "Good", "Minor swirls or light wear"),
                OptionItem::new("fair", "Fair", "Visible scratches or fading"),
                OptionItem::new("needs_work", "Needs Work", "Chips, dents or heavy oxidation"),
            ],
            timing: vec![
                OptionItem::new("asap", "ASAP", "As soon as possible"),
                OptionItem::new("this_week", "This Week", "Within the next few days"),
                OptionItem::new("next_week", "Next Week", "Planning ahead"),
                OptionItem::new("flexible", "Flexible", "Just exploring options"),
            ],
        }
    }

    /// Loads a catalog override from a JSON file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn options_for(&self, service: Service) -> Option<&ServiceOptions> {
        self.services
            .iter()
            .find(|options| options.service() == service)
    }

    pub fn condition(&self, id: &str) -> Option<&OptionItem> {
        self.conditions.iter().find(|item| item.id == id)
    }

    pub fn timing_option(&self, id: &str) -> Option<&OptionItem> {
        self.timing.iter().find(|item| item.id == id)
    }
}

impl Default for ServicesCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_covers_every_service() {
        let catalog = ServicesCatalog::builtin();
        for service in Service::ALL {
            let options = catalog
                .options_for(service)
                .unwrap_or_else(|| panic!("missing options for {service}"));
            assert!(!options.packages().is_empty());
        }
    }

    #[test]
    fn service_specific_fields_resolve_by_variant() {
        let catalog = ServicesCatalog::builtin();
        let wrapping = catalog.options_for(Service::Wrapping).expect("wrapping");
        assert!(wrapping.finishes().is_some());
        assert!(wrapping.brands().is_none());
        assert!(wrapping.addons().is_none());

        let ppf = catalog.options_for(Service::Ppf).expect("ppf");
        assert!(ppf.brands().is_some());
        assert!(ppf.finishes().is_none());

        let detailing = catalog.options_for(Service::Detailing).expect("detailing");
        assert!(detailing.addons().is_some());
        assert!(detailing.brands().is_none());
    }

    #[test]
    fn graded_package_ids_exist() {
        let catalog = ServicesCatalog::builtin();
        let ppf = catalog.options_for(Service::Ppf).expect("ppf");
        for id in ["full_body", "full_front", "track_pack"] {
            assert!(ppf.packages().iter().any(|pkg| pkg.id == id), "missing {id}");
        }
        let wrapping = catalog.options_for(Service::Wrapping).expect("wrapping");
        assert!(wrapping.packages().iter().any(|pkg| pkg.id == "full_wrap"));
        for id in ["asap", "this_week", "next_week"] {
            assert!(catalog.timing_option(id).is_some(), "missing timing {id}");
        }
    }

    #[test]
    fn catalog_json_round_trips_through_tagged_variants() {
        let catalog = ServicesCatalog::builtin();
        let json = serde_json::to_string(&catalog).expect("serialize");
        assert!(json.contains("\"service\":\"ppf\""));
        let parsed: ServicesCatalog = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, catalog);
    }
}
