use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::core::photos::PhotoSettings;
use crate::domain::DEFAULT_MAX_PHOTOS;
use crate::errors::{FunnelError, Result};
use crate::utils::paths;

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

pub const DEFAULT_STORAGE_KEY: &str = "car-funnel-lead";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    /// Business number receiving the prefilled message.
    pub phone_number: String,
    /// Calling code applied to local numbers, without `+`.
    pub calling_code: String,
    pub business_name: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            phone_number: "971567191045".into(),
            calling_code: "971".into(),
            business_name: "Cars Studio".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub max_photos: usize,
    pub max_photo_width: u32,
    pub photo_quality: u8,
}

impl Default for UiConfig {
    fn default() -> Self {
        let photo = PhotoSettings::default();
        Self {
            max_photos: DEFAULT_MAX_PHOTOS,
            max_photo_width: photo.max_width,
            photo_quality: photo.quality,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub photo_upload: bool,
    pub auto_save: bool,
    pub analytics: bool,
    pub lead_grading: bool,
    pub utm_tracking: bool,
    pub open_links: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            photo_upload: true,
            auto_save: true,
            analytics: true,
            lead_grading: true,
            utm_tracking: true,
            open_links: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsSinkKind {
    #[default]
    Tracing,
    Jsonl,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub sink: AnalyticsSinkKind,
    /// Target for the `jsonl` sink; defaults to `analytics.jsonl` in the data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub whatsapp: WhatsAppConfig,
    pub storage_key: String,
    pub ui: UiConfig,
    pub features: FeatureFlags,
    pub analytics: AnalyticsConfig,
    /// JSON file replacing the built-in services catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services_catalog: Option<PathBuf>,
    /// Landing URL whose `utm_*` parameters tag every analytics event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            whatsapp: WhatsAppConfig::default(),
            storage_key: DEFAULT_STORAGE_KEY.into(),
            ui: UiConfig::default(),
            features: FeatureFlags::default(),
            analytics: AnalyticsConfig::default(),
            services_catalog: None,
            landing_url: None,
        }
    }
}

impl AppConfig {
    pub fn photo_settings(&self) -> PhotoSettings {
        PhotoSettings {
            max_width: self.ui.max_photo_width,
            quality: self.ui.photo_quality,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let digits = self
            .whatsapp
            .phone_number
            .chars()
            .filter(char::is_ascii_digit)
            .count();
        if !(9..=15).contains(&digits) {
            return Err(FunnelError::Config(format!(
                "whatsapp.phone_number `{}` must contain 9 to 15 digits",
                self.whatsapp.phone_number
            )));
        }
        if self.storage_key.trim().is_empty() {
            return Err(FunnelError::Config("storage_key must not be blank".into()));
        }
        if self.ui.max_photo_width == 0 {
            return Err(FunnelError::Config("ui.max_photo_width must be positive".into()));
        }
        if !(1..=100).contains(&self.ui.photo_quality) {
            return Err(FunnelError::Config(
                "ui.photo_quality must be between 1 and 100".into(),
            ));
        }
        Ok(())
    }
}

/// Loads and saves [`AppConfig`] under the application data directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
            base,
        })
    }

    /// Missing files yield the defaults; present files must parse and validate.
    pub fn load(&self) -> Result<AppConfig> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data)
                .map_err(|err| FunnelError::Config(format!("{}: {err}", self.path.display())))?
        } else {
            AppConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage_key, "car-funnel-lead");
        assert_eq!(config.ui.max_photos, 3);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = AppConfig::default();
        config.whatsapp.business_name = "Gloss Lab".into();
        config.analytics.sink = AnalyticsSinkKind::Jsonl;
        config.features.open_links = false;
        manager.save(&config).unwrap();

        assert_eq!(manager.load().unwrap(), config);
        assert!(!manager.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(
            manager.path(),
            r#"{ "ui": { "max_photos": 5 }, "analytics": { "sink": "none" } }"#,
        )
        .unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.ui.max_photos, 5);
        assert_eq!(config.ui.photo_quality, 70);
        assert_eq!(config.analytics.sink, AnalyticsSinkKind::None);
        assert_eq!(config.whatsapp.phone_number, "971567191045");
    }

    #[test]
    fn invalid_business_number_is_rejected() {
        let mut config = AppConfig::default();
        config.whatsapp.phone_number = "12".into();
        assert!(matches!(config.validate(), Err(FunnelError::Config(_))));
    }
}
