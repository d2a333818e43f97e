//! Interactive terminal funnel.

pub mod io;
pub mod output;
mod screens;
pub mod ui;

use std::env;

use thiserror::Error;

use crate::catalog::{ServicesCatalog, VehicleCatalog};
use crate::config::{AppConfig, ConfigManager};
use crate::core::analytics::Analytics;
use crate::core::deep_link::{LinkOpener, NoopLinkOpener, SystemLinkOpener};
use crate::core::wizard::{FunnelWizard, WizardSettings};
use crate::errors::FunnelError;
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use crate::utils::paths;

use output::{set_preferences, OutputPreferences};
use ui::{banner::Banner, test_mode};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] FunnelError),
    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Prompt failed: {0}")]
    Dialog(String),
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        CliError::Dialog(err.to_string())
    }
}

/// Everything one funnel run needs: the controller plus its reference data.
pub struct Session {
    pub wizard: FunnelWizard,
    pub services: ServicesCatalog,
    pub vehicles: VehicleCatalog,
    pub config: AppConfig,
    pub opener: Box<dyn LinkOpener>,
}

impl Session {
    pub fn bootstrap(scripted: bool) -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        let base = manager.base_dir().to_path_buf();

        let services = match &config.services_catalog {
            Some(path) => ServicesCatalog::load_from_path(path)?,
            None => ServicesCatalog::builtin(),
        };
        let store: Box<dyn KeyValueStore> = if config.features.auto_save {
            Box::new(JsonFileStore::new(paths::state_dir_in(&base))?)
        } else {
            Box::new(MemoryStore::new())
        };
        let opener: Box<dyn LinkOpener> = if config.features.open_links && !scripted {
            Box::new(SystemLinkOpener)
        } else {
            Box::new(NoopLinkOpener)
        };
        let analytics = Analytics::from_config(&config, &base);
        let wizard = FunnelWizard::new(store, analytics, WizardSettings::from_config(&config));
        tracing::info!(data_dir = %base.display(), "funnel session started");

        Ok(Self {
            wizard,
            services,
            vehicles: VehicleCatalog::builtin(),
            config,
            opener,
        })
    }
}

pub fn run_cli() -> Result<(), CliError> {
    let scripted = test_mode::is_enabled();
    set_preferences(OutputPreferences {
        plain_mode: scripted || env::var_os("NO_COLOR").is_some(),
    });

    let mut session = Session::bootstrap(scripted)?;
    Banner::render(&session.config.whatsapp.business_name);
    screens::run_funnel(&mut session)
}
