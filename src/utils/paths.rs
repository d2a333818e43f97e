use dirs::home_dir;
use std::{env, path::PathBuf};

pub const HOME_ENV: &str = "FUNNEL_CORE_HOME";

const DEFAULT_DIR_NAME: &str = ".funnel_core";
const STATE_DIR: &str = "state";
const ANALYTICS_LOG: &str = "analytics.jsonl";

/// Returns the application data directory, defaulting to `~/.funnel_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Directory holding the persisted funnel snapshot.
pub fn state_dir_in(base: &std::path::Path) -> PathBuf {
    base.join(STATE_DIR)
}

/// Default target of the JSON-lines analytics sink.
pub fn analytics_log_in(base: &std::path::Path) -> PathBuf {
    base.join(ANALYTICS_LOG)
}
