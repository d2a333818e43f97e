//! Fire-and-forget analytics.
//!
//! Every funnel interaction is reported as a named event with a flat
//! parameter map. Delivery is best effort: a failing sink is logged and the
//! funnel carries on.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::config::{AnalyticsSinkKind, AppConfig};
use crate::errors::{FunnelError, Result};
use crate::utils::paths;

/// Event names understood by the downstream tracking setup.
pub mod events {
    pub const VIEW_CONTENT: &str = "view_content";
    pub const STEP_PROGRESS: &str = "step_progress";
    pub const SELECT_SERVICE: &str = "select_service";
    pub const SELECT_PACKAGE: &str = "select_package";
    pub const SELECT_FINISH: &str = "select_finish";
    pub const SELECT_BRAND: &str = "select_brand";
    pub const TOGGLE_ADDON: &str = "toggle_addon";
    pub const SELECT_CONDITION: &str = "select_condition";
    pub const SELECT_TIMING: &str = "select_timing";
    pub const LEAD_SUBMIT: &str = "lead_submit";
    pub const CONTACT_WHATSAPP: &str = "contact_whatsapp";
}

pub type Params = BTreeMap<String, Value>;

/// Builds a parameter map from key/value pairs.
pub fn params<const N: usize>(pairs: [(&str, Value); N]) -> Params {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub params: Params,
    pub session_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Destination for analytics events.
pub trait AnalyticsSink: Send + Sync {
    fn emit(&self, event: &AnalyticsEvent) -> Result<()>;
}

/// Writes events to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn emit(&self, event: &AnalyticsEvent) -> Result<()> {
        let params = serde_json::to_string(&event.params)?;
        tracing::info!(
            target: "funnel_core::analytics",
            event = %event.name,
            session = %event.session_id,
            %params,
            "analytics event"
        );
        Ok(())
    }
}

/// Appends one JSON object per line to a file.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl AnalyticsSink for JsonLinesSink {
    fn emit(&self, event: &AnalyticsEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(event)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// Keeps events in memory; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.name).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.events.lock() {
            guard.clear();
        }
    }
}

impl AnalyticsSink for MemorySink {
    fn emit(&self, event: &AnalyticsEvent) -> Result<()> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| FunnelError::Analytics("memory sink poisoned".into()))?;
        guard.push(event.clone());
        Ok(())
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn emit(&self, _event: &AnalyticsEvent) -> Result<()> {
        Ok(())
    }
}

/// Campaign attribution carried by the landing URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    pub utm_source: String,
    pub utm_campaign: String,
    pub utm_content: String,
    pub utm_adset: String,
    pub utm_term: String,
}

impl UtmParams {
    /// Extracts the five `utm_*` parameters; absent ones stay empty.
    pub fn from_url(landing_url: &str) -> Result<Self> {
        let url = Url::parse(landing_url)?;
        let mut utm = Self::default();
        for (key, value) in url.query_pairs() {
            let slot = match &*key {
                "utm_source" => &mut utm.utm_source,
                "utm_campaign" => &mut utm.utm_campaign,
                "utm_content" => &mut utm.utm_content,
                "utm_adset" => &mut utm.utm_adset,
                "utm_term" => &mut utm.utm_term,
                _ => continue,
            };
            *slot = value.into_owned();
        }
        Ok(utm)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs().all(|(_, value)| value.is_empty())
    }

    fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("utm_source", self.utm_source.as_str()),
            ("utm_campaign", self.utm_campaign.as_str()),
            ("utm_content", self.utm_content.as_str()),
            ("utm_adset", self.utm_adset.as_str()),
            ("utm_term", self.utm_term.as_str()),
        ]
        .into_iter()
    }

    /// Adds the non-empty parameters without overriding event-specific keys.
    pub fn merge_into(&self, params: &mut Params) {
        for (key, value) in self.pairs().filter(|(_, value)| !value.is_empty()) {
            params
                .entry(key.to_string())
                .or_insert_with(|| Value::String(value.to_string()));
        }
    }
}

/// Session-scoped tracker wrapping a sink.
pub struct Analytics {
    sink: Box<dyn AnalyticsSink>,
    session_id: Uuid,
    utm: Option<UtmParams>,
    enabled: bool,
}

impl Analytics {
    pub fn new(sink: Box<dyn AnalyticsSink>) -> Self {
        Self {
            sink,
            session_id: Uuid::new_v4(),
            utm: None,
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(Box::new(NullSink))
        }
    }

    /// Builds the tracker described by the configuration. `data_dir` anchors
    /// the default JSON-lines log.
    pub fn from_config(config: &AppConfig, data_dir: &Path) -> Self {
        if !config.features.analytics {
            return Self::disabled();
        }
        let sink: Box<dyn AnalyticsSink> = match config.analytics.sink {
            AnalyticsSinkKind::Tracing => Box::new(TracingSink),
            AnalyticsSinkKind::Jsonl => {
                let path = config
                    .analytics
                    .log_file
                    .clone()
                    .unwrap_or_else(|| paths::analytics_log_in(data_dir));
                Box::new(JsonLinesSink::new(path))
            }
            AnalyticsSinkKind::None => Box::new(NullSink),
        };
        let analytics = Self::new(sink);
        match config.landing_url.as_deref() {
            Some(landing) if config.features.utm_tracking => match UtmParams::from_url(landing) {
                Ok(utm) => analytics.with_utm(utm),
                Err(err) => {
                    tracing::warn!(url = landing, error = %err, "ignoring unparsable landing url");
                    analytics
                }
            },
            _ => analytics,
        }
    }

    pub fn with_utm(mut self, utm: UtmParams) -> Self {
        self.utm = Some(utm).filter(|utm| !utm.is_empty());
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Records an event. Sink failures are logged and swallowed.
    pub fn track(&self, name: &str, mut params: Params) {
        if !self.enabled {
            return;
        }
        if let Some(utm) = &self.utm {
            utm.merge_into(&mut params);
        }
        let event = AnalyticsEvent {
            name: name.to_string(),
            params,
            session_id: self.session_id,
            occurred_at: Utc::now(),
        };
        if let Err(err) = self.sink.emit(&event) {
            tracing::warn!(event = name, error = %err, "analytics tracking failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FailingSink;

    impl AnalyticsSink for FailingSink {
        fn emit(&self, _event: &AnalyticsEvent) -> Result<()> {
            Err(FunnelError::Analytics("offline".into()))
        }
    }

    #[test]
    fn memory_sink_records_events_in_order() {
        let sink = MemorySink::new();
        let analytics = Analytics::new(Box::new(sink.clone()));
        analytics.track(events::SELECT_SERVICE, params([("service", json!("ppf"))]));
        analytics.track(events::SELECT_TIMING, params([("timing", json!("asap"))]));

        assert_eq!(sink.names(), vec!["select_service", "select_timing"]);
        let recorded = sink.events();
        assert_eq!(recorded[0].param_str("service"), Some("ppf"));
        assert_eq!(recorded[0].session_id, analytics.session_id());
    }

    #[test]
    fn failing_sink_does_not_panic() {
        let analytics = Analytics::new(Box::new(FailingSink));
        analytics.track(events::LEAD_SUBMIT, Params::new());
    }

    #[test]
    fn disabled_tracker_emits_nothing() {
        let analytics = Analytics::disabled();
        analytics.track(events::VIEW_CONTENT, Params::new());
    }

    #[test]
    fn utm_params_parse_from_landing_url() {
        let utm = UtmParams::from_url(
            "https://quote.example.com/?utm_source=meta&utm_campaign=ppf%20summer&fbclid=x",
        )
        .expect("valid url");
        assert_eq!(utm.utm_source, "meta");
        assert_eq!(utm.utm_campaign, "ppf summer");
        assert!(utm.utm_term.is_empty());
        assert!(!utm.is_empty());
        assert!(UtmParams::from_url("not a url").is_err());
    }

    #[test]
    fn utm_params_merge_without_overriding() {
        let sink = MemorySink::new();
        let utm = UtmParams {
            utm_source: "tiktok".into(),
            ..UtmParams::default()
        };
        let analytics = Analytics::new(Box::new(sink.clone())).with_utm(utm);
        analytics.track(
            events::STEP_PROGRESS,
            params([("step", json!(2)), ("utm_source", json!("override"))]),
        );
        let event = &sink.events()[0];
        assert_eq!(event.param_str("utm_source"), Some("override"));
        assert!(!event.params.contains_key("utm_term"));
    }

    #[test]
    fn json_lines_sink_appends_one_line_per_event() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("analytics").join("events.jsonl");
        let analytics = Analytics::new(Box::new(JsonLinesSink::new(path.clone())));
        analytics.track(events::VIEW_CONTENT, params([("step", json!(1))]));
        analytics.track(events::STEP_PROGRESS, params([("step", json!(1))]));

        let contents = fs::read_to_string(&path).expect("read log");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: AnalyticsEvent = serde_json::from_str(lines[0]).expect("parse line");
        assert_eq!(first.name, "view_content");
    }

    #[test]
    fn config_selects_jsonl_sink_and_utm_tags() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.analytics.sink = AnalyticsSinkKind::Jsonl;
        config.landing_url = Some("https://cars.example/?utm_source=google&utm_term=ppf".into());

        let analytics = Analytics::from_config(&config, dir.path());
        analytics.track(events::SELECT_SERVICE, params([("service", json!("ppf"))]));

        let contents = fs::read_to_string(dir.path().join("analytics.jsonl")).expect("log");
        let event: AnalyticsEvent = serde_json::from_str(contents.trim()).expect("event");
        assert_eq!(event.param_str("utm_source"), Some("google"));
        assert_eq!(event.param_str("utm_term"), Some("ppf"));
    }

    #[test]
    fn disabled_feature_flag_writes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.analytics.sink = AnalyticsSinkKind::Jsonl;
        config.features.analytics = false;

        Analytics::from_config(&config, dir.path()).track(events::VIEW_CONTENT, Params::new());
        assert!(!dir.path().join("analytics.jsonl").exists());
    }
}
