//! The funnel controller.
//!
//! [`FunnelWizard`] is the single owner of the lead record and the current
//! step. Views read through the accessors and write through [`FunnelWizard::update`]
//! or one of the field helpers; every write is persisted best effort.

use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::core::analytics::{events, params, Analytics, Params};
use crate::core::deep_link::{open_best_effort, whatsapp_url, LinkOpener};
use crate::core::grading::grade_funnel;
use crate::core::message::{format_message, MessageFields};
use crate::core::phone::{sanitize_for_calling_code, validate_phone_number};
use crate::core::steps::{blocking_reason, Step};
use crate::domain::{FunnelData, FunnelUpdate, Grade, PhotoAttachment, Service};
use crate::errors::{FunnelError, Result};
use crate::storage::{clear_snapshot, load_snapshot, save_snapshot, KeyValueStore};

/// Knobs the controller needs from the application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSettings {
    pub storage_key: String,
    pub max_photos: usize,
    pub whatsapp_number: String,
    pub calling_code: String,
    pub lead_grading: bool,
}

impl Default for WizardSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl WizardSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            max_photos: config.ui.max_photos,
            whatsapp_number: config.whatsapp.phone_number.clone(),
            calling_code: config.whatsapp.calling_code.clone(),
            lead_grading: config.features.lead_grading,
        }
    }
}

/// Outcome of the final step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub grade: Grade,
    pub message: String,
    pub url: String,
    /// Whether the link opener reported success.
    pub opened: bool,
}

pub struct FunnelWizard {
    data: FunnelData,
    step: Step,
    store: Box<dyn KeyValueStore>,
    analytics: Analytics,
    settings: WizardSettings,
}

impl FunnelWizard {
    /// Restores the previous snapshot if one exists and announces the first view.
    pub fn new(store: Box<dyn KeyValueStore>, analytics: Analytics, settings: WizardSettings) -> Self {
        let data: FunnelData =
            load_snapshot(store.as_ref(), &settings.storage_key).unwrap_or_default();
        if data != FunnelData::default() {
            tracing::info!(service = data.service_id(), "restored funnel progress");
        }
        let wizard = Self {
            data,
            step: Step::Service,
            store,
            analytics,
            settings,
        };
        wizard.emit_view();
        wizard
    }

    pub fn data(&self) -> &FunnelData {
        &self.data
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn settings(&self) -> &WizardSettings {
        &self.settings
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn blocking_reason(&self) -> Option<&'static str> {
        blocking_reason(self.step, &self.data)
    }

    pub fn can_proceed(&self) -> bool {
        self.blocking_reason().is_none()
    }

    /// Merges a partial update and persists the record.
    ///
    /// A new `year` clears `make` and `model`, a new `make` clears `model`,
    /// unless the same update supplies them. Returns whether anything changed.
    pub fn update(&mut self, mut update: FunnelUpdate) -> bool {
        self.cascade_vehicle(&mut update);
        if let Some(photos) = update.photos.as_mut() {
            photos.truncate(self.settings.max_photos);
        }

        let previous_service = self.data.service;
        let changed = self.data.merge(update);
        self.persist();
        if self.data.service != previous_service {
            self.emit_view();
        }
        changed
    }

    /// Advances one step; a no-op on the last step.
    pub fn next(&mut self) -> bool {
        match self.step.next() {
            Some(step) => {
                self.step = step;
                self.emit_view();
                true
            }
            None => false,
        }
    }

    /// Goes back one step; a no-op on the first step.
    pub fn back(&mut self) -> bool {
        match self.step.previous() {
            Some(step) => {
                self.step = step;
                self.emit_view();
                true
            }
            None => false,
        }
    }

    pub fn select_service(&mut self, service: Service) {
        self.update(FunnelUpdate::new().service(service));
        self.analytics
            .track(events::SELECT_SERVICE, params([("service", json!(service.id()))]));
    }

    pub fn set_year(&mut self, year: impl Into<String>) {
        self.update(FunnelUpdate::new().year(year));
    }

    pub fn set_make(&mut self, make: impl Into<String>) {
        self.update(FunnelUpdate::new().make(make));
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.update(FunnelUpdate::new().model(model));
    }

    pub fn select_package(&mut self, package: &str) {
        self.update(FunnelUpdate::new().package(package));
        self.track_with_service(events::SELECT_PACKAGE, "package", package);
    }

    pub fn select_finish(&mut self, finish: &str) {
        self.update(FunnelUpdate::new().finish(finish));
        self.track_with_service(events::SELECT_FINISH, "finish", finish);
    }

    pub fn select_brand(&mut self, brand: &str) {
        self.update(FunnelUpdate::new().brand(brand));
        self.track_with_service(events::SELECT_BRAND, "brand", brand);
    }

    /// Adds the addon when missing, removes it otherwise. Returns whether it is now selected.
    pub fn toggle_addon(&mut self, addon: &str) -> bool {
        let mut addons = self.data.addons.clone();
        let selected = if addons.remove(addon) {
            false
        } else {
            addons.insert(addon.to_string());
            true
        };
        self.update(FunnelUpdate::new().addons(addons));
        self.track_with_service(events::TOGGLE_ADDON, "addon", addon);
        selected
    }

    pub fn select_condition(&mut self, condition: &str) {
        self.update(FunnelUpdate::new().condition(condition));
        self.analytics
            .track(events::SELECT_CONDITION, params([("condition", json!(condition))]));
    }

    pub fn select_timing(&mut self, timing: &str) {
        self.update(FunnelUpdate::new().timing(timing));
        self.analytics
            .track(events::SELECT_TIMING, params([("timing", json!(timing))]));
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.update(FunnelUpdate::new().name(name));
    }

    pub fn set_color_idea(&mut self, idea: impl Into<String>) {
        self.update(FunnelUpdate::new().color_idea(idea));
    }

    /// Validates and stores a phone number in international form. Blank input clears it.
    pub fn set_phone(&mut self, raw: &str) -> Result<()> {
        if raw.trim().is_empty() {
            self.update(FunnelUpdate::new().phone(""));
            return Ok(());
        }
        validate_phone_number(raw).map_err(FunnelError::InvalidInput)?;
        let phone = sanitize_for_calling_code(raw, &self.settings.calling_code);
        self.update(FunnelUpdate::new().phone(phone));
        Ok(())
    }

    pub fn add_photo(&mut self, photo: PhotoAttachment) -> Result<()> {
        let max = self.settings.max_photos;
        if self.data.photos.len() >= max {
            return Err(FunnelError::InvalidInput(format!(
                "You can attach up to {max} photos"
            )));
        }
        let mut photos = self.data.photos.clone();
        photos.push(photo);
        self.update(FunnelUpdate::new().photos(photos));
        Ok(())
    }

    pub fn remove_photo(&mut self, index: usize) -> Option<PhotoAttachment> {
        if index >= self.data.photos.len() {
            return None;
        }
        let mut photos = self.data.photos.clone();
        let removed = photos.remove(index);
        self.update(FunnelUpdate::new().photos(photos));
        Some(removed)
    }

    pub fn photo_slots_left(&self) -> usize {
        self.settings.max_photos.saturating_sub(self.data.photos.len())
    }

    /// Grades the lead, renders the message and hands the deep link to `opener`.
    ///
    /// The grade is always recomputed from the current record; `lead_grading`
    /// only decides whether it rides along on the lead events. Fails only when
    /// the contact name is missing; opener failures are logged.
    pub fn submit(&mut self, opener: &dyn LinkOpener) -> Result<Submission> {
        if let Some(reason) = blocking_reason(Step::Contact, &self.data) {
            return Err(FunnelError::Incomplete(reason.to_string()));
        }

        let grade = grade_funnel(&self.data);
        self.data.grade = grade;
        self.persist();

        let message = format_message(&MessageFields::from(&self.data));
        let url = whatsapp_url(&self.settings.whatsapp_number, &message);
        let lead_params = || {
            let mut lead = params([("service", json!(self.data.service_id()))]);
            if self.settings.lead_grading {
                lead.insert("grade".to_string(), json!(grade.as_str()));
            }
            lead
        };

        self.analytics.track(events::LEAD_SUBMIT, lead_params());
        let opened = open_best_effort(opener, &url);
        self.analytics.track(events::CONTACT_WHATSAPP, lead_params());
        tracing::info!(grade = grade.as_str(), service = self.data.service_id(), "lead submitted");

        Ok(Submission {
            grade,
            message,
            url,
            opened,
        })
    }

    /// Drops the saved snapshot and starts a fresh quote.
    pub fn reset(&mut self) {
        clear_snapshot(self.store.as_ref(), &self.settings.storage_key);
        self.data = FunnelData::default();
        self.step = Step::Service;
        self.emit_view();
    }

    fn cascade_vehicle(&self, update: &mut FunnelUpdate) {
        let year_changed = update
            .year
            .as_deref()
            .is_some_and(|year| differs(self.data.year.as_deref(), year));
        if year_changed {
            update.make.get_or_insert_with(String::new);
            update.model.get_or_insert_with(String::new);
        }
        let make_changed = update
            .make
            .as_deref()
            .is_some_and(|make| differs(self.data.make.as_deref(), make));
        if make_changed {
            update.model.get_or_insert_with(String::new);
        }
    }

    fn persist(&self) {
        save_snapshot(self.store.as_ref(), &self.settings.storage_key, &self.data);
    }

    fn emit_view(&self) {
        let service = match self.data.service {
            Some(service) => Value::from(service.id()),
            None => Value::from("none"),
        };
        let view: Params = params([
            ("step", json!(self.step.index())),
            ("service", service),
        ]);
        self.analytics.track(events::VIEW_CONTENT, view.clone());
        self.analytics.track(events::STEP_PROGRESS, view);
    }

    fn track_with_service(&self, name: &str, key: &str, value: &str) {
        self.analytics.track(
            name,
            params([(key, json!(value)), ("service", json!(self.data.service_id()))]),
        );
    }
}

fn differs(current: Option<&str>, incoming: &str) -> bool {
    let incoming = Some(incoming).filter(|value| !value.is_empty());
    current != incoming
}

impl std::fmt::Debug for FunnelWizard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunnelWizard")
            .field("step", &self.step)
            .field("data", &self.data)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
