use std::sync::Mutex;

use funnel_core::core::analytics::{Analytics, MemorySink};
use funnel_core::core::deep_link::{LinkOpener, NoopLinkOpener};
use funnel_core::core::steps::Step;
use funnel_core::core::wizard::{FunnelWizard, WizardSettings};
use funnel_core::domain::{FunnelUpdate, Grade, Service};
use funnel_core::errors::{FunnelError, Result};
use funnel_core::storage::{JsonFileStore, MemoryStore};
use tempfile::TempDir;

fn memory_wizard() -> (FunnelWizard, MemorySink) {
    let sink = MemorySink::new();
    let wizard = FunnelWizard::new(
        Box::new(MemoryStore::new()),
        Analytics::new(Box::new(sink.clone())),
        WizardSettings::default(),
    );
    (wizard, sink)
}

fn file_wizard(dir: &TempDir) -> FunnelWizard {
    let store = JsonFileStore::new(dir.path().join("state")).expect("create store");
    FunnelWizard::new(Box::new(store), Analytics::disabled(), WizardSettings::default())
}

fn fill_ppf_lead(wizard: &mut FunnelWizard) {
    wizard.select_service(Service::Ppf);
    wizard.set_year("2024");
    wizard.set_make("Ferrari");
    wizard.set_model("Roma");
    wizard.select_package("full_body");
    wizard.select_brand("xpel");
    wizard.select_condition("new");
    wizard.select_timing("asap");
    wizard.set_name("Mira");
}

/// Records every URL it is asked to open.
#[derive(Default)]
struct RecordingOpener {
    urls: Mutex<Vec<String>>,
    fail: bool,
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            Err(FunnelError::External("no browser".into()))
        } else {
            Ok(())
        }
    }
}

#[test]
fn navigation_is_bounded_on_both_ends() {
    let (mut wizard, _) = memory_wizard();
    assert!(!wizard.back());
    assert_eq!(wizard.step(), Step::Service);

    for _ in 0..4 {
        assert!(wizard.next());
    }
    assert_eq!(wizard.step(), Step::Contact);
    assert!(!wizard.next());

    assert!(wizard.back());
    assert_eq!(wizard.step(), Step::ConditionTiming);
}

#[test]
fn every_step_change_emits_view_and_progress() {
    let (mut wizard, sink) = memory_wizard();
    sink.clear();
    wizard.next();

    let events = sink.events();
    let names: Vec<&str> = events.iter().map(|event| event.name.as_str()).collect();
    assert_eq!(names, ["view_content", "step_progress"]);
    assert_eq!(events[0].params["step"], 2);
    assert_eq!(events[0].param_str("service"), Some("none"));
}

#[test]
fn mounting_emits_first_view_and_progress() {
    let (_wizard, sink) = memory_wizard();

    let events = sink.events();
    let names: Vec<&str> = events.iter().map(|event| event.name.as_str()).collect();
    assert_eq!(names, ["view_content", "step_progress"]);
    for event in &events {
        assert_eq!(event.params["step"], 1);
        assert_eq!(event.param_str("service"), Some("none"));
    }
}

#[test]
fn service_change_emits_view_once() {
    let (mut wizard, sink) = memory_wizard();
    sink.clear();
    wizard.select_service(Service::Ppf);

    let views: Vec<_> = sink
        .events()
        .into_iter()
        .filter(|event| event.name == "view_content")
        .collect();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].param_str("service"), Some("ppf"));
    assert_eq!(views[0].params["step"], 1);

    sink.clear();
    wizard.select_service(Service::Ppf);
    assert_eq!(sink.names(), ["select_service"]);
}

#[test]
fn partial_updates_leave_other_fields_alone() {
    let (mut wizard, _) = memory_wizard();
    wizard.update(FunnelUpdate::new().name("Mira").condition("fair"));
    wizard.update(FunnelUpdate::new().timing("flexible"));

    let data = wizard.data();
    assert_eq!(data.name.as_deref(), Some("Mira"));
    assert_eq!(data.condition.as_deref(), Some("fair"));
    assert_eq!(data.timing.as_deref(), Some("flexible"));
}

#[test]
fn service_change_keeps_package_choices() {
    let (mut wizard, _) = memory_wizard();
    wizard.select_service(Service::Wrapping);
    wizard.select_package("full_wrap");
    wizard.select_service(Service::Detailing);
    assert_eq!(wizard.data().package.as_deref(), Some("full_wrap"));
}

#[test]
fn selection_events_carry_the_service() {
    let (mut wizard, sink) = memory_wizard();
    wizard.select_service(Service::Detailing);
    sink.clear();
    wizard.select_package("full");
    wizard.toggle_addon("engine_bay");

    let events = sink.events();
    assert_eq!(events[0].name, "select_package");
    assert_eq!(events[0].param_str("package"), Some("full"));
    assert_eq!(events[0].param_str("service"), Some("detailing"));
    assert_eq!(events[1].name, "toggle_addon");
    assert_eq!(events[1].param_str("addon"), Some("engine_bay"));
}

#[test]
fn submit_grades_opens_link_and_tracks_in_order() {
    let (mut wizard, sink) = memory_wizard();
    fill_ppf_lead(&mut wizard);
    sink.clear();

    let opener = RecordingOpener::default();
    let submission = wizard.submit(&opener).expect("submit");

    assert_eq!(submission.grade, Grade::A);
    assert!(submission.opened);
    assert!(submission.url.starts_with("https://wa.me/971567191045?text="));
    assert_eq!(opener.urls.lock().unwrap().as_slice(), [submission.url.clone()]);
    assert_eq!(wizard.data().grade, Grade::A);

    let events = sink.events();
    assert_eq!(sink.names(), ["lead_submit", "contact_whatsapp"]);
    assert_eq!(events[0].param_str("grade"), Some("A"));
    assert_eq!(events[1].param_str("service"), Some("ppf"));
}

#[test]
fn opener_failure_is_not_a_submit_failure() {
    let (mut wizard, sink) = memory_wizard();
    fill_ppf_lead(&mut wizard);
    let opener = RecordingOpener {
        fail: true,
        ..RecordingOpener::default()
    };

    let submission = wizard.submit(&opener).expect("submit");
    assert!(!submission.opened);
    assert!(sink.names().ends_with(&["lead_submit".to_string(), "contact_whatsapp".to_string()]));
}

#[test]
fn submit_is_refused_without_a_name() {
    let (mut wizard, _) = memory_wizard();
    wizard.select_service(Service::Ppf);
    let err = wizard.submit(&NoopLinkOpener).unwrap_err();
    assert!(matches!(err, FunnelError::Incomplete(reason) if reason == "Enter your name to continue"));
}

#[test]
fn progress_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    {
        let mut wizard = file_wizard(&dir);
        fill_ppf_lead(&mut wizard);
        wizard.set_phone("050 123 4567").unwrap();
    }

    let restored = file_wizard(&dir);
    let data = restored.data();
    assert_eq!(restored.step(), Step::Service);
    assert_eq!(data.service, Some(Service::Ppf));
    assert_eq!(data.model.as_deref(), Some("Roma"));
    assert_eq!(data.phone.as_deref(), Some("+971501234567"));
}

#[test]
fn reset_forgets_saved_progress() {
    let dir = TempDir::new().unwrap();
    let mut wizard = file_wizard(&dir);
    fill_ppf_lead(&mut wizard);
    wizard.next();
    wizard.reset();
    assert_eq!(wizard.step(), Step::Service);

    let restored = file_wizard(&dir);
    assert_eq!(restored.data().service, None);
    assert_eq!(restored.data().name, None);
}

#[test]
fn custom_photo_cap_is_respected() {
    let settings = WizardSettings {
        max_photos: 1,
        ..WizardSettings::default()
    };
    let mut wizard =
        FunnelWizard::new(Box::new(MemoryStore::new()), Analytics::disabled(), settings);
    let photo = funnel_core::domain::PhotoAttachment::new("a.jpg", "image/jpeg", vec![1, 2, 3]);
    wizard.add_photo(photo.clone()).unwrap();
    assert_eq!(wizard.photo_slots_left(), 0);
    assert!(matches!(wizard.add_photo(photo), Err(FunnelError::InvalidInput(_))));
}
