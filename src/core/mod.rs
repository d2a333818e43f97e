//! Funnel business rules: grading, messaging, the step controller and its
//! best-effort side effects.

pub mod analytics;
pub mod deep_link;
pub mod grading;
pub mod message;
pub mod phone;
pub mod photos;
pub mod steps;
pub mod wizard;

pub use analytics::{Analytics, AnalyticsEvent, AnalyticsSink, MemorySink, UtmParams};
pub use deep_link::{encode_uri_component, whatsapp_url, LinkOpener, NoopLinkOpener, SystemLinkOpener};
pub use grading::{grade_funnel, grade_lead, score_lead, LeadScore};
pub use message::{format_message, MessageFields};
pub use phone::{sanitize_phone_number, validate_phone_number};
pub use steps::{blocking_reason, Step, TOTAL_STEPS};
pub use wizard::{FunnelWizard, Submission, WizardSettings};
