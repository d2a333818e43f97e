//! Funnel record types shared by the wizard, storage, and message layers.

pub mod funnel;
pub mod service;

pub use funnel::{present, FunnelData, FunnelUpdate, Grade, PhotoAttachment, DEFAULT_MAX_PHOTOS};
pub use service::Service;
