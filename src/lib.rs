#![doc(test(attr(deny(warnings))))]

//! Funnel Core drives a five-step car-service quote funnel: it collects the
//! lead, grades it, and hands it off as a prefilled WhatsApp message.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Funnel Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_can_run_twice() {
        super::init();
        super::init();
    }
}
