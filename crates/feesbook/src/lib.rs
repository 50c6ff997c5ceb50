//! feesbook
//!
//! Command-line frontend for the tuition-fee ledger: registration, payment
//! capture, and collection reports. All business rules live in
//! feesbook-core; this crate only parses arguments, prompts, and renders.

pub mod cli;
pub mod errors;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feesbook=info"));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}
