//! Observability subsystem
//!
//! Lifecycle events are emitted through `tracing` with the event name in the
//! `event` field. The library never installs a subscriber; binaries and tests
//! call [`init_tracing`] when they want output.
//!
//! # Usage
//!
//! ```ignore
//! use viewquery::observability::{init_tracing, record, Event};
//!
//! init_tracing("viewquery=debug");
//! record(Event::ViewMissing, "QC-Page-created_at");
//! ```

mod events;

pub use events::Event;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Emit a lifecycle event for a view
pub fn record(event: Event, index: &str) {
    if event.is_failure() {
        warn!(event = event.as_str(), index, "view query event");
    } else if event.is_notable() {
        info!(event = event.as_str(), index, "view query event");
    } else {
        debug!(event = event.as_str(), index, "view query event");
    }
}

/// Installs a fmt subscriber. `RUST_LOG` wins over `default_directive`.
///
/// Returns false if a global subscriber was already set.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
