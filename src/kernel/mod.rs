pub mod engine;
pub mod intent;
pub mod orchestrator;
pub mod policy;
pub mod safety;
pub mod state;
pub mod telemetry;

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock seconds since the Unix epoch. Telemetry and intent stamps only;
/// no control decision depends on it.
pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
