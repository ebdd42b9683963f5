pub mod bus;
pub mod frame;

pub use bus::TelemetryBus;
pub use frame::{CycleFrame, TelemetryBuilder};
