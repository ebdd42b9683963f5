use std::fmt;

use serde::{Deserialize, Serialize};

// Mode thresholds. Entry and exit are deliberately asymmetric (hysteresis);
// the exit epsilons keep the mode machine from chattering at the boundary.
pub const SAFE_ENTRY_BATTERY: f64 = 10.0;
pub const SAFE_EXIT_BATTERY: f64 = 20.0;
pub const SAFE_EXIT_EPSILON: f64 = 0.5;
pub const SAFE_ENTRY_TEMP: f64 = 120.0;
pub const SAFE_EXIT_TEMP: f64 = 100.0;
pub const SAFE_EXIT_TEMP_EPSILON: f64 = 1.0;
pub const LOW_POWER_ENTRY: f64 = 25.0;
pub const LOW_POWER_EXIT: f64 = 30.0;
pub const LOW_POWER_EXIT_EPSILON: f64 = 0.5;

// Critical thresholds. Crossing one triggers orchestrator override, not a block.
pub const CRITICAL_BATTERY: f64 = 5.0;
pub const CRITICAL_TEMP: f64 = 140.0;

// Hard safety bounds. Crossing one blocks every execution path.
pub const MIN_BATTERY: f64 = 0.0;
pub const MAX_TEMP: f64 = 150.0;
pub const POSITION_MIN: f64 = -10.0;
pub const POSITION_MAX: f64 = 10.0;

// Power model.
pub const BASE_LOAD: f64 = 0.6;
pub const SOLAR_CHARGE_RATE: f64 = 1.2;
pub const MAX_CHARGE_RATE: f64 = 1.5;
pub const CHARGE_EFFICIENCY: f64 = 0.95;
pub const ECLIPSE_PERIOD: u64 = 20;
pub const ECLIPSE_DURATION: u64 = 6;

/// Coarse operational mode of the satellite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Nominal,
    LowPower,
    Safe,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Nominal => "NOMINAL",
            Mode::LowPower => "LOW_POWER",
            Mode::Safe => "SAFE",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable physical record of the satellite.
///
/// Only the StateEngine mutates this; every other component reads it through
/// a borrowed reference or a [`StateSnapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SystemState {
    pub position: f64,
    pub battery_level: f64,
    pub temperature: f64,
    pub mode: Mode,
    pub cycle_count: u64,
}

impl Default for SystemState {
    fn default() -> Self {
        Self {
            position: 0.0,
            battery_level: 100.0,
            temperature: 25.0,
            mode: Mode::Nominal,
            cycle_count: 0,
        }
    }
}

impl SystemState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value-only projection for telemetry.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            position: self.position,
            battery_level: self.battery_level,
            temperature: self.temperature,
            mode: self.mode,
        }
    }
}

/// Read-only view of [`SystemState`] carried inside telemetry frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub position: f64,
    pub battery_level: f64,
    pub temperature: f64,
    pub mode: Mode,
}
