use serde::{Deserialize, Serialize};

use crate::kernel::engine::StateEngine;
use crate::kernel::intent::store::IntentStore;
use crate::kernel::intent::types::{GoalSpec, IntentType};
use crate::kernel::orchestrator::Orchestrator;
use crate::kernel::policy::PolicyGate;
use crate::kernel::safety::SafetyGate;
use crate::kernel::state::SystemState;
use crate::kernel::telemetry::TelemetryBus;

/// Initial conditions and pacing for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub initial_position: f64,
    pub initial_battery: f64,
    pub initial_temperature: f64,
    pub mission_goal_reference: f64,
    pub mission_goal_tolerance: f64,
    pub cycle_interval_secs: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_position: 0.0,
            initial_battery: 24.0,
            initial_temperature: 25.0,
            mission_goal_reference: 3.0,
            mission_goal_tolerance: 0.1,
            cycle_interval_secs: 1.0,
        }
    }
}

/// Single source of truth for simulation wiring and initial conditions.
///
/// Wires store, engine, gates, and bus into an orchestrator and submits the
/// initial orbit-correction mission intent. The telemetry bus handle is
/// reachable through the returned orchestrator and can be cloned for readers.
pub fn build_simulation(config: &SimulationConfig) -> Orchestrator {
    let mut state = SystemState::new();
    state.position = config.initial_position;
    state.battery_level = config.initial_battery;
    state.temperature = config.initial_temperature;

    let mut intents = IntentStore::new();
    intents.submit_with_goal(
        IntentType::OrbitCorrection,
        GoalSpec {
            target: Some("orbital_deviation".to_string()),
            reference: Some(config.mission_goal_reference),
            metric: Some("position".to_string()),
            tolerance: Some(config.mission_goal_tolerance),
        },
    );

    Orchestrator::new(
        intents,
        StateEngine::new(state),
        PolicyGate::new(),
        SafetyGate::new(),
        TelemetryBus::new(),
    )
}
