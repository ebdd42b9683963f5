use tracing::info;

use super::intent::types::{Intent, IntentType};
use super::state::{
    Mode, SystemState, BASE_LOAD, CHARGE_EFFICIENCY, ECLIPSE_DURATION, ECLIPSE_PERIOD,
    LOW_POWER_ENTRY, LOW_POWER_EXIT, LOW_POWER_EXIT_EPSILON, MAX_CHARGE_RATE, MIN_BATTERY,
    SAFE_ENTRY_BATTERY, SAFE_ENTRY_TEMP, SAFE_EXIT_BATTERY, SAFE_EXIT_EPSILON, SAFE_EXIT_TEMP,
    SAFE_EXIT_TEMP_EPSILON, SOLAR_CHARGE_RATE,
};

/// Fallback position goal when an orbit-correction intent carries no usable
/// goal descriptor.
pub const DEFAULT_ORBIT_GOAL: f64 = 3.0;

/// The only component that mutates [`SystemState`].
///
/// `apply` performs at most one mutation per cycle: mode advancement always
/// runs, physics runs only for an authorized candidate. The physics model is
/// prescribed, not measured.
pub struct StateEngine {
    state: SystemState,
}

impl StateEngine {
    pub fn new(state: SystemState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    /// Advance mode, then apply the candidate's physics if one is present.
    /// Returns `true` when a candidate was processed.
    pub fn apply(&mut self, candidate: Option<&mut Intent>) -> bool {
        self.update_mode();

        let Some(intent) = candidate else {
            return false;
        };

        self.state.cycle_count += 1;
        intent.evaluation_cycles += 1;
        intent.mark_active();

        if self.state.mode == Mode::Safe {
            self.apply_power_model();
            self.apply_recovery_physics(intent.intent_type);
        } else {
            if intent.intent_type == IntentType::OrbitCorrection {
                self.apply_orbit_physics();
            }
            self.apply_power_model();
            if intent.intent_type.is_recovery() {
                self.apply_recovery_physics(intent.intent_type);
            }
        }

        self.check_completion(intent);
        true
    }

    /// Hysteresis mode machine. Clauses run top-down; the first match wins.
    pub fn update_mode(&mut self) {
        let state = &self.state;

        let next = if state.battery_level <= SAFE_ENTRY_BATTERY
            || state.temperature >= SAFE_ENTRY_TEMP
        {
            Mode::Safe
        } else if state.mode == Mode::Safe
            && state.battery_level >= SAFE_EXIT_BATTERY - SAFE_EXIT_EPSILON
            && state.temperature <= SAFE_EXIT_TEMP + SAFE_EXIT_TEMP_EPSILON
        {
            Mode::Nominal
        } else if state.battery_level <= LOW_POWER_ENTRY {
            Mode::LowPower
        } else if state.mode == Mode::LowPower
            && state.battery_level >= LOW_POWER_EXIT - LOW_POWER_EXIT_EPSILON
        {
            Mode::Nominal
        } else {
            state.mode
        };

        if next != self.state.mode {
            info!(from = %self.state.mode, to = %next, "mode transition");
            self.state.mode = next;
        }
    }

    /// Deterministic eclipse power model, driven by `cycle_count`.
    pub fn apply_power_model(&mut self) {
        let phase = self.state.cycle_count % ECLIPSE_PERIOD;
        let in_sunlight = phase < ECLIPSE_PERIOD - ECLIPSE_DURATION;

        let solar = if in_sunlight { SOLAR_CHARGE_RATE } else { 0.0 };
        let charge = solar.min(MAX_CHARGE_RATE) * CHARGE_EFFICIENCY;

        self.state.battery_level =
            (self.state.battery_level + charge - BASE_LOAD).max(MIN_BATTERY);
    }

    pub fn apply_orbit_physics(&mut self) {
        self.state.position += 0.5;
        self.state.battery_level -= 1.0;
        self.state.temperature += 2.0;
    }

    /// Asymptotic recovery: close a tenth of the remaining deficit per cycle.
    pub fn apply_recovery_physics(&mut self, intent_type: IntentType) {
        match intent_type {
            IntentType::BatteryRecovery => {
                let target = self.battery_recovery_target();
                let deficit = target - self.state.battery_level;
                if deficit > 0.0 {
                    self.state.battery_level =
                        (self.state.battery_level + 0.1 * deficit).min(target);
                }
            }
            IntentType::ThermalRecovery => {
                let excess = self.state.temperature - SAFE_EXIT_TEMP;
                if excess > 0.0 {
                    self.state.temperature -= 0.1 * excess;
                }
            }
            IntentType::OrbitCorrection => {}
        }
    }

    /// Charge target for battery recovery, mode-dependent.
    pub fn battery_recovery_target(&self) -> f64 {
        match self.state.mode {
            Mode::Safe => SAFE_EXIT_BATTERY,
            Mode::LowPower => LOW_POWER_EXIT,
            Mode::Nominal => {
                if self.state.battery_level < LOW_POWER_EXIT {
                    LOW_POWER_EXIT
                } else {
                    SAFE_EXIT_BATTERY
                }
            }
        }
    }

    fn check_completion(&self, intent: &mut Intent) {
        let done = match intent.intent_type {
            IntentType::OrbitCorrection => {
                let goal = intent.goal.position_reference().unwrap_or(DEFAULT_ORBIT_GOAL);
                self.state.position >= goal
            }
            IntentType::BatteryRecovery => {
                self.state.battery_level >= self.battery_recovery_target()
            }
            IntentType::ThermalRecovery => {
                self.state.temperature <= SAFE_EXIT_TEMP + SAFE_EXIT_TEMP_EPSILON
            }
        };

        if done {
            info!(intent_id = %intent.intent_id, intent_type = %intent.intent_type, "goal reached");
            intent.mark_completed();
        }
    }
}
