use std::collections::BTreeMap;

use super::intent::types::{Intent, IntentId, IntentType};
use super::state::{Mode, SystemState, LOW_POWER_EXIT, SAFE_EXIT_BATTERY, SAFE_EXIT_TEMP};

pub const RECOVERY_SCALE: f64 = 1000.0;
pub const MISSION_BASE_SCORE: f64 = 100.0;
pub const LOW_POWER_BIAS: f64 = 50.0;
pub const NOMINAL_RECOVERY_PENALTY: f64 = -200.0;
pub const HISTORY_PENALTY_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyReason {
    NoActiveIntents,
    HighestScoreSelected,
}

impl PolicyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyReason::NoActiveIntents => "no_active_intents",
            PolicyReason::HighestScoreSelected => "highest_score_selected",
        }
    }
}

/// Scoring and selection result. Carries the full score map keyed by intent id.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyResult {
    pub selected: Option<Intent>,
    pub scores: BTreeMap<IntentId, f64>,
    pub reason: PolicyReason,
}

impl PolicyResult {
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|i| i.intent_id.as_str())
    }
}

/// Pure scoring over the active intent set.
///
/// Recovery intents score by threshold severity; the mission intent carries a
/// flat base score. Mode biases push recovery work up in LOW_POWER and down
/// in NOMINAL, and a lightweight history penalty drains intents that keep
/// getting safety-blocked. Never mutates; never detects criticals.
pub struct PolicyGate;

impl PolicyGate {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, intents: &[Intent], state: &SystemState) -> PolicyResult {
        if intents.is_empty() {
            return PolicyResult {
                selected: None,
                scores: BTreeMap::new(),
                reason: PolicyReason::NoActiveIntents,
            };
        }

        let mut scores = BTreeMap::new();
        let mut best: Option<(&Intent, f64)> = None;

        for intent in intents {
            let score = self.score(intent, state);
            scores.insert(intent.intent_id.clone(), score);

            // Strict greater-than: ties resolve to insertion order.
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((intent, score));
            }
        }

        PolicyResult {
            selected: best.map(|(intent, _)| intent.clone()),
            scores,
            reason: PolicyReason::HighestScoreSelected,
        }
    }

    fn score(&self, intent: &Intent, state: &SystemState) -> f64 {
        let mut score = match intent.intent_type {
            IntentType::BatteryRecovery => {
                let target = if state.mode == Mode::LowPower {
                    LOW_POWER_EXIT
                } else {
                    SAFE_EXIT_BATTERY
                };
                let severity = ((target - state.battery_level) / target).max(0.0);
                severity * RECOVERY_SCALE
            }
            IntentType::ThermalRecovery => {
                let severity =
                    ((state.temperature - SAFE_EXIT_TEMP) / SAFE_EXIT_TEMP).max(0.0);
                severity * RECOVERY_SCALE
            }
            IntentType::OrbitCorrection => MISSION_BASE_SCORE,
        };

        if intent.intent_type.is_recovery() {
            match state.mode {
                Mode::LowPower => score += LOW_POWER_BIAS,
                Mode::Nominal => score += NOMINAL_RECOVERY_PENALTY,
                Mode::Safe => {}
            }
        }

        score - f64::from(intent.safety_block_cycles) * HISTORY_PENALTY_FACTOR
    }
}

impl Default for PolicyGate {
    fn default() -> Self {
        Self::new()
    }
}
