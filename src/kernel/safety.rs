use std::fmt;

use serde::{Deserialize, Serialize};

use super::intent::types::{Intent, IntentType};
use super::state::{
    Mode, SystemState, CRITICAL_BATTERY, CRITICAL_TEMP, MAX_TEMP, MIN_BATTERY, POSITION_MAX,
    POSITION_MIN, SAFE_ENTRY_BATTERY, SAFE_ENTRY_TEMP,
};

/// Physical domain a reading or an intent touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Battery,
    Thermal,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Battery => "battery",
            Domain::Thermal => "thermal",
        }
    }

    /// The recovery intent type that addresses this domain.
    pub fn recovery_intent(&self) -> IntentType {
        match self {
            Domain::Battery => IntentType::BatteryRecovery,
            Domain::Thermal => IntentType::ThermalRecovery,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an execution was blocked. Rendered to a reason tag only at the
/// telemetry boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyReason {
    BatteryDepleted,
    TemperatureMaxExceeded,
    PositionBoundsExceeded,
    SafeModeMissionBlocked,
    LowPowerEnergyIntensiveBlocked,
    UnsafeExecution(Domain),
}

impl fmt::Display for SafetyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyReason::BatteryDepleted => f.write_str("battery_depleted"),
            SafetyReason::TemperatureMaxExceeded => f.write_str("temperature_max_exceeded"),
            SafetyReason::PositionBoundsExceeded => f.write_str("position_bounds_exceeded"),
            SafetyReason::SafeModeMissionBlocked => f.write_str("safe_mode_mission_blocked"),
            SafetyReason::LowPowerEnergyIntensiveBlocked => {
                f.write_str("low_power_energy_intensive_blocked")
            }
            SafetyReason::UnsafeExecution(domain) => {
                write!(f, "{}_unsafe_execution_blocked", domain)
            }
        }
    }
}

/// Pure evaluation result.
///
/// `critical_domains` lists domains past CRITICAL thresholds regardless of
/// whether execution is blocked; the orchestrator uses it for override logic.
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyDecision {
    pub blocked: bool,
    pub reason: Option<SafetyReason>,
    pub critical_domains: Vec<Domain>,
}

impl SafetyDecision {
    fn pass(critical_domains: Vec<Domain>) -> Self {
        Self {
            blocked: false,
            reason: None,
            critical_domains,
        }
    }

    fn block(reason: SafetyReason, critical_domains: Vec<Domain>) -> Self {
        Self {
            blocked: true,
            reason: Some(reason),
            critical_domains,
        }
    }
}

/// Reflexive invariant enforcement layer.
///
/// Evaluation order: critical detection, hard invariants, violated-domain
/// computation, mode restrictions, domain-aware blocking. Detects and
/// reports; never changes mode, injects intents, or mutates state.
pub struct SafetyGate;

impl SafetyGate {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, candidate: Option<&Intent>, state: &SystemState) -> SafetyDecision {
        let mut critical_domains = Vec::new();

        if state.battery_level <= CRITICAL_BATTERY {
            critical_domains.push(Domain::Battery);
        }
        if state.temperature >= CRITICAL_TEMP {
            critical_domains.push(Domain::Thermal);
        }

        // Hard invariants block unconditionally, candidate or not.
        if state.battery_level <= MIN_BATTERY {
            return SafetyDecision::block(SafetyReason::BatteryDepleted, critical_domains);
        }
        if state.temperature >= MAX_TEMP {
            return SafetyDecision::block(SafetyReason::TemperatureMaxExceeded, critical_domains);
        }
        if state.position < POSITION_MIN || state.position > POSITION_MAX {
            return SafetyDecision::block(SafetyReason::PositionBoundsExceeded, critical_domains);
        }

        let mut violated_domains = Vec::new();
        if state.battery_level <= SAFE_ENTRY_BATTERY {
            violated_domains.push(Domain::Battery);
        }
        if state.temperature >= SAFE_ENTRY_TEMP {
            violated_domains.push(Domain::Thermal);
        }

        let Some(intent) = candidate else {
            return SafetyDecision::pass(critical_domains);
        };

        // Mode restrictions.
        if state.mode == Mode::Safe && !intent.intent_type.is_recovery() {
            return SafetyDecision::block(SafetyReason::SafeModeMissionBlocked, critical_domains);
        }
        if state.mode == Mode::LowPower && Self::is_energy_intensive(intent.intent_type) {
            return SafetyDecision::block(
                SafetyReason::LowPowerEnergyIntensiveBlocked,
                critical_domains,
            );
        }

        // Domain-aware blocking: an intent touching a violated domain is
        // blocked unless it is the recovery path for that domain.
        let affected = Self::affected_domains(intent.intent_type);
        for domain in violated_domains {
            if affected.contains(&domain) && !intent.intent_type.is_recovery() {
                return SafetyDecision::block(
                    SafetyReason::UnsafeExecution(domain),
                    critical_domains,
                );
            }
        }

        SafetyDecision::pass(critical_domains)
    }

    /// Domains an intent's execution touches.
    pub fn affected_domains(intent_type: IntentType) -> &'static [Domain] {
        match intent_type {
            IntentType::OrbitCorrection => &[Domain::Battery, Domain::Thermal],
            IntentType::BatteryRecovery => &[Domain::Battery],
            IntentType::ThermalRecovery => &[Domain::Thermal],
        }
    }

    pub fn is_energy_intensive(intent_type: IntentType) -> bool {
        matches!(intent_type, IntentType::OrbitCorrection)
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new()
    }
}
