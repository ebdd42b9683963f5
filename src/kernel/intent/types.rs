use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kernel::unix_now;

pub type IntentId = String;

/// Closed set of intent types. The `_recovery` suffix in the wire name is
/// semantically significant: recovery intents are exempt from SAFE-mode
/// restrictions and subject to the recovery lock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    OrbitCorrection,
    BatteryRecovery,
    ThermalRecovery,
}

impl IntentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::OrbitCorrection => "orbit_correction",
            IntentType::BatteryRecovery => "battery_recovery",
            IntentType::ThermalRecovery => "thermal_recovery",
        }
    }

    pub fn is_recovery(&self) -> bool {
        matches!(self, IntentType::BatteryRecovery | IntentType::ThermalRecovery)
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intent lifecycle. Transitions are monotone through the DAG
/// `Pending -> Active -> {Completed, Denied}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
    Pending,
    Active,
    Completed,
    Denied,
}

impl IntentStatus {
    /// Pending or Active: still visible to queries and eligible for selection.
    pub fn is_open(&self) -> bool {
        matches!(self, IntentStatus::Pending | IntentStatus::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IntentStatus::Completed | IntentStatus::Denied)
    }
}

/// Outcome descriptor. Interpreted by the StateEngine's completion check;
/// all fields optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub target: Option<String>,
    pub reference: Option<f64>,
    pub metric: Option<String>,
    pub tolerance: Option<f64>,
}

impl GoalSpec {
    /// The position reference, when this goal is expressed in the position metric.
    pub fn position_reference(&self) -> Option<f64> {
        if self.metric.as_deref() == Some("position") {
            self.reference
        } else {
            None
        }
    }
}

/// Durable, outcome-oriented intent owned by the satellite.
///
/// An intent describes what condition should become true, not how it is
/// achieved. `intent_id` is unique and immutable for the life of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub intent_id: IntentId,
    pub intent_type: IntentType,
    pub created_at: f64,
    pub last_updated: f64,

    pub goal: GoalSpec,
    pub status: IntentStatus,

    // Evaluation tracking
    pub evaluation_cycles: u32,
    pub safety_block_cycles: u32,
    pub consecutive_selected_cycles: u32,
    pub stable_nominal_cycles: u32,

    pub block_reason: Option<String>,
}

impl Intent {
    pub fn new(intent_type: IntentType, goal: GoalSpec) -> Self {
        let now = unix_now();
        Self {
            intent_id: Uuid::new_v4().to_string(),
            intent_type,
            created_at: now,
            last_updated: now,
            goal,
            status: IntentStatus::Pending,
            evaluation_cycles: 0,
            safety_block_cycles: 0,
            consecutive_selected_cycles: 0,
            stable_nominal_cycles: 0,
            block_reason: None,
        }
    }

    pub fn mark_active(&mut self) {
        self.status = IntentStatus::Active;
        self.last_updated = unix_now();
    }

    pub fn mark_completed(&mut self) {
        self.status = IntentStatus::Completed;
        self.last_updated = unix_now();
    }

    pub fn mark_denied(&mut self, reason: &str) {
        self.status = IntentStatus::Denied;
        self.block_reason = Some(reason.to_string());
        self.last_updated = unix_now();
    }
}
