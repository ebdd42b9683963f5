use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kernel::intent::types::IntentId;
use crate::kernel::policy::PolicyResult;
use crate::kernel::safety::{Domain, SafetyDecision};
use crate::kernel::state::{StateSnapshot, SystemState};

pub const CYCLE_FRAME_KIND: &str = "cycle_frame";

// Allowed in frames: values, ids, tags. Forbidden: references to live intents.

/// One structured telemetry record per orchestration cycle. The bus stamps
/// the timestamp and kind tag on append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleFrame {
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: FrameData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameData {
    pub state: StateSnapshot,
    pub policy: PolicyFrame,
    pub execution: ExecutionFrame,
    pub safety: SafetyFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyFrame {
    pub selected_intent_id: Option<IntentId>,
    pub scores: BTreeMap<IntentId, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionFrame {
    pub executed_intent_id: Option<IntentId>,
    pub override_applied: bool,
    pub lock_applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyFrame {
    pub blocked: bool,
    pub critical_domains: Vec<Domain>,
    pub reason: Option<String>,
}

/// Projects one cycle's decisions into value-only [`FrameData`].
pub struct TelemetryBuilder;

impl TelemetryBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build_frame(
        &self,
        state: &SystemState,
        policy: &PolicyResult,
        safety: &SafetyDecision,
        executed_intent_id: Option<&str>,
        override_applied: bool,
        lock_applied: bool,
    ) -> FrameData {
        FrameData {
            state: state.snapshot(),
            policy: PolicyFrame {
                selected_intent_id: policy.selected_id().map(String::from),
                scores: policy.scores.clone(),
            },
            execution: ExecutionFrame {
                executed_intent_id: executed_intent_id.map(String::from),
                override_applied,
                lock_applied,
            },
            safety: SafetyFrame {
                blocked: safety.blocked,
                critical_domains: safety.critical_domains.clone(),
                reason: safety.reason.map(|r| r.to_string()),
            },
        }
    }
}

impl Default for TelemetryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
