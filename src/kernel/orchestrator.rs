use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::engine::StateEngine;
use super::intent::store::IntentStore;
use super::intent::types::{Intent, IntentId, IntentType};
use super::policy::{PolicyGate, PolicyResult};
use super::safety::{Domain, SafetyDecision, SafetyGate};
use super::state::{Mode, SystemState, SAFE_ENTRY_BATTERY, SAFE_ENTRY_TEMP};
use super::telemetry::{TelemetryBuilder, TelemetryBus};

/// A freshly selected recovery intent keeps the selection for at least this
/// many consecutive cycles, unless a critical domain preempts it.
pub const MIN_RECOVERY_LOCK_CYCLES: u32 = 3;

/// Cycle driver.
///
/// Composes store, gates, engine, and telemetry in a fixed per-cycle order:
/// SAFE-injection apply, SAFE staging, policy, first safety, critical
/// override, recovery lock, second safety, block-or-execute, lock tracking,
/// archival, frame emission. Owns the cycle-to-cycle arbitration state;
/// scoring, threshold detection, and physics live in the components.
pub struct Orchestrator {
    pub intents: IntentStore,
    pub engine: StateEngine,
    pub policy: PolicyGate,
    pub safety: SafetyGate,
    pub telemetry: TelemetryBus,

    builder: TelemetryBuilder,
    last_selected: Option<IntentId>,
    pending_safe_injections: BTreeSet<IntentType>,
}

impl Orchestrator {
    pub fn new(
        intents: IntentStore,
        engine: StateEngine,
        policy: PolicyGate,
        safety: SafetyGate,
        telemetry: TelemetryBus,
    ) -> Self {
        Self {
            intents,
            engine,
            policy,
            safety,
            telemetry,
            builder: TelemetryBuilder::new(),
            last_selected: None,
            pending_safe_injections: BTreeSet::new(),
        }
    }

    /// Advance the engine by `cycles` iterations synchronously. Callers are
    /// responsible for pacing.
    pub fn run(&mut self, cycles: usize) {
        for _ in 0..cycles {
            self.run_cycle();
        }
    }

    /// Recovery injections staged this cycle, applied at the start of the next.
    pub fn staged_safe_injections(&self) -> &BTreeSet<IntentType> {
        &self.pending_safe_injections
    }

    pub fn last_selected_id(&self) -> Option<&str> {
        self.last_selected.as_deref()
    }

    fn run_cycle(&mut self) {
        // Injections staged last cycle land before anything else observes
        // the active set.
        self.apply_pending_safe_injections();
        self.pending_safe_injections = Self::compute_safe_injections(self.engine.state());

        let active = self.intents.list_active();
        let policy_result = self.policy.evaluate(&active, self.engine.state());

        let mut selected = policy_result.selected.clone();
        let mut override_applied = false;
        let mut lock_applied = false;
        let mut executed_intent_id: Option<IntentId> = None;

        let safety_first = self.safety.evaluate(selected.as_ref(), self.engine.state());

        // Critical override: a domain past its critical threshold forces the
        // matching recovery intent into the selection, submitting one if none
        // is active.
        if !safety_first.critical_domains.is_empty() {
            if let Some(target) = self.apply_critical_override(&safety_first.critical_domains) {
                if selected.as_ref().map(|i| i.intent_id.as_str())
                    != Some(target.intent_id.as_str())
                {
                    info!(
                        intent_id = %target.intent_id,
                        intent_type = %target.intent_type,
                        "critical override replaced selection"
                    );
                    selected = Some(target);
                    override_applied = true;
                }
            }
        }

        // Recovery lock: a recently selected recovery intent holds the
        // selection until its streak reaches the minimum. Critical override
        // always wins over the lock.
        if let Some(locked) = self.apply_recovery_lock(&safety_first) {
            if selected.as_ref().map(|i| i.intent_id.as_str())
                != Some(locked.intent_id.as_str())
            {
                debug!(intent_id = %locked.intent_id, "recovery lock held selection");
                selected = Some(locked);
                lock_applied = true;
            }
        }

        // Override and lock may have changed the candidate; re-evaluate.
        let safety_final = self.safety.evaluate(selected.as_ref(), self.engine.state());

        if safety_final.blocked {
            if let Some(sel) = &selected {
                self.intents.note_safety_block(&sel.intent_id);
                warn!(
                    intent_id = %sel.intent_id,
                    reason = %safety_final
                        .reason
                        .map(|r| r.to_string())
                        .unwrap_or_default(),
                    "execution blocked"
                );
            }
            self.emit_frame(&policy_result, &safety_final, None, override_applied, lock_applied);
            return;
        }

        match &selected {
            Some(sel) => {
                if let Some(stored) = self.intents.get_mut(&sel.intent_id) {
                    if self.engine.apply(Some(stored)) {
                        executed_intent_id = Some(sel.intent_id.clone());
                    }
                }
            }
            // Idle cycle: mode still advances, physics does not.
            None => {
                self.engine.apply(None);
            }
        }

        match &selected {
            None => self.last_selected = None,
            Some(sel) => {
                let continued = self.last_selected.as_deref() == Some(sel.intent_id.as_str());
                self.intents.update_selection_streak(&sel.intent_id, continued);
                self.last_selected = Some(sel.intent_id.clone());
            }
        }

        self.intents.archive_completed();

        self.emit_frame(
            &policy_result,
            &safety_final,
            executed_intent_id.as_deref(),
            override_applied,
            lock_applied,
        );
    }

    /// Recovery types to inject next cycle, computed from cycle-start state.
    fn compute_safe_injections(state: &SystemState) -> BTreeSet<IntentType> {
        let mut staged = BTreeSet::new();

        if state.mode != Mode::Safe {
            return staged;
        }

        if state.battery_level <= SAFE_ENTRY_BATTERY {
            staged.insert(IntentType::BatteryRecovery);
        }
        if state.temperature >= SAFE_ENTRY_TEMP {
            staged.insert(IntentType::ThermalRecovery);
        }

        staged
    }

    fn apply_pending_safe_injections(&mut self) {
        if self.pending_safe_injections.is_empty() {
            return;
        }

        let staged: Vec<IntentType> = self.pending_safe_injections.iter().copied().collect();
        for intent_type in staged {
            if self.intents.get_active_by_type(intent_type).is_none() {
                let intent = self.intents.submit(intent_type);
                info!(
                    intent_id = %intent.intent_id,
                    intent_type = %intent_type,
                    "safe-mode recovery injected"
                );
            }
        }
    }

    /// Resolve the first critical domain to its recovery intent, submitting
    /// one if no active intent of that type exists.
    fn apply_critical_override(&mut self, critical_domains: &[Domain]) -> Option<Intent> {
        let domain = *critical_domains.first()?;
        let recovery = domain.recovery_intent();

        if let Some(existing) = self.intents.get_active_by_type(recovery) {
            return Some(existing.clone());
        }

        Some(self.intents.submit(recovery))
    }

    /// The held recovery intent, when the lock applies this cycle. A locked
    /// intent that reached a terminal status has been archived and releases
    /// the lock.
    fn apply_recovery_lock(&self, safety: &SafetyDecision) -> Option<Intent> {
        let last_id = self.last_selected.as_deref()?;
        let last = self.intents.get_active(last_id)?;

        if !last.intent_type.is_recovery() {
            return None;
        }
        if !safety.critical_domains.is_empty() {
            return None;
        }
        if last.consecutive_selected_cycles >= MIN_RECOVERY_LOCK_CYCLES {
            return None;
        }

        Some(last.clone())
    }

    fn emit_frame(
        &self,
        policy: &PolicyResult,
        safety: &SafetyDecision,
        executed_intent_id: Option<&str>,
        override_applied: bool,
        lock_applied: bool,
    ) {
        let data = self.builder.build_frame(
            self.engine.state(),
            policy,
            safety,
            executed_intent_id,
            override_applied,
            lock_applied,
        );
        self.telemetry.publish_frame(data);
    }
}
