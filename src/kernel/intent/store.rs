use tracing::debug;

use super::types::{GoalSpec, Intent, IntentType};

/// Exclusive owner of intent storage and lifecycle.
///
/// Insertion order is preserved: active queries list earlier-submitted
/// intents first, which is also the policy tie-break order. Lookups of
/// unknown ids return `None`; no operation fails.
#[derive(Debug, Default)]
pub struct IntentStore {
    intents: Vec<Intent>,
}

impl IntentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store a fresh `Pending` intent with no goal descriptor.
    pub fn submit(&mut self, intent_type: IntentType) -> Intent {
        self.submit_with_goal(intent_type, GoalSpec::default())
    }

    /// Create and store a fresh `Pending` intent. Returns a copy of the
    /// stored record, immediately visible in [`IntentStore::list_active`].
    pub fn submit_with_goal(&mut self, intent_type: IntentType, goal: GoalSpec) -> Intent {
        let intent = Intent::new(intent_type, goal);
        debug!(intent_id = %intent.intent_id, intent_type = %intent_type, "intent submitted");
        self.intents.push(intent.clone());
        intent
    }

    /// All intents whose status is Pending or Active, insertion order preserved.
    pub fn list_active(&self) -> Vec<Intent> {
        self.intents
            .iter()
            .filter(|i| i.status.is_open())
            .cloned()
            .collect()
    }

    /// First active intent matching the given type, if any.
    pub fn get_active_by_type(&self, intent_type: IntentType) -> Option<&Intent> {
        self.intents
            .iter()
            .find(|i| i.intent_type == intent_type && i.status.is_open())
    }

    pub fn get(&self, intent_id: &str) -> Option<&Intent> {
        self.intents.iter().find(|i| i.intent_id == intent_id)
    }

    pub fn get_mut(&mut self, intent_id: &str) -> Option<&mut Intent> {
        self.intents.iter_mut().find(|i| i.intent_id == intent_id)
    }

    /// Lookup restricted to non-terminal intents.
    pub fn get_active(&self, intent_id: &str) -> Option<&Intent> {
        self.intents
            .iter()
            .find(|i| i.intent_id == intent_id && i.status.is_open())
    }

    pub fn mark_active(&mut self, intent_id: &str) {
        if let Some(intent) = self.get_mut(intent_id) {
            intent.mark_active();
        }
    }

    pub fn mark_completed(&mut self, intent_id: &str) {
        if let Some(intent) = self.get_mut(intent_id) {
            intent.mark_completed();
        }
    }

    pub fn mark_denied(&mut self, intent_id: &str, reason: &str) {
        if let Some(intent) = self.get_mut(intent_id) {
            intent.mark_denied(reason);
            debug!(intent_id, reason, "intent denied");
        }
    }

    /// Record one cycle in which the intent was selected but safety-blocked.
    pub fn note_safety_block(&mut self, intent_id: &str) {
        if let Some(intent) = self.get_mut(intent_id) {
            intent.safety_block_cycles += 1;
        }
    }

    /// Track consecutive selection: extend the streak when the same intent
    /// was selected last cycle, otherwise restart it at one.
    pub fn update_selection_streak(&mut self, intent_id: &str, continued: bool) {
        if let Some(intent) = self.get_mut(intent_id) {
            if continued {
                intent.consecutive_selected_cycles += 1;
            } else {
                intent.consecutive_selected_cycles = 1;
            }
        }
    }

    /// Drop every intent with terminal status from storage. Terminal intents
    /// are thereafter invisible to all queries.
    pub fn archive_completed(&mut self) {
        let before = self.intents.len();
        self.intents.retain(|i| !i.status.is_terminal());
        let archived = before - self.intents.len();
        if archived > 0 {
            debug!(archived, "terminal intents archived");
        }
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }
}
