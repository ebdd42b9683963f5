use std::sync::{Arc, Mutex, MutexGuard};

use super::frame::{CycleFrame, FrameData, CYCLE_FRAME_KIND};
use crate::kernel::unix_now;

/// Append-only frame log. Single writer (the orchestrator), many readers.
///
/// Handles are cheap clones over shared storage; `get_frames` returns a
/// snapshot consistent with some prefix of the writer's appends, so readers
/// on other threads always see a monotonically growing sequence.
#[derive(Debug, Clone, Default)]
pub struct TelemetryBus {
    frames: Arc<Mutex<Vec<CycleFrame>>>,
}

impl TelemetryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the frame with the wall clock and the cycle-frame tag, then append.
    pub fn publish_frame(&self, data: FrameData) {
        let frame = CycleFrame {
            timestamp: unix_now(),
            kind: CYCLE_FRAME_KIND.to_string(),
            data,
        };
        self.lock().push(frame);
    }

    /// Snapshot of every frame published so far.
    pub fn get_frames(&self) -> Vec<CycleFrame> {
        self.lock().clone()
    }

    pub fn latest(&self) -> Option<CycleFrame> {
        self.lock().last().cloned()
    }

    /// Every frame as a JSON value, the encoding observers consume on the wire.
    pub fn dump(&self) -> Vec<serde_json::Value> {
        self.lock()
            .iter()
            .map(|frame| serde_json::to_value(frame).unwrap_or(serde_json::Value::Null))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CycleFrame>> {
        // A poisoned log is still a valid prefix; keep serving it.
        self.frames.lock().unwrap_or_else(|e| e.into_inner())
    }
}
