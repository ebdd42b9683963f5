use std::time::Duration;

use anyhow::Context;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::kernel::orchestrator::Orchestrator;

/// Background cadence driver for an [`Orchestrator`].
///
/// One cycle per tick; a cycle is either wholly applied or not started, so
/// stopping the runner between ticks never corrupts state.
pub struct CycleRunner {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<Orchestrator>,
}

impl CycleRunner {
    /// Move the orchestrator into a background task ticking `run(1)` at the
    /// given interval.
    pub fn spawn(mut orchestrator: Orchestrator, tick: Duration) -> Self {
        let (shutdown, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut cadence = interval(tick);
            cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cadence.tick() => {
                        orchestrator.run(1);
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("cycle runner stopped");
            orchestrator
        });

        Self { shutdown, handle }
    }

    /// Signal shutdown and return the orchestrator once the in-flight cycle,
    /// if any, has finished.
    pub async fn stop(self) -> anyhow::Result<Orchestrator> {
        let _ = self.shutdown.send(true);
        self.handle.await.context("cycle runner task failed")
    }
}
