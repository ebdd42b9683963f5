use std::time::Duration;

use tracing::info;

use vela::bootstrap::{build_simulation, SimulationConfig};
use vela::runner::CycleRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    info!("vela flight core booting");

    let config = SimulationConfig::default();
    let orchestrator = build_simulation(&config);
    let telemetry = orchestrator.telemetry.clone();

    let runner = CycleRunner::spawn(
        orchestrator,
        Duration::from_secs_f64(config.cycle_interval_secs),
    );
    info!(
        interval_secs = config.cycle_interval_secs,
        "cycle runner active, press ctrl-c to stop"
    );

    let mut status = tokio::time::interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            _ = status.tick() => {
                if let Some(frame) = telemetry.latest() {
                    info!(
                        frames = telemetry.len(),
                        mode = %frame.data.state.mode,
                        battery = frame.data.state.battery_level,
                        temperature = frame.data.state.temperature,
                        position = frame.data.state.position,
                        blocked = frame.data.safety.blocked,
                        "telemetry"
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let orchestrator = runner.stop().await?;
    info!(frames = orchestrator.telemetry.len(), "shutdown complete");
    Ok(())
}
