pub mod client;
pub mod error;
pub mod events;
pub mod executor;
pub mod state;

use anyhow::Result;

use crate::report::{self, types::ProbeResults};
use crate::utils::config::ProbeConfig;

pub use events::*;
pub use state::*;

/// Run the probe sequence against the configured gateway, printing progress
/// to the console and writing reports when a report directory is set.
pub async fn run_probes(config: &ProbeConfig) -> Result<RunState> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (emitter, receiver) = EventEmitter::new();
    let listener = tokio::spawn(ConsoleEventListener::listen(receiver));

    let run = execute(config, &session_id, emitter).await;

    // Emitter is gone, so the listener sees the channel close after the last event
    listener.await?;

    run
}

/// Run every step, write reports, then close the run with the summary banner.
///
/// The run state is only lost when a report cannot be written; the banner is
/// emitted either way.
pub async fn execute(
    config: &ProbeConfig,
    session_id: &str,
    emitter: EventEmitter,
) -> Result<RunState> {
    let mut executor = executor::ProbeExecutor::new(config, session_id, emitter);
    executor.run_steps().await;

    let written = match &config.report_dir {
        Some(dir) => report::write_reports(&ProbeResults::from_run(executor.state()), dir),
        None => Ok(Vec::new()),
    };
    if let Ok(paths) = &written {
        for path in paths {
            executor.report_written(path.clone());
        }
    }

    let run = executor.finish();
    written.map(|_| run)
}
