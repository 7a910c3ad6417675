use crate::runner::state::{ProbeStateReport, RunState, RunSummary};
use serde::{Deserialize, Serialize};

/// Probe results for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResults {
    pub session_id: String,
    pub base_url: String,
    pub steps: Vec<ProbeStateReport>,
    pub summary: RunSummary,
    pub generated_at: String,
}

impl ProbeResults {
    pub fn from_run(run: &RunState) -> Self {
        Self {
            session_id: run.session_id.clone(),
            base_url: run.base_url.clone(),
            steps: run.to_report(),
            summary: run.summary(),
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
