use super::client::{HEALTH_PATH, LOAN_COUNT_PATH, LOGIN_PATH, TRANSACTION_COUNT_PATH};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// The four probes, in execution order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    Health,
    Login,
    LoanCount,
    TransactionCount,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::Health,
        Step::Login,
        Step::LoanCount,
        Step::TransactionCount,
    ];

    /// 1-based position shown on the console
    pub fn number(&self) -> usize {
        match self {
            Step::Health => 1,
            Step::Login => 2,
            Step::LoanCount => 3,
            Step::TransactionCount => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Health => "health",
            Step::Login => "login",
            Step::LoanCount => "loanCount",
            Step::TransactionCount => "transactionCount",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Step::Health => "health endpoint",
            Step::Login => "customer login through gateway",
            Step::LoanCount => "loan count through gateway",
            Step::TransactionCount => "transaction count through gateway",
        }
    }

    /// Gateway endpoint this step calls
    pub fn path(&self) -> &'static str {
        match self {
            Step::Health => HEALTH_PATH,
            Step::Login => LOGIN_PATH,
            Step::LoanCount => LOAN_COUNT_PATH,
            Step::TransactionCount => TRANSACTION_COUNT_PATH,
        }
    }

    /// Label for the `count` field line of the count steps
    pub fn count_label(&self) -> &'static str {
        match self {
            Step::LoanCount => "Loan count",
            Step::TransactionCount => "Transaction count",
            _ => "Count",
        }
    }

    pub fn requires_token(&self) -> bool {
        matches!(self, Step::LoanCount | Step::TransactionCount)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Step verdict
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProbeStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

impl ProbeStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, ProbeStatus::Passed)
    }
}

/// State for a single probe step
#[derive(Debug, Clone)]
pub struct ProbeState {
    pub step: Step,
    pub status: ProbeStatus,
    pub http_status: Option<u16>,
    pub body: Option<String>,
    pub started_at: Option<Instant>,
    pub duration_ms: Option<u64>,
}

impl ProbeState {
    pub fn new(step: Step) -> Self {
        Self {
            step,
            status: ProbeStatus::Pending,
            http_status: None,
            body: None,
            started_at: None,
            duration_ms: None,
        }
    }

    pub fn start(&mut self) {
        self.status = ProbeStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn record_response(&mut self, status: u16, body: &str) {
        self.http_status = Some(status);
        self.body = Some(body.to_string());
    }

    pub fn pass(&mut self) {
        self.finish(ProbeStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.finish(ProbeStatus::Failed { error });
    }

    pub fn skip(&mut self, reason: String) {
        self.status = ProbeStatus::Skipped { reason };
    }

    fn finish(&mut self, status: ProbeStatus) {
        self.status = status;
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> ProbeStateReport {
        ProbeStateReport {
            step: self.step,
            number: self.step.number(),
            status: self.status.clone(),
            http_status: self.http_status,
            body: self.body.clone(),
            duration_ms: self.duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeStateReport {
    pub step: Step,
    pub number: usize,
    pub status: ProbeStatus,
    pub http_status: Option<u16>,
    pub body: Option<String>,
    pub duration_ms: Option<u64>,
}

/// State of one full probe run
#[derive(Debug, Clone)]
pub struct RunState {
    pub session_id: String,
    pub base_url: String,
    pub probes: Vec<ProbeState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl RunState {
    pub fn new(session_id: &str, base_url: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            base_url: base_url.to_string(),
            probes: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn record(&mut self, probe: ProbeState) {
        self.probes.push(probe);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn probe(&self, step: Step) -> Option<&ProbeState> {
        self.probes.iter().find(|p| p.step == step)
    }

    pub fn all_passed(&self) -> bool {
        !self.probes.is_empty() && self.probes.iter().all(|p| p.status.is_passed())
    }

    pub fn summary(&self) -> RunSummary {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for probe in &self.probes {
            match probe.status {
                ProbeStatus::Passed => passed += 1,
                ProbeStatus::Failed { .. } => failed += 1,
                ProbeStatus::Skipped { .. } => skipped += 1,
                _ => {}
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        RunSummary {
            session_id: self.session_id.clone(),
            total_steps: self.probes.len() as u32,
            passed,
            failed,
            skipped,
            total_duration_ms,
        }
    }

    pub fn to_report(&self) -> Vec<ProbeStateReport> {
        self.probes.iter().map(|p| p.to_report()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub session_id: String,
    pub total_steps: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}
