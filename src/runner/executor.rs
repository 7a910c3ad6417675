use serde_json::Value;
use std::path::PathBuf;

use super::client::{GatewayClient, GatewayResponse, SessionToken};
use super::error::ProbeError;
use super::events::{EventEmitter, ProbeEvent};
use super::state::{ProbeState, RunState, Step};
use crate::utils::config::{Credentials, ProbeConfig};

/// Printed when a count response has no `count` field
pub const MISSING_COUNT: &str = "No count field";

/// Skip reason for the authenticated steps
pub const NO_TOKEN: &str = "no token";

/// What a passing probe yielded
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub response: GatewayResponse,
    pub detail: OutcomeDetail,
}

#[derive(Debug, Clone)]
pub enum OutcomeDetail {
    /// Raw body is the interesting part (health)
    Body,
    /// Login result; `None` when the body carried no usable token
    Token(Option<SessionToken>),
    /// `count` field of a count endpoint, if present
    Count(Option<Value>),
}

/// Runs the four gateway probes in order
pub struct ProbeExecutor {
    client: GatewayClient,
    credentials: Credentials,
    emitter: EventEmitter,
    state: RunState,
}

impl ProbeExecutor {
    pub fn new(config: &ProbeConfig, session_id: &str, emitter: EventEmitter) -> Self {
        let client = GatewayClient::new(&config.base_url);
        let state = RunState::new(session_id, client.base_url());
        Self {
            client,
            credentials: config.credentials.clone(),
            emitter,
            state,
        }
    }

    /// Execute every step in order. The completion banner is left to
    /// [`ProbeExecutor::finish`] so callers can report in between.
    pub async fn run_steps(&mut self) {
        self.state.start();
        self.emitter.emit(ProbeEvent::RunStarted {
            session_id: self.state.session_id.clone(),
            base_url: self.state.base_url.clone(),
        });
        log::info!("Probing gateway at {}", self.state.base_url);

        let probe = self.begin(Step::Health);
        let result = self.probe_health().await;
        self.conclude(probe, result);

        let probe = self.begin(Step::Login);
        let result = self.probe_login().await;
        let token = self.conclude(probe, result);

        for step in Step::ALL.into_iter().filter(Step::requires_token) {
            match &token {
                Some(token) => {
                    let probe = self.begin(step);
                    let result = self.probe_count(step, token).await;
                    self.conclude(probe, result);
                }
                None => self.skip(step, NO_TOKEN),
            }
        }

        self.state.finish();
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn report_written(&self, path: PathBuf) {
        self.emitter.emit(ProbeEvent::ReportWritten { path });
    }

    /// Print the summary and completion banner, closing the event stream
    pub fn finish(self) -> RunState {
        self.emitter.emit(ProbeEvent::RunFinished {
            summary: self.state.summary(),
        });
        self.state
    }

    /// Any response that arrives passes; only transport errors fail
    async fn probe_health(&self) -> Result<ProbeOutcome, ProbeError> {
        let response = self.client.health().await?;
        Ok(ProbeOutcome {
            response,
            detail: OutcomeDetail::Body,
        })
    }

    async fn probe_login(&self) -> Result<ProbeOutcome, ProbeError> {
        let response = expect_ok(self.client.login(&self.credentials).await?)?;
        let token = SessionToken::from_login_response(&response)?;
        Ok(ProbeOutcome {
            response,
            detail: OutcomeDetail::Token(token),
        })
    }

    async fn probe_count(
        &self,
        step: Step,
        token: &SessionToken,
    ) -> Result<ProbeOutcome, ProbeError> {
        let response = expect_ok(self.client.get_authorized(step.path(), token).await?)?;
        let count = response.field("count")?;
        Ok(ProbeOutcome {
            response,
            detail: OutcomeDetail::Count(count),
        })
    }

    fn begin(&self, step: Step) -> ProbeState {
        let mut probe = ProbeState::new(step);
        probe.start();
        self.emitter.emit(ProbeEvent::StepStarted { step });
        probe
    }

    fn skip(&mut self, step: Step, reason: &str) {
        let mut probe = ProbeState::new(step);
        probe.skip(reason.to_string());
        log::warn!("{} skipped: {}", step, reason);
        self.emitter.emit(ProbeEvent::StepSkipped {
            step,
            reason: reason.to_string(),
        });
        self.state.record(probe);
    }

    /// Render a step result, record it, and hand back the session token if
    /// this was a successful login that carried one.
    fn conclude(
        &mut self,
        mut probe: ProbeState,
        result: Result<ProbeOutcome, ProbeError>,
    ) -> Option<SessionToken> {
        let step = probe.step;
        let mut token = None;

        match result {
            Ok(ProbeOutcome { response, detail }) => {
                probe.record_response(response.status, &response.body);
                self.emitter.emit(ProbeEvent::StatusReceived {
                    step,
                    status: response.status,
                });

                match detail {
                    OutcomeDetail::Body => self.emitter.emit(ProbeEvent::ResponseBody {
                        step,
                        body: response.body,
                    }),
                    OutcomeDetail::Token(Some(t)) => {
                        self.emitter.emit(ProbeEvent::TokenReceived {
                            preview: t.preview(),
                        });
                        token = Some(t);
                    }
                    OutcomeDetail::Token(None) => self.emitter.emit(ProbeEvent::TokenMissing),
                    OutcomeDetail::Count(count) => self.emitter.emit(ProbeEvent::CountReceived {
                        step,
                        count: display_count(count.as_ref()),
                    }),
                }

                probe.pass();
                log::info!("{} passed ({}ms)", step, probe.duration_ms.unwrap_or(0));
                self.emitter.emit(ProbeEvent::StepPassed {
                    step,
                    duration_ms: probe.duration_ms.unwrap_or(0),
                });
            }

            Err(ProbeError::UnexpectedStatus { status, body }) => {
                probe.record_response(status, &body);
                self.emitter.emit(ProbeEvent::StatusReceived { step, status });
                self.emitter.emit(ProbeEvent::ResponseBody { step, body });
                probe.fail(format!("unexpected status {}", status));
                log::warn!("{} failed with status {}", step, status);
                self.emitter.emit(ProbeEvent::StepFailed {
                    step,
                    error: None,
                    duration_ms: probe.duration_ms.unwrap_or(0),
                });
            }

            Err(e) => {
                if let Some(status) = e.status() {
                    probe.http_status = Some(status);
                    self.emitter.emit(ProbeEvent::StatusReceived { step, status });
                }
                let message = e.to_string();
                log::warn!("{} failed: {}", step, message);
                probe.fail(message.clone());
                self.emitter.emit(ProbeEvent::StepFailed {
                    step,
                    error: Some(message),
                    duration_ms: probe.duration_ms.unwrap_or(0),
                });
            }
        }

        self.state.record(probe);
        token
    }
}

fn expect_ok(response: GatewayResponse) -> Result<GatewayResponse, ProbeError> {
    if response.is_ok() {
        Ok(response)
    } else {
        Err(ProbeError::UnexpectedStatus {
            status: response.status,
            body: response.body,
        })
    }
}

/// Strings print bare, other JSON values in their JSON form
fn display_count(count: Option<&Value>) -> String {
    match count {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => MISSING_COUNT.to_string(),
    }
}
