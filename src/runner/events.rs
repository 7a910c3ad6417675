use super::state::{RunSummary, Step};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::broadcast::{self, error::RecvError};

/// Probe execution events, in the order the console prints them
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeEvent {
    RunStarted {
        session_id: String,
        base_url: String,
    },
    RunFinished {
        summary: RunSummary,
    },

    StepStarted {
        step: Step,
    },
    StatusReceived {
        step: Step,
        status: u16,
    },
    ResponseBody {
        step: Step,
        body: String,
    },
    TokenReceived {
        preview: String,
    },
    TokenMissing,
    CountReceived {
        step: Step,
        count: String,
    },
    StepPassed {
        step: Step,
        duration_ms: u64,
    },
    StepFailed {
        step: Step,
        error: Option<String>,
        duration_ms: u64,
    },
    StepSkipped {
        step: Step,
        reason: String,
    },

    ReportWritten {
        path: PathBuf,
    },
}

/// Events buffered per receiver before it starts lagging
pub const EVENT_CAPACITY: usize = 100;

/// Event emitter for broadcasting probe events
pub struct EventEmitter {
    sender: broadcast::Sender<ProbeEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<ProbeEvent>) {
        let (sender, receiver) = broadcast::channel(EVENT_CAPACITY);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: ProbeEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }
}

pub const BANNER_WIDTH: usize = 50;
const INDENT: &str = "   ";

/// Render one event as console lines
pub fn render_event<W: Write>(event: &ProbeEvent, out: &mut W) -> io::Result<()> {
    match event {
        ProbeEvent::RunStarted { .. } => {
            writeln!(out, "🔥 Testing API Gateway")?;
            writeln!(out, "{}", "=".repeat(BANNER_WIDTH))?;
        }

        ProbeEvent::RunFinished { summary } => {
            let counts = format!(
                "{} passed, {} failed, {} skipped",
                summary.passed.to_string().green(),
                summary.failed.to_string().red(),
                summary.skipped.to_string().yellow()
            );
            writeln!(
                out,
                "{} {} steps: {}",
                "■".blue().bold(),
                summary.total_steps,
                counts
            )?;
            if let Some(duration) = summary.total_duration_ms {
                writeln!(out, "{}Duration: {}ms", INDENT, duration)?;
            }
            writeln!(out, "🏁 Test completed!")?;
        }

        ProbeEvent::StepStarted { step } => {
            writeln!(out, "{}. Testing {}...", step.number(), step.description())?;
        }

        ProbeEvent::StatusReceived { status, .. } => {
            writeln!(out, "{}Status: {}", INDENT, status)?;
        }

        ProbeEvent::ResponseBody { body, .. } => {
            writeln!(out, "{}Response: {}", INDENT, body)?;
        }

        ProbeEvent::TokenReceived { preview } => {
            writeln!(out, "{}Token received: {}...", INDENT, preview)?;
        }

        ProbeEvent::TokenMissing => {
            writeln!(out, "{}No token in response", INDENT)?;
        }

        ProbeEvent::CountReceived { step, count } => {
            writeln!(out, "{}{}: {}", INDENT, step.count_label(), count)?;
        }

        ProbeEvent::StepPassed { .. } => {
            writeln!(out, "{}{}\n", INDENT, "✅ PASSED".green().bold())?;
        }

        ProbeEvent::StepFailed { error, .. } => match error {
            Some(e) => writeln!(out, "{}{} {}\n", INDENT, "❌ FAILED:".red().bold(), e)?,
            None => writeln!(out, "{}{}\n", INDENT, "❌ FAILED".red().bold())?,
        },

        ProbeEvent::StepSkipped { step, reason } => {
            writeln!(
                out,
                "{}. Skipping {} - {}",
                step.number(),
                step.description(),
                reason
            )?;
            writeln!(out, "{}{}\n", INDENT, "❌ SKIPPED".red().bold())?;
        }

        ProbeEvent::ReportWritten { path } => {
            writeln!(out, "{}Generated report: {}", INDENT, path.display())?;
        }
    }
    Ok(())
}

/// Console event listener printing events to stdout as they arrive
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    /// Print until every emitter has been dropped
    pub async fn listen(receiver: broadcast::Receiver<ProbeEvent>) {
        Self::listen_into(receiver, io::stdout()).await;
    }

    /// Render into `out` until the channel closes, then hand `out` back
    pub async fn listen_into<W: Write>(
        mut receiver: broadcast::Receiver<ProbeEvent>,
        mut out: W,
    ) -> W {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = render_event(&event, &mut out).and_then(|_| out.flush()) {
                        log::warn!("Failed to write console output: {}", e);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    log::warn!("Console fell behind, {} events not shown", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(event: ProbeEvent) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        render_event(&event, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_banner() {
        let text = render(ProbeEvent::RunStarted {
            session_id: "s".to_string(),
            base_url: "http://localhost:8080".to_string(),
        });
        assert_eq!(text, format!("🔥 Testing API Gateway\n{}\n", "=".repeat(50)));
    }

    #[test]
    fn test_step_lines() {
        assert_eq!(
            render(ProbeEvent::StepStarted { step: Step::Health }),
            "1. Testing health endpoint...\n"
        );
        assert_eq!(
            render(ProbeEvent::StatusReceived {
                step: Step::Health,
                status: 200
            }),
            "   Status: 200\n"
        );
        assert_eq!(
            render(ProbeEvent::CountReceived {
                step: Step::TransactionCount,
                count: "12".to_string()
            }),
            "   Transaction count: 12\n"
        );
        assert_eq!(
            render(ProbeEvent::TokenReceived {
                preview: "abc123".to_string()
            }),
            "   Token received: abc123...\n"
        );
    }

    #[test]
    fn test_verdict_lines() {
        assert_eq!(
            render(ProbeEvent::StepPassed {
                step: Step::Login,
                duration_ms: 3
            }),
            "   ✅ PASSED\n\n"
        );
        assert_eq!(
            render(ProbeEvent::StepFailed {
                step: Step::Login,
                error: Some("connection refused".to_string()),
                duration_ms: 1
            }),
            "   ❌ FAILED: connection refused\n\n"
        );
        let skipped = render(ProbeEvent::StepSkipped {
            step: Step::LoanCount,
            reason: "no token".to_string(),
        });
        assert!(skipped.starts_with("3. Skipping loan count through gateway - no token\n"));
        assert!(skipped.contains("❌ SKIPPED"));
    }

    #[test]
    fn test_completion_banner() {
        let text = render(ProbeEvent::RunFinished {
            summary: RunSummary {
                session_id: "s".to_string(),
                total_steps: 4,
                passed: 4,
                failed: 0,
                skipped: 0,
                total_duration_ms: Some(12),
            },
        });
        assert!(text.contains("4 passed, 0 failed, 0 skipped"));
        assert!(text.ends_with("🏁 Test completed!\n"));
    }

    #[test]
    fn test_report_line() {
        assert_eq!(
            render(ProbeEvent::ReportWritten {
                path: PathBuf::from("output/junit.xml")
            }),
            "   Generated report: output/junit.xml\n"
        );
    }

    #[tokio::test]
    async fn test_listener_keeps_going_after_lagging() {
        colored::control::set_override(false);
        let (emitter, receiver) = EventEmitter::new();
        for _ in 0..EVENT_CAPACITY + 20 {
            emitter.emit(ProbeEvent::TokenMissing);
        }
        emitter.emit(ProbeEvent::RunFinished {
            summary: RunSummary {
                session_id: "s".to_string(),
                total_steps: 0,
                passed: 0,
                failed: 0,
                skipped: 0,
                total_duration_ms: None,
            },
        });
        drop(emitter);

        let out = ConsoleEventListener::listen_into(receiver, Vec::new()).await;
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No token in response"));
        assert!(text.ends_with("🏁 Test completed!\n"));
    }

    #[tokio::test]
    async fn test_emitter_delivers_in_order() {
        let (emitter, mut receiver) = EventEmitter::new();
        emitter.emit(ProbeEvent::StepStarted { step: Step::Health });
        emitter.emit(ProbeEvent::TokenMissing);
        drop(emitter);

        assert_eq!(
            receiver.recv().await.unwrap(),
            ProbeEvent::StepStarted { step: Step::Health }
        );
        assert_eq!(receiver.recv().await.unwrap(), ProbeEvent::TokenMissing);
        assert!(receiver.recv().await.is_err());
    }
}
