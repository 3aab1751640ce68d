use chrono::{DateTime, Utc};
use std::mem;
use tracing::info;

use crate::errors::TransitionError;
use crate::model::{IcpReport, Inputs, OutreachDraft};

pub const DEFAULT_FAILURE_MESSAGE: &str =
    "An unexpected error occurred while generating the ICP.";

/// Request lifecycle. Each phase carries exactly the data valid in it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Generating {
        inputs: Inputs,
    },
    Complete {
        inputs: Inputs,
        report: Box<IcpReport>,
        draft: OutreachDraft,
        generated_at: DateTime<Utc>,
    },
    Error {
        inputs: Inputs,
        message: String,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Generating { .. } => "generating",
            Phase::Complete { .. } => "complete",
            Phase::Error { .. } => "error",
        }
    }
}

/// The single application-state record. Only the controller mutates it.
#[derive(Debug, Default)]
pub struct Session {
    phase: Phase,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Generating { .. })
    }

    /// Inputs of the current or last request, kept until reset.
    pub fn last_inputs(&self) -> Option<&Inputs> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Generating { inputs }
            | Phase::Complete { inputs, .. }
            | Phase::Error { inputs, .. } => Some(inputs),
        }
    }

    pub fn report(&self) -> Option<&IcpReport> {
        match &self.phase {
            Phase::Complete { report, .. } => Some(&**report),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<&OutreachDraft> {
        match &self.phase {
            Phase::Complete { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    fn refuse(&self, event: &'static str) -> TransitionError {
        TransitionError { phase: self.phase.name(), event }
    }

    fn enter(&mut self, event: &'static str, next: Phase) {
        info!(event, to = next.name(), "session transition");
        self.phase = next;
    }

    /// `Idle -> Generating`.
    pub fn submit(&mut self, inputs: Inputs) -> Result<(), TransitionError> {
        if !matches!(self.phase, Phase::Idle) {
            return Err(self.refuse("submit"));
        }
        self.enter("submit", Phase::Generating { inputs });
        Ok(())
    }

    /// Inputs of the in-flight request.
    pub fn generating_inputs(&self) -> Option<&Inputs> {
        match &self.phase {
            Phase::Generating { inputs } => Some(inputs),
            _ => None,
        }
    }

    /// `Generating -> Complete`. The draft starts as the report's template.
    pub fn succeed(&mut self, report: IcpReport) -> Result<(), TransitionError> {
        match mem::take(&mut self.phase) {
            Phase::Generating { inputs } => {
                let draft = report.outreach_template.clone();
                self.enter("succeed", Phase::Complete {
                    inputs,
                    report: Box::new(report),
                    draft,
                    generated_at: Utc::now(),
                });
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.refuse("succeed"))
            }
        }
    }

    /// `Generating -> Error`. A blank message is replaced by a generic one.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = DEFAULT_FAILURE_MESSAGE.to_string();
        }
        match mem::take(&mut self.phase) {
            Phase::Generating { inputs } => {
                self.enter("fail", Phase::Error { inputs, message });
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.refuse("fail"))
            }
        }
    }

    /// `Error -> Generating` replaying the stored inputs unchanged. Also
    /// accepted from `Complete`, which regenerates the same request.
    pub fn retry(&mut self) -> Result<(), TransitionError> {
        match mem::take(&mut self.phase) {
            Phase::Error { inputs, .. } | Phase::Complete { inputs, .. } => {
                self.enter("retry", Phase::Generating { inputs });
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.refuse("retry"))
            }
        }
    }

    /// Back to `Idle` from any phase but `Generating`, dropping inputs,
    /// report and error.
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        if self.is_busy() {
            return Err(self.refuse("reset"));
        }
        self.enter("reset", Phase::Idle);
        Ok(())
    }

    /// Mutable access to the outreach draft; the rest of the report stays
    /// read-only.
    pub fn draft_mut(&mut self) -> Result<&mut OutreachDraft, TransitionError> {
        match &mut self.phase {
            Phase::Complete { draft, .. } => Ok(draft),
            other => Err(TransitionError { phase: other.name(), event: "edit the draft" }),
        }
    }
}
