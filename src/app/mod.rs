use tracing::warn;

use crate::adapter::Adapter;
use crate::errors::{IcpError, TransitionError};
use crate::model::{Inputs, OutreachDraft};
use crate::session::{Phase, Session};

/// Top-level controller: the only owner and mutator of the session.
/// Taking `&mut self` for every request keeps at most one in flight.
pub struct App {
    session: Session,
    adapter: Adapter,
}

impl App {
    pub fn new(adapter: Adapter) -> Self {
        Self { session: Session::new(), adapter }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> &Phase {
        self.session.phase()
    }

    pub fn model(&self) -> &str {
        self.adapter.model()
    }

    pub fn submit(&mut self, inputs: Inputs) -> Result<(), TransitionError> {
        self.session.submit(inputs)
    }

    pub fn retry(&mut self) -> Result<(), TransitionError> {
        self.session.retry()
    }

    pub fn reset(&mut self) -> Result<(), TransitionError> {
        self.session.reset()
    }

    /// Perform the pending generation, landing in `Complete` or `Error`.
    /// Does nothing outside `Generating`.
    pub async fn resolve(&mut self) -> &Phase {
        let Some(inputs) = self.session.generating_inputs().cloned() else {
            return self.session.phase();
        };
        let applied = match self.adapter.generate_icp(&inputs).await {
            Ok(report) => self.session.succeed(report),
            Err(e) => self.session.fail(e.to_string()),
        };
        if let Err(e) = applied {
            warn!("{e}");
        }
        self.session.phase()
    }

    /// Submit and resolve in one step.
    pub async fn generate(&mut self, inputs: Inputs) -> Result<&Phase, TransitionError> {
        self.submit(inputs)?;
        Ok(self.resolve().await)
    }

    pub fn edit_draft(
        &mut self,
        subject: Option<String>,
        body: Option<String>,
    ) -> Result<(), TransitionError> {
        let draft = self.session.draft_mut()?;
        if let Some(s) = subject {
            draft.subject = s;
        }
        if let Some(b) = body {
            draft.body = b;
        }
        Ok(())
    }

    /// Rewrite the outreach draft per `feedback`. Only the draft changes on
    /// success; on failure the session stays `Complete` with the old draft.
    pub async fn refine(&mut self, feedback: &str) -> Result<&OutreachDraft, IcpError> {
        let (current, catalog) = match self.session.phase() {
            Phase::Complete { draft, inputs, .. } => (draft.clone(), inputs.catalog_text.clone()),
            other => {
                return Err(IcpError::InvalidInput(format!(
                    "nothing to refine while {}",
                    other.name()
                )))
            }
        };
        let refined = self.adapter.refine_outreach(&current, feedback, &catalog).await?;
        let draft = self
            .session
            .draft_mut()
            .map_err(|e| IcpError::InvalidInput(e.to_string()))?;
        *draft = refined;
        Ok(draft)
    }
}
