use anyhow::Result;
use async_trait::async_trait;

use crate::config::Config;
use crate::errors::IcpError;

pub mod gemini;

/// One structured-output call: prompt, response contract, temperature.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub operation: &'static str,
    pub prompt: String,
    /// JSON Schema the response must follow.
    pub schema: serde_json::Value,
    pub temperature: f32,
}

#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the model's raw text, or `None` when the service answered
    /// without any.
    async fn send(&self, api_key: &str, req: &StructuredRequest) -> Result<Option<String>, IcpError>;

    fn model(&self) -> &str;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    Ok(Box::new(gemini::GeminiProvider::new(
        cfg.model.clone(),
        cfg.api_base.clone(),
    )?))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// One canned provider outcome.
    pub enum Scripted {
        Text(String),
        Empty,
        Fail(String),
    }

    impl Scripted {
        pub fn text(v: serde_json::Value) -> Self {
            Scripted::Text(v.to_string())
        }
    }

    #[derive(Default)]
    struct State {
        script: VecDeque<Scripted>,
        requests: Vec<StructuredRequest>,
        keys: Vec<String>,
    }

    /// In-memory provider that replays a script and records what it was sent.
    #[derive(Clone, Default)]
    pub struct ScriptedProvider {
        state: Arc<Mutex<State>>,
    }

    impl ScriptedProvider {
        pub fn new(script: Vec<Scripted>) -> Self {
            let p = Self::default();
            p.state.lock().script = script.into();
            p
        }

        pub fn push(&self, outcome: Scripted) {
            self.state.lock().script.push_back(outcome);
        }

        pub fn calls(&self) -> usize {
            self.state.lock().requests.len()
        }

        pub fn requests(&self) -> Vec<StructuredRequest> {
            self.state.lock().requests.clone()
        }

        pub fn keys(&self) -> Vec<String> {
            self.state.lock().keys.clone()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn send(&self, api_key: &str, req: &StructuredRequest) -> Result<Option<String>, IcpError> {
            let mut st = self.state.lock();
            st.requests.push(req.clone());
            st.keys.push(api_key.to_string());
            match st.script.pop_front() {
                Some(Scripted::Text(t)) => Ok(Some(t)),
                Some(Scripted::Empty) | None => Ok(None),
                Some(Scripted::Fail(msg)) => Err(IcpError::Transport(msg)),
            }
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}
