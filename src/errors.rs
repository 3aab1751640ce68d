use thiserror::Error;

/// Every way a generation or refinement request can fail.
///
/// All variants end up as the message shown in the error panel; `kind()`
/// lets callers tell them apart without matching on text.
#[derive(Error, Debug)]
pub enum IcpError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("no response from AI")]
    EmptyResponse,
    #[error("malformed AI response: {0}")]
    Malformed(String),
    #[error("request to the model service failed: {0}")]
    Transport(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    EmptyResponse,
    Malformed,
    Transport,
    InvalidInput,
}

impl IcpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IcpError::Config(_) => ErrorKind::Config,
            IcpError::EmptyResponse => ErrorKind::EmptyResponse,
            IcpError::Malformed(_) => ErrorKind::Malformed,
            IcpError::Transport(_) => ErrorKind::Transport,
            IcpError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

impl From<reqwest::Error> for IcpError {
    fn from(e: reqwest::Error) -> Self {
        IcpError::Transport(e.to_string())
    }
}

/// An event was fed to the session in a phase that does not accept it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {event} while {phase}")]
pub struct TransitionError {
    pub phase: &'static str,
    pub event: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(IcpError::EmptyResponse.to_string(), "no response from AI");
        let e = IcpError::Config("GEMINI_API_KEY is not set".into());
        assert!(e.to_string().starts_with("configuration error"));
        assert_eq!(e.kind(), ErrorKind::Config);
    }

    #[test]
    fn transition_error_names_phase_and_event() {
        let e = TransitionError { phase: "generating", event: "reset" };
        assert_eq!(e.to_string(), "cannot reset while generating");
    }
}
