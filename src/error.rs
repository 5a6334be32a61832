use crate::session::Phase;

/// Guards raised by the slide state machine. None of these reach the user;
/// the TUI drops them after logging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("option {0} does not exist or has already been used")]
    InvalidOption(usize),

    #[error("cannot {action} while {phase}")]
    InvalidTransition { action: &'static str, phase: Phase },
}

/// Failures while handing the event log to durable storage
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("i/o error writing click log: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode click log as json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not encode click log as csv: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_names_action_and_phase() {
        let err = SessionError::InvalidTransition {
            action: "confirm",
            phase: Phase::Transitioning,
        };
        assert_eq!(err.to_string(), "cannot confirm while Transitioning");
    }

    #[test]
    fn io_errors_convert_into_persist_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err: PersistError = io.into();
        assert!(matches!(err, PersistError::Io(_)));
        assert!(err.to_string().contains("nope"));
    }
}
