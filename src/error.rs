// =============================================================================
// CYBERSHIELD CORE — error.rs
// Error taxonomy of the client-side state layer
// =============================================================================
//
//   Transport  — service unreachable (reqwest failure)
//   Malformed  — response arrived but could not be decoded
//   Semantic   — service answered with an application-level {error}
//   Busy       — the same operation is already in flight
//   Config     — unusable configuration at startup
//
// None of these are fatal; every one is handled where the call is made and
// none of them mutate session state.
// =============================================================================

use thiserror::Error;

use crate::constants::CONNECTIVITY_NOTICE;
use crate::session::Operation;

#[derive(Debug, Error)]
pub enum ShieldError {
    #[error("classifier service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response from {endpoint}: {detail}")]
    Malformed { endpoint: String, detail: String },

    #[error("{0}")]
    Semantic(String),

    #[error("{0} already in flight")]
    Busy(Operation),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type ShieldResult<T> = Result<T, ShieldError>;

impl ShieldError {
    pub fn malformed(endpoint: &str, detail: impl ToString) -> Self {
        ShieldError::Malformed {
            endpoint: endpoint.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Transport and malformed failures collapse into one connectivity notice.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ShieldError::Transport(_) | ShieldError::Malformed { .. })
    }

    /// Text suitable for showing to the person at the dashboard.
    pub fn user_notice(&self) -> String {
        match self {
            ShieldError::Transport(_) | ShieldError::Malformed { .. } => CONNECTIVITY_NOTICE.to_string(),
            ShieldError::Semantic(msg) => msg.clone(),
            ShieldError::Busy(op) => format!("Hold on, {} is still running.", op),
            ShieldError::Config(msg) => format!("Configuration problem: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_is_connectivity() {
        let err = ShieldError::malformed("/analyze", "expected value at line 1");
        assert!(err.is_connectivity());
        assert_eq!(err.user_notice(), CONNECTIVITY_NOTICE);
        assert!(err.to_string().contains("/analyze"));
    }

    #[test]
    fn test_semantic_notice_is_verbatim() {
        let err = ShieldError::Semantic("No text provided".into());
        assert!(!err.is_connectivity());
        assert_eq!(err.user_notice(), "No text provided");
    }

    #[test]
    fn test_busy_names_operation() {
        let err = ShieldError::Busy(Operation::Scan);
        assert_eq!(err.to_string(), "scan already in flight");
    }
}
