use thiserror::Error;

use crate::ledger::LedgerError;

/// Errors surfaced by the batch issuing engine.
#[derive(Debug, Clone, Error)]
pub enum IssueError {
    /// Confirmation was not observed before the configured deadline. Says
    /// nothing about the transaction itself, which may still land later.
    #[error("confirmation deadline exceeded")]
    Timeout,

    /// The offered fee lost to a competing transaction holding the same
    /// account sequence number.
    #[error("transaction underpriced")]
    Underpriced,

    /// The commitment was already recorded by an earlier transaction.
    /// Absorbed by the submitter as success; never surfaces from a run.
    #[error("commitment already issued")]
    DuplicateSubmission,

    /// Provider failure matching no known diagnostic. Fatal, never retried.
    #[error("unclassified ledger error: {0}")]
    Unclassified(String),

    /// Engine invariant violation.
    #[error("internal error: {0}")]
    Internal(String),

    /// Invalid configuration or input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Every orchestrator attempt was consumed; wraps the last failure.
    #[error("issuing failed after {attempts} attempts")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<IssueError>,
    },
}

// Known provider diagnostics, matched case-insensitively. The node's
// confirmation wait reports the first; the mempool rejects a losing
// replacement with the second; the registry contract reverts duplicate
// commitments with the third.
const TIMEOUT_PATTERN: &str = "timeout exceeded";
const UNDERPRICED_PATTERN: &str = "replacement transaction underpriced";
const DUPLICATE_PATTERN: &str = "only hashes that have not been issued can be issued";

/// Map a raw ledger error onto the engine's closed taxonomy.
///
/// Total and side-effect-free. Anything matching no known diagnostic comes
/// back as [`IssueError::Unclassified`], which the engine treats as fatal.
pub fn classify(raw: &LedgerError) -> IssueError {
    let text = raw.to_string().to_lowercase();
    if text.contains(TIMEOUT_PATTERN) {
        IssueError::Timeout
    } else if text.contains(UNDERPRICED_PATTERN) {
        IssueError::Underpriced
    } else if text.contains(DUPLICATE_PATTERN) {
        IssueError::DuplicateSubmission
    } else {
        IssueError::Unclassified(raw.to_string())
    }
}

impl IssueError {
    /// Whether the orchestrator may recover from this error with another
    /// attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IssueError::Timeout | IssueError::Underpriced)
    }

    /// Error category label for metrics.
    pub fn category(&self) -> &'static str {
        match self {
            IssueError::Timeout => "timeout",
            IssueError::Underpriced => "underpriced",
            IssueError::DuplicateSubmission => "duplicate",
            IssueError::Unclassified(_) => "unclassified",
            IssueError::Internal(_) => "internal",
            IssueError::Configuration(_) => "config",
            IssueError::RetryExhausted { .. } => "exhausted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_diagnostics() {
        let timeout = LedgerError::Provider("timeout exceeded".to_string());
        assert!(matches!(classify(&timeout), IssueError::Timeout));

        let underpriced =
            LedgerError::Provider("replacement transaction underpriced".to_string());
        assert!(matches!(classify(&underpriced), IssueError::Underpriced));

        let duplicate = LedgerError::Provider(
            "execution reverted: Only hashes that have not been issued can be issued".to_string(),
        );
        assert!(matches!(classify(&duplicate), IssueError::DuplicateSubmission));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let shouting = LedgerError::Provider("TIMEOUT EXCEEDED".to_string());
        assert!(matches!(classify(&shouting), IssueError::Timeout));
    }

    #[test]
    fn test_classify_matches_embedded_diagnostics() {
        let wrapped = LedgerError::Transport(
            "rpc call failed: timeout exceeded while polling receipts".to_string(),
        );
        assert!(matches!(classify(&wrapped), IssueError::Timeout));
    }

    #[test]
    fn test_unknown_diagnostics_become_unclassified() {
        let unknown = LedgerError::Provider("execution reverted: paused".to_string());
        match classify(&unknown) {
            IssueError::Unclassified(text) => assert!(text.contains("paused")),
            other => panic!("expected Unclassified, got {other:?}"),
        }

        // A transport timeout is not the confirmation deadline diagnostic.
        let transport = LedgerError::Transport("connection reset by peer".to_string());
        assert!(matches!(classify(&transport), IssueError::Unclassified(_)));
    }

    #[test]
    fn test_retryability() {
        assert!(IssueError::Timeout.is_retryable());
        assert!(IssueError::Underpriced.is_retryable());
        assert!(!IssueError::DuplicateSubmission.is_retryable());
        assert!(!IssueError::Unclassified("x".to_string()).is_retryable());
        assert!(!IssueError::Internal("x".to_string()).is_retryable());
        assert!(!IssueError::RetryExhausted {
            attempts: 3,
            source: Box::new(IssueError::Timeout),
        }
        .is_retryable());
    }

    #[test]
    fn test_categories() {
        assert_eq!(IssueError::Timeout.category(), "timeout");
        assert_eq!(IssueError::Underpriced.category(), "underpriced");
        assert_eq!(
            IssueError::Unclassified("x".to_string()).category(),
            "unclassified"
        );
    }
}
