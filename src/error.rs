use thiserror::Error;

/// What went wrong for one provider in the fallback chain.
///
/// These outcomes are recovered locally by advancing the chain; they are
/// only ever surfaced in aggregate on [`ResolveError::NoProviderAvailable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// Request never completed (connect error, timeout, DNS, TLS).
    Transport(String),
    /// Provider answered with a non-2xx status.
    Status(u16),
    /// Body could not be parsed into the provider's declared shape.
    BadShape,
    /// Payload parsed but contained no record with a playable URL candidate.
    NoValidRecords,
}

/// Tagged result of one provider attempt, in chain order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    pub provider: String,
    pub failure: AttemptFailure,
}

impl std::fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.failure {
            AttemptFailure::Transport(msg) => write!(f, "{}: transport error ({msg})", self.provider),
            AttemptFailure::Status(code) => write!(f, "{}: HTTP {code}", self.provider),
            AttemptFailure::BadShape => write!(f, "{}: unparseable payload", self.provider),
            AttemptFailure::NoValidRecords => write!(f, "{}: no playable records", self.provider),
        }
    }
}

/// Terminal failures of one resolution invocation.
///
/// Retry is always an explicit caller re-invocation; nothing here is retried
/// in the background.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Every provider in the chain was exhausted without a usable payload.
    #[error("no provider available for \"{key}\"")]
    NoProviderAvailable {
        key: String,
        attempts: Vec<ProviderAttempt>,
    },
    /// A provider answered cleanly, but zero valid channels survived
    /// filtering. Rendered as "no channels available", not as a failure to
    /// load.
    #[error("no channels available for \"{key}\"")]
    EmptyResult { key: String },
}

impl ResolveError {
    /// Whether offering a "retry" action makes sense for this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolveError::NoProviderAvailable { .. })
    }

    /// Stable message key for the presentation layer.
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolveError::NoProviderAvailable { .. } => "loading failed",
            ResolveError::EmptyResult { .. } => "no channels available",
        }
    }
}
