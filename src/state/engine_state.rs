/// Engine state definitions for tracking a collection run
///
/// A run moves `Idle -> CheckingQuota -> Fetching -> Emitting` and from there
/// back to `CheckingQuota` or `Fetching` for the next page, or on to one of
/// the terminal states.
use std::fmt;

/// Represents the current phase of a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineState {
    // ===== Active States =====
    /// Run created, nothing requested yet
    #[default]
    Idle,

    /// Probing the rate limit status endpoint before the next page
    CheckingQuota,

    /// Requesting the next page
    Fetching,

    /// Handing out the records of the current page
    Emitting,

    // ===== Terminal States =====
    /// Result set exhausted, record cap reached, or single page delivered
    Done,

    /// An unrecoverable error was reported to the consumer
    Failed,
}

impl EngineState {
    /// Returns true if this is a terminal state (the run yields nothing more)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CheckingQuota => "checking_quota",
            Self::Fetching => "fetching",
            Self::Emitting => "emitting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
