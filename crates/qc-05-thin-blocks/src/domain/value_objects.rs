//! Value objects for thin block configuration.

use std::time::Duration;

use super::ThinBlockMode;

/// Thin block relay configuration.
///
/// The timing fields are not enforced by the workers themselves; the peer
/// supervisor reads them to decide when to flip a worker into re-requesting
/// mode or give up on it.
#[derive(Clone, Debug)]
pub struct ThinBlockConfig {
    /// Encoding new workers use unless told otherwise
    pub preferred_mode: ThinBlockMode,
    /// Maximum transactions a single stub may list
    pub max_stub_transactions: usize,
    /// Missing transactions unanswered for this long → re-request
    pub rerequest_after: Duration,
    /// No progress for this long → release the worker
    pub stall_timeout: Duration,
}

impl Default for ThinBlockConfig {
    fn default() -> Self {
        Self {
            preferred_mode: ThinBlockMode::Compact,
            max_stub_transactions: 100_000,
            rerequest_after: Duration::from_secs(5),
            stall_timeout: Duration::from_secs(30),
        }
    }
}

impl ThinBlockConfig {
    /// Whether a worker waiting `elapsed` on missing transactions should
    /// switch to re-requesting.
    pub fn should_rerequest(&self, elapsed: Duration) -> bool {
        elapsed >= self.rerequest_after
    }

    /// Whether a worker without progress for `elapsed` should be released.
    pub fn is_stalled(&self, elapsed: Duration) -> bool {
        elapsed >= self.stall_timeout
    }
}
