//! Executable lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an executable.
///
/// State transitions:
/// - Pending -> Acked (processed, or resolved as nothing to do)
/// - Pending -> Aborted (forced by the owner, e.g. queue shutdown)
/// - Pending -> Cancelled (forced by the owner, e.g. reader invalidation)
///
/// Terminal states never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutableState {
    Pending,
    Acked,
    Aborted,
    Cancelled,
}

impl ExecutableState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecutableState::Pending)
    }

    /// Aborted or cancelled: the owner gave up on the task.
    pub fn is_force_terminated(self) -> bool {
        matches!(self, ExecutableState::Aborted | ExecutableState::Cancelled)
    }
}
