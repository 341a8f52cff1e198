//! PriorityAssigner port

use crate::domain::{Priority, TaskEnvelope};

/// Classifies a task into a priority class. Called once per executable.
pub trait PriorityAssigner: Send + Sync {
    fn assign(&self, task: &TaskEnvelope) -> Priority;
}

impl<F> PriorityAssigner for F
where
    F: Fn(&TaskEnvelope) -> Priority + Send + Sync,
{
    fn assign(&self, task: &TaskEnvelope) -> Priority {
        self(task)
    }
}
