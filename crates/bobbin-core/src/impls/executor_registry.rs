//! ExecutorRegistry - task category ごとに Executor を振り分ける
//!
//! Executable は Executor を 1 つしか持たないので、複数 category を扱う場合は
//! この registry を Executor として渡します。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ExecutionContext, RegistryError, TaskCategory, TaskEnvelope, TaskError};
use crate::ports::{ExecuteResponse, Executor};

/// Registry of executors (category -> executor).
///
/// Built during initialization (mutable), used during runtime (immutable),
/// so dispatch needs no lock.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<TaskCategory, Arc<dyn Executor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            executors: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        category: TaskCategory,
        executor: Arc<dyn Executor>,
    ) -> Result<(), RegistryError> {
        if self.executors.contains_key(&category) {
            return Err(RegistryError::AlreadyRegistered(format!("executor for {category}")));
        }
        self.executors.insert(category, executor);
        Ok(())
    }

    pub fn get(&self, category: TaskCategory) -> Option<&Arc<dyn Executor>> {
        self.executors.get(&category)
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

#[async_trait]
impl Executor for ExecutorRegistry {
    async fn execute(&self, ctx: &ExecutionContext, task: &TaskEnvelope) -> ExecuteResponse {
        match self.executors.get(&task.category()) {
            Some(executor) => executor.execute(ctx, task).await,
            None => ExecuteResponse::err(TaskError::ExecutorNotFound(task.category())),
        }
    }
}
