//! In-process run lock.
//!
//! Good enough when every batch trigger lives in one process. Multi-process
//! deployments implement `RunLock` against their shared store instead.

use std::collections::HashSet;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::traits::RunLock;

#[derive(Debug, Default)]
pub struct MemoryRunLock {
    held: Mutex<HashSet<String>>,
}

impl MemoryRunLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, job: &str) -> bool {
        self.held
            .lock()
            .map(|held| held.contains(job))
            .unwrap_or(false)
    }
}

#[async_trait]
impl RunLock for MemoryRunLock {
    async fn acquire(&self, job: &str) -> Result<bool> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| anyhow!("run lock poisoned"))?;
        Ok(held.insert(job.to_string()))
    }

    async fn release(&self, job: &str) -> Result<()> {
        let mut held = self
            .held
            .lock()
            .map_err(|_| anyhow!("run lock poisoned"))?;
        held.remove(job);
        Ok(())
    }
}
