use crate::config::PoolConfig;
use crate::utils::error::{HarvestError, Result};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounded worker pool owned by one pipeline for the length of a run.
///
/// A [`Worker`] is a slot lease: at most `size` leases exist at a time, and
/// each carries a stable slot number used as the worker context in logs.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: String,
    size: usize,
    semaphore: Arc<Semaphore>,
    free_slots: Arc<Mutex<Vec<usize>>>,
}

impl WorkerPool {
    pub fn new(config: &PoolConfig) -> Self {
        // 反向放入，讓 slot 1 先被取用
        let free_slots = (1..=config.size).rev().collect();
        Self {
            name: config.name.clone(),
            size: config.size,
            semaphore: Arc::new(Semaphore::new(config.size)),
            free_slots: Arc::new(Mutex::new(free_slots)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits for a free slot.
    pub async fn acquire(&self) -> Result<Worker> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| HarvestError::PipelineTask {
                message: format!("worker pool '{}' closed", self.name),
            })?;

        let slot = self
            .free_slots
            .lock()
            .map_err(|_| HarvestError::PipelineTask {
                message: format!("worker pool '{}' poisoned", self.name),
            })?
            .pop()
            .ok_or_else(|| HarvestError::PipelineTask {
                message: format!("worker pool '{}' has no free slot", self.name),
            })?;

        Ok(Worker {
            name: format!("{}-{}", self.name, slot),
            slot,
            free_slots: Arc::clone(&self.free_slots),
            _permit: permit,
        })
    }
}

#[derive(Debug)]
pub struct Worker {
    name: String,
    slot: usize,
    free_slots: Arc<Mutex<Vec<usize>>>,
    _permit: OwnedSemaphorePermit,
}

impl Worker {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // slot 先歸還，permit 之後才釋放
        if let Ok(mut free_slots) = self.free_slots.lock() {
            free_slots.push(self.slot);
        }
    }
}
