//! Bounded worker pool for artist tasks
//!
//! This module handles:
//! - Capping the number of artist tasks in flight with a semaphore
//! - Blocking the producer while the pool is saturated
//! - Containing task panics so one artist never takes down the run
//!
//! A permit is acquired before a task is spawned and released when it
//! finishes, so at most `capacity` tasks ever execute at once and the
//! listing walk cannot run ahead of the workers.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

/// Fixed-capacity pool running independent tasks
pub struct Scheduler {
    /// Limits tasks in flight
    semaphore: Arc<Semaphore>,

    /// Spawned tasks not yet reaped
    tasks: JoinSet<()>,

    capacity: usize,

    /// Tasks that ended in a panic so far
    panicked: usize,
}

impl Scheduler {
    /// Creates a pool that runs at most `capacity` tasks at once
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            tasks: JoinSet::new(),
            capacity,
            panicked: 0,
        }
    }

    /// Submits a task, waiting for a free slot first
    ///
    /// Returns once the task has been spawned. While `capacity` tasks are
    /// running the caller is suspended here, which throttles whoever is
    /// producing work.
    pub async fn submit<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.reap_finished();

        let permit = match self.semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            // The semaphore is never closed while the scheduler is alive
            Err(_) => return,
        };

        self.tasks.spawn(async move {
            let _permit = permit;
            task.await;
        });
    }

    /// Number of tasks currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Waits for every submitted task to finish
    ///
    /// # Returns
    ///
    /// The number of tasks that panicked over the scheduler's lifetime
    pub async fn join_all(mut self) -> usize {
        while let Some(result) = self.tasks.join_next().await {
            self.record(result);
        }
        self.panicked
    }

    /// Drops bookkeeping for tasks that already completed
    fn reap_finished(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            self.record(result);
        }
    }

    fn record(&mut self, result: Result<(), JoinError>) {
        if let Err(e) = result {
            if e.is_panic() {
                tracing::error!("Artist task panicked: {}", e);
                self.panicked += 1;
            }
        }
    }
}
