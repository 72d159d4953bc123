//! Bounded background queue
//!
//! Post-commit side effects (notifications, repricing passes) are submitted
//! here instead of being spawned ad hoc. One worker drains the queue; each job
//! runs on its own task so it outlives the submitting caller and a panicking
//! job cannot take the worker down.
//!
//! Policy is at-most-once: a job runs once, failures are logged and counted,
//! nothing is retried. When the queue is full the new job is dropped.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::ServiceError;

type JobFuture = Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + 'static>>;

struct Job {
    name: String,
    future: JobFuture,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    pending: AtomicU64,
    idle: Notify,
}

impl Counters {
    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Point-in-time view of the queue counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QueueStats {
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub dropped: u64,
    pub pending: u64,
}

pub struct BackgroundQueue {
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl BackgroundQueue {
    /// Creates the queue and spawns its worker on the current runtime
    pub fn new(capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<Job>(capacity.max(1));
        let counters = Arc::new(Counters::default());

        let worker_counters = counters.clone();
        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let name = job.name;
                match tokio::spawn(job.future).await {
                    Ok(Ok(())) => {
                        worker_counters.succeeded.fetch_add(1, Ordering::Relaxed);
                        debug!(job = %name, "background job finished");
                    }
                    Ok(Err(e)) => {
                        worker_counters.failed.fetch_add(1, Ordering::Relaxed);
                        error!(job = %name, error = %e, "background job failed");
                    }
                    Err(e) => {
                        worker_counters.failed.fetch_add(1, Ordering::Relaxed);
                        error!(job = %name, error = %e, "background job panicked");
                    }
                }
                worker_counters.finish_one();
            }
            debug!("background queue closed");
        });

        Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            counters,
        }
    }

    /// Enqueues a job; returns false if it was dropped
    pub fn submit<F>(&self, name: impl Into<String>, job: F) -> bool
    where
        F: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        let name = name.into();
        let sender = match self.sender.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let Some(sender) = sender else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(job = %name, "background queue is shut down, job dropped");
            return false;
        };

        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        let job = Job {
            name: name.clone(),
            future: Box::pin(job),
        };
        match sender.try_send(job) {
            Ok(()) => {
                self.counters.submitted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(e) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                self.counters.finish_one();
                match e {
                    mpsc::error::TrySendError::Full(_) => warn!(job = %name, "background queue full, job dropped"),
                    mpsc::error::TrySendError::Closed(_) => warn!(job = %name, "background queue closed, job dropped"),
                }
                false
            }
        }
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            pending: self.counters.pending.load(Ordering::SeqCst),
        }
    }

    /// Waits until every accepted job has finished
    ///
    /// Jobs submitted by running jobs are waited for too.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.counters.idle.notified();
            if self.counters.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Stops accepting jobs, drains the queue and joins the worker
    pub async fn shutdown(&self) {
        let sender = match self.sender.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(sender);

        let worker = match self.worker.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(error = %e, "background worker ended abnormally");
            }
        }
    }
}
