//! Background analysis worker.
//!
//! Tracking an action only enqueues the user for analysis; this worker
//! drains the queue on a timer and runs pattern mining plus suggestion
//! generation on its own database connection. A crashed or slow analysis
//! pass never blocks the tracking path.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::Notify;

use crate::config::PolicyConfig;
use crate::db::FleetDb;

/// Users analyzed per drain cycle.
const MAX_BATCH_SIZE: usize = 4;
/// Seconds between drain cycles.
const POLL_INTERVAL_SECS: u64 = 5;
/// Minimum seconds between queued analyses for the same user.
const USER_DEBOUNCE_SECS: u64 = 30;
/// Drain cycles between debounce-map prunes.
const PRUNE_EVERY_CYCLES: u32 = 12;

/// Why an analysis was requested. Higher priorities drain first, and
/// `Manual` skips the per-user debounce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnalysisPriority {
    Background,
    ActionTracked,
    Manual,
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub user_id: String,
    pub priority: AnalysisPriority,
    pub requested_at: Instant,
}

/// Pending analysis requests, at most one per user.
///
/// Re-enqueueing a queued user upgrades its priority instead of adding a
/// second entry. Non-manual requests are debounced per user so a burst of
/// tracked actions costs one analysis pass, not one per action.
#[derive(Default)]
pub struct AnalysisQueue {
    queue: Mutex<VecDeque<AnalysisRequest>>,
    last_enqueued: Mutex<HashMap<String, Instant>>,
}

impl AnalysisQueue {
    pub fn enqueue(&self, user_id: String, priority: AnalysisPriority) {
        if priority != AnalysisPriority::Manual {
            if let Ok(last) = self.last_enqueued.lock() {
                if let Some(at) = last.get(&user_id) {
                    if at.elapsed() < Duration::from_secs(USER_DEBOUNCE_SECS) {
                        return;
                    }
                }
            }
        }

        let Ok(mut queue) = self.queue.lock() else {
            return;
        };
        match queue.iter_mut().find(|r| r.user_id == user_id) {
            Some(existing) => {
                if priority > existing.priority {
                    existing.priority = priority;
                }
            }
            None => queue.push_back(AnalysisRequest {
                user_id: user_id.clone(),
                priority,
                requested_at: Instant::now(),
            }),
        }
        drop(queue);

        if let Ok(mut last) = self.last_enqueued.lock() {
            last.insert(user_id, Instant::now());
        }
    }

    /// Remove up to `max` requests, highest priority first.
    pub fn dequeue_batch(&self, max: usize) -> Vec<AnalysisRequest> {
        let Ok(mut queue) = self.queue.lock() else {
            return Vec::new();
        };
        let mut batch = Vec::new();
        while batch.len() < max && !queue.is_empty() {
            let best = queue
                .iter()
                .enumerate()
                .max_by_key(|(_, r)| r.priority)
                .map(|(i, _)| i);
            match best.and_then(|i| queue.remove(i)) {
                Some(request) => batch.push(request),
                None => break,
            }
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop debounce entries old enough to no longer suppress anything.
    fn prune_stale_entries(&self) {
        if let Ok(mut last) = self.last_enqueued.lock() {
            last.retain(|_, at| at.elapsed() < Duration::from_secs(USER_DEBOUNCE_SECS * 10));
        }
    }
}

/// Owns the drain loop. Opens its own connection from `db_path` each cycle
/// so the worker never shares a connection with request handlers.
pub struct AnalysisWorker {
    queue: Arc<AnalysisQueue>,
    db_path: PathBuf,
    policy: PolicyConfig,
    shutdown: Arc<Notify>,
}

impl AnalysisWorker {
    pub fn new(queue: Arc<AnalysisQueue>, db_path: PathBuf, policy: PolicyConfig) -> Self {
        AnalysisWorker {
            queue,
            db_path,
            policy,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Handle for asking the run loop to stop.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Drain the queue on a fixed interval until shut down.
    pub async fn run(self) {
        let mut cycles: u32 = 0;
        loop {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)) => {}
                _ = self.shutdown.notified() => {
                    log::info!("Analysis worker shutting down");
                    break;
                }
            }
            cycles = cycles.wrapping_add(1);
            if cycles % PRUNE_EVERY_CYCLES == 0 {
                self.queue.prune_stale_entries();
            }
            self.drain_once();
        }
    }

    fn drain_once(&self) {
        let batch = self.queue.dequeue_batch(MAX_BATCH_SIZE);
        if batch.is_empty() {
            return;
        }

        let db = match FleetDb::open_at(self.db_path.clone()) {
            Ok(db) => db,
            Err(e) => {
                log::warn!("Analysis worker could not open the database: {e}");
                return;
            }
        };

        for request in batch {
            match crate::analytics::run_user_analysis(&db, &self.policy, &request.user_id) {
                Ok(summary) => {
                    if summary.patterns_updated > 0 || summary.suggestions_created > 0 {
                        log::info!(
                            "Analysis for {}: {} patterns, {} suggestions",
                            request.user_id,
                            summary.patterns_updated,
                            summary.suggestions_created
                        );
                    }
                }
                Err(e) => {
                    log::warn!("Analysis failed for {}: {e}", request.user_id);
                }
            }
        }
    }
}
