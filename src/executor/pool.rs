//! Bounded transfer pool.
//!
//! This module provides a dispatcher + worker inbox design:
//! - single-consumer upstream `mpsc::Receiver` (dispatcher)
//! - per-worker `mpsc` inbox channels, fed round-robin
//! - an unbounded result channel back to the coordinator
//! - explicit sender drop on shutdown before awaiting workers
//!
//! Workers never touch shared run counters: each one sends an [`ItemReport`]
//! and the coordinator folds them. With one worker, items are processed one
//! at a time in enqueue order.

use super::{transfer_one, TransferContext};
use crate::types::{Outcome, ShadowError, WorkItem};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use std::sync::Arc;

/// Work item accepted by the transfer pool.
#[derive(Debug, Clone)]
pub struct TransferJob {
    /// Position in the directory listing
    pub index: usize,
    pub item: WorkItem,
}

/// Result of one job, tagged with the worker that ran it.
#[derive(Debug)]
pub struct ItemReport {
    pub index: usize,
    pub worker: usize,
    pub item: WorkItem,
    pub result: Result<Outcome, ShadowError>,
}

/// Hooks invoked on the worker while an item is processed.
pub trait ItemObserver: Send + Sync {
    /// A copy of `item` is about to start; `overwrite` when it replaces an
    /// existing destination.
    fn copy_starting(&self, _worker: usize, _item: &WorkItem, _overwrite: bool) {}

    /// `report` is final; called before it is sent back to the coordinator.
    fn item_finished(&self, report: &ItemReport);
}

/// Runtime stats for the transfer pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub enqueued: usize,
    pub dispatched: usize,
    pub completed: usize,
    pub per_worker_completed: Vec<usize>,
}

impl PoolStats {
    fn new(workers: usize) -> Self {
        Self {
            workers,
            enqueued: 0,
            dispatched: 0,
            completed: 0,
            per_worker_completed: vec![0; workers],
        }
    }
}

/// Thread-pool executor running [`transfer_one`] for each enqueued item.
pub struct ParallelExecutor {
    runtime: Runtime,
    enqueue_tx: Option<mpsc::Sender<TransferJob>>,
    dispatcher_handle: Option<JoinHandle<()>>,
    worker_handles: Vec<JoinHandle<()>>,
    results_rx: Option<mpsc::UnboundedReceiver<ItemReport>>,
    stats: Arc<Mutex<PoolStats>>,
}

impl ParallelExecutor {
    /// Create a dispatcher + worker pool with bounded channels.
    pub fn new(
        worker_count: usize,
        queue_capacity: usize,
        ctx: TransferContext,
        observer: Option<Arc<dyn ItemObserver>>,
    ) -> Result<Self, ShadowError> {
        let workers = worker_count.max(1);
        let capacity = queue_capacity.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name("shadowbak-worker")
            .enable_all()
            .build()
            .map_err(|e| ShadowError::Worker(format!("cannot start worker runtime: {}", e)))?;

        let stats = Arc::new(Mutex::new(PoolStats::new(workers)));
        let handle = runtime.handle().clone();

        let (enqueue_tx, enqueue_rx) = mpsc::channel::<TransferJob>(capacity);
        let (results_tx, results_rx) = mpsc::unbounded_channel::<ItemReport>();

        let mut worker_txs = Vec::with_capacity(workers);
        let mut worker_handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let (worker_tx, worker_rx) = mpsc::channel::<TransferJob>(capacity);
            worker_txs.push(worker_tx);
            worker_handles.push(handle.spawn(worker_loop(
                worker_id,
                worker_rx,
                ctx,
                observer.clone(),
                results_tx.clone(),
                Arc::clone(&stats),
            )));
        }
        // Workers hold the only result senders from here on.
        drop(results_tx);

        let dispatcher_handle =
            handle.spawn(dispatcher_loop(enqueue_rx, worker_txs, Arc::clone(&stats)));

        debug!("Transfer pool started with {} worker(s)", workers);

        Ok(Self {
            runtime,
            enqueue_tx: Some(enqueue_tx),
            dispatcher_handle: Some(dispatcher_handle),
            worker_handles,
            results_rx: Some(results_rx),
            stats,
        })
    }

    /// Enqueue a job into upstream dispatcher queue.
    pub fn enqueue(&self, job: TransferJob) -> Result<(), ShadowError> {
        let sender = self.enqueue_tx.as_ref().ok_or_else(|| {
            ShadowError::Worker("transfer queue is already closed".to_string())
        })?;
        let stats = Arc::clone(&self.stats);

        self.runtime.block_on(async {
            sender.send(job).await.map_err(|_| {
                ShadowError::Worker("transfer queue receiver is closed".to_string())
            })?;

            let mut guard = stats.lock().await;
            guard.enqueued += 1;
            Ok(())
        })
    }

    /// Close queue input, wait for dispatcher/workers to exit, and collect
    /// every report in enqueue order.
    pub fn close_and_wait(mut self) -> Result<(Vec<ItemReport>, PoolStats), ShadowError> {
        self.enqueue_tx.take();

        let dispatcher = self.dispatcher_handle.take();
        let workers = std::mem::take(&mut self.worker_handles);
        let results_rx = self.results_rx.take();
        let stats = Arc::clone(&self.stats);

        self.runtime.block_on(async move {
            if let Some(handle) = dispatcher {
                handle.await.map_err(map_join_error)?;
            }
            for handle in workers {
                handle.await.map_err(map_join_error)?;
            }

            let mut reports = Vec::new();
            if let Some(mut rx) = results_rx {
                while let Some(report) = rx.recv().await {
                    reports.push(report);
                }
            }
            reports.sort_by_key(|report| report.index);

            let stats = stats.lock().await.clone();
            Ok((reports, stats))
        })
    }
}

async fn dispatcher_loop(
    mut enqueue_rx: mpsc::Receiver<TransferJob>,
    worker_txs: Vec<mpsc::Sender<TransferJob>>,
    stats: Arc<Mutex<PoolStats>>,
) {
    let mut next_worker = 0usize;
    let worker_len = worker_txs.len();

    while let Some(job) = enqueue_rx.recv().await {
        if worker_len == 0 {
            break;
        }

        let target = next_worker % worker_len;
        if worker_txs[target].send(job).await.is_ok() {
            let mut guard = stats.lock().await;
            guard.dispatched += 1;
            next_worker = (next_worker + 1) % worker_len;
        }
    }
    // worker_txs are dropped here, which closes worker inboxes.
}

async fn worker_loop(
    worker_id: usize,
    mut worker_rx: mpsc::Receiver<TransferJob>,
    ctx: TransferContext,
    observer: Option<Arc<dyn ItemObserver>>,
    results_tx: mpsc::UnboundedSender<ItemReport>,
    stats: Arc<Mutex<PoolStats>>,
) {
    while let Some(TransferJob { index, item }) = worker_rx.recv().await {
        // File I/O blocks; keep it off the async worker threads.
        let blocking_item = item.clone();
        let blocking_observer = observer.clone();
        let result = match tokio::task::spawn_blocking(move || {
            transfer_one(&blocking_item, &ctx, |overwrite| {
                if let Some(observer) = &blocking_observer {
                    observer.copy_starting(worker_id, &blocking_item, overwrite);
                }
            })
        })
        .await
        {
            Ok(result) => result,
            Err(e) => Err(map_join_error(e)),
        };

        let report = ItemReport {
            index,
            worker: worker_id,
            item,
            result,
        };
        if let Some(observer) = &observer {
            observer.item_finished(&report);
        }

        {
            let mut guard = stats.lock().await;
            guard.completed += 1;
            if let Some(slot) = guard.per_worker_completed.get_mut(worker_id) {
                *slot += 1;
            }
        }

        if results_tx.send(report).is_err() {
            break;
        }
    }
}

fn map_join_error(error: tokio::task::JoinError) -> ShadowError {
    ShadowError::Worker(format!("transfer task failed: {}", error))
}
