//! Timer-driven injection of synthesized input.
//!
//! The hook thread only pushes onto an unbounded channel. A dedicated worker
//! wakes on a schedule, drains everything queued so far and hands it to the
//! [`InjectionSink`] as one batch. Drains only ever run on that one worker, so
//! two of them can never overlap.

use crate::scroll::state::{InputRecord, SynthesizedEvent};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Receives ordered batches of records to synthesize.
pub trait InjectionSink: Send + Sync {
    fn inject(&self, batch: &[InputRecord]) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Ticks on a fixed cadence, independent of how long a drain takes.
    #[default]
    FixedInterval,
    /// Waits a full interval after each drain completes.
    SelfRescheduling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub interval: Duration,
    pub policy: DispatchPolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(20),
            policy: DispatchPolicy::FixedInterval,
        }
    }
}

#[derive(Debug, Default)]
pub struct DispatchStats {
    batches: AtomicU64,
    records: AtomicU64,
    failures: AtomicU64,
}

impl DispatchStats {
    /// Successful injection calls.
    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    /// Records handed to the sink in successful calls.
    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

/// Producer half handed to the hook thread. Sending never blocks.
#[derive(Debug, Clone)]
pub struct DispatchSender {
    tx: Sender<SynthesizedEvent>,
}

impl DispatchSender {
    /// Queues `event`; returns `false` when the dispatcher has shut down.
    pub fn enqueue(&self, event: SynthesizedEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Creates an unscheduled queue. [`drain_into`] empties the receiver.
pub fn queue() -> (DispatchSender, Receiver<SynthesizedEvent>) {
    let (tx, rx) = mpsc::channel();
    (DispatchSender { tx }, rx)
}

/// Drains every queued event in FIFO order and injects them in one call.
///
/// Returns the number of records handed to the sink; an empty queue makes no
/// call at all.
pub fn drain_into(
    rx: &Receiver<SynthesizedEvent>,
    sink: &dyn InjectionSink,
    stats: &DispatchStats,
) -> usize {
    let mut batch: Vec<InputRecord> = Vec::new();
    while let Ok(event) = rx.try_recv() {
        batch.extend(event.into_records());
    }
    if batch.is_empty() {
        return 0;
    }

    match sink.inject(&batch) {
        Ok(()) => {
            stats.batches.fetch_add(1, Ordering::Relaxed);
            stats
                .records
                .fetch_add(batch.len() as u64, Ordering::Relaxed);
            tracing::trace!(records = batch.len(), "injected batch");
        }
        Err(err) => {
            stats.failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(?err, records = batch.len(), "failed to inject batch");
        }
    }
    batch.len()
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

pub struct Dispatcher {
    sender: DispatchSender,
    stats: Arc<DispatchStats>,
    config: DispatcherConfig,
    worker: Option<WorkerHandle>,
}

impl Dispatcher {
    pub fn spawn(sink: Arc<dyn InjectionSink>, config: DispatcherConfig) -> anyhow::Result<Self> {
        let (sender, rx) = queue();
        let (stop_tx, stop_rx) = mpsc::channel();
        let stats = Arc::new(DispatchStats::default());
        let worker_stats = Arc::clone(&stats);
        let join = thread::Builder::new()
            .name("scroll-dispatch".into())
            .spawn(move || worker_loop(rx, stop_rx, sink, worker_stats, config))?;
        tracing::debug!(
            interval_ms = config.interval.as_millis() as u64,
            policy = ?config.policy,
            "dispatcher started"
        );
        Ok(Self {
            sender,
            stats,
            config,
            worker: Some(WorkerHandle { stop_tx, join }),
        })
    }

    pub fn sender(&self) -> DispatchSender {
        self.sender.clone()
    }

    pub fn enqueue(&self, event: SynthesizedEvent) -> bool {
        self.sender.enqueue(event)
    }

    pub fn stats(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }

    pub fn config(&self) -> DispatcherConfig {
        self.config
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stops the scheduler after a final drain. Calling it again is a no-op.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            if worker.join.join().is_err() {
                tracing::error!("dispatcher worker panicked");
            }
            tracing::debug!(
                batches = self.stats.batches(),
                failures = self.stats.failures(),
                "dispatcher stopped"
            );
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    rx: Receiver<SynthesizedEvent>,
    stop_rx: Receiver<()>,
    sink: Arc<dyn InjectionSink>,
    stats: Arc<DispatchStats>,
    config: DispatcherConfig,
) {
    let interval = config.interval.max(Duration::from_millis(1));
    let mut next_tick = Instant::now() + interval;

    loop {
        let wait = match config.policy {
            DispatchPolicy::FixedInterval => next_tick.saturating_duration_since(Instant::now()),
            DispatchPolicy::SelfRescheduling => interval,
        };
        match stop_rx.recv_timeout(wait) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        drain_into(&rx, sink.as_ref(), &stats);

        if config.policy == DispatchPolicy::FixedInterval {
            let now = Instant::now();
            next_tick += interval;
            // Skip ticks missed behind a slow injection call.
            while next_tick <= now {
                next_tick += interval;
            }
        }
    }

    // Anything queued before the stop request still goes out.
    drain_into(&rx, sink.as_ref(), &stats);
}
