// src/poller.rs
//! Fixed-interval job list poller.
//!
//! Every tick spawns an independent fetch, so slow responses can overlap.
//! Each fetch is stamped with a sequence number and [`JobTable::load`]
//! refuses anything older than what is already displayed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::client::JobSource;
use crate::models::JobSnapshot;
use crate::table::JobTable;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

pub type SharedTable = Arc<RwLock<JobTable>>;

/// Answers whether anyone is currently looking at the table.
pub trait Visibility: Send + Sync {
    fn is_visible(&self) -> bool;
}

/// Visibility driven by connected viewers.
#[derive(Debug, Default)]
pub struct ViewerPresence {
    viewers: AtomicUsize,
    always_visible: AtomicBool,
}

impl ViewerPresence {
    pub fn new(always_visible: bool) -> Self {
        Self {
            viewers: AtomicUsize::new(0),
            always_visible: AtomicBool::new(always_visible),
        }
    }

    pub fn connect(&self) -> usize {
        self.viewers.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn disconnect(&self) -> usize {
        let previous = self
            .viewers
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        previous.saturating_sub(1)
    }

    pub fn viewers(&self) -> usize {
        self.viewers.load(Ordering::SeqCst)
    }

    pub fn set_always_visible(&self, value: bool) {
        self.always_visible.store(value, Ordering::SeqCst);
    }
}

impl Visibility for ViewerPresence {
    fn is_visible(&self) -> bool {
        self.always_visible.load(Ordering::SeqCst) || self.viewers() > 0
    }
}

/// Pushed to viewers whenever a newer snapshot has been rendered.
#[derive(Debug, Clone, Serialize)]
pub struct TableUpdate {
    pub sequence: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub rows: usize,
    pub html: String,
}

impl TableUpdate {
    pub fn from_table(table: &JobTable) -> Self {
        Self {
            sequence: table.sequence().unwrap_or_default(),
            fetched_at: table.fetched_at(),
            rows: table.rows().len(),
            html: table.render_html(),
        }
    }
}

#[async_trait]
pub trait RenderListener: Send + Sync {
    async fn table_rendered(&self, update: TableUpdate);
}

#[derive(Clone)]
pub struct Poller {
    source: Arc<dyn JobSource>,
    table: SharedTable,
    visibility: Arc<dyn Visibility>,
    listener: Option<Arc<dyn RenderListener>>,
    interval: Duration,
    sequence: Arc<AtomicU64>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn JobSource>,
        table: SharedTable,
        visibility: Arc<dyn Visibility>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            table,
            visibility,
            listener: None,
            interval,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn RenderListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn table(&self) -> SharedTable {
        self.table.clone()
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetches and applies one snapshot, waiting for the result.
    /// Returns whether the table changed.
    pub async fn poll_once(&self) -> bool {
        let sequence = self.next_sequence();
        self.fetch_and_apply(sequence).await
    }

    /// One timer tick: spawns a fetch when the table is visible, does nothing otherwise.
    pub fn tick(&self) -> Option<JoinHandle<bool>> {
        if !self.visibility.is_visible() {
            log::trace!("Job table hidden, skipping poll");
            return None;
        }

        let sequence = self.next_sequence();
        let poller = self.clone();
        Some(tokio::spawn(async move { poller.fetch_and_apply(sequence).await }))
    }

    pub async fn fetch_and_apply(&self, sequence: u64) -> bool {
        log::debug!("Polling job list (sequence {})", sequence);

        let jobs = match self.source.fetch_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                log::warn!("Job list poll {} failed, keeping previous render: {}", sequence, e);
                return false;
            }
        };

        let mut table = self.table.write().await;
        if !table.load(JobSnapshot::new(jobs, sequence)) {
            log::debug!(
                "Discarding stale job list response {} (showing {:?})",
                sequence,
                table.sequence()
            );
            return false;
        }

        // Notify while still holding the table so listeners see renders in sequence order.
        if let Some(listener) = &self.listener {
            listener.table_rendered(TableUpdate::from_table(&table)).await;
        }
        true
    }

    /// Initial load, then one tick per interval until `shutdown` flips or its sender drops.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        log::info!("Job poller started (interval {}ms)", self.interval.as_millis());
        self.poll_once().await;

        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    let stop = changed.is_err() || *shutdown.borrow();
                    if stop {
                        log::info!("Job poller stopping");
                        break;
                    }
                }
                _ = interval.tick() => {
                    self.tick();
                }
            }
        }
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
