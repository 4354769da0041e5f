//! Periodic snapshot collection

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::source::MetricsSource;
use crate::error::CollectionError;
use crate::model::Snapshot;
use crate::state::SharedState;
use crate::static_config::parse_config;

/// Fuses the metrics source and the static configuration into snapshots.
///
/// A cycle either succeeds as a whole and replaces the published snapshot,
/// or fails and leaves the previous snapshot in place. There is no partial
/// publication and no retry within a cycle.
pub struct Aggregator {
    source: Arc<dyn MetricsSource>,
    config_path: PathBuf,
    state: Arc<SharedState>,
    successes: AtomicU64,
    failures: AtomicU64,
    last_error: Mutex<Option<String>>,
}

impl Aggregator {
    pub fn new(
        source: Arc<dyn MetricsSource>,
        config_path: impl Into<PathBuf>,
        state: Arc<SharedState>,
    ) -> Self {
        Self {
            source,
            config_path: config_path.into(),
            state,
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// Path of the static FRR configuration file
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Gather all three inputs and build a snapshot without publishing it
    ///
    /// # Errors
    ///
    /// Returns the first input that failed.
    pub async fn collect(&self) -> Result<Snapshot, CollectionError> {
        let ospf = self.source.fetch_ospf().await.map_err(CollectionError::Ospf)?;
        let system = self
            .source
            .collect_system_metrics()
            .await
            .map_err(CollectionError::System)?;
        let static_config = parse_config(&self.config_path)?;

        Ok(Snapshot::new(ospf, static_config, system))
    }

    /// Run one cycle: collect, then publish on success or record the error
    ///
    /// # Errors
    ///
    /// Returns the collection error after recording it. The published
    /// snapshot is untouched in that case.
    pub async fn run_cycle(&self) -> Result<(), CollectionError> {
        match self.collect().await {
            Ok(snapshot) => {
                debug!(
                    neighbors = snapshot.ospf.neighbors.len(),
                    lsas = snapshot.ospf.lsas.len(),
                    routes = snapshot.ospf.routes.len(),
                    "Publishing snapshot"
                );
                self.state.publish_snapshot(snapshot);
                self.successes.fetch_add(1, Ordering::Relaxed);
                *self.last_error.lock() = None;
                Ok(())
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!(error = %e, "Collection cycle failed, keeping previous snapshot");
                } else {
                    error!(error = %e, "Collection cycle failed, keeping previous snapshot");
                }
                self.failures.fetch_add(1, Ordering::Relaxed);
                *self.last_error.lock() = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Run cycles every `interval` until `cancel` fires
    ///
    /// The first cycle runs immediately.
    pub async fn start_periodic(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = interval.as_secs(),
            config = %self.config_path.display(),
            "Aggregator started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Aggregator stopped");
                    return;
                }
                _ = ticker.tick() => {
                    // Errors are recorded and logged by run_cycle
                    let _ = self.run_cycle().await;
                }
            }
        }
    }

    /// Currently published snapshot
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.snapshot()
    }

    /// Error of the most recent cycle, `None` if it succeeded or none ran
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    /// Number of successful cycles
    pub fn success_count(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Number of failed cycles
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
