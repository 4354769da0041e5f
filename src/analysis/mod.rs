//! Anomaly analysis
//!
//! An [`Analyzer`] turns a snapshot into an [`AnomalyAnalysis`]. The analysis
//! loop re-evaluates whenever a new snapshot has been published and swaps the
//! result into [`SharedState`], the same way the aggregator publishes
//! snapshots.

mod baseline;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use baseline::BaselineAnalyzer;

use crate::model::{AnomalyAnalysis, Snapshot};
use crate::state::SharedState;

/// Consistency checker over one snapshot
pub trait Analyzer: Send + Sync {
    /// Evaluate every check against `snapshot`
    fn evaluate(&self, snapshot: &Snapshot) -> AnomalyAnalysis;
}

/// Evaluate the current snapshot if it changed since `last`
///
/// Returns the snapshot that was evaluated, or `last` when nothing new was
/// published.
pub fn evaluate_once(
    analyzer: &dyn Analyzer,
    state: &SharedState,
    last: Option<Arc<Snapshot>>,
) -> Option<Arc<Snapshot>> {
    let Some(snapshot) = state.snapshot() else {
        return last;
    };
    if last.as_ref().is_some_and(|prev| Arc::ptr_eq(prev, &snapshot)) {
        return last;
    }

    let analysis = analyzer.evaluate(&snapshot);
    debug!(
        router = analysis.router_anomaly.has_anomaly(),
        external = analysis.external_anomaly.has_anomaly(),
        nssa_external = analysis.nssa_external_anomaly.has_anomaly(),
        lsdb_to_rib = analysis.lsdb_to_rib_anomaly.has_anomaly(),
        rib_to_fib = analysis.rib_to_fib_anomaly.has_anomaly(),
        "Publishing analysis"
    );
    state.publish_analysis(analysis);
    Some(snapshot)
}

/// Run the analyzer every `interval` until `cancel` fires
pub async fn run_periodic(
    analyzer: Arc<dyn Analyzer>,
    state: Arc<SharedState>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = None;

    info!(interval_secs = interval.as_secs(), "Analyzer started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Analyzer stopped");
                return;
            }
            _ = ticker.tick() => {
                last = evaluate_once(analyzer.as_ref(), &state, last);
            }
        }
    }
}
