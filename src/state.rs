//! Published state shared between the collector, the analyzer and the IPC server.
//!
//! Both values are immutable once published and are replaced wholesale with
//! an atomic pointer swap. Readers take one reference per request and keep
//! it for the whole request, so they never see a half-updated view.
//!
//! ```text
//! Aggregator::collect() -> SharedState::publish_snapshot() -> ArcSwap::store()
//!                                                                   |
//!                                                            (atomic swap)
//!
//! IPC request -> SharedState::snapshot() -> ArcSwap::load_full() -> Arc<Snapshot>
//!                                                  |
//!                                          (lock-free read)
//! ```

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::model::{AnomalyAnalysis, Snapshot};

/// Latest snapshot and analysis, each absent until first published
#[derive(Default)]
pub struct SharedState {
    snapshot: ArcSwapOption<Snapshot>,
    analysis: ArcSwapOption<AnomalyAnalysis>,
}

impl SharedState {
    /// Create an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if any cycle has succeeded yet
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.load_full()
    }

    /// Current analysis, if any has been published yet
    #[must_use]
    pub fn analysis(&self) -> Option<Arc<AnomalyAnalysis>> {
        self.analysis.load_full()
    }

    /// Replace the current snapshot
    pub fn publish_snapshot(&self, snapshot: Snapshot) {
        self.snapshot.store(Some(Arc::new(snapshot)));
    }

    /// Replace the current analysis
    pub fn publish_analysis(&self, analysis: AnomalyAnalysis) {
        self.analysis.store(Some(Arc::new(analysis)));
    }
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedState")
            .field("has_snapshot", &self.snapshot.load().is_some())
            .field("has_analysis", &self.analysis.load().is_some())
            .finish()
    }
}
