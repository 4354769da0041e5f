//! Snapshot collection
//!
//! - [`MetricsSource`]: live OSPF state and host metrics
//! - [`Aggregator`]: runs collection cycles and publishes snapshots

mod collector;
mod source;
mod system;

pub use collector::Aggregator;
pub use source::{ExporterSource, MetricsSource};
pub use system::SystemSampler;
