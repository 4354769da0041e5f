//! Host resource sampling

use parking_lot::Mutex;
use sysinfo::{Networks, System};

use crate::error::SourceError;
use crate::model::{InterfaceStats, SystemMetrics};

/// Samples CPU, memory and interface counters.
///
/// CPU usage is computed by sysinfo from the difference between two
/// refreshes, so the `System` handle is kept across cycles. The first
/// sample after startup reports whatever sysinfo has from construction.
pub struct SystemSampler {
    system: Mutex<System>,
}

impl SystemSampler {
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        system.refresh_memory();
        Self {
            system: Mutex::new(system),
        }
    }

    /// Take one sample
    ///
    /// # Errors
    ///
    /// Returns `SourceError::System` if the host reports no memory, which
    /// happens when `/proc` is not readable.
    pub fn sample(&self) -> Result<SystemMetrics, SourceError> {
        let (cpu_usage, memory_usage) = {
            let mut system = self.system.lock();
            system.refresh_cpu_all();
            system.refresh_memory();

            let total = system.total_memory();
            if total == 0 {
                return Err(SourceError::System("total memory reported as 0".into()));
            }
            let used = system.used_memory();
            let memory_usage = (used as f64 / total as f64) * 100.0;
            (f64::from(system.global_cpu_usage()), memory_usage)
        };

        let networks = Networks::new_with_refreshed_list();
        let mut network_stats: Vec<InterfaceStats> = networks
            .iter()
            .map(|(name, data)| InterfaceStats {
                name: name.clone(),
                rx_bytes: data.total_received(),
                tx_bytes: data.total_transmitted(),
                rx_errors: data.total_errors_on_received(),
                tx_errors: data.total_errors_on_transmitted(),
            })
            .collect();
        network_stats.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(SystemMetrics {
            cpu_usage,
            memory_usage,
            network_stats,
        })
    }
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample() {
        let sampler = SystemSampler::new();
        let metrics = sampler.sample().unwrap();
        assert!(metrics.memory_usage > 0.0);
        assert!(metrics.memory_usage <= 100.0);

        assert!(metrics
            .network_stats
            .windows(2)
            .all(|pair| pair[0].name <= pair[1].name));
    }
}
