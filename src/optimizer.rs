//! Resource-aware recovery optimization heuristics
//!
//! Derives advisory parallelization, compression and bandwidth-split
//! parameters from the compute and network resources available to whatever
//! external executor performs the real restore I/O. The engine itself never
//! enforces these values.

use serde::{Deserialize, Serialize};

const MAX_PARALLEL_DEGREE: u32 = 8;
const BATCH_SIZE: u32 = 100;
const CONCURRENT_TRANSFERS: u32 = 4;

const RECOVERY_BANDWIDTH_SHARE: f64 = 0.7;
const MONITORING_BANDWIDTH_SHARE: f64 = 0.2;
const OTHER_BANDWIDTH_SHARE: f64 = 0.1;

/// Compute and network resources available for a recovery
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceProfile {
    /// CPU cores available to the external executor
    pub cpu_cores: u32,
    /// Total bandwidth available, in Mbps
    pub bandwidth_mbps: u64,
}

/// Compression effort tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompressionLevel {
    /// Minimal compression, for CPU-starved hosts
    Low,
    /// Balanced compression
    Medium,
    /// Aggressive compression, for hosts with CPU to spare
    High,
}

/// Advisory parallelization sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parallelization {
    /// Suggested worker count, capped at 8
    pub degree: u32,
    /// Items per batch
    pub batch_size: u32,
    /// Concurrent transfer streams
    pub concurrent_transfers: u32,
}

/// Bandwidth split across recovery concerns, in Mbps
///
/// Each share is rounded independently, so the three values may drift from
/// the input total by a small rounding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandwidthAllocation {
    /// Share reserved for restore traffic
    pub recovery_mbps: u64,
    /// Share reserved for monitoring traffic
    pub monitoring_mbps: u64,
    /// Share left for everything else
    pub other_mbps: u64,
}

/// Full optimization parameter set consumed by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationParameters {
    /// Parallelization sizing
    pub parallelization: Parallelization,
    /// Compression tier
    pub compression_level: CompressionLevel,
    /// Bandwidth split
    pub bandwidth_allocation: BandwidthAllocation,
}

/// Derives optimization parameters from available resources
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizationAdvisor;

impl OptimizationAdvisor {
    /// Create an advisor
    pub fn new() -> Self {
        Self
    }

    /// Compute advisory optimization parameters for the given resources
    pub fn compute(&self, resources: &ResourceProfile) -> OptimizationParameters {
        let degree = (resources.cpu_cores / 2).min(MAX_PARALLEL_DEGREE);

        let compression_level = if resources.cpu_cores >= 4 {
            CompressionLevel::High
        } else if resources.cpu_cores >= 2 {
            CompressionLevel::Medium
        } else {
            CompressionLevel::Low
        };

        let total = resources.bandwidth_mbps as f64;
        let bandwidth_allocation = BandwidthAllocation {
            recovery_mbps: (total * RECOVERY_BANDWIDTH_SHARE).round() as u64,
            monitoring_mbps: (total * MONITORING_BANDWIDTH_SHARE).round() as u64,
            other_mbps: (total * OTHER_BANDWIDTH_SHARE).round() as u64,
        };

        OptimizationParameters {
            parallelization: Parallelization {
                degree,
                batch_size: BATCH_SIZE,
                concurrent_transfers: CONCURRENT_TRANSFERS,
            },
            compression_level,
            bandwidth_allocation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources(cpu_cores: u32, bandwidth_mbps: u64) -> ResourceProfile {
        ResourceProfile {
            cpu_cores,
            bandwidth_mbps,
        }
    }

    #[test]
    fn test_parallel_degree_is_half_the_cores() {
        let advisor = OptimizationAdvisor::new();
        let params = advisor.compute(&resources(8, 1_000));
        assert_eq!(params.parallelization.degree, 4);
    }

    #[test]
    fn test_parallel_degree_caps_at_eight() {
        let advisor = OptimizationAdvisor::new();
        let params = advisor.compute(&resources(20, 1_000));
        assert_eq!(params.parallelization.degree, 8);
    }

    #[test]
    fn test_fixed_batch_and_transfer_sizing() {
        let advisor = OptimizationAdvisor::new();
        let params = advisor.compute(&resources(4, 1_000));
        assert_eq!(params.parallelization.batch_size, 100);
        assert_eq!(params.parallelization.concurrent_transfers, 4);
    }

    #[test]
    fn test_compression_tiers() {
        let advisor = OptimizationAdvisor::new();
        assert_eq!(
            advisor.compute(&resources(1, 100)).compression_level,
            CompressionLevel::Low
        );
        assert_eq!(
            advisor.compute(&resources(3, 100)).compression_level,
            CompressionLevel::Medium
        );
        assert_eq!(
            advisor.compute(&resources(4, 100)).compression_level,
            CompressionLevel::High
        );
    }

    #[test]
    fn test_bandwidth_shares_sum_close_to_total() {
        let advisor = OptimizationAdvisor::new();
        for total in [100u64, 999, 1_001, 12_345, 7] {
            let allocation = advisor.compute(&resources(4, total)).bandwidth_allocation;
            let sum =
                allocation.recovery_mbps + allocation.monitoring_mbps + allocation.other_mbps;
            let drift = sum.abs_diff(total);
            assert!(drift <= 2, "drift {} for total {}", drift, total);
        }
    }

    #[test]
    fn test_bandwidth_split_proportions() {
        let advisor = OptimizationAdvisor::new();
        let allocation = advisor.compute(&resources(4, 1_000)).bandwidth_allocation;
        assert_eq!(allocation.recovery_mbps, 700);
        assert_eq!(allocation.monitoring_mbps, 200);
        assert_eq!(allocation.other_mbps, 100);
    }

    #[test]
    fn test_single_core_yields_zero_degree() {
        // Advisory only: floor(1 / 2) = 0 is passed through untouched.
        let advisor = OptimizationAdvisor::new();
        let params = advisor.compute(&resources(1, 100));
        assert_eq!(params.parallelization.degree, 0);
    }
}
