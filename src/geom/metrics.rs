//! Opt-in timing hooks for the simulation engine.
//!
//! Timing is only collected when the `engine_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there). In
//! every other build the calls compile to plain closure invocations.
//!
//! ```ignore
//! use onion_engine::geom::{EngineMetrics, TimingBucket};
//!
//! let mut metrics = EngineMetrics::default();
//! metrics.begin();
//! let result = metrics.time(TimingBucket::VolumeSampling, || simulate(&params));
//! if let Some(report) = metrics.end() {
//!     println!("sampling: {} ns", report.volume_sampling_ns);
//! }
//! ```

/// Phases of the engine that are timed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Statistics grid walk plus aggregation.
    VolumeSampling,
    /// Baseline run for comparison mode.
    Comparison,
    /// Adaptive visual cloud generation.
    VisualSampling,
    /// Explosion transform over the cloud.
    Explosion,
    /// Parameter sweep for export.
    BatchSweep,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineTimingReport {
    pub volume_sampling_ns: u64,
    pub comparison_ns: u64,
    pub visual_sampling_ns: u64,
    pub explosion_ns: u64,
    pub batch_sweep_ns: u64,
}

impl EngineTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.volume_sampling_ns
            .saturating_add(self.comparison_ns)
            .saturating_add(self.visual_sampling_ns)
            .saturating_add(self.explosion_ns)
            .saturating_add(self.batch_sweep_ns)
    }

    /// Total in milliseconds, for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }

    #[cfg_attr(
        not(all(feature = "engine_metrics", not(target_arch = "wasm32"))),
        allow(dead_code)
    )]
    fn bucket_mut(&mut self, bucket: TimingBucket) -> &mut u64 {
        match bucket {
            TimingBucket::VolumeSampling => &mut self.volume_sampling_ns,
            TimingBucket::Comparison => &mut self.comparison_ns,
            TimingBucket::VisualSampling => &mut self.visual_sampling_ns,
            TimingBucket::Explosion => &mut self.explosion_ns,
            TimingBucket::BatchSweep => &mut self.batch_sweep_ns,
        }
    }
}

/// Accumulator around [`EngineTimingReport`].
///
/// With metrics disabled every method is a no-op and [`end`](Self::end)
/// returns `None`.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
    report: EngineTimingReport,
}

impl EngineMetrics {
    /// Resets all counters.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = EngineTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<EngineTimingReport> {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and adds its wall time to `bucket`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = self.report.bucket_mut(bucket);
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_total_sums_buckets() {
        let report = EngineTimingReport {
            volume_sampling_ns: 1000,
            visual_sampling_ns: 2000,
            batch_sweep_ns: 3000,
            ..EngineTimingReport::default()
        };
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn bucket_mut_targets_matching_field() {
        let mut report = EngineTimingReport::default();
        *report.bucket_mut(TimingBucket::Explosion) += 7;
        assert_eq!(report.explosion_ns, 7);
        assert_eq!(report.total_ns(), 7);
    }

    #[test]
    fn time_returns_closure_result() {
        let mut metrics = EngineMetrics::default();
        metrics.begin();
        assert_eq!(metrics.time(TimingBucket::VolumeSampling, || 42), 42);
        let report = metrics.end();
        if cfg!(all(feature = "engine_metrics", not(target_arch = "wasm32"))) {
            assert!(report.is_some());
        } else {
            assert!(report.is_none());
        }
    }
}
