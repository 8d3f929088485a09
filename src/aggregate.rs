//! Per-run-key accumulation of extracted metrics.
use crate::timing::TimingSample;
use std::collections::HashMap;

/// Everything extracted for one run key before it is flattened into a row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsBag {
    /// Peak heap bytes from the massif file, if any.
    pub peak_mem: Option<u64>,
    /// One entry per timing file, so real, user and sys always have the
    /// same sample count.
    pub timings: Vec<TimingSample>,
}

impl MetricsBag {
    /// Arithmetic mean of every timing sample, or `None` without samples.
    pub fn mean_timing(&self) -> Option<TimingSample> {
        if self.timings.is_empty() {
            return None;
        }
        let n = self.timings.len() as f64;
        let (real, user, sys) = self
            .timings
            .iter()
            .fold((0.0, 0.0, 0.0), |(r, u, s), t| (r + t.real, u + t.user, s + t.sys));
        Some(TimingSample {
            real: real / n,
            user: user / n,
            sys: sys / n,
        })
    }
}

/// Metrics grouped by run key, in first-seen order.
#[derive(Debug, Default)]
pub struct Aggregator {
    index: HashMap<String, usize>,
    runs: Vec<(String, MetricsBag)>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bag_mut(&mut self, run_key: &str) -> &mut MetricsBag {
        let slot = match self.index.get(run_key) {
            Some(&slot) => slot,
            None => {
                let slot = self.runs.len();
                self.index.insert(run_key.to_string(), slot);
                self.runs.push((run_key.to_string(), MetricsBag::default()));
                slot
            }
        };
        &mut self.runs[slot].1
    }

    /// Store the peak memory for `run_key`. A second value for the same key
    /// replaces the first.
    pub fn record_peak_mem(&mut self, run_key: &str, bytes: u64) {
        let bag = self.bag_mut(run_key);
        if let Some(previous) = bag.peak_mem.replace(bytes) {
            tracing::warn!(run_key, previous, bytes, "overwriting peak memory sample");
        }
    }

    /// Append one timing sample for `run_key`.
    pub fn record_timing(&mut self, run_key: &str, sample: TimingSample) {
        self.bag_mut(run_key).timings.push(sample);
    }

    /// Number of distinct run keys seen so far.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Run keys and their bags in first-seen order.
    pub fn into_runs(self) -> Vec<(String, MetricsBag)> {
        self.runs
    }
}
