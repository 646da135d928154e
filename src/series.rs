//! Per-process sample series and summary statistics

use std::collections::HashMap;

/// Extended statistics for one series (SIMD-accelerated via Trueno)
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub mean: f32,
    pub stddev: f32,
    pub min: f32,
    pub max: f32,
    pub median: f32, // P50
    pub p75: f32,
    pub p90: f32,
    pub p95: f32,
    pub p99: f32,
}

/// Append-only named sample series for one process
///
/// Labels may be pre-registered so that only declared interval pairs ever
/// accumulate samples; iteration follows registration/first-insert order,
/// which is the declaration order for pre-registered labels.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: HashMap<String, Vec<f64>>,
    order: Vec<String>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given labels pre-registered, in order
    pub fn with_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut store = Self::new();
        for label in labels {
            store.register(label.as_ref());
        }
        store
    }

    /// Register a label with an empty series; keeps existing samples
    pub fn register(&mut self, label: &str) {
        if !self.series.contains_key(label) {
            self.series.insert(label.to_string(), Vec::new());
            self.order.push(label.to_string());
        }
    }

    /// Append a sample, creating the series on first use
    pub fn append(&mut self, label: &str, sample: f64) {
        self.register(label);
        if let Some(samples) = self.series.get_mut(label) {
            samples.push(sample);
        }
    }

    /// Append a sample only if the label was pre-registered
    ///
    /// Returns whether the sample was kept. Intervals spanning undeclared
    /// checkpoint pairs are dropped here.
    pub fn append_if_registered(&mut self, label: &str, sample: f64) -> bool {
        match self.series.get_mut(label) {
            Some(samples) => {
                samples.push(sample);
                true
            }
            None => false,
        }
    }

    /// Samples recorded under a label
    pub fn get(&self, label: &str) -> Option<&[f64]> {
        self.series.get(label).map(Vec::as_slice)
    }

    /// Labels in registration/first-insert order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of labels (including empty pre-registered ones)
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Mean of a label's samples via Trueno; 0 for empty series
    pub fn mean(&self, label: &str) -> f64 {
        self.get(label).map_or(0.0, mean)
    }

    /// Mean ignoring zero samples; 0 when every sample is zero
    pub fn mean_nonzero(&self, label: &str) -> f64 {
        self.get(label).map_or(0.0, mean_nonzero)
    }

    /// Extended statistics for a label's samples
    pub fn summary(&self, label: &str) -> Option<SeriesSummary> {
        let samples = self.get(label)?;
        if samples.is_empty() {
            return None;
        }

        let values: Vec<f32> = samples.iter().map(|&s| s as f32).collect();
        let v = trueno::Vector::from_slice(&values);

        let mean = v.mean().unwrap_or(0.0);
        let stddev = v.stddev().unwrap_or(0.0);
        let min = v.min().unwrap_or(0.0);
        let max = v.max().unwrap_or(0.0);

        // Percentiles need sorted data (Trueno has no built-in percentile)
        let mut sorted = values;
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Some(SeriesSummary {
            mean,
            stddev,
            min,
            max,
            median: percentile(&sorted, 50.0),
            p75: percentile(&sorted, 75.0),
            p90: percentile(&sorted, 90.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
        })
    }
}

/// Mean over all samples; 0 for an empty slice
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let values: Vec<f32> = samples.iter().map(|&s| s as f32).collect();
    let sum = trueno::Vector::from_slice(&values).sum().unwrap_or(0.0);
    f64::from(sum) / samples.len() as f64
}

/// Mean skipping zero samples; 0 when nothing remains
pub fn mean_nonzero(samples: &[f64]) -> f64 {
    let nonzero: Vec<f64> = samples.iter().copied().filter(|&s| s != 0.0).collect();
    mean(&nonzero)
}

/// Linear-interpolation percentile over sorted data
fn percentile(sorted: &[f32], pct: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let index = (pct / 100.0) * (sorted.len() - 1) as f32;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f32;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}
