//! Calculator variants over the checkpoint machinery
//!
//! Three interchangeable single-pass strategies share the checkpoint index
//! and correlation plumbing:
//! - [`CheckpointIntervalCalculator`]: correlates rounds across threads and
//!   emits elapsed time between adjacent declared checkpoints
//! - [`LatencyCalculator`]: extracts precomputed duration/count fields
//!   directly, no round tracking
//! - [`ThreadIntervalCalculator`]: cadence between successive occurrences of
//!   the same event on the same thread
//!
//! Each instance owns all of its state, so independent trace channels can
//! run one engine each without cross-talk.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

use crate::checkpoint::{CheckpointIndex, Qualifier};
use crate::correlate::RequestCorrelator;
use crate::event::{Pid, ThreadId, TraceEvent};
use crate::round::{CheckpointHit, RoundKey, RoundRecord, RoundStore};
use crate::series::SeriesStore;

/// Per-process computed series, keyed by process id
pub type ProcessTable = BTreeMap<Pid, SeriesStore>;

/// A single-pass trace-event consumer producing per-process series
///
/// Events must be fed in true chronological order for correlated pairs;
/// ordering is a precondition, not validated here.
pub trait Calculator {
    /// Consume one event, updating per-process state
    fn observe(&mut self, event: &TraceEvent);

    /// Per-process series accumulated so far
    fn processes(&self) -> &ProcessTable;
}

/// Ordered multi-checkpoint interval computation (the full round protocol)
#[derive(Debug)]
pub struct CheckpointIntervalCalculator {
    index: CheckpointIndex,
    interval_labels: Vec<String>,
    correlator: RequestCorrelator,
    rounds: HashMap<Pid, RoundStore>,
    procs: ProcessTable,
}

impl CheckpointIntervalCalculator {
    /// Create an engine for the declared checkpoint list
    pub fn new(index: CheckpointIndex) -> Self {
        let interval_labels = index.interval_labels();
        Self {
            index,
            interval_labels,
            correlator: RequestCorrelator::new(),
            rounds: HashMap::new(),
            procs: ProcessTable::new(),
        }
    }

    /// Live identity hints (diagnostic; drops to zero as rounds complete)
    pub fn hint_count(&self) -> usize {
        self.correlator.len()
    }

    /// In-flight rounds for a process (diagnostic)
    pub fn inflight_rounds(&self, pid: Pid) -> usize {
        self.rounds.get(&pid).map_or(0, RoundStore::len)
    }

    /// Walk a completed round in declared order and emit interval samples
    ///
    /// The first present descriptor seeds the walk without emitting. Each
    /// later present descriptor contributes `time - lastSeenTime` under the
    /// `prev-curr` label, kept only when that label names an adjacent
    /// declared pair; spans across missing checkpoints are dropped, not
    /// zero-filled. Qualified entries resolve the timestamp stored under the
    /// descriptor's own declared value.
    fn finalize_round(index: &CheckpointIndex, series: &mut SeriesStore, record: RoundRecord) {
        let mut last: Option<(&str, u64)> = None;
        for spec in index.specs() {
            let Some(hit) = record.get(&spec.descriptor) else {
                continue;
            };
            let time = match hit {
                CheckpointHit::At(ts) => *ts,
                CheckpointHit::PerItem(items) => {
                    let Qualifier::FieldEquals { value, .. } = &spec.qualifier else {
                        continue;
                    };
                    match items.get(value) {
                        Some(ts) => *ts,
                        None => continue,
                    }
                }
            };
            if let Some((prev_label, prev_time)) = last {
                let label = format!("{}-{}", prev_label, spec.descriptor);
                let kept =
                    series.append_if_registered(&label, time.saturating_sub(prev_time) as f64);
                if !kept {
                    trace!(label, "interval spans a missing checkpoint, dropped");
                }
            }
            last = Some((spec.descriptor.as_str(), time));
        }
    }
}

impl Calculator for CheckpointIntervalCalculator {
    fn observe(&mut self, event: &TraceEvent) {
        let series = self
            .procs
            .entry(event.pid)
            .or_insert_with(|| SeriesStore::with_labels(&self.interval_labels));

        let name = event.canonical_name();
        let Some(siblings) = self.index.siblings(&name) else {
            return;
        };

        let rounds = self.rounds.entry(event.pid).or_default();
        let key = match self.correlator.resolve(event) {
            Some(identity) => {
                let key = RoundKey::Request(identity);
                rounds.adopt(event.thread_id, &key);
                key
            }
            None => RoundKey::Thread(event.thread_id),
        };
        rounds.record(&key, event, siblings);

        if self.index.is_last(&name) {
            if let RoundKey::Request(identity) = &key {
                self.correlator.forget(identity);
            }
            if let Some(record) = rounds.take(&key) {
                debug!(pid = event.pid, ?key, checkpoints = record.len(), "round complete");
                Self::finalize_round(&self.index, series, record);
            }
        }
    }

    fn processes(&self) -> &ProcessTable {
        &self.procs
    }
}

/// Direct field-latency extraction, one series per declared descriptor
#[derive(Debug)]
pub struct LatencyCalculator {
    index: CheckpointIndex,
    labels: Vec<String>,
    procs: ProcessTable,
}

impl LatencyCalculator {
    pub fn new(index: CheckpointIndex) -> Self {
        let labels = index
            .specs()
            .iter()
            .map(|s| s.descriptor.clone())
            .collect();
        Self {
            index,
            labels,
            procs: ProcessTable::new(),
        }
    }
}

impl Calculator for LatencyCalculator {
    fn observe(&mut self, event: &TraceEvent) {
        let series = self
            .procs
            .entry(event.pid)
            .or_insert_with(|| SeriesStore::with_labels(&self.labels));

        let name = event.canonical_name();
        let Some(siblings) = self.index.siblings(&name) else {
            return;
        };

        for spec in siblings {
            // Only bare-field descriptors name something to extract
            let Qualifier::Field(field) = &spec.qualifier else {
                continue;
            };
            match event.field_f64(field) {
                Ok(value) => series.append(&spec.descriptor, value),
                Err(err) => {
                    trace!(descriptor = %spec.descriptor, %err, "skipping latency sample");
                }
            }
        }
    }

    fn processes(&self) -> &ProcessTable {
        &self.procs
    }
}

/// Cadence between successive occurrences of an event on one thread
///
/// Needs no checkpoint correlation and runs for the life of the stream; an
/// empty declared list means every event is measured.
#[derive(Debug)]
pub struct ThreadIntervalCalculator {
    index: CheckpointIndex,
    last_seen: HashMap<Pid, HashMap<String, u64>>,
    procs: ProcessTable,
}

impl ThreadIntervalCalculator {
    pub fn new(index: CheckpointIndex) -> Self {
        Self {
            index,
            last_seen: HashMap::new(),
            procs: ProcessTable::new(),
        }
    }

    fn series_key(name: &str, thread_id: ThreadId) -> String {
        format!("{}-{}", name, thread_id)
    }
}

impl Calculator for ThreadIntervalCalculator {
    fn observe(&mut self, event: &TraceEvent) {
        let series = self.procs.entry(event.pid).or_default();

        let name = event.canonical_name();
        if !self.index.is_empty() && !self.index.contains(&name) {
            return;
        }

        let key = Self::series_key(&name, event.thread_id);
        match self.last_seen.entry(event.pid).or_default().entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(event.timestamp);
            }
            Entry::Occupied(mut slot) => {
                let previous = *slot.get();
                series.append(slot.key(), event.timestamp.saturating_sub(previous) as f64);
                slot.insert(event.timestamp);
            }
        }
    }

    fn processes(&self) -> &ProcessTable {
        &self.procs
    }
}
