//! Per-request round records
//!
//! A round is one cycle of checkpoint observations for a single correlated
//! identity, from the first declared checkpoint to the last. Records are
//! keyed provisionally by thread id until the cross-thread request identity
//! is known, then migrated.

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::checkpoint::{CheckpointSpec, Qualifier};
use crate::event::{ThreadId, TraceEvent};

/// Key under which an in-flight round is stored
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoundKey {
    /// Provisional key: the true request identity is not yet known
    Thread(ThreadId),
    /// Resolved cross-thread request identity
    Request(String),
}

/// Timestamp(s) captured for one declared descriptor within a round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointHit {
    /// Unqualified checkpoint: a single timestamp, last occurrence wins
    At(u64),
    /// Qualified checkpoint: timestamps keyed by the event's own value of
    /// the qualifier field, so concurrently outstanding sub-items sharing
    /// the checkpoint name stay apart
    PerItem(HashMap<i64, u64>),
}

/// Checkpoint timestamps collected so far for one in-flight identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundRecord {
    hits: HashMap<String, CheckpointHit>,
}

impl RoundRecord {
    /// Timestamp entry for a declared descriptor, if observed this round
    pub fn get(&self, descriptor: &str) -> Option<&CheckpointHit> {
        self.hits.get(descriptor)
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Per-process store of in-flight rounds
#[derive(Debug, Default)]
pub struct RoundStore {
    rounds: HashMap<RoundKey, RoundRecord>,
}

impl RoundStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-key a round started under a provisional thread id
    ///
    /// If a record exists under `Thread(thread_id)` and the resolved key
    /// differs, every entry moves into the (possibly existing) resolved
    /// record and the provisional one is deleted. On collision the migrated
    /// entry overwrites the resident one: last-writer-wins, kept as explicit
    /// policy.
    pub fn adopt(&mut self, thread_id: ThreadId, key: &RoundKey) {
        if matches!(key, RoundKey::Thread(_)) {
            return;
        }
        let Some(provisional) = self.rounds.remove(&RoundKey::Thread(thread_id)) else {
            return;
        };
        debug!(
            thread_id,
            ?key,
            checkpoints = provisional.hits.len(),
            "migrating provisional round to resolved identity"
        );
        let target = self.rounds.entry(key.clone()).or_default();
        for (descriptor, hit) in provisional.hits {
            target.hits.insert(descriptor, hit);
        }
    }

    /// Record an event against every sibling descriptor of its canonical name
    ///
    /// Unqualified descriptors store the timestamp directly (last occurrence
    /// wins). `field=value` descriptors store it only when the event's field
    /// matches, keyed by the field value. A missing or non-integer field is
    /// a recoverable skip local to that descriptor. Bare-field descriptors
    /// belong to the latency variant and are ignored here.
    pub fn record(&mut self, key: &RoundKey, event: &TraceEvent, siblings: &[CheckpointSpec]) {
        let record = self.rounds.entry(key.clone()).or_default();
        for spec in siblings {
            match &spec.qualifier {
                Qualifier::None => {
                    record
                        .hits
                        .insert(spec.descriptor.clone(), CheckpointHit::At(event.timestamp));
                }
                Qualifier::FieldEquals { field, value } => {
                    let observed = match event.field_i64(field) {
                        Ok(v) => v,
                        Err(err) => {
                            trace!(descriptor = %spec.descriptor, %err, "skipping qualified checkpoint");
                            continue;
                        }
                    };
                    if observed != *value {
                        continue;
                    }
                    let entry = record
                        .hits
                        .entry(spec.descriptor.clone())
                        .or_insert_with(|| CheckpointHit::PerItem(HashMap::new()));
                    if let CheckpointHit::PerItem(items) = entry {
                        items.insert(observed, event.timestamp);
                    }
                }
                Qualifier::Field(_) => {}
            }
        }
    }

    /// Remove and return a round record for finalization
    pub fn take(&mut self, key: &RoundKey) -> Option<RoundRecord> {
        self.rounds.remove(key)
    }

    /// Number of in-flight rounds
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}
