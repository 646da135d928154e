//! Cross-thread request identity correlation
//!
//! Early trace points for a request often carry only thread-local context;
//! the stable cross-thread identity surfaces later, on an event that carries
//! the request-number and transaction-id fields. The correlator bridges the
//! gap: a round starts provisionally keyed by thread id and is re-keyed once
//! the real identity is seen on that thread.

use std::collections::HashMap;

use crate::event::{ThreadId, TraceEvent};

/// Payload field carrying the request number
pub const REQUEST_NUM_FIELD: &str = "num";

/// Payload field carrying the transaction id
pub const TRANSACTION_ID_FIELD: &str = "tid";

/// Thread-id to request-identity hint table
///
/// All state is instance-owned; independent engines never share hints.
#[derive(Debug, Default)]
pub struct RequestCorrelator {
    hints: HashMap<ThreadId, String>,
}

impl RequestCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the stable request identity for an event
    ///
    /// If the event carries both identity fields, their composition becomes
    /// the identity and the hint for the event's thread is overwritten.
    /// Otherwise the last hint recorded for the thread is returned; `None`
    /// means the round must stay keyed by thread id for now.
    pub fn resolve(&mut self, event: &TraceEvent) -> Option<String> {
        match (
            event.fields.get(REQUEST_NUM_FIELD),
            event.fields.get(TRANSACTION_ID_FIELD),
        ) {
            (Some(num), Some(tid)) => {
                let identity = format!("{}{}", num, tid);
                self.hints.insert(event.thread_id, identity.clone());
                Some(identity)
            }
            _ => self.hints.get(&event.thread_id).cloned(),
        }
    }

    /// Purge every hint pointing at a completed identity
    ///
    /// A request can fan out to multiple threads; all of their hints must go
    /// together or a later round would inherit a stale hand-off.
    pub fn forget(&mut self, identity: &str) {
        self.hints.retain(|_, hint| hint != identity);
    }

    /// Number of live hints
    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}
