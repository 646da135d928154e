//! Trace event record and canonical name resolution
//!
//! Events arrive from an external trace source (see `source`). The engine
//! never mutates them; it only reads ids, timestamps, and payload fields.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Process id as reported by the trace source (vpid)
pub type Pid = i32;

/// Thread id as reported by the trace source (pthread id)
pub type ThreadId = u64;

/// Typed payload field value carried by a trace event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer payload (counters, ids, op types)
    Int(i64),
    /// Floating-point payload (precomputed latencies)
    Float(f64),
    /// String payload
    Str(String),
}

impl FieldValue {
    /// Integer view of the value, if it has one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Float(_) | FieldValue::Str(_) => None,
        }
    }

    /// Numeric view of the value (integers widen to f64)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Str(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Str(v) => write!(f, "{}", v),
        }
    }
}

/// Field lookup errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The event carries no field with the requested name
    #[error("event '{event}' has no field '{field}'")]
    Missing { event: String, field: String },
    /// The field exists but is not of the requested type
    #[error("field '{field}' of event '{event}' is not numeric")]
    NotNumeric { event: String, field: String },
}

/// One timestamped trace event
///
/// `name` is the base trace-point name (`provider:point`). `extra_name`
/// optionally refines it into a distinguishable logical event; see
/// [`TraceEvent::canonical_name`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Emitting process id
    pub pid: Pid,
    /// Emitting thread id
    pub thread_id: ThreadId,
    /// Base trace-point name, e.g. "osd:ms_fast_dispatch"
    pub name: String,
    /// Optional qualifying sub-name (operation kind etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_name: Option<String>,
    /// Monotonic timestamp; unit is whatever the source uses, consistent
    /// across the run
    pub timestamp: u64,
    /// Event payload fields by name
    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
}

impl TraceEvent {
    /// Canonical event name used for checkpoint index lookups
    ///
    /// Without a sub-name this is the base name unchanged. With one, the
    /// sub-name has every `::` separator collapsed to a single `_` and is
    /// appended as `base_sub`, so a single trace-point type splits into
    /// distinguishable logical events.
    pub fn canonical_name(&self) -> Cow<'_, str> {
        match &self.extra_name {
            None => Cow::Borrowed(self.name.as_str()),
            Some(extra) => Cow::Owned(format!("{}_{}", self.name, extra.replace("::", "_"))),
        }
    }

    /// Look up a payload field by name
    pub fn field(&self, name: &str) -> Result<&FieldValue, FieldError> {
        self.fields.get(name).ok_or_else(|| FieldError::Missing {
            event: self.name.clone(),
            field: name.to_string(),
        })
    }

    /// Look up an integer payload field
    pub fn field_i64(&self, name: &str) -> Result<i64, FieldError> {
        self.field(name)?
            .as_i64()
            .ok_or_else(|| FieldError::NotNumeric {
                event: self.name.clone(),
                field: name.to_string(),
            })
    }

    /// Look up a numeric payload field, widening integers to f64
    pub fn field_f64(&self, name: &str) -> Result<f64, FieldError> {
        self.field(name)?
            .as_f64()
            .ok_or_else(|| FieldError::NotNumeric {
                event: self.name.clone(),
                field: name.to_string(),
            })
    }
}
