//! Checkpoint descriptor parsing and lookup index
//!
//! A run is configured with an ordered list of checkpoint descriptors of the
//! form `base:sub[:qualifier]`. The first two colon-separated tokens name the
//! trace point; the optional third token narrows when the checkpoint fires
//! (`field=value`) or, for latency extraction, names the field to read.

use std::collections::HashMap;
use thiserror::Error;

/// Descriptor parsing errors, reported at index-build time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointError {
    /// Descriptor does not match the `base:sub[:qualifier]` shape
    #[error("malformed checkpoint descriptor '{0}' (expected base:sub[:qualifier])")]
    Malformed(String),
    /// `field=value` qualifier whose value is not an integer
    #[error("checkpoint '{descriptor}' has non-integer qualifier value '{value}'")]
    BadQualifierValue { descriptor: String, value: String },
}

/// Optional condition attached to a checkpoint descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// Fires on any occurrence of the event
    None,
    /// Fires only when the event's `field` equals `value`; concurrently
    /// outstanding sub-items are keyed by the event's own field value
    FieldEquals { field: String, value: i64 },
    /// Names the payload field to extract (latency variant only)
    Field(String),
}

/// One parsed checkpoint descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointSpec {
    /// The declared descriptor string, verbatim; round records and series
    /// labels are keyed by it
    pub descriptor: String,
    /// Canonical event name (`base:sub`)
    pub event: String,
    /// Parsed qualifier, if any
    pub qualifier: Qualifier,
}

impl CheckpointSpec {
    /// Parse a single `base:sub[:qualifier]` descriptor
    pub fn parse(descriptor: &str) -> Result<Self, CheckpointError> {
        let malformed = || CheckpointError::Malformed(descriptor.to_string());

        let parts: Vec<&str> = descriptor.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(malformed());
        }
        if parts[0].is_empty() || parts[1].is_empty() || parts[0].contains('=') || parts[1].contains('=') {
            return Err(malformed());
        }

        let event = format!("{}:{}", parts[0], parts[1]);
        let qualifier = match parts.get(2) {
            None => Qualifier::None,
            Some(raw) if raw.is_empty() => return Err(malformed()),
            Some(raw) => match raw.split_once('=') {
                None => Qualifier::Field(raw.to_string()),
                Some((field, value)) => {
                    if field.is_empty() || value.is_empty() {
                        return Err(malformed());
                    }
                    let value: i64 =
                        value
                            .parse()
                            .map_err(|_| CheckpointError::BadQualifierValue {
                                descriptor: descriptor.to_string(),
                                value: value.to_string(),
                            })?;
                    Qualifier::FieldEquals {
                        field: field.to_string(),
                        value,
                    }
                }
            },
        };

        Ok(CheckpointSpec {
            descriptor: descriptor.to_string(),
            event,
            qualifier,
        })
    }
}

/// Read-only lookup structure over the declared checkpoint list
///
/// Multiple descriptors may share a canonical event name (e.g. two qualified
/// variants of one trace point); all are retained as siblings under that
/// name. An empty declared list builds an empty index, which disables
/// checkpoint filtering for the variants that support it.
#[derive(Debug, Clone, Default)]
pub struct CheckpointIndex {
    specs: Vec<CheckpointSpec>,
    by_event: HashMap<String, Vec<CheckpointSpec>>,
    first_event: Option<String>,
    last_event: Option<String>,
}

impl CheckpointIndex {
    /// Build the index from the ordered declared descriptor list
    ///
    /// Fails fast on the first malformed descriptor.
    pub fn build<S: AsRef<str>>(declared: &[S]) -> Result<Self, CheckpointError> {
        let mut index = CheckpointIndex::default();
        for descriptor in declared {
            let spec = CheckpointSpec::parse(descriptor.as_ref())?;
            index
                .by_event
                .entry(spec.event.clone())
                .or_default()
                .push(spec.clone());
            index.specs.push(spec);
        }
        index.first_event = index.specs.first().map(|s| s.event.clone());
        index.last_event = index.specs.last().map(|s| s.event.clone());
        Ok(index)
    }

    /// True when no descriptors were declared
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Number of declared descriptors
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// All declared descriptors, in declaration order
    pub fn specs(&self) -> &[CheckpointSpec] {
        &self.specs
    }

    /// Sibling descriptors registered under a canonical event name, in
    /// declaration order
    pub fn siblings(&self, event: &str) -> Option<&[CheckpointSpec]> {
        self.by_event.get(event).map(Vec::as_slice)
    }

    /// True when an event name has at least one registered descriptor
    pub fn contains(&self, event: &str) -> bool {
        self.by_event.contains_key(event)
    }

    /// Canonical name of the first declared checkpoint
    pub fn first_event(&self) -> Option<&str> {
        self.first_event.as_deref()
    }

    /// True when `event` is the canonical name of the last declared
    /// checkpoint, i.e. the round-completion marker
    pub fn is_last(&self, event: &str) -> bool {
        self.last_event.as_deref() == Some(event)
    }

    /// Series labels for every adjacent declared pair, in order
    ///
    /// Labels are fixed at build time as `prev-curr` over the verbatim
    /// descriptor strings; interval samples are only ever recorded under one
    /// of these.
    pub fn interval_labels(&self) -> Vec<String> {
        self.specs
            .windows(2)
            .map(|pair| format!("{}-{}", pair[0].descriptor, pair[1].descriptor))
            .collect()
    }
}
