// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::plan::AttributeMap;
use crate::value::Value;

use regex::Regex;
use thiserror::Error;

/// Error type for attribute lookup operations.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No key matched the spec, neither exactly nor as a pattern.
    #[error("no attribute key matches `{0}`, exact or pattern")]
    NotFound(String),
    /// The spec is not a valid regular expression.
    #[error("invalid lookup pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Outcome of a lookup. Whether the result is a single value or a list is
/// decided by which branch matched, never by result cardinality: a pattern
/// that matched exactly one key still yields `Multiple` with one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Single(Value),
    Multiple(Vec<Value>),
}

impl Resolved {
    pub fn into_value(self) -> Value {
        match self {
            Resolved::Single(v) => v,
            Resolved::Multiple(vs) => Value::from(vs),
        }
    }
}

/// Read-only view over one resource's flattened attribute map, addressable
/// by exact key or by regular-expression pattern.
#[derive(Clone, Copy)]
pub struct AttributeResolver<'a> {
    attrs: &'a AttributeMap,
}

impl<'a> AttributeResolver<'a> {
    pub fn new(attrs: &'a AttributeMap) -> Self {
        Self { attrs }
    }

    /// Resolve a key spec. An exact key always short-circuits to a single
    /// value, even when the spec would also match as a pattern. Otherwise
    /// the spec is compiled as a regex and matched against each key from
    /// the start of the key (not full-string), collecting values in map
    /// order with multiplicity preserved.
    pub fn lookup(&self, spec: &str) -> Result<Resolved, ResolveError> {
        if let Some(value) = self.attrs.get(spec) {
            return Ok(Resolved::Single(value.clone()));
        }

        let pattern = Regex::new(spec).map_err(|source| ResolveError::InvalidPattern {
            pattern: spec.to_string(),
            source,
        })?;

        let matched: Vec<Value> = self
            .attrs
            .iter()
            .filter(|(key, _)| matches_from_start(&pattern, key))
            .map(|(_, value)| value.clone())
            .collect();

        if matched.is_empty() {
            Err(ResolveError::NotFound(spec.to_string()))
        } else {
            Ok(Resolved::Multiple(matched))
        }
    }
}

// Python re.match semantics: the match must begin at offset 0, but need not
// cover the whole key. Rule sets rely on this for both anchored and
// unanchored patterns.
fn matches_from_start(pattern: &Regex, key: &str) -> bool {
    pattern.find(key).is_some_and(|m| m.start() == 0)
}
