// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::value::Value;

use core::fmt;

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

/// One resource's flattened attributes, dotted keys mapped to scalar values.
/// Insertion order is the order of the source plan and is preserved so that
/// pattern lookups return values deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeMap(IndexMap<String, Value>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the resource carries the reserved `destroy` flag. Rules
    /// are skipped for such resources.
    pub fn is_destroy(&self) -> bool {
        matches!(self.0.get("destroy"), Some(Value::Bool(true)))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for AttributeMap {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Derive the resource type from a qualified resource identifier: the text
/// before the first `.`, or the identifier itself when there is no dot.
pub fn resource_type(resource_id: &str) -> &str {
    match resource_id.split_once('.') {
        Some((head, _)) => head,
        None => resource_id,
    }
}

/// A converted plan: resource identifiers mapped to attribute maps, in plan
/// order, plus the plan-level `destroy` flag which is not a resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePlan {
    destroy: bool,
    resources: IndexMap<String, AttributeMap>,
}

impl ResourcePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destroy(&self) -> bool {
        self.destroy
    }

    pub fn get(&self, resource_id: &str) -> Option<&AttributeMap> {
        self.resources.get(resource_id)
    }

    pub fn insert(&mut self, resource_id: impl Into<String>, attrs: AttributeMap) {
        self.resources.insert(resource_id.into(), attrs);
    }

    pub fn resources(&self) -> impl Iterator<Item = (&String, &AttributeMap)> {
        self.resources.iter()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn from_json_str(json: &str) -> Result<ResourcePlan> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &String) -> Result<ResourcePlan> {
        match std::fs::read_to_string(path) {
            Ok(c) => Self::from_json_str(c.as_str()),
            Err(e) => bail!("Failed to read {path}. {e}"),
        }
    }
}

// The plan root mixes resource objects with one reserved boolean entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlanEntry {
    Flag(bool),
    Resource(AttributeMap),
}

struct ResourcePlanVisitor;

impl<'de> Visitor<'de> for ResourcePlanVisitor {
    type Value = ResourcePlan;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of resource identifiers to attribute maps")
    }

    fn visit_map<V>(self, mut visitor: V) -> Result<Self::Value, V::Error>
    where
        V: MapAccess<'de>,
    {
        let mut plan = ResourcePlan::new();
        while let Some(key) = visitor.next_key::<String>()? {
            match (key.as_str(), visitor.next_value::<PlanEntry>()?) {
                ("destroy", PlanEntry::Flag(b)) => plan.destroy = b,
                (_, PlanEntry::Resource(attrs)) => {
                    plan.resources.insert(key, attrs);
                }
                (_, PlanEntry::Flag(_)) => {
                    return Err(de::Error::custom(format!(
                        "plan entry `{key}` must be an attribute map"
                    )));
                }
            }
        }
        Ok(plan)
    }
}

impl<'de> Deserialize<'de> for ResourcePlan {
    fn deserialize<D>(deserializer: D) -> Result<ResourcePlan, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ResourcePlanVisitor)
    }
}

impl Serialize for ResourcePlan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let extra = usize::from(self.destroy);
        let mut map = serializer.serialize_map(Some(self.resources.len() + extra))?;
        if self.destroy {
            map.serialize_entry("destroy", &true)?;
        }
        for (id, attrs) in &self.resources {
            map.serialize_entry(id, attrs)?;
        }
        map.end()
    }
}
