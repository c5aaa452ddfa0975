// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A single policy rule: a human-readable name and a predicate in the
/// constrained expression language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub expr: String,
}

/// The rules that apply to one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRuleGroup {
    pub resource: String,
    pub rules: Vec<Rule>,
}

/// An ordered set of rule groups, loaded once per validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet(Vec<ResourceRuleGroup>);

impl RuleSet {
    pub fn new(groups: Vec<ResourceRuleGroup>) -> Self {
        Self(groups)
    }

    pub fn groups(&self) -> &[ResourceRuleGroup] {
        &self.0
    }

    /// Groups applicable to the given resource type, in rule-set order.
    pub fn matching<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = &'a ResourceRuleGroup> {
        self.0.iter().filter(move |g| g.resource == resource_type)
    }

    pub fn from_json_str(json: &str) -> Result<RuleSet> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &String) -> Result<RuleSet> {
        match std::fs::read_to_string(path) {
            Ok(c) => Self::from_json_str(c.as_str()),
            Err(e) => bail!("Failed to read {path}. {e}"),
        }
    }
}
