// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::interpreter::Interpreter;
use crate::lexer::Source;
use crate::parser::Parser;
use crate::plan::{resource_type, AttributeMap, ResourcePlan};
use crate::resolver::AttributeResolver;
use crate::rules::{Rule, RuleSet};

use core::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One failed rule check: the resource it failed on and the rule's name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Violation {
    pub resource_id: String,
    pub rule_name: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.resource_id, self.rule_name)
    }
}

/// The plan validation engine.
///
/// Holds an immutable rule set and runs every applicable rule against every
/// resource of a plan, collecting violations. Rules never abort the run: an
/// unevaluable predicate is reported as a violation (fail-closed) and the
/// cause is logged, so the caller always gets a complete report.
#[derive(Debug, Clone)]
pub struct Engine {
    rules: RuleSet,
}

impl Engine {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Validate a plan. The returned sequence is ordered by plan order,
    /// then rule-set order; an empty sequence is the sole success signal.
    pub fn validate(&self, plan: &ResourcePlan) -> Vec<Violation> {
        let mut violations = vec![];
        for (resource_id, attrs) in plan.resources() {
            // Resources being destroyed are exempt from every rule.
            if attrs.is_destroy() {
                continue;
            }
            let rtype = resource_type(resource_id);
            for group in self.rules.matching(rtype) {
                for rule in &group.rules {
                    match Self::check_rule(rule, attrs) {
                        Ok(true) => (),
                        Ok(false) => violations.push(Violation {
                            resource_id: resource_id.clone(),
                            rule_name: rule.name.clone(),
                        }),
                        Err(cause) => {
                            warn!(
                                resource = %resource_id,
                                rule = %rule.name,
                                %cause,
                                "rule evaluation failed; reporting as violation"
                            );
                            violations.push(Violation {
                                resource_id: resource_id.clone(),
                                rule_name: rule.name.clone(),
                            });
                        }
                    }
                }
            }
        }
        violations
    }

    // Parse and evaluate one predicate against one resource. Kept fallible
    // so validate() can decide what a failure means.
    fn check_rule(rule: &Rule, attrs: &AttributeMap) -> Result<bool> {
        let source = Source::from_contents(format!("<{}>", rule.name), rule.expr.clone())?;
        let expr = Parser::new(&source)?.parse()?;
        let resolver = AttributeResolver::new(attrs);
        Interpreter::new(resolver).eval_rule(&expr)
    }
}
