// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod ast;
mod engine;
mod interpreter;
mod lexer;
mod parser;
mod plan;
mod resolver;
mod rules;
mod value;

pub use engine::{Engine, Violation};
pub use interpreter::Interpreter;
pub use plan::{resource_type, AttributeMap, ResourcePlan};
pub use resolver::{AttributeResolver, ResolveError, Resolved};
pub use rules::{ResourceRuleGroup, Rule, RuleSet};
pub use value::Value;

/// Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::ast::*;
    pub use crate::lexer::*;
    pub use crate::parser::*;
}
