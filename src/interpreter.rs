// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::resolver::AttributeResolver;
use crate::value::Value;

use anyhow::{bail, Result};

/// Evaluates one parsed predicate against one resource's attributes.
///
/// The scope stack holds quantifier loop variables; inner comprehensions
/// shadow outer ones and bindings are dropped when the comprehension ends.
pub struct Interpreter<'a> {
    resolver: AttributeResolver<'a>,
    scope: Vec<(String, Value)>,
}

impl<'a> Interpreter<'a> {
    pub fn new(resolver: AttributeResolver<'a>) -> Self {
        Self {
            resolver,
            scope: vec![],
        }
    }

    /// Evaluate the predicate to its boolean verdict. Every failure mode
    /// (unresolved lookup, invalid pattern, bad cast, non-boolean result)
    /// surfaces as an error for the caller to downgrade.
    pub fn eval_rule(&mut self, expr: &Expr) -> Result<bool> {
        self.eval_bool(expr)
    }

    fn eval_bool(&mut self, expr: &Expr) -> Result<bool> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            v => bail!(expr
                .span()
                .error(&format!("expecting bool, got {}", v.type_name()))),
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::String { value, .. } | Expr::Number { value, .. } | Expr::Bool { value, .. } => {
                Ok(value.clone())
            }

            Expr::Var { span } => {
                let name = span.text();
                match self.scope.iter().rev().find(|(n, _)| n == name) {
                    Some((_, v)) => Ok(v.clone()),
                    None => bail!(span.error(&format!("unbound variable `{name}`"))),
                }
            }

            Expr::Lookup { span, spec } => {
                let spec_val = self.eval(spec)?;
                let key = match &spec_val {
                    Value::String(s) => s.clone(),
                    v => bail!(spec
                        .span()
                        .error(&format!("lookup spec must be a string, got {}", v.type_name()))),
                };
                match self.resolver.lookup(&key) {
                    Ok(resolved) => Ok(resolved.into_value()),
                    Err(e) => bail!(span.error(&e.to_string())),
                }
            }

            Expr::IntCast { arg, .. } => {
                let v = self.eval(arg)?;
                match v.to_int() {
                    Ok(n) => Ok(Value::Int(n)),
                    Err(e) => bail!(arg.span().error(&e.to_string())),
                }
            }

            Expr::NotExpr { expr, .. } => Ok(Value::Bool(!self.eval_bool(expr)?)),

            Expr::LogicExpr { op, lhs, rhs, .. } => {
                let l = self.eval_bool(lhs)?;
                // Short-circuit: the right side of a decided `and`/`or` is
                // never evaluated, so its lookups cannot fail the rule.
                let b = match op {
                    LogicOp::And if !l => false,
                    LogicOp::Or if l => true,
                    _ => self.eval_bool(rhs)?,
                };
                Ok(Value::Bool(b))
            }

            Expr::BoolExpr {
                span, op, lhs, rhs, ..
            } => {
                let lv = self.eval(lhs)?;
                let rv = self.eval(rhs)?;
                self.eval_compare(span, *op, &lv, &rv)
            }

            Expr::Quantifier {
                op,
                term,
                var,
                domain,
                ..
            } => {
                let domain_val = self.eval(domain)?;
                let items = match &domain_val {
                    Value::Array(a) => a.clone(),
                    v => bail!(domain.span().error(&format!(
                        "quantifier domain must be a list, got {}",
                        v.type_name()
                    ))),
                };

                for item in items.iter() {
                    self.scope.push((var.text().to_string(), item.clone()));
                    let result = self.eval_bool(term);
                    self.scope.pop();
                    let holds = result?;
                    match op {
                        QuantOp::All if !holds => return Ok(Value::Bool(false)),
                        QuantOp::Any if holds => return Ok(Value::Bool(true)),
                        _ => (),
                    }
                }

                // all([]) is vacuously true, any([]) is false.
                Ok(Value::Bool(matches!(op, QuantOp::All)))
            }
        }
    }

    fn eval_compare(
        &self,
        span: &crate::lexer::Span,
        op: BoolOp,
        lhs: &Value,
        rhs: &Value,
    ) -> Result<Value> {
        let b = match op {
            // Structural equality: values of different types compare
            // unequal rather than erroring.
            BoolOp::Eq => lhs == rhs,
            BoolOp::Ne => lhs != rhs,
            _ => {
                // Ordered comparisons are numeric only; lookups must be
                // cast with int() first.
                let (Value::Int(l), Value::Int(r)) = (lhs, rhs) else {
                    bail!(span.error(&format!(
                        "numeric comparison requires int operands, got {} and {}; use int()",
                        lhs.type_name(),
                        rhs.type_name()
                    )));
                };
                match op {
                    BoolOp::Lt => l < r,
                    BoolOp::Le => l <= r,
                    BoolOp::Gt => l > r,
                    BoolOp::Ge => l >= r,
                    _ => bail!("internal error: equality handled above"),
                }
            }
        };
        Ok(Value::Bool(b))
    }
}
