// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::lexer::Span;
use crate::value::Value;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BoolOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QuantOp {
    All,
    Any,
}

/// Node of a parsed rule predicate.
#[derive(Debug)]
pub enum Expr {
    String {
        span: Span,
        value: Value,
    },

    Number {
        span: Span,
        value: Value,
    },

    Bool {
        span: Span,
        value: Value,
    },

    /// A quantifier loop variable.
    Var {
        span: Span,
    },

    /// `R[spec]` attribute lookup.
    Lookup {
        span: Span,
        spec: Box<Expr>,
    },

    /// `int(arg)` numeric cast.
    IntCast {
        span: Span,
        arg: Box<Expr>,
    },

    NotExpr {
        span: Span,
        expr: Box<Expr>,
    },

    BoolExpr {
        span: Span,
        op: BoolOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    LogicExpr {
        span: Span,
        op: LogicOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `all([term for var in domain])` / `any([term for var in domain])`.
    Quantifier {
        span: Span,
        op: QuantOp,
        term: Box<Expr>,
        var: Span,
        domain: Box<Expr>,
    },
}

impl Expr {
    pub const fn span(&self) -> &Span {
        match *self {
            Self::String { ref span, .. }
            | Self::Number { ref span, .. }
            | Self::Bool { ref span, .. }
            | Self::Var { ref span, .. }
            | Self::Lookup { ref span, .. }
            | Self::IntCast { ref span, .. }
            | Self::NotExpr { ref span, .. }
            | Self::BoolExpr { ref span, .. }
            | Self::LogicExpr { ref span, .. }
            | Self::Quantifier { ref span, .. } => span,
        }
    }
}
