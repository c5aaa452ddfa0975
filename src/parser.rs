// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::ast::*;
use crate::lexer::*;
use crate::value::Value;

use core::str::FromStr;

use anyhow::{bail, Result};

const KEYWORDS: [&str; 12] = [
    "R", "all", "and", "any", "false", "False", "for", "in", "int", "not", "or", "true",
];

#[derive(Clone)]
pub struct Parser<'source> {
    source: Source,
    lexer: Lexer<'source>,
    tok: Token,
    end: u32,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source Source) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let tok = lexer.next_token()?;
        Ok(Self {
            source: source.clone(),
            lexer,
            tok,
            end: 0,
        })
    }

    pub fn token_text(&self) -> &str {
        match self.tok.0 {
            TokenKind::Symbol | TokenKind::Number | TokenKind::Ident | TokenKind::Eof => {
                self.tok.1.text()
            }
            TokenKind::String => "",
        }
    }

    fn next_token(&mut self) -> Result<()> {
        self.end = self.tok.1.end;
        self.tok = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, text: &str, context: &str) -> Result<()> {
        if self.token_text() == text {
            self.next_token()
        } else {
            let msg = format!("expecting `{text}` {context}");
            Err(self.source.error(self.tok.1.line, self.tok.1.col, &msg))
        }
    }

    fn is_keyword(ident: &str) -> bool {
        KEYWORDS.contains(&ident)
    }

    fn parse_var(&mut self) -> Result<Span> {
        let span = self.tok.1.clone();
        match self.tok.0 {
            TokenKind::Ident if Self::is_keyword(span.text()) => Err(self.source.error(
                self.tok.1.line,
                self.tok.1.col,
                &format!("unexpected keyword `{}`", span.text()),
            )),
            TokenKind::Ident => {
                self.next_token()?;
                Ok(span)
            }
            _ => Err(self
                .source
                .error(self.tok.1.line, self.tok.1.col, "expecting identifier")),
        }
    }

    // Span covering `from` up to the previously consumed token.
    fn span_to_here(&self, from: &Span) -> Span {
        Span {
            source: from.source.clone(),
            line: from.line,
            col: from.col,
            start: from.start,
            end: self.end,
        }
    }

    fn unescape(raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                // The lexer has already rejected unknown escapes.
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => (),
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    /// Parse the predicate and require that the whole input was consumed.
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        if self.tok.0 != TokenKind::Eof {
            bail!(self.tok.1.error("unexpected input after expression"));
        }
        Ok(expr)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and_expr()?;
        while self.tok.0 == TokenKind::Ident && self.token_text() == "or" {
            self.next_token()?;
            let rhs = self.parse_and_expr()?;
            let span = self.span_to_here(lhs.span());
            lhs = Expr::LogicExpr {
                span,
                op: LogicOp::Or,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_and_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_not_expr()?;
        while self.tok.0 == TokenKind::Ident && self.token_text() == "and" {
            self.next_token()?;
            let rhs = self.parse_not_expr()?;
            let span = self.span_to_here(lhs.span());
            lhs = Expr::LogicExpr {
                span,
                op: LogicOp::And,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_not_expr(&mut self) -> Result<Expr> {
        if self.tok.0 == TokenKind::Ident && self.token_text() == "not" {
            let not_span = self.tok.1.clone();
            self.next_token()?;
            let expr = self.parse_not_expr()?;
            let span = self.span_to_here(&not_span);
            return Ok(Expr::NotExpr {
                span,
                expr: Box::new(expr),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let lhs = self.parse_operand()?;
        let op = match self.token_text() {
            "==" => BoolOp::Eq,
            "!=" => BoolOp::Ne,
            "<" => BoolOp::Lt,
            "<=" => BoolOp::Le,
            ">" => BoolOp::Gt,
            ">=" => BoolOp::Ge,
            "=" => {
                bail!(self.tok.1.error("expecting `==`, found `=`"));
            }
            _ => return Ok(lhs),
        };
        self.next_token()?;
        let rhs = self.parse_operand()?;
        let span = self.span_to_here(lhs.span());
        Ok(Expr::BoolExpr {
            span,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_operand(&mut self) -> Result<Expr> {
        let span = self.tok.1.clone();
        match &self.tok.0 {
            TokenKind::Number => {
                let value = match i64::from_str(span.text()) {
                    Ok(n) => Value::Int(n),
                    Err(_) => bail!(span.error("could not parse number")),
                };
                self.next_token()?;
                Ok(Expr::Number { span, value })
            }
            TokenKind::String => {
                let value = Value::from(Self::unescape(span.text()));
                self.next_token()?;
                Ok(Expr::String { span, value })
            }
            TokenKind::Symbol if span.text() == "(" => {
                self.next_token()?;
                let expr = self.parse_expr()?;
                self.expect(")", "to close grouping")?;
                Ok(expr)
            }
            TokenKind::Ident => match span.text() {
                "true" | "True" => {
                    self.next_token()?;
                    Ok(Expr::Bool {
                        span,
                        value: Value::Bool(true),
                    })
                }
                "false" | "False" => {
                    self.next_token()?;
                    Ok(Expr::Bool {
                        span,
                        value: Value::Bool(false),
                    })
                }
                "R" => self.parse_lookup(),
                "int" => self.parse_int_cast(),
                "all" | "any" => self.parse_quantifier(),
                ident if Self::is_keyword(ident) => {
                    bail!(span.error(&format!("unexpected keyword `{ident}`")))
                }
                _ => {
                    self.next_token()?;
                    Ok(Expr::Var { span })
                }
            },
            _ => bail!(span.error("expecting expression")),
        }
    }

    fn parse_lookup(&mut self) -> Result<Expr> {
        let r_span = self.tok.1.clone();
        self.next_token()?;
        self.expect("[", "after `R`")?;
        let spec = self.parse_expr()?;
        self.expect("]", "to close lookup")?;
        let span = self.span_to_here(&r_span);
        Ok(Expr::Lookup {
            span,
            spec: Box::new(spec),
        })
    }

    fn parse_int_cast(&mut self) -> Result<Expr> {
        let int_span = self.tok.1.clone();
        self.next_token()?;
        self.expect("(", "after `int`")?;
        let arg = self.parse_expr()?;
        self.expect(")", "to close cast")?;
        let span = self.span_to_here(&int_span);
        Ok(Expr::IntCast {
            span,
            arg: Box::new(arg),
        })
    }

    // all([term for var in domain]) and the `any` counterpart. The
    // comprehension brackets are part of the fixed syntax so that
    // existing rule files keep parsing.
    fn parse_quantifier(&mut self) -> Result<Expr> {
        let quant_span = self.tok.1.clone();
        let op = match quant_span.text() {
            "all" => QuantOp::All,
            _ => QuantOp::Any,
        };
        self.next_token()?;
        self.expect("(", "after quantifier")?;
        self.expect("[", "to open comprehension")?;
        let term = self.parse_expr()?;
        self.expect("for", "in comprehension")?;
        let var = self.parse_var()?;
        self.expect("in", "in comprehension")?;
        let domain = self.parse_expr()?;
        self.expect("]", "to close comprehension")?;
        self.expect(")", "to close quantifier")?;
        let span = self.span_to_here(&quant_span);
        Ok(Expr::Quantifier {
            span,
            op,
            term: Box::new(term),
            var,
            domain: Box::new(domain),
        })
    }
}
