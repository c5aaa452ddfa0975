// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt::{self, Debug, Formatter};
use core::iter::Peekable;
use core::str::CharIndices;
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};

#[derive(Clone)]
struct SourceInternal {
    pub file: String,
    pub contents: String,
    pub lines: Vec<(u32, u32)>,
}

/// A rule predicate held together with its per-line offsets so that
/// syntax and evaluation errors can point into the text.
#[derive(Clone)]
pub struct Source {
    src: Rc<SourceInternal>,
}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        self.src.file.fmt(f)
    }
}

impl Source {
    pub fn from_contents(file: String, contents: String) -> Result<Source> {
        let max_size = u32::MAX as usize - 2; // Account for rows, cols possibly starting at 1, EOF etc.
        if contents.len() > max_size {
            bail!("{file} exceeds maximum allowed predicate size {max_size}");
        }
        let mut lines = vec![];
        let mut prev_ch = ' ';
        let mut prev_pos = 0u32;
        let mut start = 0u32;
        for (i, ch) in contents.char_indices() {
            if ch == '\n' {
                let end = match prev_ch {
                    '\r' => prev_pos,
                    _ => i as u32,
                };
                lines.push((start, end));
                start = i as u32 + 1;
            }
            prev_ch = ch;
            prev_pos = i as u32;
        }

        if (start as usize) < contents.len() {
            lines.push((start, contents.len() as u32));
        } else if contents.is_empty() {
            lines.push((0, 0));
        } else {
            let s = (contents.len() - 1) as u32;
            lines.push((s, s));
        }
        Ok(Self {
            src: Rc::new(SourceInternal {
                file,
                contents,
                lines,
            }),
        })
    }

    pub fn file(&self) -> &String {
        &self.src.file
    }

    pub fn contents(&self) -> &String {
        &self.src.contents
    }

    pub fn line(&self, idx: u32) -> &str {
        let idx = idx as usize;
        if idx < self.src.lines.len() {
            let (start, end) = self.src.lines[idx];
            &self.src.contents[start as usize..end as usize]
        } else {
            ""
        }
    }

    pub fn message(&self, line: u32, col: u32, kind: &str, msg: &str) -> String {
        if line as usize > self.src.lines.len() {
            return format!("{}: invalid line {} specified", self.src.file, line);
        }

        let line_str = format!("{line}");
        let line_num_width = line_str.len() + 1;
        let col_spaces = col as usize - 1;

        format!(
            "\n--> {}:{}:{}\n{:<line_num_width$}|\n\
	     {:<line_num_width$}| {}\n\
	     {:<line_num_width$}| {:<col_spaces$}^\n\
	     {}: {}",
            self.src.file,
            line,
            col,
            "",
            line,
            self.line(line - 1),
            "",
            "",
            kind,
            msg
        )
    }

    pub fn error(&self, line: u32, col: u32, msg: &str) -> anyhow::Error {
        anyhow!(self.message(line, col, "error", msg))
    }
}

#[derive(Clone)]
pub struct Span {
    pub source: Source,
    pub line: u32,
    pub col: u32,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn text(&self) -> &str {
        &self.source.contents()[self.start as usize..self.end as usize]
    }

    pub fn message(&self, kind: &str, msg: &str) -> String {
        self.source.message(self.line, self.col, kind, msg)
    }

    pub fn error(&self, msg: &str) -> anyhow::Error {
        self.source.error(self.line, self.col, msg)
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let t = self.text().escape_debug().to_string();
        let max = 32;
        let (txt, trailer) = if t.len() > max {
            (&t[0..max], "...")
        } else {
            (t.as_str(), "")
        };

        f.write_fmt(format_args!(
            "{}:{}:{}:{}, \"{}{}\"",
            self.line, self.col, self.start, self.end, txt, trailer
        ))
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Symbol,
    String,
    Number,
    Ident,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token(pub TokenKind, pub Span);

#[derive(Clone)]
pub struct Lexer<'source> {
    source: Source,
    iter: Peekable<CharIndices<'source>>,
    line: u32,
    col: u32,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source Source) -> Self {
        Self {
            source: source.clone(),
            iter: source.contents().char_indices().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn peek(&mut self) -> (usize, char) {
        match self.iter.peek() {
            Some((index, chr)) => (*index, *chr),
            _ => (self.source.contents().len(), '\x00'),
        }
    }

    fn peekahead(&mut self, n: usize) -> (usize, char) {
        match self.iter.clone().nth(n) {
            Some((index, chr)) => (index, chr),
            _ => (self.source.contents().len(), '\x00'),
        }
    }

    fn read_ident(&mut self) -> Result<Token> {
        let start = self.peek().0;
        let col = self.col;
        loop {
            let ch = self.peek().1;
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.iter.next();
            } else {
                break;
            }
        }
        let end = self.peek().0;
        self.col += (end - start) as u32;
        Ok(Token(
            TokenKind::Ident,
            Span {
                source: self.source.clone(),
                line: self.line,
                col,
                start: start as u32,
                end: end as u32,
            },
        ))
    }

    // Only integer literals are part of the grammar; fractions and
    // exponents are rejected up front.
    fn read_number(&mut self) -> Result<Token> {
        let (start, chr) = self.peek();
        let col = self.col;
        self.iter.next();
        if chr == '-' && !self.peek().1.is_ascii_digit() {
            return Err(self.source.error(self.line, col, "expecting digit after `-`"));
        }
        while self.peek().1.is_ascii_digit() {
            self.iter.next();
        }

        let end = self.peek().0;
        self.col += (end - start) as u32;

        // A valid integer cannot be followed by these characters.
        let ch = self.peek().1;
        if ch == '_' || ch == '.' || ch.is_ascii_alphanumeric() {
            return Err(self.source.error(self.line, self.col, "invalid number"));
        }

        Ok(Token(
            TokenKind::Number,
            Span {
                source: self.source.clone(),
                line: self.line,
                col,
                start: start as u32,
                end: end as u32,
            },
        ))
    }

    // Both quote styles are accepted; existing rule files carry
    // Python-style single-quoted strings.
    fn read_string(&mut self, quote: char) -> Result<Token> {
        let (line, col) = (self.line, self.col);
        self.iter.next();
        self.col += 1;
        let (start, _) = self.peek();
        loop {
            let (offset, ch) = self.peek();
            match ch {
                '\x00' => {
                    return Err(self.source.error(line, col, "unmatched quote"));
                }
                '\n' => {
                    return Err(self
                        .source
                        .error(line, col, "string literal must not span lines"));
                }
                '\\' => {
                    self.iter.next();
                    let (_, esc) = self.peek();
                    self.iter.next();
                    match esc {
                        '\\' | '\'' | '"' | 'n' | 't' => (),
                        _ => {
                            let col = self.col + (offset - start) as u32 + 1;
                            return Err(self.source.error(line, col, "invalid escape sequence"));
                        }
                    }
                }
                _ if ch == quote => break,
                _ => {
                    self.iter.next();
                }
            }
        }

        self.iter.next();
        let end = self.peek().0;
        self.col += (end - start) as u32;

        Ok(Token(
            TokenKind::String,
            Span {
                source: self.source.clone(),
                line,
                col: col + 1,
                start: start as u32,
                end: end as u32 - 1,
            },
        ))
    }

    fn skip_ws(&mut self) {
        loop {
            match self.peek().1 {
                ' ' => self.col += 1,
                '\t' => self.col += 4,
                '\r' => (),
                '\n' => {
                    self.col = 1;
                    self.line += 1;
                }
                _ => break,
            }
            self.iter.next();
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_ws();

        let (start, chr) = self.peek();
        let col = self.col;

        match chr {
            '-' if self.peekahead(1).1.is_ascii_digit() => self.read_number(),
            // grouping and separators
            '(' | ')' | '[' | ']' | ',' => {
                self.col += 1;
                self.iter.next();
                Ok(Token(
                    TokenKind::Symbol,
                    Span {
                        source: self.source.clone(),
                        line: self.line,
                        col,
                        start: start as u32,
                        end: start as u32 + 1,
                    },
                ))
            }
            // < <= > >= = ==
            '<' | '>' | '=' => {
                self.col += 1;
                self.iter.next();
                if self.peek().1 == '=' {
                    self.col += 1;
                    self.iter.next();
                };
                Ok(Token(
                    TokenKind::Symbol,
                    Span {
                        source: self.source.clone(),
                        line: self.line,
                        col,
                        start: start as u32,
                        end: self.peek().0 as u32,
                    },
                ))
            }
            '!' if self.peekahead(1).1 == '=' => {
                self.col += 2;
                self.iter.next();
                self.iter.next();
                Ok(Token(
                    TokenKind::Symbol,
                    Span {
                        source: self.source.clone(),
                        line: self.line,
                        col,
                        start: start as u32,
                        end: self.peek().0 as u32,
                    },
                ))
            }
            '\'' | '"' => self.read_string(chr),
            '\x00' => Ok(Token(
                TokenKind::Eof,
                Span {
                    source: self.source.clone(),
                    line: self.line,
                    col,
                    start: start as u32,
                    end: start as u32,
                },
            )),
            _ if chr.is_ascii_digit() => self.read_number(),
            _ if chr.is_ascii_alphabetic() || chr == '_' => self.read_ident(),
            _ => Err(self.source.error(self.line, self.col, "invalid character")),
        }
    }
}
