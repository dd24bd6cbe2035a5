//! Token cursor and literal grammar shared by the statement parsers.

use serde::{Deserialize, Serialize};

use super::lexer::{Token, TokenKind, tokenize};
use crate::error::ParseError;

/// Coarse type of a literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "complex")]
    Complex,
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "bytes")]
    Bytes,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "NoneType")]
    None,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "tuple")]
    Tuple,
    #[serde(rename = "dict")]
    Dict,
    #[serde(rename = "set")]
    Set,
}

impl LiteralKind {
    /// The type name shown to users.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Complex => "complex",
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::Bool => "bool",
            Self::None => "NoneType",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Set => "set",
        }
    }
}

impl std::fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A literal located in the source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Literal {
    pub kind: LiteralKind,
    pub start: usize,
    pub end: usize,
}

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

pub(crate) fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Cursor over the token stream of one tagged source block.
pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        Ok(Self {
            source,
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    pub fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    pub fn peek_nth(&self, n: usize) -> &Token {
        let index = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    pub fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    pub fn is_punct(&self, punct: &str) -> bool {
        matches!(self.peek().kind, TokenKind::Punct(p) if p == punct)
    }

    pub fn eat_punct(&mut self, punct: &str) -> bool {
        if self.is_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_punct(&mut self, punct: &str, expected: &str) -> Result<Token, ParseError> {
        if self.is_punct(punct) {
            Ok(self.advance())
        } else {
            let found = self.peek().clone();
            Err(self.error_at(&found, format!("expected {expected}, found {}", self.describe(&found))))
        }
    }

    /// Skip statement separators (line breaks and `;`).
    pub fn skip_separators(&mut self) {
        while self.peek().kind == TokenKind::Newline || self.is_punct(";") {
            self.advance();
        }
    }

    fn at_separator(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Newline | TokenKind::Eof) || self.is_punct(";")
    }

    /// Require the current statement to end here.
    pub fn end_statement(&mut self) -> Result<(), ParseError> {
        if self.at_separator() {
            return Ok(());
        }
        let found = self.peek().clone();
        Err(self.error_at(
            &found,
            format!("expected end of statement, found {}", self.describe(&found)),
        ))
    }

    pub fn text(&self, token: &Token) -> &'a str {
        &self.source[token.start..token.end]
    }

    pub fn slice(&self, literal: &Literal) -> &'a str {
        &self.source[literal.start..literal.end]
    }

    pub fn describe(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Newline => "end of line".to_string(),
            _ => format!("`{}`", self.text(token)),
        }
    }

    pub fn error_at(&self, token: &Token, message: impl Into<String>) -> ParseError {
        ParseError::new(token.line, token.column, message)
    }

    /// A literal, or a bare tuple of literals (`1, 2`).
    pub fn literal_or_tuple(&mut self) -> Result<Literal, ParseError> {
        let first = self.literal()?;
        if !self.is_punct(",") {
            return Ok(first);
        }

        let mut end = first.end;
        while self.is_punct(",") {
            end = self.advance().end;
            if self.at_separator() || self.is_punct("=") {
                break;
            }
            end = self.literal()?.end;
        }
        Ok(Literal {
            kind: LiteralKind::Tuple,
            start: first.start,
            end,
        })
    }

    /// A constant value: number, string, boolean, `None`, or a
    /// list/tuple/dict/set built only from constants.
    pub fn literal(&mut self) -> Result<Literal, ParseError> {
        let token = self.peek().clone();
        let scalar = |kind| Literal {
            kind,
            start: token.start,
            end: token.end,
        };

        match &token.kind {
            TokenKind::Int => {
                self.advance();
                Ok(scalar(LiteralKind::Int))
            }
            TokenKind::Float => {
                self.advance();
                Ok(scalar(LiteralKind::Float))
            }
            TokenKind::Complex => {
                self.advance();
                Ok(scalar(LiteralKind::Complex))
            }
            TokenKind::Str | TokenKind::Bytes => self.strings(),
            TokenKind::Name(name) => match name.as_str() {
                "True" | "False" => {
                    self.advance();
                    Ok(scalar(LiteralKind::Bool))
                }
                "None" => {
                    self.advance();
                    Ok(scalar(LiteralKind::None))
                }
                _ => Err(self.error_at(
                    &token,
                    format!("`{name}` is not a literal; only constant values are allowed"),
                )),
            },
            TokenKind::Punct("-" | "+") => self.signed_number(),
            TokenKind::Punct("[") => self.list(),
            TokenKind::Punct("(") => self.parenthesized(),
            TokenKind::Punct("{") => self.braced(),
            _ => Err(self.error_at(
                &token,
                format!("expected a literal value, found {}", self.describe(&token)),
            )),
        }
    }

    /// Adjacent string literals concatenate.
    fn strings(&mut self) -> Result<Literal, ParseError> {
        let first = self.advance();
        let mut end = first.end;
        while matches!(self.peek().kind, TokenKind::Str | TokenKind::Bytes) {
            let next = self.advance();
            if next.kind != first.kind {
                return Err(self.error_at(&next, "cannot mix bytes and str literals"));
            }
            end = next.end;
        }
        let kind = if first.kind == TokenKind::Bytes {
            LiteralKind::Bytes
        } else {
            LiteralKind::Str
        };
        Ok(Literal {
            kind,
            start: first.start,
            end,
        })
    }

    fn signed_number(&mut self) -> Result<Literal, ParseError> {
        let sign = self.advance();
        let number = self.peek().clone();
        let kind = match number.kind {
            TokenKind::Int => LiteralKind::Int,
            TokenKind::Float => LiteralKind::Float,
            TokenKind::Complex => LiteralKind::Complex,
            _ => {
                return Err(self.error_at(
                    &sign,
                    format!("unary `{}` is only allowed before a number", self.text(&sign)),
                ));
            }
        };
        self.advance();
        Ok(Literal {
            kind,
            start: sign.start,
            end: number.end,
        })
    }

    fn list(&mut self) -> Result<Literal, ParseError> {
        let open = self.advance();
        let close = self.items("]")?;
        Ok(Literal {
            kind: LiteralKind::List,
            start: open.start,
            end: close.end,
        })
    }

    /// Comma-separated literals up to `close`, trailing comma allowed.
    fn items(&mut self, close: &'static str) -> Result<Token, ParseError> {
        loop {
            if self.is_punct(close) {
                return Ok(self.advance());
            }
            self.literal()?;
            if self.is_punct(close) {
                return Ok(self.advance());
            }
            self.expect_punct(",", &format!("`,` or `{close}`"))?;
        }
    }

    /// `()` is an empty tuple, `(x)` is just `x`, `(x,)` is a tuple.
    fn parenthesized(&mut self) -> Result<Literal, ParseError> {
        let open = self.advance();
        if self.is_punct(")") {
            let close = self.advance();
            return Ok(Literal {
                kind: LiteralKind::Tuple,
                start: open.start,
                end: close.end,
            });
        }

        let inner = self.literal()?;
        if self.is_punct(")") {
            let close = self.advance();
            return Ok(Literal {
                kind: inner.kind,
                start: open.start,
                end: close.end,
            });
        }

        self.expect_punct(",", "`,` or `)`")?;
        let close = self.items(")")?;
        Ok(Literal {
            kind: LiteralKind::Tuple,
            start: open.start,
            end: close.end,
        })
    }

    /// `{}` and `{k: v, ...}` are dicts, `{x, ...}` is a set.
    fn braced(&mut self) -> Result<Literal, ParseError> {
        let open = self.advance();
        if self.is_punct("}") {
            let close = self.advance();
            return Ok(Literal {
                kind: LiteralKind::Dict,
                start: open.start,
                end: close.end,
            });
        }

        self.literal()?;
        if !self.eat_punct(":") {
            if !self.is_punct("}") {
                self.expect_punct(",", "`,` or `}`")?;
            }
            let close = self.items("}")?;
            return Ok(Literal {
                kind: LiteralKind::Set,
                start: open.start,
                end: close.end,
            });
        }

        self.literal()?;
        let close = loop {
            if self.is_punct("}") {
                break self.advance();
            }
            self.expect_punct(",", "`,` or `}`")?;
            if self.is_punct("}") {
                break self.advance();
            }
            self.literal()?;
            self.expect_punct(":", "`:`")?;
            self.literal()?;
        };
        Ok(Literal {
            kind: LiteralKind::Dict,
            start: open.start,
            end: close.end,
        })
    }
}
