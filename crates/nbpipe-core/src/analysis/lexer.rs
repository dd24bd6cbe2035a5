//! Tokenizer for tagged-cell source.
//!
//! Recognizes the lexical structure of notebook statements (names, numbers,
//! strings, punctuation, logical line breaks) well enough for the restricted
//! grammars in this module. Newlines inside brackets and after a `\` are
//! continuations and produce no token.

use crate::error::ParseError;

/// Punctuation, longest first so that matching is greedy.
const PUNCTUATION: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "==", "!=", "<=", ">=", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "@=", "**", "//", "<<", ">>", "->", ":=", "(", ")", "[", "]", "{", "}", ",", ":",
    ";", "=", ".", "+", "-", "*", "/", "%", "&", "|", "^", "~", "<", ">", "@", "!",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Name(String),
    Int,
    Float,
    Complex,
    Str,
    Bytes,
    Punct(&'static str),
    Newline,
    Eof,
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

/// Tokenize `source`. The result always ends with `Newline`, `Eof`.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
    /// Open brackets with their position, innermost last.
    brackets: Vec<(char, usize, usize)>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            line_start: 0,
            brackets: Vec::new(),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        while let Some(c) = self.peek() {
            if !matches!(c, '\n' | ' ' | '\t' | '\r' | '\x0c' | '#' | '\\') {
                self.check_indent()?;
            }
            match c {
                '\n' => {
                    let mark = self.mark();
                    self.bump();
                    if self.brackets.is_empty() {
                        self.push_newline(mark);
                    }
                }
                ' ' | '\t' | '\r' | '\x0c' => {
                    self.bump();
                }
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                '\\' => self.continuation()?,
                '"' | '\'' => {
                    let mark = self.mark();
                    self.string(mark, "")?;
                }
                c if c.is_ascii_digit() => self.number()?,
                '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => self.number()?,
                c if is_ident_start(c) => self.name_or_prefixed_string()?,
                _ => self.punctuation()?,
            }
        }

        if let Some((open, line, column)) = self.brackets.last() {
            return Err(ParseError::new(*line, *column, format!("`{open}` was never closed")));
        }

        let mark = self.mark();
        self.push_newline(mark);
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            start: self.pos,
            end: self.pos,
            line: mark.1,
            column: mark.2,
        });
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    /// Current (offset, line, column).
    fn mark(&self) -> (usize, usize, usize) {
        let column = self.source[self.line_start..self.pos].chars().count() + 1;
        (self.pos, self.line, column)
    }

    fn push(&mut self, kind: TokenKind, (start, line, column): (usize, usize, usize)) {
        self.tokens.push(Token {
            kind,
            start,
            end: self.pos,
            line,
            column,
        });
    }

    /// Blank lines and leading newlines collapse into nothing.
    fn push_newline(&mut self, mark: (usize, usize, usize)) {
        let redundant = self
            .tokens
            .last()
            .is_none_or(|t| t.kind == TokenKind::Newline);
        if !redundant {
            self.push(TokenKind::Newline, mark);
        }
    }

    /// Statements are top level, so a logical line may not start indented.
    fn check_indent(&self) -> Result<(), ParseError> {
        let starts_line = self.brackets.is_empty()
            && self
                .tokens
                .last()
                .is_none_or(|t| t.kind == TokenKind::Newline);
        let (_, line, column) = self.mark();
        if starts_line && column > 1 {
            return Err(ParseError::new(line, column, "unexpected indent"));
        }
        Ok(())
    }

    fn continuation(&mut self) -> Result<(), ParseError> {
        let (_, line, column) = self.mark();
        self.bump();
        if self.peek() == Some('\r') {
            self.bump();
        }
        match self.peek() {
            Some('\n') => {
                self.bump();
                Ok(())
            }
            None => Ok(()),
            Some(_) => Err(ParseError::new(
                line,
                column,
                "unexpected character after line continuation",
            )),
        }
    }

    fn name_or_prefixed_string(&mut self) -> Result<(), ParseError> {
        let mark = self.mark();
        while self.peek().is_some_and(is_ident_continue) {
            self.bump();
        }
        let source = self.source;
        let ident = &source[mark.0..self.pos];

        if matches!(self.peek(), Some('"' | '\'')) && is_string_prefix(ident) {
            return self.string(mark, ident);
        }

        let name = ident.to_string();
        self.push(TokenKind::Name(name), mark);
        Ok(())
    }

    fn string(&mut self, mark: (usize, usize, usize), prefix: &str) -> Result<(), ParseError> {
        let (_, line, column) = mark;
        let prefix = prefix.to_ascii_lowercase();
        if prefix.contains('f') {
            return Err(ParseError::new(
                line,
                column,
                "f-strings are not supported in tagged cells",
            ));
        }
        let kind = if prefix.contains('b') {
            TokenKind::Bytes
        } else {
            TokenKind::Str
        };

        let Some(quote) = self.bump() else {
            return Err(ParseError::new(line, column, "unterminated string literal"));
        };
        let triple = self.peek() == Some(quote) && self.peek_nth(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::new(line, column, "unterminated string literal"));
                }
                Some('\\') => {
                    // An escaped character never terminates the literal, even in raw strings.
                    self.bump();
                    self.bump();
                }
                Some('\n') if !triple => {
                    return Err(ParseError::new(line, column, "unterminated string literal"));
                }
                Some(c) if c == quote => {
                    if !triple {
                        self.bump();
                        break;
                    }
                    if self.peek_nth(1) == Some(quote) && self.peek_nth(2) == Some(quote) {
                        self.bump();
                        self.bump();
                        self.bump();
                        break;
                    }
                    self.bump();
                }
                Some(_) => {
                    self.bump();
                }
            }
        }

        self.push(kind, mark);
        Ok(())
    }

    fn number(&mut self) -> Result<(), ParseError> {
        let mark = self.mark();
        let (start, line, column) = mark;
        let invalid = |text: &str| {
            ParseError::new(line, column, format!("invalid number literal `{text}`"))
        };

        let radix = match (self.peek(), self.peek_nth(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        if let Some(radix) = radix {
            self.bump();
            self.bump();
            while self.peek().is_some_and(is_ident_continue) {
                self.bump();
            }
            let text = &self.source[start..self.pos];
            let digits: String = text[2..].chars().filter(|&c| c != '_').collect();
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return Err(invalid(text));
            }
            self.push(TokenKind::Int, mark);
            return Ok(());
        }

        let mut is_float = false;
        self.digits();
        if self.peek() == Some('.') {
            is_float = true;
            self.bump();
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.bump();
                if signed {
                    self.bump();
                }
                self.digits();
            }
        }
        let complex = matches!(self.peek(), Some('j' | 'J'));
        if complex {
            self.bump();
        }

        if self.peek().is_some_and(is_ident_continue) {
            while self.peek().is_some_and(is_ident_continue) {
                self.bump();
            }
            return Err(invalid(&self.source[start..self.pos]));
        }

        let text = &self.source[start..self.pos];
        if text.contains("__") || text.ends_with('_') {
            return Err(invalid(text));
        }

        let kind = if complex {
            TokenKind::Complex
        } else if is_float {
            TokenKind::Float
        } else {
            TokenKind::Int
        };
        self.push(kind, mark);
        Ok(())
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            self.bump();
        }
    }

    fn punctuation(&mut self) -> Result<(), ParseError> {
        let mark = self.mark();
        let (_, line, column) = mark;
        let rest = &self.source[self.pos..];

        let Some(punct) = PUNCTUATION.iter().copied().find(|p| rest.starts_with(p)) else {
            let c = self.peek().unwrap_or_default();
            return Err(ParseError::new(line, column, format!("unexpected character `{c}`")));
        };
        for _ in 0..punct.len() {
            self.bump();
        }

        match punct {
            "(" | "[" | "{" => {
                let open = punct.chars().next().unwrap_or_default();
                self.brackets.push((open, line, column));
            }
            ")" | "]" | "}" => {
                let expected = match punct {
                    ")" => '(',
                    "]" => '[',
                    _ => '{',
                };
                match self.brackets.pop() {
                    Some((open, _, _)) if open == expected => {}
                    _ => {
                        return Err(ParseError::new(line, column, format!("unmatched `{punct}`")));
                    }
                }
            }
            _ => {}
        }

        self.push(TokenKind::Punct(punct), mark);
        Ok(())
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_string_prefix(ident: &str) -> bool {
    matches!(
        ident.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "f" | "br" | "rb" | "fr" | "rf"
    )
}
