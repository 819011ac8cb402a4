use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::ast::CompareOp;
use super::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    Bool(bool),
    Compare(CompareOp),
    And,
    Or,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier '{name}'"),
            TokenKind::Number(value) => write!(f, "number {value}"),
            TokenKind::Str(value) => write!(f, "string \"{value}\""),
            TokenKind::Bool(value) => write!(f, "{value}"),
            TokenKind::Compare(op) => write!(f, "'{}'", op.symbol()),
            TokenKind::And => write!(f, "'&&'"),
            TokenKind::Or => write!(f, "'||'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Eof => write!(f, "end of expression"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character of the token.
    pub offset: usize,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        input,
        chars: input.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn next_token(&mut self) -> Result<Token, ParseError> {
        while let Some((_, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }

        let Some((offset, ch)) = self.chars.next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset: self.input.len(),
            });
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '&' => self.pair(offset, '&', TokenKind::And)?,
            '|' => self.pair(offset, '|', TokenKind::Or)?,
            '=' => self.pair(offset, '=', TokenKind::Compare(CompareOp::Eq))?,
            '!' => self.pair(offset, '=', TokenKind::Compare(CompareOp::Ne))?,
            '>' => {
                if self.eat('=') {
                    TokenKind::Compare(CompareOp::Ge)
                } else {
                    TokenKind::Compare(CompareOp::Gt)
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::Compare(CompareOp::Le)
                } else {
                    TokenKind::Compare(CompareOp::Lt)
                }
            }
            '"' | '\'' => self.string(offset, ch)?,
            '-' if matches!(self.chars.peek(), Some((_, next)) if next.is_ascii_digit()) => {
                self.number(offset)?
            }
            ch if ch.is_ascii_digit() => self.number(offset)?,
            ch if ch.is_ascii_alphabetic() || ch == '_' => self.word(offset),
            other => {
                return Err(ParseError::new(
                    offset,
                    format!("unexpected character '{other}'"),
                ))
            }
        };

        Ok(Token { kind, offset })
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some((_, ch)) if *ch == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn pair(
        &mut self,
        offset: usize,
        second: char,
        kind: TokenKind,
    ) -> Result<TokenKind, ParseError> {
        if self.eat(second) {
            Ok(kind)
        } else {
            let first = &self.input[offset..offset + 1];
            Err(ParseError::new(
                offset,
                format!("expected '{first}{second}'"),
            ))
        }
    }

    fn end_of(&mut self, predicate: impl Fn(char) -> bool) -> usize {
        while let Some((_, ch)) = self.chars.peek() {
            if predicate(*ch) {
                self.chars.next();
            } else {
                break;
            }
        }
        self.chars
            .peek()
            .map(|(index, _)| *index)
            .unwrap_or(self.input.len())
    }

    fn number(&mut self, offset: usize) -> Result<TokenKind, ParseError> {
        let end = self.end_of(|ch| ch.is_ascii_digit() || ch == '.');
        let raw = &self.input[offset..end];
        raw.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::new(offset, format!("invalid number literal '{raw}'")))
    }

    fn word(&mut self, offset: usize) -> TokenKind {
        let end = self.end_of(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.');
        match &self.input[offset..end] {
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            name => TokenKind::Ident(name.to_string()),
        }
    }

    fn string(&mut self, offset: usize, quote: char) -> Result<TokenKind, ParseError> {
        let mut value = String::new();
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                '\\' => match self.chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                ch if ch == quote => return Ok(TokenKind::Str(value)),
                ch => value.push(ch),
            }
        }
        Err(ParseError::new(offset, "unterminated string literal"))
    }
}
