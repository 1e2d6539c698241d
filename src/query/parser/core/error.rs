//! 解析错误
//!
//! 词法与语法阶段共用的错误类型，携带出错位置、意外的 token、期望的 token 列表以及提示。

use std::error::Error;
use std::fmt;

use super::token::Position;
use crate::query::parser::lexer::{LexError, LexErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    SyntaxError,
    UnexpectedToken,
    UnterminatedString,
    UnterminatedComment,
    InvalidNumber,
    UnexpectedEndOfInput,
    InvalidCharacter,
    RecursionLimitExceeded,
    UnsupportedFeature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub position: Position,
    pub unexpected_token: Option<String>,
    pub expected_tokens: Vec<String>,
    pub hints: Vec<String>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: String, position: Position) -> Self {
        ParseError {
            kind,
            message,
            position,
            unexpected_token: None,
            expected_tokens: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn syntax_error<T: fmt::Display>(msg: T, position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::SyntaxError,
            format!("Syntax error: {}", msg),
            position,
        )
    }

    pub fn unexpected_token<T: fmt::Display>(token: T, position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedToken,
            format!("Unexpected token: {}", token),
            position,
        )
        .with_unexpected_token(token)
    }

    pub fn unexpected_end_of_input(position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedEndOfInput,
            "Unexpected end of input".to_string(),
            position,
        )
    }

    pub fn unsupported_feature<T: fmt::Display>(feature: T, position: Position) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnsupportedFeature,
            format!("Unsupported feature: {}", feature),
            position,
        )
    }

    pub fn with_unexpected_token<T: fmt::Display>(mut self, token: T) -> Self {
        self.unexpected_token = Some(token.to_string());
        self
    }

    pub fn with_expected_tokens(mut self, tokens: Vec<String>) -> Self {
        self.expected_tokens = tokens;
        self
    }

    pub fn with_hint(mut self, hint: String) -> Self {
        self.hints.push(hint);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.position.line, self.position.column, self.message
        )?;

        if !self.expected_tokens.is_empty() {
            write!(f, "\n  Expected one of: {}", self.expected_tokens.join(", "))?;
        }

        if !self.hints.is_empty() {
            write!(f, "\n  Hint(s):")?;
            for hint in &self.hints {
                write!(f, "\n    - {}", hint)?;
            }
        }

        Ok(())
    }
}

impl Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(lex_error: LexError) -> Self {
        let kind = match lex_error.kind {
            LexErrorKind::UnterminatedString => ParseErrorKind::UnterminatedString,
            LexErrorKind::UnterminatedComment => ParseErrorKind::UnterminatedComment,
            LexErrorKind::InvalidNumber => ParseErrorKind::InvalidNumber,
            LexErrorKind::UnexpectedCharacter => ParseErrorKind::InvalidCharacter,
        };
        ParseError::new(kind, lex_error.message, lex_error.position)
    }
}
