pub mod lexer;

pub use crate::query::parser::core::{Position, Token, TokenKind};
pub use lexer::Lexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    UnterminatedComment,
    InvalidNumber,
    UnexpectedCharacter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub message: String,
    pub position: Position,
}

impl LexError {
    pub fn new(kind: LexErrorKind, message: String, position: Position) -> Self {
        LexError {
            kind,
            message,
            position,
        }
    }

    pub fn unterminated_string(position: Position) -> Self {
        LexError::new(
            LexErrorKind::UnterminatedString,
            "Unterminated string literal".to_string(),
            position,
        )
    }

    pub fn unterminated_comment(position: Position) -> Self {
        LexError::new(
            LexErrorKind::UnterminatedComment,
            "Unterminated multi-line comment".to_string(),
            position,
        )
    }

    pub fn invalid_number(message: String, position: Position) -> Self {
        LexError::new(
            LexErrorKind::InvalidNumber,
            format!("Invalid number: {}", message),
            position,
        )
    }

    pub fn unexpected_character(ch: char, position: Position) -> Self {
        LexError::new(
            LexErrorKind::UnexpectedCharacter,
            format!("Unexpected character: '{}'", ch),
            position,
        )
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Lex error at line {}, column {}: {}",
            self.position.line, self.position.column, self.message
        )
    }
}

impl std::error::Error for LexError {}
