//! Lexer implementation for the query parser
//!
//! This module implements a lexical analyzer that converts input query strings into tokens.

use crate::query::parser::core::{Position, Token, TokenKind as Tk};
use crate::query::parser::lexer::LexError;

#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            chars: input.char_indices().collect(),
            index: 0,
            line: 1,
            column: 1,
        }
    }

    /// 将整个输入切分为 token 序列，末尾总是 `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == Tk::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn byte_offset(&self) -> usize {
        self.chars
            .get(self.index)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.input.len())
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.index).map(|(_, ch)| *ch)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.get(self.index + n).map(|(_, ch)| *ch)
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match (self.peek_char(), self.peek_nth(1)) {
                (Some(ch), _) if ch.is_whitespace() => {
                    self.read_char();
                }
                (Some('-'), Some('-')) => {
                    while let Some(ch) = self.peek_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.read_char();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.current_position();
                    self.read_char();
                    self.read_char();
                    loop {
                        match (self.peek_char(), self.peek_nth(1)) {
                            (Some('*'), Some('/')) => {
                                self.read_char();
                                self.read_char();
                                break;
                            }
                            (Some(_), _) => {
                                self.read_char();
                            }
                            (None, _) => return Err(LexError::unterminated_comment(start)),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.read_char();
            } else {
                break;
            }
        }
        ident
    }

    fn read_number(&mut self, start: Position) -> Result<Tk, LexError> {
        let mut text = String::new();
        let mut is_float = false;

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.read_char();
            } else if ch == '.' && !is_float && self.peek_nth(1).map_or(false, |c| c.is_ascii_digit()) {
                is_float = true;
                text.push(ch);
                self.read_char();
            } else if (ch == 'e' || ch == 'E')
                && self
                    .peek_nth(1)
                    .map_or(false, |c| c.is_ascii_digit() || c == '+' || c == '-')
            {
                is_float = true;
                text.push(ch);
                self.read_char();
                if let Some(sign) = self.peek_char().filter(|c| *c == '+' || *c == '-') {
                    text.push(sign);
                    self.read_char();
                }
            } else {
                break;
            }
        }

        if is_float {
            text.parse::<f64>()
                .map(Tk::FloatLiteral)
                .map_err(|_| LexError::invalid_number(text, start))
        } else {
            text.parse::<i64>()
                .map(Tk::IntegerLiteral)
                .map_err(|_| LexError::invalid_number(text, start))
        }
    }

    /// 读取被 `quote` 包围的文本，重复的引号表示转义
    fn read_quoted(&mut self, quote: char, start: Position) -> Result<String, LexError> {
        self.read_char();
        let mut result = String::new();
        loop {
            match self.read_char() {
                Some(ch) if ch == quote => {
                    if self.peek_char() == Some(quote) {
                        self.read_char();
                        result.push(quote);
                    } else {
                        return Ok(result);
                    }
                }
                Some(ch) => result.push(ch),
                None => return Err(LexError::unterminated_string(start)),
            }
        }
    }

    fn lookup_keyword(identifier: &str) -> Tk {
        match identifier.to_uppercase().as_str() {
            "SELECT" => Tk::Select,
            "FROM" => Tk::From,
            "WHERE" => Tk::Where,
            "GROUP" => Tk::Group,
            "BY" => Tk::By,
            "HAVING" => Tk::Having,
            "ORDER" => Tk::Order,
            "ASC" => Tk::Asc,
            "DESC" => Tk::Desc,
            "LIMIT" => Tk::Limit,
            "OFFSET" => Tk::Offset,
            "DISTINCT" => Tk::Distinct,
            "ALL" => Tk::All,
            "AS" => Tk::As,
            "WITH" => Tk::With,
            "NOT" => Tk::Not,
            "AND" => Tk::And,
            "OR" => Tk::Or,
            "IS" => Tk::Is,
            "NULL" => Tk::Null,
            "TRUE" => Tk::True,
            "FALSE" => Tk::False,
            "IN" => Tk::In,
            "LIKE" => Tk::Like,
            "BETWEEN" => Tk::Between,
            "CASE" => Tk::Case,
            "WHEN" => Tk::When,
            "THEN" => Tk::Then,
            "ELSE" => Tk::Else,
            "END" => Tk::End,
            "CAST" => Tk::Cast,
            "EXISTS" => Tk::Exists,
            "UNION" => Tk::Union,
            "EXCEPT" => Tk::Except,
            "INTERSECT" => Tk::Intersect,
            "JOIN" => Tk::Join,
            "INNER" => Tk::Inner,
            "LEFT" => Tk::Left,
            "RIGHT" => Tk::Right,
            "FULL" => Tk::Full,
            "OUTER" => Tk::Outer,
            "CROSS" => Tk::Cross,
            "ON" => Tk::On,
            "USING" => Tk::Using,
            "VALUES" => Tk::Values,
            "GRAPH_TABLE" => Tk::GraphTable,
            "MATCH" => Tk::Match,
            "CREATE" => Tk::Create,
            "TABLE" => Tk::Table,
            "VIEW" => Tk::View,
            "DROP" => Tk::Drop,
            "IF" => Tk::If,
            "EXPLAIN" => Tk::Explain,
            "COPY" => Tk::Copy,
            "TO" => Tk::To,
            "INSERT" => Tk::Insert,
            "INTO" => Tk::Into,
            "PRAGMA" => Tk::Pragma,
            "BEGIN" => Tk::Begin,
            "COMMIT" => Tk::Commit,
            "ROLLBACK" => Tk::Rollback,
            "DESCRIBE" => Tk::Describe,
            "SUMMARIZE" => Tk::Summarize,
            "SHOW" => Tk::Show,
            "PIVOT" => Tk::Pivot,
            "FOR" => Tk::For,
            _ => Tk::Identifier(identifier.to_string()),
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let start = self.current_position();
        let offset = self.byte_offset();

        let ch = match self.peek_char() {
            Some(ch) => ch,
            None => return Ok(Token::new(Tk::Eof, String::new(), offset, start.line, start.column)),
        };

        let kind = if ch.is_alphabetic() || ch == '_' {
            let ident = self.read_identifier();
            Self::lookup_keyword(&ident)
        } else if ch.is_ascii_digit() {
            self.read_number(start)?
        } else if ch == '.' && self.peek_nth(1).map_or(false, |c| c.is_ascii_digit()) {
            self.read_number(start)?
        } else if ch == '\'' {
            Tk::StringLiteral(self.read_quoted('\'', start)?)
        } else if ch == '"' {
            Tk::QuotedIdentifier(self.read_quoted('"', start)?)
        } else {
            self.read_operator(ch, start)?
        };

        let end = self.byte_offset();
        let lexeme = self.input.get(offset..end).unwrap_or("").to_string();
        Ok(Token::new(kind, lexeme, offset, start.line, start.column))
    }

    fn read_operator(&mut self, ch: char, start: Position) -> Result<Tk, LexError> {
        let next = self.peek_nth(1);
        let (kind, width) = match (ch, next) {
            ('<', Some('-')) => (Tk::LeftArrow, 2),
            ('<', Some('=')) => (Tk::Le, 2),
            ('<', Some('>')) => (Tk::Ne, 2),
            ('<', _) => (Tk::Lt, 1),
            ('>', Some('=')) => (Tk::Ge, 2),
            ('>', _) => (Tk::Gt, 1),
            ('-', Some('>')) => (Tk::Arrow, 2),
            ('-', _) => (Tk::Minus, 1),
            ('!', Some('=')) => (Tk::Ne, 2),
            ('=', Some('=')) => (Tk::Eq, 2),
            ('=', _) => (Tk::Eq, 1),
            ('|', Some('|')) => (Tk::Concat, 2),
            (':', Some(':')) => (Tk::DoubleColon, 2),
            (':', _) => (Tk::Colon, 1),
            ('+', _) => (Tk::Plus, 1),
            ('*', _) => (Tk::Star, 1),
            ('/', _) => (Tk::Slash, 1),
            ('%', _) => (Tk::Percent, 1),
            ('(', _) => (Tk::LParen, 1),
            (')', _) => (Tk::RParen, 1),
            ('[', _) => (Tk::LBracket, 1),
            (']', _) => (Tk::RBracket, 1),
            ('{', _) => (Tk::LBrace, 1),
            ('}', _) => (Tk::RBrace, 1),
            (',', _) => (Tk::Comma, 1),
            ('.', _) => (Tk::Dot, 1),
            (';', _) => (Tk::Semicolon, 1),
            _ => return Err(LexError::unexpected_character(ch, start)),
        };
        for _ in 0..width {
            self.read_char();
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Tk> {
        Lexer::new(input)
            .tokenize()
            .expect("词法分析应该成功")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("select From gRaPh_TaBlE"),
            vec![Tk::Select, Tk::From, Tk::GraphTable, Tk::Eof]
        );
    }

    #[test]
    fn test_edge_arrows() {
        assert_eq!(
            kinds("(a)-[e]->(b)<-[f]-(c)"),
            vec![
                Tk::LParen,
                Tk::Identifier("a".to_string()),
                Tk::RParen,
                Tk::Minus,
                Tk::LBracket,
                Tk::Identifier("e".to_string()),
                Tk::RBracket,
                Tk::Arrow,
                Tk::LParen,
                Tk::Identifier("b".to_string()),
                Tk::RParen,
                Tk::LeftArrow,
                Tk::LBracket,
                Tk::Identifier("f".to_string()),
                Tk::RBracket,
                Tk::Minus,
                Tk::LParen,
                Tk::Identifier("c".to_string()),
                Tk::RParen,
                Tk::Eof,
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            kinds("42 3.5 'it''s' \"Col\""),
            vec![
                Tk::IntegerLiteral(42),
                Tk::FloatLiteral(3.5),
                Tk::StringLiteral("it's".to_string()),
                Tk::QuotedIdentifier("Col".to_string()),
                Tk::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("-- leading\nSELECT /* inline */ 1"),
            vec![Tk::Select, Tk::IntegerLiteral(1), Tk::Eof]
        );
    }

    #[test]
    fn test_token_offsets_and_positions() {
        let tokens = Lexer::new("SELECT\n  x").tokenize().expect("词法分析应该成功");
        assert_eq!(tokens[1].offset, 9);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].column, 3);
        assert_eq!(tokens[1].lexeme, "x");
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("SELECT 'abc").tokenize().unwrap_err();
        assert_eq!(err.kind, crate::query::parser::lexer::LexErrorKind::UnterminatedString);
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("SELECT #").tokenize().unwrap_err();
        assert_eq!(err.position, Position::new(1, 8));
    }
}
