use crate::query::parser::core::error::{ParseError, ParseErrorKind};
use crate::query::parser::core::{Position, Token, TokenKind};

/// 默认的递归预算
///
/// 预算按解析函数的栈帧计：一层表达式嵌套要经过整条优先级链，
/// 按 `EXPRESSION_NESTING_COST` 计入。该默认值在 2 MiB 的 debug 线程栈上留有余量。
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 256;

pub struct ParseContext {
    tokens: Vec<Token>,
    index: usize,
    recursion_depth: usize,
    max_recursion_depth: usize,
}

impl ParseContext {
    /// `tokens` 必须以 `Eof` 结尾
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            recursion_depth: 0,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn enter_recursion(&mut self) -> Result<(), ParseError> {
        self.enter_recursion_by(1)
    }

    pub fn exit_recursion(&mut self) {
        self.exit_recursion_by(1);
    }

    /// 一次计入 `cost` 层，失败时计数不回退，调用方随即放弃整条语句
    pub fn enter_recursion_by(&mut self, cost: usize) -> Result<(), ParseError> {
        self.recursion_depth += cost;
        if self.recursion_depth > self.max_recursion_depth {
            Err(ParseError::new(
                ParseErrorKind::RecursionLimitExceeded,
                format!(
                    "Recursion limit exceeded (max depth {})",
                    self.max_recursion_depth
                ),
                self.current_position(),
            ))
        } else {
            Ok(())
        }
    }

    pub fn exit_recursion_by(&mut self, cost: usize) {
        self.recursion_depth = self.recursion_depth.saturating_sub(cost);
    }

    pub fn recursion_depth(&self) -> usize {
        self.recursion_depth
    }

    pub fn current_token(&self) -> &Token {
        self.peek_nth(0)
    }

    /// 向前查看第 n 个 token，越界时返回末尾的 `Eof`
    pub fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.index + n).min(last)]
    }

    pub fn current_position(&self) -> Position {
        self.current_token().position()
    }

    pub fn is_eof(&self) -> bool {
        self.current_token().kind == TokenKind::Eof
    }

    pub fn next_token(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    pub fn check_token(&self, expected: &TokenKind) -> bool {
        self.current_token().kind == *expected
    }

    pub fn match_token(&mut self, expected: TokenKind) -> bool {
        if self.check_token(&expected) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub fn expect_token(&mut self, expected: TokenKind) -> Result<Token, ParseError> {
        if self.check_token(&expected) {
            Ok(self.next_token())
        } else {
            Err(self.unexpected(&[expected.to_string()]))
        }
    }

    /// 上下文关键字以普通标识符形式出现
    pub fn check_word(&self, word: &str) -> bool {
        self.current_token().is_word(word)
    }

    pub fn match_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub fn expect_word(&mut self, word: &str) -> Result<(), ParseError> {
        if self.match_word(word) {
            Ok(())
        } else {
            Err(self.unexpected(&[word.to_string()]))
        }
    }

    pub fn check_identifier(&self) -> bool {
        matches!(
            self.current_token().kind,
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_)
        )
    }

    pub fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match &self.current_token().kind {
            TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => {
                let name = name.clone();
                self.next_token();
                Ok(name)
            }
            _ => Err(self.unexpected(&["identifier".to_string()])),
        }
    }

    /// `name [. name]`，返回 (schema, name)
    pub fn expect_qualified_name(&mut self) -> Result<(Option<String>, String), ParseError> {
        let first = self.expect_identifier()?;
        if self.check_token(&TokenKind::Dot) && !matches!(self.peek_nth(1).kind, TokenKind::Star) {
            self.next_token();
            let second = self.expect_identifier()?;
            Ok((Some(first), second))
        } else {
            Ok((None, first))
        }
    }

    /// 针对当前 token 构造错误
    pub fn unexpected(&self, expected: &[String]) -> ParseError {
        let token = self.current_token();
        let error = if token.kind == TokenKind::Eof {
            ParseError::unexpected_end_of_input(token.position())
        } else {
            ParseError::unexpected_token(&token.kind, token.position())
        };
        error.with_expected_tokens(expected.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parser::lexer::Lexer;

    fn context(input: &str) -> ParseContext {
        ParseContext::new(Lexer::new(input).tokenize().expect("词法分析应该成功"))
    }

    #[test]
    fn test_peek_past_end_returns_eof() {
        let ctx = context("a");
        assert_eq!(ctx.peek_nth(5).kind, TokenKind::Eof);
    }

    #[test]
    fn test_contextual_words() {
        let mut ctx = context("Property graph g");
        assert!(ctx.match_word("PROPERTY"));
        assert!(ctx.match_word("GRAPH"));
        assert_eq!(ctx.expect_identifier().expect("应为标识符"), "g");
        assert!(ctx.is_eof());
    }

    #[test]
    fn test_recursion_limit() {
        let mut ctx = context("x").with_max_recursion_depth(2);
        assert!(ctx.enter_recursion().is_ok());
        assert!(ctx.enter_recursion().is_ok());
        let err = ctx.enter_recursion().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::RecursionLimitExceeded);
    }

    #[test]
    fn test_weighted_recursion() {
        let mut ctx = context("x").with_max_recursion_depth(10);
        assert!(ctx.enter_recursion_by(6).is_ok());
        assert_eq!(ctx.recursion_depth(), 6);
        let err = ctx.enter_recursion_by(6).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::RecursionLimitExceeded);

        let mut ctx = context("x").with_max_recursion_depth(10);
        ctx.enter_recursion_by(6).unwrap();
        ctx.exit_recursion_by(6);
        assert_eq!(ctx.recursion_depth(), 0);
        ctx.exit_recursion_by(3);
        assert_eq!(ctx.recursion_depth(), 0);
    }

    #[test]
    fn test_unexpected_end_of_input() {
        let mut ctx = context("");
        let err = ctx.expect_token(TokenKind::Select).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEndOfInput);
    }
}
