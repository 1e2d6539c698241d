use crate::query::parser::ast::stmt::Stmt;
use crate::query::parser::core::error::ParseError;
use crate::query::parser::core::TokenKind;
use crate::query::parser::lexer::Lexer;
use crate::query::parser::parser::parse_context::{ParseContext, DEFAULT_MAX_RECURSION_DEPTH};
use crate::query::parser::parser::stmt_parser::StmtParser;

pub struct Parser<'a> {
    input: &'a str,
    max_recursion_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// 解析恰好一条语句，允许末尾带一个分号
    pub fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let tokens = Lexer::new(self.input).tokenize()?;
        let mut ctx = ParseContext::new(tokens).with_max_recursion_depth(self.max_recursion_depth);

        let stmt = StmtParser::new().parse_statement(&mut ctx)?;
        ctx.match_token(TokenKind::Semicolon);
        if !ctx.is_eof() {
            return Err(ctx.unexpected(&["end of statement".to_string()]));
        }
        Ok(stmt)
    }

    /// 按分号切分后逐条解析
    pub fn parse_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        split_statements(self.input)?
            .into_iter()
            .map(|text| {
                Parser::new(text)
                    .with_max_recursion_depth(self.max_recursion_depth)
                    .parse_statement()
            })
            .collect()
    }
}

/// 按顶层分号切分语句文本
///
/// 切分基于词法分析结果，字符串与注释中的分号不会切分语句。
/// 不含任何 token 的片段会被跳过。
pub fn split_statements(input: &str) -> Result<Vec<&str>, ParseError> {
    let tokens = Lexer::new(input).tokenize()?;

    let mut statements = Vec::new();
    let mut span: Option<(usize, usize)> = None;
    for token in &tokens {
        match token.kind {
            TokenKind::Semicolon | TokenKind::Eof => {
                if let Some((start, end)) = span.take() {
                    statements.push(&input[start..end]);
                }
            }
            _ => {
                let start = span.map_or(token.offset, |(start, _)| start);
                span = Some((start, token.end_offset()));
            }
        }
    }
    Ok(statements)
}
