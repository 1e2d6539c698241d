//! 图模式解析模块
//!
//! 解析 `GRAPH_TABLE (g MATCH ... [WHERE ...] COLUMNS (...)) [AS] alias`。
//! 结果是一个 `duckpgq_match` 表函数调用，其唯一参数为匹配表达式。

use crate::query::parser::ast::*;
use crate::query::parser::core::error::ParseError;
use crate::query::parser::core::TokenKind;
use crate::query::parser::parser::expr_parser::ExprParser;
use crate::query::parser::parser::parse_context::ParseContext;
use crate::query::parser::parser::query_parser::QueryParser;

pub struct PatternParser;

impl PatternParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_graph_table(&mut self, ctx: &mut ParseContext) -> Result<TableRef, ParseError> {
        ctx.expect_token(TokenKind::GraphTable)?;
        ctx.expect_token(TokenKind::LParen)?;

        let pg_name = ctx.expect_identifier()?;
        ctx.expect_token(TokenKind::Match)?;

        let mut path_patterns = vec![self.parse_path_pattern(ctx)?];
        while ctx.match_token(TokenKind::Comma) {
            path_patterns.push(self.parse_path_pattern(ctx)?);
        }

        let where_clause = if ctx.match_token(TokenKind::Where) {
            Some(Box::new(ExprParser::new().parse_expression(ctx)?))
        } else {
            None
        };

        ctx.expect_word("COLUMNS")?;
        ctx.expect_token(TokenKind::LParen)?;
        let mut query_parser = QueryParser::new();
        let mut column_list = vec![query_parser.parse_select_item(ctx)?];
        while ctx.match_token(TokenKind::Comma) {
            column_list.push(query_parser.parse_select_item(ctx)?);
        }
        ctx.expect_token(TokenKind::RParen)?;
        ctx.expect_token(TokenKind::RParen)?;

        let (alias, _) = query_parser.parse_table_alias(ctx)?;

        let match_expr = MatchExpression {
            pg_name,
            alias,
            path_patterns,
            column_list,
            where_clause,
        };

        Ok(TableRef::TableFunction(TableFunctionRef {
            function: FunctionExpression::new(
                MATCH_FUNCTION_NAME,
                vec![Expr::Match(Box::new(match_expr))],
            ),
            alias: None,
            column_name_alias: Vec::new(),
        }))
    }

    /// `[p =] vertex (edge vertex)*`
    fn parse_path_pattern(&mut self, ctx: &mut ParseContext) -> Result<PathPattern, ParseError> {
        let variable = if ctx.check_identifier() && ctx.peek_nth(1).kind == TokenKind::Eq {
            let name = ctx.expect_identifier()?;
            ctx.next_token();
            Some(name)
        } else {
            None
        };

        let mut elements = vec![PathElement::Vertex(self.parse_vertex(ctx)?)];
        while let Some(edge) = self.parse_edge(ctx)? {
            elements.push(PathElement::Edge(edge));
            elements.push(PathElement::Vertex(self.parse_vertex(ctx)?));
        }

        Ok(PathPattern { variable, elements })
    }

    /// `(v[:Label] [WHERE e])`
    fn parse_vertex(&mut self, ctx: &mut ParseContext) -> Result<VertexPattern, ParseError> {
        ctx.expect_token(TokenKind::LParen)?;
        let (variable, label, where_clause) = self.parse_element_body(ctx)?;
        ctx.expect_token(TokenKind::RParen)?;
        Ok(VertexPattern {
            variable,
            label,
            where_clause,
        })
    }

    /// 顶点和边共用的 `[var][:Label] [WHERE e]`
    fn parse_element_body(
        &mut self,
        ctx: &mut ParseContext,
    ) -> Result<(Option<String>, Option<String>, Option<Box<Expr>>), ParseError> {
        let variable = if ctx.check_identifier() {
            Some(ctx.expect_identifier()?)
        } else {
            None
        };
        let label = if ctx.match_token(TokenKind::Colon) {
            Some(ctx.expect_identifier()?)
        } else {
            None
        };
        let where_clause = if ctx.match_token(TokenKind::Where) {
            Some(Box::new(ExprParser::new().parse_expression(ctx)?))
        } else {
            None
        };
        Ok((variable, label, where_clause))
    }

    /// 解析一条边，没有边时返回 `None`
    fn parse_edge(&mut self, ctx: &mut ParseContext) -> Result<Option<EdgePattern>, ParseError> {
        let left_arrow = match ctx.current_token().kind {
            TokenKind::LeftArrow => true,
            TokenKind::Minus => false,
            // 无方括号的 `->`
            TokenKind::Arrow => {
                ctx.next_token();
                return self.finish_edge(ctx, None, None, None, EdgeDirection::Right).map(Some);
            }
            _ => return Ok(None),
        };
        ctx.next_token();

        if !ctx.match_token(TokenKind::LBracket) {
            let direction = if left_arrow {
                EdgeDirection::Left
            } else {
                EdgeDirection::Any
            };
            return self.finish_edge(ctx, None, None, None, direction).map(Some);
        }

        let (variable, label, where_clause) = self.parse_element_body(ctx)?;
        ctx.expect_token(TokenKind::RBracket)?;

        let right_arrow = if ctx.match_token(TokenKind::Arrow) {
            true
        } else if ctx.match_token(TokenKind::Minus) {
            false
        } else {
            return Err(ctx.unexpected(&["'->'".to_string(), "'-'".to_string()]));
        };

        let direction = match (left_arrow, right_arrow) {
            (false, true) => EdgeDirection::Right,
            (true, false) => EdgeDirection::Left,
            (false, false) => EdgeDirection::Any,
            (true, true) => EdgeDirection::Both,
        };

        self.finish_edge(ctx, variable, label, where_clause, direction).map(Some)
    }

    fn finish_edge(
        &mut self,
        ctx: &mut ParseContext,
        variable: Option<String>,
        label: Option<String>,
        where_clause: Option<Box<Expr>>,
        direction: EdgeDirection,
    ) -> Result<EdgePattern, ParseError> {
        let quantifier = self.parse_quantifier(ctx)?;
        Ok(EdgePattern {
            variable,
            label,
            direction,
            quantifier,
            where_clause,
        })
    }

    /// `{n,m}`、`{n,}`、`{n}`、`*`、`+`
    fn parse_quantifier(&mut self, ctx: &mut ParseContext) -> Result<Option<Quantifier>, ParseError> {
        if ctx.match_token(TokenKind::Star) {
            return Ok(Some(Quantifier { min: 0, max: None }));
        }
        if ctx.match_token(TokenKind::Plus) {
            return Ok(Some(Quantifier { min: 1, max: None }));
        }
        if !ctx.match_token(TokenKind::LBrace) {
            return Ok(None);
        }

        let min = self.parse_bound(ctx)?;
        let max = if ctx.match_token(TokenKind::Comma) {
            if ctx.check_token(&TokenKind::RBrace) {
                None
            } else {
                Some(self.parse_bound(ctx)?)
            }
        } else {
            Some(min)
        };
        ctx.expect_token(TokenKind::RBrace)?;

        if let Some(max) = max {
            if max < min {
                return Err(ParseError::syntax_error(
                    format!("Invalid quantifier {{{},{}}}: upper bound below lower bound", min, max),
                    ctx.current_position(),
                ));
            }
        }
        Ok(Some(Quantifier { min, max }))
    }

    fn parse_bound(&mut self, ctx: &mut ParseContext) -> Result<u32, ParseError> {
        let position = ctx.current_position();
        match ctx.current_token().kind {
            TokenKind::IntegerLiteral(n) => {
                ctx.next_token();
                u32::try_from(n).map_err(|_| {
                    ParseError::syntax_error(format!("Quantifier bound {} out of range", n), position)
                })
            }
            _ => Err(ctx.unexpected(&["integer".to_string()])),
        }
    }
}

impl Default for PatternParser {
    fn default() -> Self {
        Self::new()
    }
}
