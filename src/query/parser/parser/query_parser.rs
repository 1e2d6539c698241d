//! 查询解析模块
//!
//! 负责解析 SELECT 查询：WITH 子句、集合运算、SELECT 节点以及 FROM 子句中的表引用。

use crate::query::parser::ast::*;
use crate::query::parser::core::error::ParseError;
use crate::query::parser::core::{Token, TokenKind};
use crate::query::parser::parser::expr_parser::ExprParser;
use crate::query::parser::parser::parse_context::ParseContext;
use crate::query::parser::parser::pattern_parser::PatternParser;

pub struct QueryParser;

/// 解析 WITH 子句时暂存的 CTE 定义
struct CteDefinition {
    name: String,
    cte: CommonTableExpression,
}

impl QueryParser {
    pub fn new() -> Self {
        Self
    }

    /// 判断 token 是否可以开始一个查询
    pub fn starts_query(token: &Token) -> bool {
        matches!(
            token.kind,
            TokenKind::Select | TokenKind::With | TokenKind::Values
        )
    }

    pub fn parse_select_statement(&mut self, ctx: &mut ParseContext) -> Result<SelectStmt, ParseError> {
        ctx.enter_recursion()?;
        let node = self.parse_query_node(ctx);
        ctx.exit_recursion();
        Ok(SelectStmt::new(node?))
    }

    fn parse_query_node(&mut self, ctx: &mut ParseContext) -> Result<QueryNode, ParseError> {
        let ctes = if ctx.check_token(&TokenKind::With) {
            self.parse_with_clause(ctx)?
        } else {
            Vec::new()
        };

        let mut node = self.parse_set_expression(ctx)?;
        self.parse_result_modifiers(ctx, &mut node)?;

        if ctes.is_empty() {
            return Ok(node);
        }

        let materialized: Vec<(String, CommonTableExpression)> = ctes
            .iter()
            .filter(|def| def.cte.materialized)
            .map(|def| (def.name.clone(), def.cte.clone()))
            .collect();

        let cte_map = node.cte_map_mut();
        for def in ctes {
            cte_map.insert(def.name, def.cte);
        }

        // 物化 CTE 在外层包一层 CTE 节点
        for (name, cte) in materialized {
            node = QueryNode::Cte(CteNode {
                ctename: name,
                query: Box::new(cte.query.node),
                child: Box::new(node),
                aliases: cte.aliases,
                cte_map: CteMap::new(),
            });
        }

        Ok(node)
    }

    fn parse_with_clause(&mut self, ctx: &mut ParseContext) -> Result<Vec<CteDefinition>, ParseError> {
        ctx.expect_token(TokenKind::With)?;
        let recursive = ctx.match_word("RECURSIVE");

        let mut ctes: Vec<CteDefinition> = Vec::new();
        loop {
            let name_position = ctx.current_position();
            let name = ctx.expect_identifier()?;
            if ctes.iter().any(|def| def.name.eq_ignore_ascii_case(&name)) {
                return Err(ParseError::syntax_error(
                    format!("Duplicate CTE name \"{}\"", name),
                    name_position,
                ));
            }
            let aliases = if ctx.check_token(&TokenKind::LParen) {
                self.parse_identifier_list(ctx)?
            } else {
                Vec::new()
            };
            ctx.expect_token(TokenKind::As)?;

            let materialized = if ctx.match_word("MATERIALIZED") {
                true
            } else {
                if ctx.check_token(&TokenKind::Not) && ctx.peek_nth(1).is_word("MATERIALIZED") {
                    ctx.next_token();
                    ctx.next_token();
                }
                false
            };

            ctx.expect_token(TokenKind::LParen)?;
            let query = self.parse_select_statement(ctx)?;
            ctx.expect_token(TokenKind::RParen)?;

            ctes.push(CteDefinition {
                name,
                cte: CommonTableExpression {
                    aliases,
                    query: Box::new(query),
                    materialized,
                    recursive,
                },
            });

            if !ctx.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(ctes)
    }

    /// 集合运算同样折叠成左深树，折叠层数计入递归预算
    fn parse_set_expression(&mut self, ctx: &mut ParseContext) -> Result<QueryNode, ParseError> {
        let mut folded = 0;
        let node = self.parse_set_operations(ctx, &mut folded);
        ctx.exit_recursion_by(folded);
        node
    }

    fn parse_set_operations(
        &mut self,
        ctx: &mut ParseContext,
        folded: &mut usize,
    ) -> Result<QueryNode, ParseError> {
        let mut left = self.parse_query_term(ctx)?;

        loop {
            let op = match ctx.current_token().kind {
                TokenKind::Union => SetOperationType::Union,
                TokenKind::Except => SetOperationType::Except,
                TokenKind::Intersect => SetOperationType::Intersect,
                _ => break,
            };
            ctx.next_token();
            let all = ctx.match_token(TokenKind::All);
            if !all {
                ctx.match_token(TokenKind::Distinct);
            }
            ctx.enter_recursion()?;
            *folded += 1;
            let right = self.parse_query_term(ctx)?;
            left = QueryNode::SetOperation(SetOperationNode {
                op,
                all,
                left: Box::new(left),
                right: Box::new(right),
                order_by: Vec::new(),
                limit: None,
                offset: None,
                cte_map: CteMap::new(),
            });
        }

        Ok(left)
    }

    fn parse_query_term(&mut self, ctx: &mut ParseContext) -> Result<QueryNode, ParseError> {
        match ctx.current_token().kind {
            TokenKind::Select => Ok(QueryNode::Select(self.parse_select_node(ctx)?)),
            TokenKind::Values => Ok(QueryNode::Select(self.parse_values_node(ctx)?)),
            TokenKind::LParen => {
                ctx.next_token();
                ctx.enter_recursion()?;
                let node = self.parse_query_node(ctx);
                ctx.exit_recursion();
                ctx.expect_token(TokenKind::RParen)?;
                node
            }
            _ => Err(ctx.unexpected(&["SELECT".to_string(), "VALUES".to_string(), "'('".to_string()])),
        }
    }

    fn parse_select_node(&mut self, ctx: &mut ParseContext) -> Result<SelectNode, ParseError> {
        ctx.expect_token(TokenKind::Select)?;

        let distinct = if ctx.match_token(TokenKind::Distinct) {
            true
        } else {
            ctx.match_token(TokenKind::All);
            false
        };

        let select_list = self.parse_select_list(ctx)?;

        let from_table = if ctx.match_token(TokenKind::From) {
            self.parse_from_clause(ctx)?
        } else {
            TableRef::EmptyFrom
        };

        let mut node = SelectNode::new(select_list, from_table);
        node.distinct = distinct;

        if ctx.match_token(TokenKind::Where) {
            node.where_clause = Some(ExprParser::new().parse_expression(ctx)?);
        }
        if ctx.match_token(TokenKind::Group) {
            ctx.expect_token(TokenKind::By)?;
            node.group_by = ExprParser::new().parse_expression_list(ctx)?;
        }
        if ctx.match_token(TokenKind::Having) {
            node.having = Some(ExprParser::new().parse_expression(ctx)?);
        }

        Ok(node)
    }

    /// `VALUES (...), (...)` 等价于 `SELECT * FROM (VALUES ...)`
    pub fn parse_values_node(&mut self, ctx: &mut ParseContext) -> Result<SelectNode, ParseError> {
        let values = self.parse_values_list(ctx)?;
        Ok(SelectNode::new(
            vec![SelectItem::new(Expr::Star(StarExpr { relation_name: None }))],
            TableRef::ExpressionList(ExpressionListRef { values, alias: None }),
        ))
    }

    fn parse_values_list(&mut self, ctx: &mut ParseContext) -> Result<Vec<Vec<Expr>>, ParseError> {
        ctx.expect_token(TokenKind::Values)?;
        let mut rows = Vec::new();
        loop {
            ctx.expect_token(TokenKind::LParen)?;
            rows.push(ExprParser::new().parse_expression_list(ctx)?);
            ctx.expect_token(TokenKind::RParen)?;
            if !ctx.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(rows)
    }

    fn parse_select_list(&mut self, ctx: &mut ParseContext) -> Result<Vec<SelectItem>, ParseError> {
        let mut items = vec![self.parse_select_item(ctx)?];
        while ctx.match_token(TokenKind::Comma) {
            items.push(self.parse_select_item(ctx)?);
        }
        Ok(items)
    }

    /// 投影项 `expr [[AS] alias]`
    pub fn parse_select_item(&mut self, ctx: &mut ParseContext) -> Result<SelectItem, ParseError> {
        let expr = if ctx.match_token(TokenKind::Star) {
            Expr::Star(StarExpr { relation_name: None })
        } else {
            ExprParser::new().parse_expression(ctx)?
        };
        let alias = self.parse_optional_alias(ctx)?;
        Ok(SelectItem { expr, alias })
    }

    fn parse_result_modifiers(&mut self, ctx: &mut ParseContext, node: &mut QueryNode) -> Result<(), ParseError> {
        let mut order_by = Vec::new();
        if ctx.match_token(TokenKind::Order) {
            ctx.expect_token(TokenKind::By)?;
            loop {
                let expr = ExprParser::new().parse_expression(ctx)?;
                let direction = if ctx.match_token(TokenKind::Desc) {
                    OrderDirection::Desc
                } else {
                    ctx.match_token(TokenKind::Asc);
                    OrderDirection::Asc
                };
                order_by.push(OrderByItem { expr, direction });
                if !ctx.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }

        let limit = if ctx.match_token(TokenKind::Limit) {
            Some(ExprParser::new().parse_expression(ctx)?)
        } else {
            None
        };
        let offset = if ctx.match_token(TokenKind::Offset) {
            Some(ExprParser::new().parse_expression(ctx)?)
        } else {
            None
        };

        match node {
            QueryNode::Select(select) => {
                select.order_by = order_by;
                select.limit = limit;
                select.offset = offset;
            }
            QueryNode::SetOperation(set_op) => {
                set_op.order_by = order_by;
                set_op.limit = limit;
                set_op.offset = offset;
            }
            QueryNode::Cte(_) => {
                if !order_by.is_empty() || limit.is_some() || offset.is_some() {
                    return Err(ParseError::unsupported_feature(
                        "result modifiers on a CTE node",
                        ctx.current_position(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// FROM 子句：逗号分隔的表引用等价于交叉连接
    ///
    /// 每折叠一次连接，左深树就加深一层，这一层计入递归预算，
    /// 整个 FROM 子句解析完后才归还。
    pub fn parse_from_clause(&mut self, ctx: &mut ParseContext) -> Result<TableRef, ParseError> {
        let mut folded = 0;
        let table_ref = self.parse_cross_joins(ctx, &mut folded);
        ctx.exit_recursion_by(folded);
        table_ref
    }

    fn parse_cross_joins(
        &mut self,
        ctx: &mut ParseContext,
        folded: &mut usize,
    ) -> Result<TableRef, ParseError> {
        let mut left = self.parse_joined_table(ctx, folded)?;
        while ctx.match_token(TokenKind::Comma) {
            ctx.enter_recursion()?;
            *folded += 1;
            let right = self.parse_joined_table(ctx, folded)?;
            left = TableRef::Join(JoinRef {
                left: Box::new(left),
                right: Box::new(right),
                join_type: JoinType::Cross,
                condition: None,
                using_columns: Vec::new(),
            });
        }
        Ok(left)
    }

    fn parse_join_type(&mut self, ctx: &mut ParseContext) -> Result<Option<JoinType>, ParseError> {
        let join_type = match ctx.current_token().kind {
            TokenKind::Join => {
                ctx.next_token();
                return Ok(Some(JoinType::Inner));
            }
            TokenKind::Inner => JoinType::Inner,
            TokenKind::Left => JoinType::Left,
            TokenKind::Right => JoinType::Right,
            TokenKind::Full => JoinType::Full,
            TokenKind::Cross => JoinType::Cross,
            _ => return Ok(None),
        };
        ctx.next_token();
        if matches!(join_type, JoinType::Left | JoinType::Right | JoinType::Full) {
            ctx.match_token(TokenKind::Outer);
        }
        ctx.expect_token(TokenKind::Join)?;
        Ok(Some(join_type))
    }

    fn parse_joined_table(
        &mut self,
        ctx: &mut ParseContext,
        folded: &mut usize,
    ) -> Result<TableRef, ParseError> {
        let mut left = self.parse_table_primary(ctx)?;

        while let Some(join_type) = self.parse_join_type(ctx)? {
            ctx.enter_recursion()?;
            *folded += 1;
            let right = self.parse_table_primary(ctx)?;
            let mut join = JoinRef {
                left: Box::new(left),
                right: Box::new(right),
                join_type,
                condition: None,
                using_columns: Vec::new(),
            };
            if join_type != JoinType::Cross {
                if ctx.match_token(TokenKind::On) {
                    join.condition = Some(ExprParser::new().parse_expression(ctx)?);
                } else if ctx.match_token(TokenKind::Using) {
                    join.using_columns = self.parse_identifier_list(ctx)?;
                } else {
                    return Err(ctx.unexpected(&["ON".to_string(), "USING".to_string()]));
                }
            }
            left = TableRef::Join(join);
        }

        Ok(left)
    }

    fn parse_table_primary(&mut self, ctx: &mut ParseContext) -> Result<TableRef, ParseError> {
        ctx.enter_recursion()?;
        let table_ref = self.parse_table_primary_inner(ctx);
        ctx.exit_recursion();
        let mut table_ref = table_ref?;

        if ctx.check_token(&TokenKind::Pivot) {
            table_ref = self.parse_pivot(ctx, table_ref)?;
        }
        Ok(table_ref)
    }

    fn parse_table_primary_inner(&mut self, ctx: &mut ParseContext) -> Result<TableRef, ParseError> {
        match ctx.current_token().kind {
            TokenKind::GraphTable => PatternParser::new().parse_graph_table(ctx),
            TokenKind::LParen if Self::starts_query(ctx.peek_nth(1)) => {
                ctx.next_token();
                let subquery = self.parse_select_statement(ctx)?;
                ctx.expect_token(TokenKind::RParen)?;
                let (alias, column_name_alias) = self.parse_table_alias(ctx)?;
                Ok(TableRef::Subquery(SubqueryRef {
                    subquery: Box::new(subquery),
                    alias,
                    column_name_alias,
                }))
            }
            TokenKind::LParen => {
                ctx.next_token();
                let table_ref = self.parse_from_clause(ctx)?;
                ctx.expect_token(TokenKind::RParen)?;
                Ok(table_ref)
            }
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_) => {
                let (schema_name, name) = ctx.expect_qualified_name()?;
                if ctx.check_token(&TokenKind::LParen) {
                    let mut function = ExprParser::new().parse_function_arguments(ctx, name)?;
                    function.schema = schema_name;
                    let (alias, column_name_alias) = self.parse_table_alias(ctx)?;
                    return Ok(TableRef::TableFunction(TableFunctionRef {
                        function,
                        alias,
                        column_name_alias,
                    }));
                }
                let (alias, _) = self.parse_table_alias(ctx)?;
                Ok(TableRef::BaseTable(BaseTableRef {
                    schema_name,
                    table_name: name,
                    alias,
                }))
            }
            _ => Err(ctx.unexpected(&["table reference".to_string()])),
        }
    }

    /// `source PIVOT (agg [, agg] FOR column IN (v, ...)) [alias]`
    fn parse_pivot(&mut self, ctx: &mut ParseContext, source: TableRef) -> Result<TableRef, ParseError> {
        ctx.expect_token(TokenKind::Pivot)?;
        ctx.expect_token(TokenKind::LParen)?;
        let aggregates = ExprParser::new().parse_expression_list(ctx)?;
        ctx.expect_token(TokenKind::For)?;
        let pivot_column = ctx.expect_identifier()?;
        ctx.expect_token(TokenKind::In)?;
        ctx.expect_token(TokenKind::LParen)?;
        let pivot_values = ExprParser::new().parse_expression_list(ctx)?;
        ctx.expect_token(TokenKind::RParen)?;
        ctx.expect_token(TokenKind::RParen)?;
        let (alias, _) = self.parse_table_alias(ctx)?;

        Ok(TableRef::Pivot(PivotRef {
            source: Box::new(source),
            aggregates,
            pivot_column,
            pivot_values,
            alias,
        }))
    }

    /// `[AS] alias [(col, ...)]`
    pub fn parse_table_alias(&mut self, ctx: &mut ParseContext) -> Result<(Option<String>, Vec<String>), ParseError> {
        let alias = self.parse_optional_alias(ctx)?;
        let columns = if alias.is_some() && ctx.check_token(&TokenKind::LParen) {
            self.parse_identifier_list(ctx)?
        } else {
            Vec::new()
        };
        Ok((alias, columns))
    }

    fn parse_optional_alias(&mut self, ctx: &mut ParseContext) -> Result<Option<String>, ParseError> {
        if ctx.match_token(TokenKind::As) {
            return Ok(Some(ctx.expect_identifier()?));
        }
        if ctx.check_identifier() {
            return Ok(Some(ctx.expect_identifier()?));
        }
        Ok(None)
    }

    /// `(a, b, c)`
    pub fn parse_identifier_list(&mut self, ctx: &mut ParseContext) -> Result<Vec<String>, ParseError> {
        ctx.expect_token(TokenKind::LParen)?;
        let mut names = vec![ctx.expect_identifier()?];
        while ctx.match_token(TokenKind::Comma) {
            names.push(ctx.expect_identifier()?);
        }
        ctx.expect_token(TokenKind::RParen)?;
        Ok(names)
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}
