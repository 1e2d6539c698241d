//! DDL 语句解析模块
//!
//! 负责解析数据定义语言语句，包括 CREATE PROPERTY GRAPH、CREATE TABLE、CREATE VIEW 以及 DROP。

use crate::query::parser::ast::*;
use crate::query::parser::core::error::ParseError;
use crate::query::parser::core::TokenKind;
use crate::query::parser::parser::expr_parser::ExprParser;
use crate::query::parser::parser::parse_context::ParseContext;
use crate::query::parser::parser::query_parser::QueryParser;

/// DDL 解析器
pub struct DdlParser;

impl DdlParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析 CREATE 语句
    pub fn parse_create_statement(&mut self, ctx: &mut ParseContext) -> Result<Stmt, ParseError> {
        ctx.expect_token(TokenKind::Create)?;

        let or_replace = if ctx.match_token(TokenKind::Or) {
            ctx.expect_word("REPLACE")?;
            true
        } else {
            false
        };

        let info = if ctx.match_word("PROPERTY") {
            ctx.expect_word("GRAPH")?;
            let on_conflict = self.parse_on_conflict(ctx, or_replace)?;
            CreateInfo::PropertyGraph(self.parse_property_graph(ctx, on_conflict)?)
        } else if ctx.match_token(TokenKind::Table) {
            let on_conflict = self.parse_on_conflict(ctx, or_replace)?;
            CreateInfo::Table(self.parse_create_table(ctx, on_conflict)?)
        } else if ctx.match_token(TokenKind::View) {
            let on_conflict = self.parse_on_conflict(ctx, or_replace)?;
            let (schema, view_name) = ctx.expect_qualified_name()?;
            ctx.expect_token(TokenKind::As)?;
            let query = QueryParser::new().parse_select_statement(ctx)?;
            CreateInfo::View(CreateViewInfo {
                schema,
                view_name,
                query: Box::new(query),
                on_conflict,
            })
        } else {
            return Err(ctx.unexpected(&[
                "PROPERTY GRAPH".to_string(),
                "TABLE".to_string(),
                "VIEW".to_string(),
            ]));
        };

        Ok(Stmt::Create(CreateStmt { info }))
    }

    /// `[IF NOT EXISTS]`，与 `OR REPLACE` 互斥
    fn parse_on_conflict(&mut self, ctx: &mut ParseContext, or_replace: bool) -> Result<OnCreateConflict, ParseError> {
        if ctx.check_token(&TokenKind::If) {
            let position = ctx.current_position();
            ctx.next_token();
            ctx.expect_token(TokenKind::Not)?;
            ctx.expect_token(TokenKind::Exists)?;
            if or_replace {
                return Err(ParseError::syntax_error(
                    "OR REPLACE and IF NOT EXISTS cannot be combined",
                    position,
                ));
            }
            return Ok(OnCreateConflict::Ignore);
        }
        Ok(if or_replace {
            OnCreateConflict::Replace
        } else {
            OnCreateConflict::Error
        })
    }

    fn parse_property_graph(
        &mut self,
        ctx: &mut ParseContext,
        on_conflict: OnCreateConflict,
    ) -> Result<CreatePropertyGraphInfo, ParseError> {
        let property_graph_name = ctx.expect_identifier()?;

        ctx.expect_word("VERTEX")?;
        ctx.expect_word("TABLES")?;
        let vertex_tables = self.parse_graph_table_list(ctx, true)?;

        let edge_tables = if ctx.match_word("EDGE") {
            ctx.expect_word("TABLES")?;
            self.parse_graph_table_list(ctx, false)?
        } else {
            Vec::new()
        };

        Ok(CreatePropertyGraphInfo {
            property_graph_name,
            vertex_tables,
            edge_tables,
            on_conflict,
        })
    }

    fn parse_graph_table_list(
        &mut self,
        ctx: &mut ParseContext,
        is_vertex: bool,
    ) -> Result<Vec<PropertyGraphTable>, ParseError> {
        ctx.expect_token(TokenKind::LParen)?;
        let mut tables = Vec::new();
        loop {
            let table = if is_vertex {
                self.parse_vertex_table(ctx)?
            } else {
                self.parse_edge_table(ctx)?
            };
            tables.push(table);
            if !ctx.match_token(TokenKind::Comma) {
                break;
            }
        }
        ctx.expect_token(TokenKind::RParen)?;
        Ok(tables)
    }

    /// `t [AS a] [LABEL l]`
    fn parse_vertex_table(&mut self, ctx: &mut ParseContext) -> Result<PropertyGraphTable, ParseError> {
        let mut table = PropertyGraphTable::vertex(ctx.expect_identifier()?);
        table.table_alias = self.parse_graph_table_alias(ctx)?;
        if let Some(label) = self.parse_label(ctx)? {
            table.main_label = label;
        }
        Ok(table)
    }

    /// `t [AS a] SOURCE [KEY (c) REFERENCES] v [(c)] DESTINATION [KEY (c) REFERENCES] v [(c)] [LABEL l]`
    fn parse_edge_table(&mut self, ctx: &mut ParseContext) -> Result<PropertyGraphTable, ParseError> {
        let mut table = PropertyGraphTable::vertex(ctx.expect_identifier()?);
        table.is_vertex_table = false;
        table.table_alias = self.parse_graph_table_alias(ctx)?;

        ctx.expect_word("SOURCE")?;
        let (reference, fk, pk) = self.parse_edge_endpoint(ctx)?;
        table.source_reference = Some(reference);
        table.source_fk = fk;
        table.source_pk = pk;

        ctx.expect_word("DESTINATION")?;
        let (reference, fk, pk) = self.parse_edge_endpoint(ctx)?;
        table.destination_reference = Some(reference);
        table.destination_fk = fk;
        table.destination_pk = pk;

        if let Some(label) = self.parse_label(ctx)? {
            table.main_label = label;
        }
        Ok(table)
    }

    /// 返回 (引用的顶点表, 外键列, 主键列)
    fn parse_edge_endpoint(
        &mut self,
        ctx: &mut ParseContext,
    ) -> Result<(String, Vec<String>, Vec<String>), ParseError> {
        let mut query_parser = QueryParser::new();
        let fk = if ctx.match_word("KEY") {
            let columns = query_parser.parse_identifier_list(ctx)?;
            ctx.expect_word("REFERENCES")?;
            columns
        } else {
            Vec::new()
        };
        let reference = ctx.expect_identifier()?;
        let pk = if ctx.check_token(&TokenKind::LParen) {
            query_parser.parse_identifier_list(ctx)?
        } else {
            Vec::new()
        };
        Ok((reference, fk, pk))
    }

    fn parse_graph_table_alias(&mut self, ctx: &mut ParseContext) -> Result<Option<String>, ParseError> {
        if ctx.match_token(TokenKind::As) {
            Ok(Some(ctx.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    fn parse_label(&mut self, ctx: &mut ParseContext) -> Result<Option<String>, ParseError> {
        if ctx.match_word("LABEL") {
            Ok(Some(ctx.expect_identifier()?))
        } else {
            Ok(None)
        }
    }

    fn parse_create_table(
        &mut self,
        ctx: &mut ParseContext,
        on_conflict: OnCreateConflict,
    ) -> Result<CreateTableInfo, ParseError> {
        let (schema, table) = ctx.expect_qualified_name()?;

        let mut columns = Vec::new();
        if ctx.match_token(TokenKind::LParen) {
            loop {
                let name = ctx.expect_identifier()?;
                let logical_type = ExprParser::new().parse_type_name(ctx)?;
                columns.push(ColumnDefinition { name, logical_type });
                if !ctx.match_token(TokenKind::Comma) {
                    break;
                }
            }
            ctx.expect_token(TokenKind::RParen)?;
        }

        let query = if ctx.match_token(TokenKind::As) {
            Some(Box::new(QueryParser::new().parse_select_statement(ctx)?))
        } else {
            None
        };

        if columns.is_empty() && query.is_none() {
            return Err(ctx.unexpected(&["'('".to_string(), "AS".to_string()]));
        }

        Ok(CreateTableInfo {
            schema,
            table,
            columns,
            query,
            on_conflict,
        })
    }

    /// 解析 DROP 语句
    pub fn parse_drop_statement(&mut self, ctx: &mut ParseContext) -> Result<Stmt, ParseError> {
        ctx.expect_token(TokenKind::Drop)?;

        let drop_type = if ctx.match_word("PROPERTY") {
            ctx.expect_word("GRAPH")?;
            DropType::PropertyGraph
        } else if ctx.match_token(TokenKind::Table) {
            DropType::Table
        } else if ctx.match_token(TokenKind::View) {
            DropType::View
        } else if ctx.match_word("SCHEMA") {
            DropType::Schema
        } else {
            return Err(ctx.unexpected(&[
                "PROPERTY GRAPH".to_string(),
                "TABLE".to_string(),
                "VIEW".to_string(),
                "SCHEMA".to_string(),
            ]));
        };

        let if_exists = if ctx.match_token(TokenKind::If) {
            ctx.expect_token(TokenKind::Exists)?;
            true
        } else {
            false
        };

        let (schema, name) = ctx.expect_qualified_name()?;
        let cascade = ctx.match_word("CASCADE");

        Ok(Stmt::Drop(DropStmt {
            info: DropInfo {
                drop_type,
                schema,
                name,
                if_exists,
                cascade,
            },
        }))
    }
}

impl Default for DdlParser {
    fn default() -> Self {
        Self::new()
    }
}
