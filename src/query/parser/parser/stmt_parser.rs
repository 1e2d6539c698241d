//! 语句解析模块
//!
//! 负责解析各种语句，包括 SELECT、CREATE、DROP、EXPLAIN、COPY、INSERT、PRAGMA、
//! 事务控制以及 DESCRIBE / SUMMARIZE / SHOW。

use crate::core::Value;
use crate::query::parser::ast::*;
use crate::query::parser::core::error::{ParseError, ParseErrorKind};
use crate::query::parser::core::TokenKind;
use crate::query::parser::parser::ddl_parser::DdlParser;
use crate::query::parser::parser::parse_context::ParseContext;
use crate::query::parser::parser::query_parser::QueryParser;

pub struct StmtParser;

impl StmtParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_statement(&mut self, ctx: &mut ParseContext) -> Result<Stmt, ParseError> {
        let token = ctx.current_token().clone();
        match token.kind {
            TokenKind::Select | TokenKind::With | TokenKind::Values | TokenKind::LParen => {
                Ok(Stmt::Select(QueryParser::new().parse_select_statement(ctx)?))
            }
            TokenKind::Create => DdlParser::new().parse_create_statement(ctx),
            TokenKind::Drop => DdlParser::new().parse_drop_statement(ctx),
            TokenKind::Explain => self.parse_explain_statement(ctx),
            TokenKind::Copy => self.parse_copy_statement(ctx),
            TokenKind::Insert => self.parse_insert_statement(ctx),
            TokenKind::Pragma => self.parse_pragma_statement(ctx),
            TokenKind::Begin | TokenKind::Commit | TokenKind::Rollback => {
                self.parse_transaction_statement(ctx)
            }
            TokenKind::Describe | TokenKind::Summarize | TokenKind::Show => {
                self.parse_show_statement(ctx)
            }
            TokenKind::Eof => Err(ParseError::unexpected_end_of_input(ctx.current_position())),
            _ => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken,
                format!("Unexpected token: {:?}", token.kind),
                ctx.current_position(),
            )
            .with_unexpected_token(&token.kind)),
        }
    }

    fn parse_explain_statement(&mut self, ctx: &mut ParseContext) -> Result<Stmt, ParseError> {
        ctx.expect_token(TokenKind::Explain)?;
        let explain_type = if ctx.match_word("ANALYZE") {
            ExplainType::Analyze
        } else {
            ExplainType::Standard
        };

        ctx.enter_recursion()?;
        let stmt = self.parse_statement(ctx);
        ctx.exit_recursion();

        Ok(Stmt::Explain(ExplainStmt {
            stmt: Box::new(stmt?),
            explain_type,
        }))
    }

    /// `COPY (select) TO 'file'`、`COPY t [(cols)] TO|FROM 'file'`，可带 `(option value, ...)`
    fn parse_copy_statement(&mut self, ctx: &mut ParseContext) -> Result<Stmt, ParseError> {
        ctx.expect_token(TokenKind::Copy)?;
        let mut query_parser = QueryParser::new();

        let mut info = CopyInfo {
            schema: None,
            table: None,
            select_list: Vec::new(),
            select_statement: None,
            file_path: String::new(),
            is_from: false,
            options: Vec::new(),
        };

        if ctx.check_token(&TokenKind::LParen) {
            ctx.next_token();
            let query = query_parser.parse_select_statement(ctx)?;
            ctx.expect_token(TokenKind::RParen)?;
            ctx.expect_token(TokenKind::To)?;
            info.select_statement = Some(Box::new(query.node));
        } else {
            let (schema, table) = ctx.expect_qualified_name()?;
            if ctx.check_token(&TokenKind::LParen) {
                info.select_list = query_parser.parse_identifier_list(ctx)?;
            }

            if ctx.match_token(TokenKind::From) {
                info.is_from = true;
            } else {
                ctx.expect_token(TokenKind::To)?;
                // COPY t TO 等价于 COPY (SELECT * FROM t) TO
                info.select_statement = Some(Box::new(Self::copy_source(
                    schema.clone(),
                    table.clone(),
                    &info.select_list,
                )));
            }
            info.schema = schema;
            info.table = Some(table);
        }

        info.file_path = self.parse_string_literal(ctx)?;

        ctx.match_token(TokenKind::With);
        if ctx.match_token(TokenKind::LParen) {
            loop {
                let name = ctx.expect_identifier()?;
                let values = if ctx.check_token(&TokenKind::Comma) || ctx.check_token(&TokenKind::RParen) {
                    Vec::new()
                } else if ctx.match_token(TokenKind::LParen) {
                    let mut values = vec![self.parse_literal_value(ctx)?];
                    while ctx.match_token(TokenKind::Comma) {
                        values.push(self.parse_literal_value(ctx)?);
                    }
                    ctx.expect_token(TokenKind::RParen)?;
                    values
                } else {
                    vec![self.parse_literal_value(ctx)?]
                };
                info.options.push((name.to_lowercase(), values));
                if !ctx.match_token(TokenKind::Comma) {
                    break;
                }
            }
            ctx.expect_token(TokenKind::RParen)?;
        }

        Ok(Stmt::Copy(CopyStmt { info }))
    }

    fn copy_source(schema: Option<String>, table: String, columns: &[String]) -> QueryNode {
        let select_list = if columns.is_empty() {
            vec![SelectItem::new(Expr::Star(StarExpr { relation_name: None }))]
        } else {
            columns
                .iter()
                .map(|c| SelectItem::new(Expr::column(&[c.as_str()])))
                .collect()
        };
        let from = TableRef::BaseTable(BaseTableRef {
            schema_name: schema,
            table_name: table,
            alias: None,
        });
        QueryNode::Select(SelectNode::new(select_list, from))
    }

    /// `INSERT [OR REPLACE] INTO t [(cols)] (select | VALUES ...)`
    fn parse_insert_statement(&mut self, ctx: &mut ParseContext) -> Result<Stmt, ParseError> {
        ctx.expect_token(TokenKind::Insert)?;
        let or_replace = if ctx.match_token(TokenKind::Or) {
            ctx.expect_word("REPLACE")?;
            true
        } else {
            false
        };
        ctx.expect_token(TokenKind::Into)?;

        let (schema, table) = ctx.expect_qualified_name()?;
        let mut query_parser = QueryParser::new();

        let columns = if ctx.check_token(&TokenKind::LParen) && !QueryParser::starts_query(ctx.peek_nth(1)) {
            query_parser.parse_identifier_list(ctx)?
        } else {
            Vec::new()
        };

        let select_statement = query_parser.parse_select_statement(ctx)?;

        Ok(Stmt::Insert(InsertStmt {
            schema,
            table,
            columns,
            select_statement: Box::new(select_statement),
            or_replace,
        }))
    }

    /// `PRAGMA name`、`PRAGMA name = value`、`PRAGMA name(args)`
    fn parse_pragma_statement(&mut self, ctx: &mut ParseContext) -> Result<Stmt, ParseError> {
        ctx.expect_token(TokenKind::Pragma)?;
        let name = ctx.expect_identifier()?;

        let (parameters, pragma_type) = if ctx.match_token(TokenKind::Eq) {
            (vec![self.parse_literal_value(ctx)?], PragmaType::Assignment)
        } else if ctx.match_token(TokenKind::LParen) {
            let mut parameters = Vec::new();
            if !ctx.check_token(&TokenKind::RParen) {
                parameters.push(self.parse_literal_value(ctx)?);
                while ctx.match_token(TokenKind::Comma) {
                    parameters.push(self.parse_literal_value(ctx)?);
                }
            }
            ctx.expect_token(TokenKind::RParen)?;
            (parameters, PragmaType::Call)
        } else {
            (Vec::new(), PragmaType::Nothing)
        };

        Ok(Stmt::Pragma(PragmaStmt {
            name: name.to_lowercase(),
            parameters,
            pragma_type,
        }))
    }

    fn parse_transaction_statement(&mut self, ctx: &mut ParseContext) -> Result<Stmt, ParseError> {
        let transaction_type = match ctx.next_token().kind {
            TokenKind::Begin => TransactionType::Begin,
            TokenKind::Commit => TransactionType::Commit,
            _ => TransactionType::Rollback,
        };
        ctx.match_word("TRANSACTION");
        Ok(Stmt::Transaction(TransactionStmt { transaction_type }))
    }

    /// DESCRIBE / SUMMARIZE / SHOW 均转换为对元查询引用的 `SELECT *`
    fn parse_show_statement(&mut self, ctx: &mut ParseContext) -> Result<Stmt, ParseError> {
        let keyword = ctx.next_token().kind;

        let show_ref = match keyword {
            TokenKind::Describe | TokenKind::Summarize => {
                if ctx.match_word("PROPERTY") {
                    ctx.expect_word("GRAPH")?;
                }
                let (_, table_name) = ctx.expect_qualified_name()?;
                let show_type = if keyword == TokenKind::Describe {
                    ShowType::Describe
                } else {
                    ShowType::Summary
                };
                ShowRef { table_name, show_type }
            }
            _ => {
                if ctx.match_word("TABLES") {
                    if ctx.match_token(TokenKind::From) {
                        ShowRef {
                            table_name: ctx.expect_identifier()?,
                            show_type: ShowType::ShowFrom,
                        }
                    } else {
                        ShowRef {
                            table_name: "tables".to_string(),
                            show_type: ShowType::ShowUnqualified,
                        }
                    }
                } else {
                    // SHOW t 等价于 DESCRIBE t
                    let (_, table_name) = ctx.expect_qualified_name()?;
                    ShowRef {
                        table_name,
                        show_type: ShowType::Describe,
                    }
                }
            }
        };

        let node = SelectNode::new(
            vec![SelectItem::new(Expr::Star(StarExpr { relation_name: None }))],
            TableRef::Show(show_ref),
        );
        Ok(Stmt::Select(SelectStmt::new(QueryNode::Select(node))))
    }

    fn parse_string_literal(&mut self, ctx: &mut ParseContext) -> Result<String, ParseError> {
        match &ctx.current_token().kind {
            TokenKind::StringLiteral(s) => {
                let s = s.clone();
                ctx.next_token();
                Ok(s)
            }
            _ => Err(ctx.unexpected(&["string literal".to_string()])),
        }
    }

    /// PRAGMA 与 COPY 选项中的字面量；裸标识符按字符串处理
    fn parse_literal_value(&mut self, ctx: &mut ParseContext) -> Result<Value, ParseError> {
        let negative = ctx.match_token(TokenKind::Minus);
        let value = match &ctx.current_token().kind {
            TokenKind::IntegerLiteral(n) => {
                let n = if negative { -*n } else { *n };
                Value::from_integer_literal(n)
            }
            TokenKind::FloatLiteral(f) => Value::Double(if negative { -*f } else { *f }),
            _ if negative => return Err(ctx.unexpected(&["number".to_string()])),
            TokenKind::StringLiteral(s) => Value::Varchar(s.clone()),
            TokenKind::Identifier(s) | TokenKind::QuotedIdentifier(s) => Value::Varchar(s.clone()),
            TokenKind::True => Value::Boolean(true),
            TokenKind::False => Value::Boolean(false),
            TokenKind::Null => Value::Null,
            _ => return Err(ctx.unexpected(&["literal".to_string()])),
        };
        ctx.next_token();
        Ok(value)
    }
}

impl Default for StmtParser {
    fn default() -> Self {
        Self::new()
    }
}
