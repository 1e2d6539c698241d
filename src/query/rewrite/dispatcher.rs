//! 语句分发器
//!
//! 按语句类型选择下游表函数。CREATE TABLE AS、EXPLAIN、INSERT 这类包装语句会递归到内部语句，
//! 内部语句的结果被丢弃，随后仍按未实现处理。

use log::{debug, warn};

use super::correlation::CorrelationState;
use super::match_locator::find_match_function;
use super::statement_locator::find_select_statement;
use crate::core::{PgqError, PgqResult};
use crate::query::parser::ast::{CreateInfo, QueryNode, SelectStmt, Stmt};
use crate::query::planner::{PlanDirective, TableFunction};

pub fn handle_statement(stmt: &mut Stmt, state: &mut CorrelationState) -> PgqResult<PlanDirective> {
    let kind = stmt.kind();
    debug!("分发 {} 语句", kind);

    match stmt {
        Stmt::Select(select) => handle_select(select, state),
        Stmt::Create(create) => match &mut create.info {
            CreateInfo::PropertyGraph(info) => {
                debug!("CREATE PROPERTY GRAPH {} -> create_property_graph", info.property_graph_name);
                Ok(PlanDirective::with_function(TableFunction::create_property_graph()))
            }
            CreateInfo::Table(info) => {
                if let Some(query) = info.query.as_deref_mut() {
                    handle_select(query, state)?;
                }
                Err(not_implemented(kind))
            }
            CreateInfo::View(_) => Err(not_implemented(kind)),
        },
        // 不区分 DROP 目标，所有可达的 DROP 都视为属性图删除
        Stmt::Drop(_) => {
            debug!("DROP -> drop_property_graph");
            Ok(PlanDirective::with_function(TableFunction::drop_property_graph()))
        }
        Stmt::Explain(explain) => {
            // 内部语句的指令被丢弃
            handle_statement(&mut explain.stmt, state)?;
            Err(not_implemented(kind))
        }
        Stmt::Copy(copy) => {
            if let Some(QueryNode::Select(node)) = copy.info.select_statement.as_deref_mut() {
                find_match_function(&mut node.from_table, state)?;
            }
            Err(PgqError::MustUseBindEntryPoint)
        }
        Stmt::Insert(insert) => {
            handle_select(&mut insert.select_statement, state)?;
            Err(not_implemented(kind))
        }
        Stmt::Pragma(_) | Stmt::Transaction(_) => Err(not_implemented(kind)),
    }
}

/// SELECT 必须解析出一个表函数，否则只能走绑定入口
fn handle_select(select: &mut SelectStmt, state: &mut CorrelationState) -> PgqResult<PlanDirective> {
    let directive = find_select_statement(select, state)?;
    if !directive.has_function() {
        return Err(PgqError::MustUseBindEntryPoint);
    }
    Ok(directive)
}

fn not_implemented(kind: &str) -> PgqError {
    warn!("{} 语句尚未在 PGQ 查询中实现", kind);
    PgqError::NotImplemented(kind.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parser::Parser;
    use crate::query::planner::StatementReturnType;

    fn parse(query: &str) -> Stmt {
        Parser::new(query).parse_statement().expect("解析应该成功")
    }

    fn parse_select(query: &str) -> SelectStmt {
        match parse(query) {
            Stmt::Select(select) => select,
            other => panic!("期望 Select 语句, 实际为 {}", other.kind()),
        }
    }

    fn dispatch(query: &str) -> (PgqResult<PlanDirective>, CorrelationState) {
        let mut stmt = parse(query);
        let mut state = CorrelationState::new();
        let result = handle_statement(&mut stmt, &mut state);
        (result, state)
    }

    #[test]
    fn test_create_property_graph() {
        let (result, _) = dispatch("CREATE PROPERTY GRAPH g VERTEX TABLES (v)");
        let directive = result.expect("应该成功");
        assert_eq!(directive.function_name(), Some("create_property_graph"));
        assert!(directive.requires_valid_transaction);
        assert_eq!(directive.return_type, StatementReturnType::QueryResult);
    }

    #[test]
    fn test_drop_any_target() {
        for query in ["DROP PROPERTY GRAPH g", "DROP TABLE t", "DROP VIEW IF EXISTS v", "DROP SCHEMA s CASCADE"] {
            let (result, _) = dispatch(query);
            let directive = result.expect("DROP 应该成功");
            assert_eq!(directive.function_name(), Some("drop_property_graph"), "查询: {}", query);
        }
    }

    #[test]
    fn test_select_without_function_must_bind() {
        let (result, state) = dispatch("SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id)) x");
        assert_eq!(result.unwrap_err(), PgqError::MustUseBindEntryPoint);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_describe_dispatches() {
        let (result, _) = dispatch("DESCRIBE PROPERTY GRAPH g");
        assert_eq!(result.expect("应该成功").function_name(), Some("describe_property_graph"));
    }

    #[test]
    fn test_create_table_without_query() {
        let (result, _) = dispatch("CREATE TABLE t (a INTEGER)");
        assert_eq!(result.unwrap_err(), PgqError::NotImplemented("CREATE".to_string()));

        let (result, _) = dispatch("CREATE VIEW v AS SELECT * FROM t");
        assert_eq!(result.unwrap_err(), PgqError::NotImplemented("CREATE".to_string()));
    }

    #[test]
    fn test_create_table_as_match_select_must_bind() {
        let (result, state) = dispatch("CREATE TABLE t AS SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id))");
        assert_eq!(result.unwrap_err(), PgqError::MustUseBindEntryPoint);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_create_table_as_falls_through_after_inner_directive() {
        // 内部 SELECT 解析出函数后结果被丢弃
        let mut stmt = parse("CREATE TABLE t AS SELECT 1");
        if let Stmt::Create(create) = &mut stmt {
            if let CreateInfo::Table(info) = &mut create.info {
                info.query = Some(Box::new(parse_select("SUMMARIZE g")));
            }
        }
        let mut state = CorrelationState::new();
        let err = handle_statement(&mut stmt, &mut state).unwrap_err();
        assert_eq!(err, PgqError::NotImplemented("CREATE".to_string()));
    }

    #[test]
    fn test_explain_discards_inner_directive() {
        let (result, _) = dispatch("EXPLAIN DROP PROPERTY GRAPH g");
        assert_eq!(result.unwrap_err(), PgqError::NotImplemented("EXPLAIN".to_string()));
    }

    #[test]
    fn test_copy_rewrites_then_must_bind() {
        let (result, state) = dispatch("COPY (SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id))) TO 'out.csv'");
        assert_eq!(result.unwrap_err(), PgqError::MustUseBindEntryPoint);
        assert_eq!(state.len(), 1);

        let (result, state) = dispatch("COPY t FROM 'in.csv'");
        assert_eq!(result.unwrap_err(), PgqError::MustUseBindEntryPoint);
        assert!(state.is_empty());
    }

    #[test]
    fn test_insert_recurses() {
        let (result, state) = dispatch("INSERT INTO t SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id))");
        assert_eq!(result.unwrap_err(), PgqError::MustUseBindEntryPoint);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_other_statements_not_implemented() {
        let (result, _) = dispatch("PRAGMA foo");
        assert_eq!(result.unwrap_err(), PgqError::NotImplemented("PRAGMA".to_string()));

        let (result, _) = dispatch("BEGIN");
        assert_eq!(result.unwrap_err(), PgqError::NotImplemented("TRANSACTION".to_string()));
    }
}
