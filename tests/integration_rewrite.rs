//! 图匹配重写集成测试
//!
//! 测试范围:
//! - rewrite::CorrelationState - 关联索引分配
//! - rewrite::find_select_statement - SELECT 语句中 FROM 目标与 CTE 的遍历
//! - rewrite::find_match_function - 表引用树中的图匹配调用重写

mod common;

use common::{parse_stmt, pending_match, rewritten_index, select_node_mut};
use graph_pgq::core::{PgqError, Value};
use graph_pgq::query::parser::ast::{Expr, MatchExpression, Stmt, TableRef};
use graph_pgq::query::rewrite::{find_select_statement, CorrelationState};

const MATCH_QUERY: &str = "SELECT * FROM GRAPH_TABLE (snb MATCH (a:Person)-[k:knows]->(b:Person) COLUMNS (a.id, b.id)) friends";

fn rewrite(stmt: &mut Stmt, state: &mut CorrelationState) -> Result<(), PgqError> {
    let Stmt::Select(select) = stmt else {
        panic!("期望 SELECT 语句");
    };
    find_select_statement(select, state).map(|_| ())
}

// ==================== 关联索引分配 ====================

#[test]
fn test_correlation_indices_are_sequential() {
    let mut state = CorrelationState::new();
    for expected in 0..5 {
        let index = state.allocate(Box::new(MatchExpression {
            pg_name: format!("g{}", expected),
            ..MatchExpression::default()
        }));
        assert_eq!(index, expected);
    }

    assert_eq!(state.len(), 5);
    assert_eq!(state.next_index(), 5);
    for index in 0..5 {
        let expr = state.get(index).expect("每个索引都应能取回");
        assert_eq!(expr.pg_name, format!("g{}", index));
    }
}

#[test]
fn test_indices_continue_across_statements() {
    let mut state = CorrelationState::new();

    let mut first = parse_stmt(MATCH_QUERY);
    rewrite(&mut first, &mut state).expect("重写应该成功");
    let mut second = parse_stmt(MATCH_QUERY);
    rewrite(&mut second, &mut state).expect("重写应该成功");

    assert_eq!(rewritten_index(&select_node_mut(&mut first).from_table), 0);
    assert_eq!(rewritten_index(&select_node_mut(&mut second).from_table), 1);
    assert_eq!(state.len(), 2);
}

// ==================== 单个图匹配调用 ====================

#[test]
fn test_match_call_is_replaced_by_index() {
    let mut stmt = parse_stmt(MATCH_QUERY);
    let original = pending_match(&select_node_mut(&mut stmt).from_table).clone();
    let mut state = CorrelationState::new();

    rewrite(&mut stmt, &mut state).expect("重写应该成功");

    let from = &select_node_mut(&mut stmt).from_table;
    assert_eq!(rewritten_index(from), 0);
    assert_eq!(from.alias(), Some("friends"));

    // 关联状态中保存的是完整的原表达式
    assert_eq!(state.get(0), Some(&original));
    assert_eq!(original.pg_name, "snb");
    assert_eq!(original.path_patterns.len(), 1);
}

#[test]
fn test_match_without_alias_clears_function_alias() {
    let mut stmt = parse_stmt("SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id))");
    let mut state = CorrelationState::new();

    rewrite(&mut stmt, &mut state).expect("重写应该成功");

    let from = &select_node_mut(&mut stmt).from_table;
    assert_eq!(rewritten_index(from), 0);
    assert_eq!(from.alias(), None);
}

#[test]
fn test_other_table_functions_untouched() {
    let mut stmt = parse_stmt("SELECT * FROM read_csv('people.csv') p");
    let before = stmt.clone();
    let mut state = CorrelationState::new();

    rewrite(&mut stmt, &mut state).expect("重写应该成功");

    assert_eq!(stmt, before);
    assert!(state.is_empty());
}

// ==================== JOIN 与子查询 ====================

#[test]
fn test_join_of_two_matches_gets_distinct_indices() {
    let mut stmt = parse_stmt(
        "SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id)) x \
         JOIN GRAPH_TABLE (h MATCH (b) COLUMNS (b.id)) y USING (id)",
    );
    let mut state = CorrelationState::new();

    rewrite(&mut stmt, &mut state).expect("重写应该成功");

    let TableRef::Join(join) = select_node_mut(&mut stmt).from_table.as_ref() else {
        panic!("期望 JOIN");
    };
    // 先左后右
    assert_eq!(rewritten_index(&join.left), 0);
    assert_eq!(rewritten_index(&join.right), 1);
    assert_eq!(state.get(0).map(|e| e.pg_name.as_str()), Some("g"));
    assert_eq!(state.get(1).map(|e| e.pg_name.as_str()), Some("h"));
}

#[test]
fn test_match_inside_from_subquery() {
    let mut stmt = parse_stmt("SELECT * FROM (SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id)) x) s");
    let mut state = CorrelationState::new();

    rewrite(&mut stmt, &mut state).expect("重写应该成功");

    let TableRef::Subquery(subquery) = select_node_mut(&mut stmt).from_table.as_ref() else {
        panic!("期望子查询");
    };
    let inner = subquery.subquery.node.as_select_node().expect("子查询应为 SELECT 节点");
    assert_eq!(rewritten_index(&inner.from_table), 0);
    assert_eq!(state.len(), 1);
}

// ==================== CTE ====================

#[test]
fn test_cte_rewritten_before_outer_from() {
    let mut stmt = parse_stmt(
        "WITH c AS (SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id)) x) \
         SELECT * FROM c, GRAPH_TABLE (h MATCH (b) COLUMNS (b.id)) y",
    );
    let mut state = CorrelationState::new();

    rewrite(&mut stmt, &mut state).expect("重写应该成功");

    let node = select_node_mut(&mut stmt);
    let cte = node.cte_map.get("c").expect("CTE 应存在");
    let body = cte.query.node.as_select_node().expect("CTE 定义应为 SELECT 节点");
    assert_eq!(rewritten_index(&body.from_table), 0);

    let TableRef::Join(join) = node.from_table.as_ref() else {
        panic!("期望逗号连接");
    };
    assert!(matches!(join.left.as_ref(), TableRef::BaseTable(_)));
    assert_eq!(rewritten_index(&join.right), 1);

    assert_eq!(state.get(0).map(|e| e.pg_name.as_str()), Some("g"));
    assert_eq!(state.get(1).map(|e| e.pg_name.as_str()), Some("h"));
}

#[test]
fn test_ctes_rewritten_in_declaration_order() {
    let mut stmt = parse_stmt(
        "WITH second AS (SELECT * FROM GRAPH_TABLE (g2 MATCH (a) COLUMNS (a.id))), \
         first AS (SELECT * FROM GRAPH_TABLE (g1 MATCH (a) COLUMNS (a.id))) \
         SELECT * FROM first",
    );
    let mut state = CorrelationState::new();

    rewrite(&mut stmt, &mut state).expect("重写应该成功");

    assert_eq!(state.get(0).map(|e| e.pg_name.as_str()), Some("g2"));
    assert_eq!(state.get(1).map(|e| e.pg_name.as_str()), Some("g1"));
}

#[test]
fn test_nested_cte_not_searched() {
    let mut stmt = parse_stmt(
        "WITH outer_cte AS (WITH inner_cte AS (SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id))) \
         SELECT * FROM inner_cte) SELECT * FROM outer_cte",
    );
    let mut state = CorrelationState::new();

    rewrite(&mut stmt, &mut state).expect("重写应该成功");

    assert!(state.is_empty());
    let node = select_node_mut(&mut stmt);
    let outer = node.cte_map.get("outer_cte").expect("外层 CTE 应存在");
    let inner = outer
        .query
        .node
        .cte_map()
        .get("inner_cte")
        .expect("内层 CTE 应存在");
    let body = inner.query.node.as_select_node().expect("内层 CTE 应为 SELECT 节点");
    assert_eq!(pending_match(&body.from_table).pg_name, "g");
}

// ==================== 不支持的构造 ====================

#[test]
fn test_values_in_from_unsupported() {
    let mut stmt = parse_stmt("SELECT * FROM (VALUES (1), (2)) v");
    let mut state = CorrelationState::new();

    let err = rewrite(&mut stmt, &mut state).unwrap_err();
    assert_eq!(err, PgqError::UnsupportedConstruct("EXPRESSION_LIST"));
}

#[test]
fn test_select_without_from_unsupported() {
    let mut stmt = parse_stmt("SELECT 1");
    let mut state = CorrelationState::new();

    let err = rewrite(&mut stmt, &mut state).unwrap_err();
    assert_eq!(err, PgqError::UnsupportedConstruct("EMPTY_FROM"));
}

#[test]
fn test_error_after_partial_rewrite_keeps_allocations() {
    let mut stmt = parse_stmt(
        "SELECT * FROM GRAPH_TABLE (g MATCH (a) COLUMNS (a.id)) x, (VALUES (1)) v",
    );
    let mut state = CorrelationState::new();

    let err = rewrite(&mut stmt, &mut state).unwrap_err();
    assert_eq!(err, PgqError::UnsupportedConstruct("EXPRESSION_LIST"));
    // 左侧已经被重写，索引不会回收
    assert_eq!(state.len(), 1);
    assert_eq!(state.next_index(), 1);
}

#[test]
fn test_show_from_is_unrecognized_mode() {
    let mut stmt = parse_stmt("SHOW TABLES FROM main");
    let mut state = CorrelationState::new();

    let err = rewrite(&mut stmt, &mut state).unwrap_err();
    assert!(matches!(err, PgqError::UnrecognizedMode(_)));
}

#[test]
fn test_index_constant_is_integer_value() {
    let mut stmt = parse_stmt(MATCH_QUERY);
    let mut state = CorrelationState::new();
    rewrite(&mut stmt, &mut state).expect("重写应该成功");

    let TableRef::TableFunction(function_ref) = select_node_mut(&mut stmt).from_table.as_ref() else {
        panic!("期望表函数");
    };
    assert_eq!(function_ref.function.function_name, "duckpgq_match");
    assert_eq!(function_ref.function.children, vec![Expr::Constant(Value::Integer(0))]);
}
