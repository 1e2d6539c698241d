//! 集成测试共享工具模块
//!
//! 提供语句解析、会话构造和重写结果检查等辅助函数，供所有集成测试使用

#![allow(dead_code)]

use std::sync::Arc;

use graph_pgq::extension::{register_pgq_state, ClientContext, ParserExtensionInfo, PgqState, DEFAULT_STATE_KEY};
use graph_pgq::query::parser::ast::{Expr, MatchExpression, QueryNode, SelectNode, Stmt, TableFunctionRef, TableRef};
use graph_pgq::query::parser::Parser;
use graph_pgq::core::Value;
use parking_lot::Mutex;

/// 解析一条语句，失败时直接让测试失败
pub fn parse_stmt(query: &str) -> Stmt {
    match Parser::new(query).parse_statement() {
        Ok(stmt) => stmt,
        Err(e) => panic!("解析 `{}` 失败: {}", query, e),
    }
}

/// 取出 SELECT 语句最外层的 SELECT 节点
pub fn select_node_mut(stmt: &mut Stmt) -> &mut SelectNode {
    match stmt {
        Stmt::Select(select) => match &mut select.node {
            QueryNode::Select(node) => node,
            other => panic!("期望 SELECT 节点, 实际为 {}", other.kind()),
        },
        other => panic!("期望 SELECT 语句, 实际为 {}", other.kind()),
    }
}

/// 创建一个已注册 PGQ 状态的会话
pub fn session(session_id: i64) -> (ClientContext, Arc<Mutex<PgqState>>) {
    let context = ClientContext::new(session_id);
    let state = register_pgq_state(&context, DEFAULT_STATE_KEY);
    (context, state)
}

pub fn extension_info() -> ParserExtensionInfo {
    ParserExtensionInfo::default()
}

/// 断言表引用是已重写的图匹配调用，返回其关联索引
pub fn rewritten_index(table_ref: &TableRef) -> i32 {
    let TableRef::TableFunction(TableFunctionRef { function, .. }) = table_ref else {
        panic!("期望表函数, 实际为 {}", table_ref.kind());
    };
    assert_eq!(function.children.len(), 1, "重写后应只剩一个参数");
    match &function.children[0] {
        Expr::Constant(Value::Integer(index)) => *index,
        other => panic!("期望关联索引常量, 实际为 {}", other.kind()),
    }
}

/// 断言表引用仍是携带匹配表达式的原始调用
pub fn pending_match(table_ref: &TableRef) -> &MatchExpression {
    let TableRef::TableFunction(TableFunctionRef { function, .. }) = table_ref else {
        panic!("期望表函数, 实际为 {}", table_ref.kind());
    };
    function
        .children
        .first()
        .and_then(Expr::as_match)
        .expect("应仍保留匹配表达式")
}
