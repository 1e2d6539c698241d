//! SELECT 语句定位器
//!
//! 在一个语义层级上找到 SELECT 语句所有 FROM 子句的表引用，交给匹配定位器重写；
//! FROM 目标为元查询时转交元查询处理。
//!
//! 只遍历一层 CTE：CTE 定义自身的 CTE 映射不会被搜索。

use log::trace;

use super::correlation::CorrelationState;
use super::match_locator::find_match_function;
use super::show_handler::parse_show_ref;
use crate::core::PgqResult;
use crate::query::parser::ast::{QueryNode, SelectNode, SelectStmt, TableRef};
use crate::query::planner::PlanDirective;

pub fn find_select_statement(stmt: &mut SelectStmt, state: &mut CorrelationState) -> PgqResult<PlanDirective> {
    match &mut stmt.node {
        QueryNode::Select(node) => {
            if let TableRef::Show(show_ref) = node.from_table.as_ref() {
                return parse_show_ref(show_ref);
            }
            rewrite_select_node(node, state)?;
        }
        QueryNode::Cte(cte_node) => {
            let Some(child) = cte_node.child.as_select_node_mut() else {
                trace!("CTE 节点 {} 的子节点不是 SELECT, 跳过", cte_node.ctename);
                return Ok(PlanDirective::default());
            };
            rewrite_select_node(child, state)?;
        }
        QueryNode::SetOperation(_) => {
            trace!("集合运算节点不做重写");
        }
    }
    Ok(PlanDirective::default())
}

/// 先重写各 CTE 定义的 FROM 目标（按插入顺序），再重写外层 FROM 目标
fn rewrite_select_node(node: &mut SelectNode, state: &mut CorrelationState) -> PgqResult<()> {
    for (name, cte) in node.cte_map.iter_mut() {
        if let Some(body) = cte.query.node.as_select_node_mut() {
            trace!("重写 CTE {}", name);
            find_match_function(&mut body.from_table, state)?;
        }
    }
    find_match_function(&mut node.from_table, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PgqError, Value};
    use crate::query::parser::ast::{CteNode, CteMap, Expr, SelectItem, ShowRef, ShowType, StarExpr};

    fn star() -> Vec<SelectItem> {
        vec![SelectItem::new(Expr::Star(StarExpr { relation_name: None }))]
    }

    #[test]
    fn test_show_ref_delegates() {
        let node = SelectNode::new(
            star(),
            TableRef::Show(ShowRef {
                table_name: "g".to_string(),
                show_type: ShowType::Summary,
            }),
        );
        let mut stmt = SelectStmt::new(QueryNode::Select(node));
        let mut state = CorrelationState::new();

        let directive = find_select_statement(&mut stmt, &mut state).expect("应该成功");
        assert_eq!(directive.function_name(), Some("summarize_property_graph"));
        assert_eq!(directive.parameters, vec![Value::from("g")]);
    }

    #[test]
    fn test_plain_select_returns_default() {
        let node = SelectNode::new(star(), TableRef::base_table("t"));
        let mut stmt = SelectStmt::new(QueryNode::Select(node));
        let mut state = CorrelationState::new();

        let directive = find_select_statement(&mut stmt, &mut state).expect("应该成功");
        assert_eq!(directive, PlanDirective::default());
    }

    #[test]
    fn test_cte_node_with_non_select_child() {
        let child = SelectNode::new(star(), TableRef::EmptyFrom);
        let set_child = QueryNode::Cte(CteNode {
            ctename: "inner".to_string(),
            query: Box::new(QueryNode::Select(child.clone())),
            child: Box::new(QueryNode::Select(child)),
            aliases: Vec::new(),
            cte_map: CteMap::new(),
        });
        let mut stmt = SelectStmt::new(QueryNode::Cte(CteNode {
            ctename: "outer".to_string(),
            query: Box::new(QueryNode::Select(SelectNode::new(star(), TableRef::EmptyFrom))),
            child: Box::new(set_child),
            aliases: Vec::new(),
            cte_map: CteMap::new(),
        }));
        let mut state = CorrelationState::new();

        // 子节点不是 SELECT，不会触碰 EMPTY_FROM
        let directive = find_select_statement(&mut stmt, &mut state).expect("应该成功");
        assert_eq!(directive, PlanDirective::default());
    }

    #[test]
    fn test_error_propagates_from_outer_from() {
        let node = SelectNode::new(star(), TableRef::EmptyFrom);
        let mut stmt = SelectStmt::new(QueryNode::Select(node));
        let mut state = CorrelationState::new();

        let err = find_select_statement(&mut stmt, &mut state).unwrap_err();
        assert_eq!(err, PgqError::UnsupportedConstruct("EMPTY_FROM"));
    }
}
