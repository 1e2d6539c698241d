//! 图匹配定位器
//!
//! 在表引用子树中查找 `duckpgq_match` 表函数调用，把其中的匹配表达式摘到关联状态中，
//! 并用关联索引常量替换。

use log::{debug, trace, warn};

use super::correlation::CorrelationState;
use super::statement_locator::find_select_statement;
use crate::core::{PgqError, PgqResult, Value};
use crate::query::parser::ast::{Expr, TableFunctionRef, TableRef, MATCH_FUNCTION_NAME};

/// 递归查找并原地重写图匹配调用
pub fn find_match_function(table_ref: &mut TableRef, state: &mut CorrelationState) -> PgqResult<()> {
    trace!("查找图匹配调用: {}", table_ref.kind());
    match table_ref {
        TableRef::TableFunction(function_ref) => {
            rewrite_match_call(function_ref, state);
            Ok(())
        }
        TableRef::Subquery(subquery) => {
            find_select_statement(&mut subquery.subquery, state)?;
            Ok(())
        }
        TableRef::Join(join) => {
            find_match_function(&mut join.left, state)?;
            find_match_function(&mut join.right, state)
        }
        // 基表不会包含图匹配调用
        TableRef::BaseTable(_) => Ok(()),
        TableRef::ExpressionList(_)
        | TableRef::EmptyFrom
        | TableRef::Show(_)
        | TableRef::Pivot(_)
        | TableRef::Cte(_)
        | TableRef::ColumnData(_) => {
            warn!("MATCH 语句不支持的表引用类型: {}", table_ref.kind());
            Err(PgqError::UnsupportedConstruct(table_ref.kind()))
        }
    }
}

fn rewrite_match_call(function_ref: &mut TableFunctionRef, state: &mut CorrelationState) {
    let function = &mut function_ref.function;
    if function.function_name != MATCH_FUNCTION_NAME {
        return;
    }
    let Some(Expr::Match(slot)) = function.children.first_mut() else {
        return;
    };

    function_ref.alias = slot.alias.clone();
    let match_expr = std::mem::take(slot);
    let pg_name = match_expr.pg_name.clone();
    let index = state.allocate(match_expr);

    function.children.pop();
    function.children.push(Expr::Constant(Value::Integer(index)));
    debug!("图匹配表达式 (属性图 {}) 已替换为关联索引 {}", pg_name, index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parser::ast::{FunctionExpression, JoinRef, JoinType, MatchExpression};

    fn match_call(pg_name: &str, alias: Option<&str>) -> TableRef {
        let match_expr = MatchExpression {
            pg_name: pg_name.to_string(),
            alias: alias.map(str::to_string),
            ..MatchExpression::default()
        };
        TableRef::TableFunction(TableFunctionRef {
            function: FunctionExpression::new(MATCH_FUNCTION_NAME, vec![Expr::Match(Box::new(match_expr))]),
            alias: None,
            column_name_alias: Vec::new(),
        })
    }

    fn assert_rewritten(table_ref: &TableRef, alias: Option<&str>, index: i32) {
        if let TableRef::TableFunction(function_ref) = table_ref {
            assert_eq!(function_ref.alias.as_deref(), alias);
            assert_eq!(function_ref.function.children, vec![Expr::Constant(Value::Integer(index))]);
        } else {
            panic!("期望表函数, 实际为 {}", table_ref.kind());
        }
    }

    #[test]
    fn test_rewrite_moves_alias_and_expression() {
        let mut state = CorrelationState::new();
        let mut table_ref = match_call("snb", Some("a"));

        find_match_function(&mut table_ref, &mut state).expect("重写应该成功");

        assert_rewritten(&table_ref, Some("a"), 0);
        let stored = state.get(0).expect("匹配表达式应已保存");
        assert_eq!(stored.pg_name, "snb");
        assert_eq!(stored.alias.as_deref(), Some("a"));
    }

    #[test]
    fn test_other_table_function_untouched() {
        let mut state = CorrelationState::new();
        let mut table_ref = TableRef::TableFunction(TableFunctionRef {
            function: FunctionExpression::new("read_csv", vec![Expr::constant("x.csv")]),
            alias: Some("r".to_string()),
            column_name_alias: Vec::new(),
        });
        let before = table_ref.clone();

        find_match_function(&mut table_ref, &mut state).expect("应该成功");
        assert_eq!(table_ref, before);
        assert!(state.is_empty());
    }

    #[test]
    fn test_match_function_without_match_expression_untouched() {
        let mut state = CorrelationState::new();
        let mut table_ref = TableRef::TableFunction(TableFunctionRef {
            function: FunctionExpression::new(MATCH_FUNCTION_NAME, vec![Expr::constant(3)]),
            alias: None,
            column_name_alias: Vec::new(),
        });
        let before = table_ref.clone();

        find_match_function(&mut table_ref, &mut state).expect("应该成功");
        assert_eq!(table_ref, before);
        assert_eq!(state.next_index(), 0);
    }

    #[test]
    fn test_join_rewrites_both_sides() {
        let mut state = CorrelationState::new();
        let mut table_ref = TableRef::Join(JoinRef {
            left: Box::new(match_call("g", Some("l"))),
            right: Box::new(match_call("g", Some("r"))),
            join_type: JoinType::Cross,
            condition: None,
            using_columns: Vec::new(),
        });

        find_match_function(&mut table_ref, &mut state).expect("重写应该成功");

        let TableRef::Join(join) = &table_ref else {
            panic!("期望连接");
        };
        assert_rewritten(&join.left, Some("l"), 0);
        assert_rewritten(&join.right, Some("r"), 1);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_base_table_is_noop() {
        let mut state = CorrelationState::new();
        let mut table_ref = TableRef::base_table("t");
        find_match_function(&mut table_ref, &mut state).expect("应该成功");
        assert_eq!(table_ref, TableRef::base_table("t"));
    }

    #[test]
    fn test_unsupported_kinds() {
        let mut state = CorrelationState::new();
        let mut table_ref = TableRef::EmptyFrom;
        let err = find_match_function(&mut table_ref, &mut state).unwrap_err();
        assert_eq!(err, PgqError::UnsupportedConstruct("EMPTY_FROM"));
    }
}
