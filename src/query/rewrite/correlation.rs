//! 关联状态
//!
//! 记录被摘出语句树的图匹配表达式。每个表达式分配一个递增的关联索引，
//! 下游表函数凭索引取回原表达式。

use std::collections::HashMap;

use crate::query::parser::ast::MatchExpression;

/// 关联状态
///
/// 索引在会话内单调递增，不会复用，映射只增不减。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationState {
    /// 下一个待分配的索引
    match_index: i32,
    /// 索引到匹配表达式的映射
    transform_expression: HashMap<i32, Box<MatchExpression>>,
}

impl CorrelationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接管匹配表达式并返回分配的索引
    pub fn allocate(&mut self, expr: Box<MatchExpression>) -> i32 {
        let index = self.match_index;
        self.transform_expression.insert(index, expr);
        self.match_index += 1;
        index
    }

    pub fn get(&self, index: i32) -> Option<&MatchExpression> {
        self.transform_expression.get(&index).map(Box::as_ref)
    }

    pub fn next_index(&self) -> i32 {
        self.match_index
    }

    pub fn len(&self) -> usize {
        self.transform_expression.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transform_expression.is_empty()
    }
}
