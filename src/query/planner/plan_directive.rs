//! 计划指令
//!
//! 分发器的输出：告诉宿主规划器应当调用哪个表函数、传什么参数以及结果形态。

use serde::Serialize;

use super::functions::TableFunction;
use crate::core::Value;

/// 语句返回形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StatementReturnType {
    /// 返回结果集
    #[default]
    QueryResult,
    /// 返回受影响行数
    ChangedRows,
    /// 无返回
    Nothing,
}

/// 计划指令
///
/// 默认指令不绑定任何函数，要求事务，返回结果集，与宿主的默认值一致。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDirective {
    pub function: Option<TableFunction>,
    pub parameters: Vec<Value>,
    pub requires_valid_transaction: bool,
    pub return_type: StatementReturnType,
}

impl Default for PlanDirective {
    fn default() -> Self {
        Self {
            function: None,
            parameters: Vec::new(),
            requires_valid_transaction: true,
            return_type: StatementReturnType::QueryResult,
        }
    }
}

impl PlanDirective {
    /// 绑定函数的指令：要求事务，返回结果集
    pub fn with_function(function: TableFunction) -> Self {
        Self {
            function: Some(function),
            ..Self::default()
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn has_function(&self) -> bool {
        self.function.is_some()
    }

    pub fn function_name(&self) -> Option<&'static str> {
        self.function.as_ref().map(TableFunction::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let directive = PlanDirective::default();
        assert!(!directive.has_function());
        assert!(directive.parameters.is_empty());
        assert!(directive.requires_valid_transaction);
        assert_eq!(directive.return_type, StatementReturnType::QueryResult);
    }

    #[test]
    fn test_directive_with_function() {
        let directive = PlanDirective::with_function(TableFunction::summarize_property_graph())
            .with_parameters(vec![Value::from("g")]);
        assert_eq!(directive.function_name(), Some("summarize_property_graph"));
        assert_eq!(directive.parameters, vec![Value::Varchar("g".to_string())]);
        assert!(directive.requires_valid_transaction);
    }
}
