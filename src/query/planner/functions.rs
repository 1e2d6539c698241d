//! 下游表函数描述
//!
//! 属性图的创建、删除、描述与汇总由宿主中的表函数执行，这里只给出它们的名称与参数类型。

use serde::Serialize;
use std::fmt;

use crate::core::LogicalType;

/// 表函数类型枚举（替代字符串）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TableFunctionKind {
    CreatePropertyGraph,
    DropPropertyGraph,
    DescribePropertyGraph,
    SummarizePropertyGraph,
}

impl TableFunctionKind {
    /// 从函数名解析表函数类型
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "create_property_graph" => Some(TableFunctionKind::CreatePropertyGraph),
            "drop_property_graph" => Some(TableFunctionKind::DropPropertyGraph),
            "describe_property_graph" => Some(TableFunctionKind::DescribePropertyGraph),
            "summarize_property_graph" => Some(TableFunctionKind::SummarizePropertyGraph),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableFunctionKind::CreatePropertyGraph => "create_property_graph",
            TableFunctionKind::DropPropertyGraph => "drop_property_graph",
            TableFunctionKind::DescribePropertyGraph => "describe_property_graph",
            TableFunctionKind::SummarizePropertyGraph => "summarize_property_graph",
        }
    }
}

impl fmt::Display for TableFunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 表函数描述：名称加参数类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFunction {
    pub kind: TableFunctionKind,
    pub arguments: Vec<LogicalType>,
}

impl TableFunction {
    pub fn new(kind: TableFunctionKind, arguments: Vec<LogicalType>) -> Self {
        Self { kind, arguments }
    }

    pub fn create_property_graph() -> Self {
        Self::new(TableFunctionKind::CreatePropertyGraph, Vec::new())
    }

    pub fn drop_property_graph() -> Self {
        Self::new(TableFunctionKind::DropPropertyGraph, Vec::new())
    }

    pub fn describe_property_graph() -> Self {
        Self::new(TableFunctionKind::DescribePropertyGraph, Vec::new())
    }

    /// 以属性图名称（VARCHAR）为参数
    pub fn summarize_property_graph() -> Self {
        Self::new(TableFunctionKind::SummarizePropertyGraph, vec![LogicalType::Varchar])
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_names_round_trip() {
        for function in [
            TableFunction::create_property_graph(),
            TableFunction::drop_property_graph(),
            TableFunction::describe_property_graph(),
            TableFunction::summarize_property_graph(),
        ] {
            assert_eq!(TableFunctionKind::from_name(function.name()), Some(function.kind));
        }
        assert_eq!(TableFunctionKind::from_name("duckpgq_match"), None);
    }

    #[test]
    fn test_summarize_takes_varchar() {
        assert_eq!(TableFunction::summarize_property_graph().arguments, vec![LogicalType::Varchar]);
        assert!(TableFunction::describe_property_graph().arguments.is_empty());
    }
}
