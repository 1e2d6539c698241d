//! 表引用 AST 定义
//!
//! FROM 子句中的各种表引用。变体集合是封闭的，重写器对每个变体都有明确的处理。

use serde::Serialize;
use std::fmt;

use super::expr::{Expr, FunctionExpression};
use super::stmt::SelectStmt;
use crate::core::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableRef {
    BaseTable(BaseTableRef),
    TableFunction(TableFunctionRef),
    Subquery(SubqueryRef),
    Join(JoinRef),
    /// `VALUES (...), (...)`
    ExpressionList(ExpressionListRef),
    /// 没有 FROM 子句
    EmptyFrom,
    /// DESCRIBE / SUMMARIZE / SHOW 生成的元查询引用
    Show(ShowRef),
    Pivot(PivotRef),
    /// 已绑定的 CTE 引用，由宿主生成
    Cte(CteRef),
    /// 已物化的行集合，由宿主生成
    ColumnData(ColumnDataRef),
}

impl TableRef {
    /// 表引用类型名称
    pub fn kind(&self) -> &'static str {
        match self {
            TableRef::BaseTable(_) => "BASE_TABLE",
            TableRef::TableFunction(_) => "TABLE_FUNCTION",
            TableRef::Subquery(_) => "SUBQUERY",
            TableRef::Join(_) => "JOIN",
            TableRef::ExpressionList(_) => "EXPRESSION_LIST",
            TableRef::EmptyFrom => "EMPTY_FROM",
            TableRef::Show(_) => "SHOW_REF",
            TableRef::Pivot(_) => "PIVOT",
            TableRef::Cte(_) => "CTE",
            TableRef::ColumnData(_) => "COLUMN_DATA",
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            TableRef::BaseTable(t) => t.alias.as_deref(),
            TableRef::TableFunction(t) => t.alias.as_deref(),
            TableRef::Subquery(t) => t.alias.as_deref(),
            TableRef::ExpressionList(t) => t.alias.as_deref(),
            TableRef::Pivot(t) => t.alias.as_deref(),
            TableRef::Cte(t) => t.alias.as_deref(),
            TableRef::ColumnData(t) => t.alias.as_deref(),
            TableRef::Join(_) | TableRef::EmptyFrom | TableRef::Show(_) => None,
        }
    }

    pub fn set_alias(&mut self, alias: Option<String>) {
        match self {
            TableRef::BaseTable(t) => t.alias = alias,
            TableRef::TableFunction(t) => t.alias = alias,
            TableRef::Subquery(t) => t.alias = alias,
            TableRef::ExpressionList(t) => t.alias = alias,
            TableRef::Pivot(t) => t.alias = alias,
            TableRef::Cte(t) => t.alias = alias,
            TableRef::ColumnData(t) => t.alias = alias,
            TableRef::Join(_) | TableRef::EmptyFrom | TableRef::Show(_) => {}
        }
    }

    pub fn base_table(name: impl Into<String>) -> Self {
        TableRef::BaseTable(BaseTableRef {
            schema_name: None,
            table_name: name.into(),
            alias: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseTableRef {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub alias: Option<String>,
}

/// 表函数调用，`func(args) [AS alias]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableFunctionRef {
    pub function: FunctionExpression,
    pub alias: Option<String>,
    pub column_name_alias: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubqueryRef {
    pub subquery: Box<SelectStmt>,
    pub alias: Option<String>,
    pub column_name_alias: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinRef {
    pub left: Box<TableRef>,
    pub right: Box<TableRef>,
    pub join_type: JoinType,
    pub condition: Option<Expr>,
    pub using_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionListRef {
    pub values: Vec<Vec<Expr>>,
    pub alias: Option<String>,
}

/// 元查询的模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShowType {
    Summary,
    Describe,
    ShowFrom,
    ShowUnqualified,
}

impl fmt::Display for ShowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowType::Summary => write!(f, "SUMMARY"),
            ShowType::Describe => write!(f, "DESCRIBE"),
            ShowType::ShowFrom => write!(f, "SHOW_FROM"),
            ShowType::ShowUnqualified => write!(f, "SHOW_UNQUALIFIED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowRef {
    pub table_name: String,
    pub show_type: ShowType,
}

/// `source PIVOT (agg FOR column IN (v, ...))`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRef {
    pub source: Box<TableRef>,
    pub aggregates: Vec<Expr>,
    pub pivot_column: String,
    pub pivot_values: Vec<Expr>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CteRef {
    pub cte_name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDataRef {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub alias: Option<String>,
}
