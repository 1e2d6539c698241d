//! 表达式 AST 定义

use serde::Serialize;

use super::pattern::MatchExpression;
use super::stmt::SelectStmt;
use crate::core::{LogicalType, Value};

/// 表达式枚举
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Constant(Value),
    Column(ColumnRef),
    Star(StarExpr),
    Function(FunctionExpression),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    IsNull(IsNullExpr),
    InList(InListExpr),
    Between(BetweenExpr),
    Case(CaseExpr),
    Cast(CastExpr),
    Subquery(SubqueryExpr),
    /// 图匹配表达式，只应作为 `duckpgq_match` 表函数的唯一参数出现
    Match(Box<MatchExpression>),
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn column(names: &[&str]) -> Self {
        Expr::Column(ColumnRef {
            names: names.iter().map(|n| n.to_string()).collect(),
        })
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    pub fn as_match(&self) -> Option<&MatchExpression> {
        match self {
            Expr::Match(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expr::Constant(v) => Some(v),
            _ => None,
        }
    }

    /// 表达式类型名称
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "CONSTANT",
            Expr::Column(_) => "COLUMN_REF",
            Expr::Star(_) => "STAR",
            Expr::Function(_) => "FUNCTION",
            Expr::Binary(_) => "BINARY",
            Expr::Unary(_) => "UNARY",
            Expr::IsNull(_) => "IS_NULL",
            Expr::InList(_) => "IN_LIST",
            Expr::Between(_) => "BETWEEN",
            Expr::Case(_) => "CASE",
            Expr::Cast(_) => "CAST",
            Expr::Subquery(_) => "SUBQUERY",
            Expr::Match(_) => "MATCH",
        }
    }
}

/// 列引用，可带表名/模式名限定
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRef {
    pub names: Vec<String>,
}

impl ColumnRef {
    pub fn column_name(&self) -> &str {
        self.names.last().map(String::as_str).unwrap_or("")
    }
}

/// `*` 或 `t.*`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarExpr {
    pub relation_name: Option<String>,
}

/// 函数调用
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionExpression {
    pub schema: Option<String>,
    pub function_name: String,
    pub children: Vec<Expr>,
    pub distinct: bool,
}

impl FunctionExpression {
    pub fn new(function_name: impl Into<String>, children: Vec<Expr>) -> Self {
        Self {
            schema: None,
            function_name: function_name.into(),
            children,
            distinct: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Like,
    NotLike,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinaryOp,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsNullExpr {
    pub expr: Box<Expr>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InListExpr {
    pub expr: Box<Expr>,
    pub list: Vec<Expr>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetweenExpr {
    pub expr: Box<Expr>,
    pub lower: Box<Expr>,
    pub upper: Box<Expr>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseExpr {
    pub operand: Option<Box<Expr>>,
    pub when_then: Vec<(Expr, Expr)>,
    pub else_expr: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastExpr {
    pub expr: Box<Expr>,
    pub target: LogicalType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubqueryKind {
    Scalar,
    Exists,
}

/// 表达式位置上的子查询；分发器不会进入其中查找图匹配
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubqueryExpr {
    pub kind: SubqueryKind,
    pub subquery: Box<SelectStmt>,
}

/// 投影项，`expr [AS alias]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderByItem {
    pub expr: Expr,
    pub direction: OrderDirection,
}
