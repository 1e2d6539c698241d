//! 图模式 AST 定义
//!
//! `GRAPH_TABLE (g MATCH ... COLUMNS (...))` 解析后得到的匹配表达式。

use serde::Serialize;

use super::expr::{Expr, SelectItem};

/// 承载图匹配表达式的表函数名称
pub const MATCH_FUNCTION_NAME: &str = "duckpgq_match";

/// 图匹配表达式
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchExpression {
    /// 属性图名称
    pub pg_name: String,
    /// `GRAPH_TABLE (...) AS alias` 中的别名
    pub alias: Option<String>,
    pub path_patterns: Vec<PathPattern>,
    pub column_list: Vec<SelectItem>,
    pub where_clause: Option<Box<Expr>>,
}

/// 路径模式，`[p =] (a)-[e]->(b)...`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathPattern {
    pub variable: Option<String>,
    pub elements: Vec<PathElement>,
}

impl PathPattern {
    pub fn vertices(&self) -> impl Iterator<Item = &VertexPattern> {
        self.elements.iter().filter_map(|e| match e {
            PathElement::Vertex(v) => Some(v),
            PathElement::Edge(_) => None,
        })
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgePattern> {
        self.elements.iter().filter_map(|e| match e {
            PathElement::Edge(edge) => Some(edge),
            PathElement::Vertex(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PathElement {
    Vertex(VertexPattern),
    Edge(EdgePattern),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexPattern {
    pub variable: Option<String>,
    pub label: Option<String>,
    pub where_clause: Option<Box<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeDirection {
    /// `-[]->`
    Right,
    /// `<-[]-`
    Left,
    /// `-[]-`
    Any,
    /// `<-[]->`
    Both,
}

/// 边重复量词，`{min,max}`；`*` 为 `{0,}`，`+` 为 `{1,}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quantifier {
    pub min: u32,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePattern {
    pub variable: Option<String>,
    pub label: Option<String>,
    pub direction: EdgeDirection,
    pub quantifier: Option<Quantifier>,
    pub where_clause: Option<Box<Expr>>,
}
