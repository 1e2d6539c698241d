//! 语句 AST 定义
//!
//! 基于枚举的语句定义，覆盖 PGQ 扩展需要识别的 SQL 语句。

use serde::Serialize;

use super::expr::{Expr, OrderByItem, SelectItem};
use super::table_ref::TableRef;
use crate::core::{LogicalType, Value};

/// 语句枚举
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Select(SelectStmt),
    Create(CreateStmt),
    Drop(DropStmt),
    Explain(ExplainStmt),
    Copy(CopyStmt),
    Insert(InsertStmt),
    Pragma(PragmaStmt),
    Transaction(TransactionStmt),
}

impl Stmt {
    /// 获取语句类型名称
    pub fn kind(&self) -> &'static str {
        match self {
            Stmt::Select(_) => "SELECT",
            Stmt::Create(_) => "CREATE",
            Stmt::Drop(_) => "DROP",
            Stmt::Explain(_) => "EXPLAIN",
            Stmt::Copy(_) => "COPY",
            Stmt::Insert(_) => "INSERT",
            Stmt::Pragma(_) => "PRAGMA",
            Stmt::Transaction(_) => "TRANSACTION",
        }
    }
}

/// SELECT 语句
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectStmt {
    pub node: QueryNode,
}

impl SelectStmt {
    pub fn new(node: QueryNode) -> Self {
        Self { node }
    }
}

/// 查询节点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QueryNode {
    Select(SelectNode),
    /// 物化 CTE 包装节点
    Cte(CteNode),
    SetOperation(SetOperationNode),
}

impl QueryNode {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryNode::Select(_) => "SELECT_NODE",
            QueryNode::Cte(_) => "CTE_NODE",
            QueryNode::SetOperation(_) => "SET_OPERATION_NODE",
        }
    }

    pub fn as_select_node(&self) -> Option<&SelectNode> {
        match self {
            QueryNode::Select(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_select_node_mut(&mut self) -> Option<&mut SelectNode> {
        match self {
            QueryNode::Select(node) => Some(node),
            _ => None,
        }
    }

    pub fn cte_map(&self) -> &CteMap {
        match self {
            QueryNode::Select(node) => &node.cte_map,
            QueryNode::Cte(node) => &node.cte_map,
            QueryNode::SetOperation(node) => &node.cte_map,
        }
    }

    pub fn cte_map_mut(&mut self) -> &mut CteMap {
        match self {
            QueryNode::Select(node) => &mut node.cte_map,
            QueryNode::Cte(node) => &mut node.cte_map,
            QueryNode::SetOperation(node) => &mut node.cte_map,
        }
    }
}

/// 普通 SELECT 节点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectNode {
    pub select_list: Vec<SelectItem>,
    pub from_table: Box<TableRef>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub distinct: bool,
    pub cte_map: CteMap,
}

impl SelectNode {
    pub fn new(select_list: Vec<SelectItem>, from_table: TableRef) -> Self {
        Self {
            select_list,
            from_table: Box::new(from_table),
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct: false,
            cte_map: CteMap::new(),
        }
    }
}

/// 物化 CTE 节点：`query` 为 CTE 定义，`child` 为引用它的查询
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CteNode {
    pub ctename: String,
    pub query: Box<QueryNode>,
    pub child: Box<QueryNode>,
    pub aliases: Vec<String>,
    pub cte_map: CteMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SetOperationType {
    Union,
    Except,
    Intersect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetOperationNode {
    pub op: SetOperationType,
    pub all: bool,
    pub left: Box<QueryNode>,
    pub right: Box<QueryNode>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub cte_map: CteMap,
}

/// 公共表表达式定义
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonTableExpression {
    pub aliases: Vec<String>,
    pub query: Box<SelectStmt>,
    pub materialized: bool,
    pub recursive: bool,
}

/// CTE 名称到定义的映射，保持插入顺序
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CteMap {
    entries: Vec<(String, CommonTableExpression)>,
}

impl CteMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖同名 CTE，覆盖时保留原位置
    pub fn insert(&mut self, name: String, cte: CommonTableExpression) {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = cte;
        } else {
            self.entries.push((name, cte));
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommonTableExpression> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, cte)| cte)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommonTableExpression)> {
        self.entries.iter().map(|(n, cte)| (n.as_str(), cte))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut CommonTableExpression)> {
        self.entries.iter_mut().map(|(n, cte)| (n.as_str(), cte))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 创建冲突策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OnCreateConflict {
    Error,
    Ignore,
    Replace,
}

/// CREATE 语句
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateStmt {
    pub info: CreateInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CreateInfo {
    PropertyGraph(CreatePropertyGraphInfo),
    Table(CreateTableInfo),
    View(CreateViewInfo),
}

impl CreateInfo {
    pub fn kind(&self) -> &'static str {
        match self {
            CreateInfo::PropertyGraph(_) => "PROPERTY_GRAPH",
            CreateInfo::Table(_) => "TABLE",
            CreateInfo::View(_) => "VIEW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePropertyGraphInfo {
    pub property_graph_name: String,
    pub vertex_tables: Vec<PropertyGraphTable>,
    pub edge_tables: Vec<PropertyGraphTable>,
    pub on_conflict: OnCreateConflict,
}

/// 属性图中的顶点表或边表
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyGraphTable {
    pub table_name: String,
    pub table_alias: Option<String>,
    /// 主标签，缺省为表名
    pub main_label: String,
    pub is_vertex_table: bool,
    pub source_reference: Option<String>,
    pub source_fk: Vec<String>,
    pub source_pk: Vec<String>,
    pub destination_reference: Option<String>,
    pub destination_fk: Vec<String>,
    pub destination_pk: Vec<String>,
}

impl PropertyGraphTable {
    pub fn vertex(table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        Self {
            main_label: table_name.clone(),
            table_name,
            table_alias: None,
            is_vertex_table: true,
            source_reference: None,
            source_fk: Vec::new(),
            source_pk: Vec::new(),
            destination_reference: None,
            destination_fk: Vec::new(),
            destination_pk: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub logical_type: LogicalType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTableInfo {
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<ColumnDefinition>,
    /// CREATE TABLE ... AS SELECT
    pub query: Option<Box<SelectStmt>>,
    pub on_conflict: OnCreateConflict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateViewInfo {
    pub schema: Option<String>,
    pub view_name: String,
    pub query: Box<SelectStmt>,
    pub on_conflict: OnCreateConflict,
}

/// DROP 语句
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropStmt {
    pub info: DropInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropType {
    Table,
    View,
    Schema,
    PropertyGraph,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropInfo {
    pub drop_type: DropType,
    pub schema: Option<String>,
    pub name: String,
    pub if_exists: bool,
    pub cascade: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExplainType {
    Standard,
    Analyze,
}

/// EXPLAIN 语句
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainStmt {
    pub stmt: Box<Stmt>,
    pub explain_type: ExplainType,
}

/// COPY 语句
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyStmt {
    pub info: CopyInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyInfo {
    pub schema: Option<String>,
    pub table: Option<String>,
    pub select_list: Vec<String>,
    /// `COPY (query) TO` 或 `COPY t TO` 生成的源查询；`COPY t FROM` 时为空
    pub select_statement: Option<Box<QueryNode>>,
    pub file_path: String,
    pub is_from: bool,
    pub options: Vec<(String, Vec<Value>)>,
}

/// INSERT 语句
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertStmt {
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    pub select_statement: Box<SelectStmt>,
    pub or_replace: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PragmaType {
    /// `PRAGMA name`
    Nothing,
    /// `PRAGMA name = value`
    Assignment,
    /// `PRAGMA name(args)`
    Call,
}

/// PRAGMA 语句
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PragmaStmt {
    pub name: String,
    pub parameters: Vec<Value>,
    pub pragma_type: PragmaType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionType {
    Begin,
    Commit,
    Rollback,
}

/// 事务控制语句
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionStmt {
    pub transaction_type: TransactionType,
}
