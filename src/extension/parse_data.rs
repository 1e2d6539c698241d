//! 解析数据
//!
//! 解析钩子的产物。宿主只把它当作不透明对象保存，计划钩子再通过 `Any` 向下转型取回语句。

use std::any::Any;
use std::fmt;

use crate::query::parser::ast::Stmt;

/// 解析扩展产出的不透明解析数据
pub trait ParserExtensionParseData: Any + Send + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn copy(&self) -> Box<dyn ParserExtensionParseData>;

    fn to_string(&self) -> String;
}

/// 持有恰好一条语句的 PGQ 解析数据
#[derive(Debug, Clone, PartialEq)]
pub struct PgqParseData {
    pub statement: Stmt,
}

impl PgqParseData {
    pub fn new(statement: Stmt) -> Self {
        Self { statement }
    }
}

impl ParserExtensionParseData for PgqParseData {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn copy(&self) -> Box<dyn ParserExtensionParseData> {
        Box::new(self.clone())
    }

    /// 以 JSON 形式输出语句树
    fn to_string(&self) -> String {
        serde_json::to_string(&self.statement)
            .unwrap_or_else(|e| format!("PgqParseData({}): {}", self.statement.kind(), e))
    }
}
