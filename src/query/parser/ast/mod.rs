//! AST 模块
//!
//! 本模块提供基于枚举的 AST 设计：每一层（语句、查询节点、表引用、表达式）
//! 都是封闭的枚举，新增变体时所有 match 都必须显式处理。

// 表达式定义
pub mod expr;
pub use expr::*;

// 语句定义
pub mod stmt;
pub use stmt::*;

// 表引用定义
pub mod table_ref;
pub use table_ref::*;

// 图模式定义
pub mod pattern;
pub use pattern::*;
