//! 语句重写与分发模块
//!
//! - `correlation`: 关联状态，保存被摘出的图匹配表达式
//! - `match_locator`: 在表引用树中重写 `duckpgq_match` 调用
//! - `statement_locator`: 遍历 SELECT 语句的 FROM 目标与 CTE
//! - `show_handler`: DESCRIBE / SUMMARIZE 元查询
//! - `dispatcher`: 按语句类型生成计划指令

pub mod correlation;
pub mod dispatcher;
pub mod match_locator;
pub mod show_handler;
pub mod statement_locator;

pub use correlation::CorrelationState;
pub use dispatcher::handle_statement;
pub use match_locator::find_match_function;
pub use show_handler::parse_show_ref;
pub use statement_locator::find_select_statement;
