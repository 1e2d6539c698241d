//! 解析器模块
//!
//! 负责解析语句的顶层结构，包括查询、表达式、图模式以及 DDL。

mod ddl_parser;
mod expr_parser;
mod parse_context;
mod parser;
mod pattern_parser;
mod query_parser;
mod stmt_parser;


pub use ddl_parser::DdlParser;
pub use expr_parser::ExprParser;
pub use parse_context::{ParseContext, DEFAULT_MAX_RECURSION_DEPTH};
pub use parser::{split_statements, Parser};
pub use pattern_parser::PatternParser;
pub use query_parser::QueryParser;
pub use stmt_parser::StmtParser;
