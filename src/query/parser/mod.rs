//! SQL/PGQ 解析模块
//!
//! 将查询文本解析为抽象语法树（AST），供重写与分发阶段使用。

pub mod ast;
pub mod core;
pub mod lexer;
pub mod parser;

// 重新导出 core 模块的常用类型
pub use core::{ParseError, ParseErrorKind, Position, Token, TokenKind};

// 重新导出统一解析器
pub use parser::{split_statements, Parser};
