//! Value 模块
//!
//! 语句树和计划指令共享的字面量值与逻辑类型。

pub mod types;

pub use types::*;
