//! 统一错误处理
//!
//! 重写与分发过程中的所有错误都是语句级致命错误：检测到即返回，
//! 不做局部恢复。语句树可能已被部分修改，调用方会放弃整条语句。

use thiserror::Error;

use crate::query::parser::ast::ShowType;
use crate::query::parser::core::error::ParseError;

/// PGQ 扩展错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PgqError {
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),

    #[error("检测到 {0} 条语句, 每次只能提交一条语句")]
    MultipleStatements(usize),

    #[error("未找到 PGQ 解析数据")]
    MissingParseData,

    #[error("未注册的会话状态: {0}")]
    MissingSessionState(String),

    #[error("MATCH 语句尚不支持 {0} 类型的表引用")]
    UnsupportedConstruct(&'static str),

    #[error("未知的 SHOW 类型: {0}")]
    UnrecognizedMode(ShowType),

    #[error("该语句不能通过计划入口处理, 请改用绑定入口 (duckpgq_bind)")]
    MustUseBindEntryPoint,

    #[error("{0} 语句尚未在 PGQ 查询中实现")]
    NotImplemented(String),
}

/// 统一的结果类型
pub type PgqResult<T> = Result<T, PgqError>;

impl PgqError {
    /// 错误所属阶段，用于日志
    pub fn phase(&self) -> &'static str {
        match self {
            PgqError::Parse(_) | PgqError::MultipleStatements(_) => "parse",
            PgqError::MissingParseData | PgqError::MissingSessionState(_) => "plan",
            PgqError::UnsupportedConstruct(_)
            | PgqError::UnrecognizedMode(_)
            | PgqError::MustUseBindEntryPoint => "bind",
            PgqError::NotImplemented(_) => "not_implemented",
        }
    }
}
