//! PGQ 解析扩展
//!
//! 宿主侧的接入面：解析数据、会话状态、解析与计划钩子以及扩展注册。

pub mod entry;
pub mod parse_data;
pub mod state;

pub use entry::{
    pgq_parse, pgq_plan, DbConfig, ParserExtension, ParserExtensionInfo, PgqParserExtension, DEFAULT_STATE_KEY,
};
pub use parse_data::{ParserExtensionParseData, PgqParseData};
pub use state::{get_pgq_state, register_pgq_state, ClientContext, PgqState};
