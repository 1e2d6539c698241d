pub mod error;
pub mod value;

// 错误和结果类型
pub use error::{PgqError, PgqResult};

// 核心数据类型
pub use value::{LogicalType, Value};
