use serde::{Deserialize, Serialize};
use std::fmt;

/// 逻辑类型，用于表函数签名和 CAST 目标
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalType {
    Boolean,
    Integer,
    BigInt,
    Double,
    Varchar,
    Date,
    Timestamp,
    /// 语法层面不认识的类型名，原样保留交给宿主绑定
    Named(String),
}

impl LogicalType {
    /// 从类型名解析逻辑类型（不区分大小写）
    pub fn from_name(name: &str) -> Self {
        match name.to_uppercase().as_str() {
            "BOOL" | "BOOLEAN" => LogicalType::Boolean,
            "INT" | "INT4" | "INTEGER" => LogicalType::Integer,
            "BIGINT" | "INT8" | "LONG" => LogicalType::BigInt,
            "DOUBLE" | "FLOAT8" | "FLOAT" | "REAL" => LogicalType::Double,
            "VARCHAR" | "TEXT" | "STRING" => LogicalType::Varchar,
            "DATE" => LogicalType::Date,
            "TIMESTAMP" | "DATETIME" => LogicalType::Timestamp,
            _ => LogicalType::Named(name.to_string()),
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Boolean => write!(f, "BOOLEAN"),
            LogicalType::Integer => write!(f, "INTEGER"),
            LogicalType::BigInt => write!(f, "BIGINT"),
            LogicalType::Double => write!(f, "DOUBLE"),
            LogicalType::Varchar => write!(f, "VARCHAR"),
            LogicalType::Date => write!(f, "DATE"),
            LogicalType::Timestamp => write!(f, "TIMESTAMP"),
            LogicalType::Named(name) => write!(f, "{}", name),
        }
    }
}

/// 字面量值
///
/// 出现在 AST 常量表达式和计划指令参数中。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i32),
    BigInt(i64),
    Double(f64),
    Varchar(String),
}

impl Value {
    pub fn logical_type(&self) -> Option<LogicalType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(LogicalType::Boolean),
            Value::Integer(_) => Some(LogicalType::Integer),
            Value::BigInt(_) => Some(LogicalType::BigInt),
            Value::Double(_) => Some(LogicalType::Double),
            Value::Varchar(_) => Some(LogicalType::Varchar),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i as i64),
            Value::BigInt(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(s) => Some(s),
            _ => None,
        }
    }

    /// 整数字面量优先落在 INTEGER，超出范围时提升为 BIGINT
    pub fn from_integer_literal(value: i64) -> Self {
        match i32::try_from(value) {
            Ok(small) => Value::Integer(small),
            Err(_) => Value::BigInt(value),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Varchar(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::BigInt(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::Varchar(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_literal_promotion() {
        assert_eq!(Value::from_integer_literal(42), Value::Integer(42));
        assert_eq!(
            Value::from_integer_literal(i64::from(i32::MAX) + 1),
            Value::BigInt(i64::from(i32::MAX) + 1)
        );
    }

    #[test]
    fn test_varchar_display_escapes_quotes() {
        let value = Value::from("it's");
        assert_eq!(value.to_string(), "'it''s'");
    }

    #[test]
    fn test_logical_type_from_name() {
        assert_eq!(LogicalType::from_name("varchar"), LogicalType::Varchar);
        assert_eq!(LogicalType::from_name("Int"), LogicalType::Integer);
        assert_eq!(
            LogicalType::from_name("HUGEINT"),
            LogicalType::Named("HUGEINT".to_string())
        );
    }
}
