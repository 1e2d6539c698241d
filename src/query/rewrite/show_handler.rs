//! DESCRIBE / SUMMARIZE 元查询处理

use log::{debug, warn};

use crate::core::{PgqError, PgqResult, Value};
use crate::query::parser::ast::{ShowRef, ShowType};
use crate::query::planner::{PlanDirective, TableFunction};

/// SUMMARY 选择汇总函数并以名称为参数，DESCRIBE 选择描述函数，其余类型报错
pub fn parse_show_ref(show_ref: &ShowRef) -> PgqResult<PlanDirective> {
    match show_ref.show_type {
        ShowType::Summary => {
            debug!("SUMMARIZE {} -> summarize_property_graph", show_ref.table_name);
            Ok(PlanDirective::with_function(TableFunction::summarize_property_graph())
                .with_parameters(vec![Value::Varchar(show_ref.table_name.clone())]))
        }
        ShowType::Describe => {
            debug!("DESCRIBE {} -> describe_property_graph", show_ref.table_name);
            Ok(PlanDirective::with_function(TableFunction::describe_property_graph()))
        }
        other => {
            warn!("未知的 SHOW 类型: {}", other);
            Err(PgqError::UnrecognizedMode(other))
        }
    }
}
