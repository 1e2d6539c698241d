//! 规划接口模块
//!
//! 分发器产出的计划指令，以及它可以引用的下游表函数。

pub mod functions;
pub mod plan_directive;

pub use functions::{TableFunction, TableFunctionKind};
pub use plan_directive::{PlanDirective, StatementReturnType};
