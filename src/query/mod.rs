// Query module for the PGQ extension
//
// This module provides the statement pipeline up to planning:
// - Parsing query strings into AST
// - Rewriting graph-match calls and dispatching statements
// - Plan directives handed back to the host planner

pub mod parser;
pub mod planner;
pub mod rewrite;

// Re-export error types from core module
pub use crate::core::{PgqError, PgqResult};
