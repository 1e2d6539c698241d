//! graph-pgq - SQL/PGQ statement rewriting and dispatch
//!
//! This crate intercepts parsed SQL statements, lifts embedded graph-pattern
//! matches (`GRAPH_TABLE (... MATCH ...)`) out of the statement tree into a
//! per-session correlation state, and classifies each statement into the
//! property-graph table function the host planner must invoke.

pub mod config;
pub mod core;
pub mod extension;
pub mod query;
pub mod utils;
