//! Pure, DB-free DATCOM parameter tools.
//!
//! Each module implements one of the required tools from the shared
//! registry as a plain function; `datcom-core::tool_registry` wraps each in
//! a thin `Tool` impl for dispatch by the reasoning agent and calls the
//! functions directly, in fixed order, from the DATCOM pipeline.

pub mod body;
pub mod calculator;
pub mod fltcon;
pub mod geometry;
pub mod synthesis;
pub mod validate;
