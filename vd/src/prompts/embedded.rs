//! Embedded prompts
//!
//! Compiled into the binary from .pmt files.

/// Planner system instruction template
pub const PLAN: &str = include_str!("../../prompts/plan.pmt");
