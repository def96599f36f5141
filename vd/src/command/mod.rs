//! Device commands
//!
//! - [`schema`] - the static command table and field bounds
//! - [`Command`] - the closed, validated command type
//! - [`validate`] - untrusted JSON object to [`Command`]

pub mod schema;
mod types;
mod validator;

pub use schema::{COMMANDS, CommandSpec, FieldSpec, PILL_COUNT, WATER_ML};
pub use types::{Command, Milliliters, PillCount};
pub use validator::{RawCandidate, RejectionReason, validate};
