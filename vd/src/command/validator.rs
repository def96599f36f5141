//! Plan validator
//!
//! Turns an untrusted JSON object into a [`Command`]. Out-of-range numbers are
//! clamped; only unknown tags and non-integer fields are rejected.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::schema::{CommandSpec, FieldSpec, PILL_DISPENSE, STATUS, STOP, WATER_ON};
use super::types::{Command, Milliliters, PillCount};

/// Untyped candidate object as produced by the model backend
pub type RawCandidate = Map<String, Value>;

/// Why a candidate could not become a command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("unknown cmd: {0:?}")]
    UnknownCommand(String),

    #[error("malformed field: {0}")]
    MalformedField(&'static str),
}

/// Validate a raw candidate into a bounded command
///
/// Pure and deterministic. The candidate is consumed either way.
pub fn validate(raw: RawCandidate) -> Result<Command, RejectionReason> {
    let tag = match raw.get("cmd") {
        Some(Value::String(tag)) => tag.as_str(),
        Some(other) => {
            debug!(%other, "validate: cmd is not a string");
            return Err(RejectionReason::UnknownCommand(other.to_string()));
        }
        None => {
            debug!("validate: cmd missing");
            return Err(RejectionReason::UnknownCommand(String::new()));
        }
    };

    let Some(spec) = CommandSpec::lookup(tag) else {
        debug!(%tag, "validate: unknown tag");
        return Err(RejectionReason::UnknownCommand(tag.to_string()));
    };

    let command = match (spec.tag, spec.field) {
        (WATER_ON, Some(field)) => Command::WaterOn {
            ml: Milliliters::clamped(read_field(&raw, &field)?),
        },
        (PILL_DISPENSE, Some(field)) => Command::PillDispense {
            count: PillCount::clamped(read_field(&raw, &field)?),
        },
        (STOP, _) => Command::Stop,
        (STATUS, _) => Command::Status,
        _ => return Err(RejectionReason::UnknownCommand(tag.to_string())),
    };

    debug!(%command, "validate: accepted");
    Ok(command)
}

/// Read a numeric field, falling back to the schema default when absent
fn read_field(raw: &RawCandidate, field: &FieldSpec) -> Result<i64, RejectionReason> {
    match raw.get(field.name) {
        None | Some(Value::Null) => {
            debug!(field = field.name, default = field.default, "read_field: using default");
            Ok(i64::from(field.default))
        }
        Some(value) => coerce_integer(value).ok_or_else(|| {
            debug!(field = field.name, %value, "read_field: not an integer");
            RejectionReason::MalformedField(field.name)
        }),
    }
}

/// Interpret a JSON value as an integer
///
/// Accepts JSON integers, floats (truncated toward zero) and strings holding
/// a base-10 integer. Out-of-range magnitudes saturate; clamping happens later.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else if n.as_u64().is_some() {
                Some(i64::MAX)
            } else {
                // `as` saturates for floats
                n.as_f64().map(|f| f.trunc() as i64)
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .ok()
            .map(|i| i.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64),
        _ => None,
    }
}
