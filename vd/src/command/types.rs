//! Validated device commands
//!
//! A [`Command`] can only be built through clamping constructors or the
//! validator, so every instance carries in-range values. `Command` has no
//! `Deserialize` impl; external JSON goes through [`super::validate`].

use std::fmt;

use serde::Serialize;

use super::schema::{PILL_COUNT, WATER_ML};

/// Water volume, always within the `WATER_ON` bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Milliliters(u32);

impl Milliliters {
    /// Clamp any integer into range
    pub fn clamped(value: i64) -> Self {
        let clamped = WATER_ML.clamp(value);
        debug_assert!(WATER_ML.contains(clamped));
        Self(clamped)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for Milliliters {
    fn default() -> Self {
        Self(WATER_ML.default)
    }
}

/// Pill count, always within the `PILL_DISPENSE` bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PillCount(u32);

impl PillCount {
    /// Clamp any integer into range
    pub fn clamped(value: i64) -> Self {
        let clamped = PILL_COUNT.clamp(value);
        debug_assert!(PILL_COUNT.contains(clamped));
        Self(clamped)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for PillCount {
    fn default() -> Self {
        Self(PILL_COUNT.default)
    }
}

/// A validated, range-bounded instruction for the device controller
///
/// Serializes to the canonical wire shapes:
/// `{"cmd":"WATER_ON","ml":150}`, `{"cmd":"PILL_DISPENSE","count":1}`,
/// `{"cmd":"STOP"}`, `{"cmd":"STATUS"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "cmd", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    WaterOn { ml: Milliliters },
    PillDispense { count: PillCount },
    Stop,
    Status,
}

impl Command {
    pub fn water_on(ml: i64) -> Self {
        Self::WaterOn {
            ml: Milliliters::clamped(ml),
        }
    }

    pub fn pill_dispense(count: i64) -> Self {
        Self::PillDispense {
            count: PillCount::clamped(count),
        }
    }

    /// Wire tag for this command
    pub fn tag(&self) -> &'static str {
        match self {
            Self::WaterOn { .. } => super::schema::WATER_ON,
            Self::PillDispense { .. } => super::schema::PILL_DISPENSE,
            Self::Stop => super::schema::STOP,
            Self::Status => super::schema::STATUS,
        }
    }

    /// Canonical JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::WaterOn { ml } => serde_json::json!({ "cmd": self.tag(), "ml": ml.get() }),
            Self::PillDispense { count } => serde_json::json!({ "cmd": self.tag(), "count": count.get() }),
            Self::Stop | Self::Status => serde_json::json!({ "cmd": self.tag() }),
        }
    }

    /// Single-line JSON, without trailing newline
    pub fn to_line(&self) -> String {
        self.to_json().to_string()
    }

    /// What the device does when it receives this command
    pub fn describe(&self) -> String {
        match self {
            Self::WaterOn { ml } => format!("dispense {} ml of water", ml.get()),
            Self::PillDispense { count } if count.get() == 1 => "dispense 1 pill".to_string(),
            Self::PillDispense { count } => format!("dispense {} pills", count.get()),
            Self::Stop => "stop actuators".to_string(),
            Self::Status => "report status".to_string(),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line())
    }
}
