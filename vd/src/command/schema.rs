//! Command schema table
//!
//! The closed set of device commands and the bounds on their numeric fields.
//! The validator and the planner prompt both read from this table.

use tracing::debug;

/// Bounds and default for a command's single numeric field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// JSON key carrying the value
    pub name: &'static str,

    /// Inclusive lower bound
    pub min: u32,

    /// Inclusive upper bound
    pub max: u32,

    /// Value used when the key is absent
    pub default: u32,
}

impl FieldSpec {
    /// Clamp an arbitrary integer into `[min, max]`
    pub fn clamp(&self, value: i64) -> u32 {
        let clamped = value.clamp(i64::from(self.min), i64::from(self.max));
        if clamped != value {
            debug!(field = self.name, value, clamped, "FieldSpec::clamp: value out of range");
        }
        // In range of u32 because min and max are
        clamped as u32
    }

    /// Whether `value` already sits inside the bounds
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// One row of the schema table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Wire tag carried in the `cmd` key
    pub tag: &'static str,

    /// The numeric field this command takes, if any
    pub field: Option<FieldSpec>,
}

pub const WATER_ON: &str = "WATER_ON";
pub const PILL_DISPENSE: &str = "PILL_DISPENSE";
pub const STOP: &str = "STOP";
pub const STATUS: &str = "STATUS";

/// Water volume in milliliters
pub const WATER_ML: FieldSpec = FieldSpec {
    name: "ml",
    min: 50,
    max: 250,
    default: 150,
};

/// Number of pills per dispense
pub const PILL_COUNT: FieldSpec = FieldSpec {
    name: "count",
    min: 1,
    max: 2,
    default: 1,
};

/// The full command table, in prompt order
pub static COMMANDS: [CommandSpec; 4] = [
    CommandSpec {
        tag: WATER_ON,
        field: Some(WATER_ML),
    },
    CommandSpec {
        tag: PILL_DISPENSE,
        field: Some(PILL_COUNT),
    },
    CommandSpec { tag: STOP, field: None },
    CommandSpec { tag: STATUS, field: None },
];

impl CommandSpec {
    /// Find the row for a wire tag (case-sensitive)
    pub fn lookup(tag: &str) -> Option<&'static CommandSpec> {
        debug!(%tag, "CommandSpec::lookup: called");
        COMMANDS.iter().find(|spec| spec.tag == tag)
    }

    /// Shape of the command as shown to the model, e.g.
    /// `{"cmd":"WATER_ON","ml":<int 50..250>}`
    pub fn shape(&self) -> String {
        match self.field {
            Some(field) => format!(
                r#"{{"cmd":"{}","{}":<int {}..{}>}}"#,
                self.tag, field.name, field.min, field.max
            ),
            None => format!(r#"{{"cmd":"{}"}}"#, self.tag),
        }
    }
}
