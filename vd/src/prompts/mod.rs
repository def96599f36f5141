//! Prompt templates
//!
//! The planner's system instruction is a Handlebars template filled from the
//! command schema table, so the shapes and ranges the model sees are the same
//! ones the validator enforces.

pub mod embedded;

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use crate::command::COMMANDS;

#[derive(Debug, Serialize)]
struct ShapeEntry {
    tag: &'static str,
    shape: String,
}

#[derive(Debug, Serialize)]
struct DefaultEntry {
    name: &'static str,
    value: u32,
}

#[derive(Debug, Serialize)]
struct PlanPromptContext {
    commands: Vec<ShapeEntry>,
    defaults: Vec<DefaultEntry>,
}

impl PlanPromptContext {
    fn from_schema() -> Self {
        Self {
            commands: COMMANDS
                .iter()
                .map(|spec| ShapeEntry {
                    tag: spec.tag,
                    shape: spec.shape(),
                })
                .collect(),
            defaults: COMMANDS
                .iter()
                .filter_map(|spec| spec.field)
                .map(|field| DefaultEntry {
                    name: field.name,
                    value: field.default,
                })
                .collect(),
        }
    }
}

/// Render the planner system instruction
pub fn plan_system_prompt() -> Result<String> {
    debug!("plan_system_prompt: called");
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(handlebars::no_escape);

    hbs.render_template(embedded::PLAN, &PlanPromptContext::from_schema())
        .map(|rendered| rendered.trim().to_string())
        .map_err(|e| eyre!("Failed to render plan prompt: {}", e))
}
