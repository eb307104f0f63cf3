//! Render command implementation.
//!
//! The `wheelhouse render` command prints the directive-expanded template
//! text for a single unit, before parsing or normalization.

use crate::cli::args::RenderArgs;
use crate::compose::{plan_units, Unit};
use crate::directives;
use crate::error::{Result, WheelhouseError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, EXIT_NO_CONFIG};
use super::{discover_package, load_package_config, parse_overrides};

/// The render command implementation.
pub struct RenderCommand {
    args: RenderArgs,
}

impl RenderCommand {
    /// Create a new render command.
    pub fn new(args: RenderArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RenderArgs {
        &self.args
    }

    /// Pick the requested unit: first match on type, object and element.
    fn select(&self, units: Vec<Unit>) -> Result<Unit> {
        let args = &self.args;
        units
            .into_iter()
            .find(|unit| {
                unit.id.object_type == args.object_type
                    && args.object.as_ref().map_or(true, |o| *o == unit.id.object)
                    && args.element.map_or(true, |e| unit.id.element == Some(e))
            })
            .ok_or_else(|| WheelhouseError::InvalidConfig {
                message: format!(
                    "no unit of type '{}'{}{} in the configuration",
                    args.object_type,
                    args.object
                        .as_ref()
                        .map(|o| format!(" for object '{}'", o))
                        .unwrap_or_default(),
                    args.element
                        .map(|e| format!(" at element {}", e))
                        .unwrap_or_default(),
                ),
            })
    }
}

impl Command for RenderCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(layout) = discover_package(&self.args.package, self.args.config.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let overrides = parse_overrides(&self.args.set)?;
        let Some(config) = load_package_config(&layout, &overrides, ui)? else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let unit = self.select(plan_units(&config)?)?;
        let template = layout.template_store().load(&unit.id.object_type)?;
        tracing::debug!(unit = %unit.id, template = %template.path.display(), "rendering");

        let expanded = directives::expand(&template.contents, &unit.document)?;
        ui.message(expanded.trim_end());

        Ok(CommandResult::success())
    }
}
