//! Config command implementation.
//!
//! The `wheelhouse config` command shows the resolved configuration: prompt
//! answers applied, `--set` overrides overlaid and references resolved.

use crate::cli::args::ConfigArgs;
use crate::error::{Result, WheelhouseError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, EXIT_NO_CONFIG};
use super::{discover_package, load_package_config, parse_overrides};

/// The config command implementation.
pub struct ConfigCommand {
    args: ConfigArgs,
}

impl ConfigCommand {
    /// Create a new config command.
    pub fn new(args: ConfigArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ConfigArgs {
        &self.args
    }
}

impl Command for ConfigCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(layout) = discover_package(&self.args.package, self.args.config.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let overrides = parse_overrides(&self.args.set)?;
        let Some(config) = load_package_config(&layout, &overrides, ui)? else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        if self.args.json {
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| WheelhouseError::Other(e.into()))?;
            ui.message(&json);
        } else {
            ui.message(&format!("# {}", layout.config.display()));
            let yaml =
                serde_yaml::to_string(&config).map_err(|e| WheelhouseError::Other(e.into()))?;
            ui.message(yaml.trim_end());
        }

        Ok(CommandResult::success())
    }
}
