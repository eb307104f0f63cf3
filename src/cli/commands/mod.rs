//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`wheelhouse compose`, `wheelhouse render`)
//! - Shared package discovery and configuration loading
//! - Consistent global flag handling

pub mod completions;
pub mod compose;
pub mod config;
pub mod dispatcher;
pub mod init;
pub mod render;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, EXIT_NO_CONFIG};

use std::path::Path;

use serde_yaml::Value;

use crate::compose::PackageLayout;
use crate::document::parse_override;
use crate::error::{Result, WheelhouseError};
use crate::ui::UserInterface;

/// Parse repeated `--set key=value` flags.
pub(crate) fn parse_overrides(raw: &[String]) -> Result<Vec<(String, Value)>> {
    raw.iter().map(|item| parse_override(item)).collect()
}

/// Discover a package, or report the missing configuration.
///
/// `Ok(None)` means the error was already shown and the command should exit
/// with [`EXIT_NO_CONFIG`].
pub(crate) fn discover_package(
    package: &Path,
    config: Option<&Path>,
    ui: &mut dyn UserInterface,
) -> Result<Option<PackageLayout>> {
    match PackageLayout::discover(package, config) {
        Ok(layout) => Ok(Some(layout)),
        Err(WheelhouseError::ConfigNotFound { path }) => {
            report_missing_config(&path, ui);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Load a package configuration, reporting a missing file the same way as
/// [`discover_package`].
pub(crate) fn load_package_config(
    layout: &PackageLayout,
    overrides: &[(String, Value)],
    ui: &mut dyn UserInterface,
) -> Result<Option<Value>> {
    match layout.load_config(ui, overrides) {
        Ok(config) => Ok(Some(config)),
        Err(WheelhouseError::ConfigNotFound { path }) => {
            report_missing_config(&path, ui);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn report_missing_config(path: &Path, ui: &mut dyn UserInterface) {
    ui.error(&format!(
        "No configuration found at {}. Run 'wheelhouse init' first.",
        path.display()
    ));
}
