//! Compose command implementation.
//!
//! The `wheelhouse compose` command asks the package prompts, resolves the
//! configuration and writes one manifest per unit.

use std::path::PathBuf;

use crate::cli::args::ComposeArgs;
use crate::compose::{ComposeOptions, Composer, YamlManifestBuilder};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, EXIT_NO_CONFIG};
use super::{discover_package, load_package_config, parse_overrides};

/// Directory for expanded definitions when only `--debug` is given.
pub const DEFAULT_DEBUG_DIR: &str = "debug";

/// The compose command implementation.
pub struct ComposeCommand {
    args: ComposeArgs,
    debug: bool,
}

impl ComposeCommand {
    /// Create a new compose command.
    pub fn new(args: ComposeArgs, debug: bool) -> Self {
        Self { args, debug }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ComposeArgs {
        &self.args
    }

    /// Output locations for this run.
    pub fn options(&self) -> ComposeOptions {
        let debug_dir = match (&self.args.debug_dir, self.debug) {
            (Some(dir), _) => Some(dir.clone()),
            (None, true) => Some(PathBuf::from(DEFAULT_DEBUG_DIR)),
            (None, false) => None,
        };

        ComposeOptions {
            out_dir: self.args.out.clone(),
            debug_dir,
        }
    }
}

impl Command for ComposeCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(layout) = discover_package(&self.args.package, self.args.config.as_deref(), ui)?
        else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        ui.show_header(&format!("Composing {}", layout.name()));

        let overrides = parse_overrides(&self.args.set)?;
        let Some(config) = load_package_config(&layout, &overrides, ui)? else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let options = self.options();
        let out_dir = options.out_dir.clone();
        let builder = YamlManifestBuilder::new();
        let composer = Composer::new(layout.template_store(), &builder, options);

        let mut spinner = ui.start_spinner("Composing manifests...");
        let report = match composer.compose(&config) {
            Ok(report) => {
                spinner.finish_success(&format!("Composed {} manifest(s)", report.len()));
                report
            }
            Err(e) => {
                spinner.finish_error("Composition failed");
                return Err(e);
            }
        };

        if ui.output_mode().shows_details() {
            for unit in &report.units {
                ui.message(&format!("  {} -> {}", unit.id, unit.path.display()));
                if let Some(debug_path) = &unit.debug_path {
                    ui.message(&format!("    debug: {}", debug_path.display()));
                }
            }
        }

        if report.is_empty() {
            ui.warning("Configuration lists no objects; nothing was written");
        } else {
            ui.success(&format!(
                "Wrote {} manifest(s) to {}",
                report.len(),
                out_dir.display()
            ));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::{MockUI, OutputMode, SpinnerStatus};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn setup_package() -> TempDir {
        let temp = TempDir::new().unwrap();
        let pkg = temp.path().join("pkg");
        write(
            &pkg,
            "config.yaml",
            "objects:\n  - web:\n      deployment:\n        image: nginx:${var.tag|latest}\n        replicas: 1\n",
        );
        write(&pkg, "interactive.yaml", "- prompt: 'Tag: '\n  variable: tag\n");
        write(
            &pkg,
            "templates/deployment/template.yaml",
            "kind: Deployment\nimage: ${cfg.deployment.image}\nreplicas: ${cfg.deployment.replicas}\n",
        );
        temp
    }

    fn args_for(temp: &TempDir) -> ComposeArgs {
        ComposeArgs {
            package: temp.path().join("pkg"),
            out: temp.path().join("out"),
            ..ComposeArgs::default()
        }
    }

    #[test]
    fn compose_writes_manifest_with_answers() {
        let temp = setup_package();
        let mut args = args_for(&temp);
        args.set = vec!["web.deployment.replicas=3".to_string()];
        let cmd = ComposeCommand::new(args, false);
        let mut ui = MockUI::new();
        ui.set_prompt_response("tag", "1.25");

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        let text = fs::read_to_string(temp.path().join("out/web-deployment.yaml")).unwrap();
        let manifest: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(manifest["image"], "nginx:1.25");
        assert_eq!(manifest["replicas"], 3);
        assert!(ui.has_success("Wrote 1 manifest(s)"));
        assert_eq!(
            ui.spinner_results(),
            vec![(SpinnerStatus::Success, "Composed 1 manifest(s)".to_string())]
        );
    }

    #[test]
    fn compose_missing_config_exits_two() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("pkg")).unwrap();
        let cmd = ComposeCommand::new(args_for(&temp), false);
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_error("No configuration found"));
    }

    #[test]
    fn compose_failure_finishes_spinner_with_error() {
        let temp = setup_package();
        fs::remove_dir_all(temp.path().join("pkg/templates")).unwrap();
        let cmd = ComposeCommand::new(args_for(&temp), false);
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();

        assert!(err.to_string().contains("deployment"));
        assert_eq!(ui.spinner_results()[0].0, SpinnerStatus::Error);
    }

    #[test]
    fn verbose_lists_units() {
        let temp = setup_package();
        let mut args = args_for(&temp);
        args.debug_dir = Some(temp.path().join("dbg"));
        let cmd = ComposeCommand::new(args, false);
        let mut ui = MockUI::with_mode(OutputMode::Verbose);

        cmd.execute(&mut ui).unwrap();

        assert!(ui.has_message("web/deployment"));
        assert!(ui.has_message("debug:"));
        assert!(temp.path().join("dbg/web-deployment.json").exists());
    }

    #[test]
    fn debug_flag_enables_default_debug_dir() {
        let cmd = ComposeCommand::new(ComposeArgs::default(), true);
        assert_eq!(cmd.options().debug_dir, Some(PathBuf::from("debug")));

        let cmd = ComposeCommand::new(ComposeArgs::default(), false);
        assert_eq!(cmd.options().debug_dir, None);
    }
}
