//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands, ComposeArgs};
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Exit code for a package without configuration.
pub const EXIT_NO_CONFIG: i32 = 2;

/// Dispatches CLI commands to their implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandDispatcher {
    debug: bool,
}

impl CommandDispatcher {
    /// Create a new dispatcher. `debug` enables debug artifacts.
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it. No subcommand composes the current directory.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Compose(args)) => {
                super::compose::ComposeCommand::new(args.clone(), self.debug).execute(ui)
            }
            Some(Commands::Render(args)) => {
                super::render::RenderCommand::new(args.clone()).execute(ui)
            }
            Some(Commands::Config(args)) => {
                super::config::ConfigCommand::new(args.clone()).execute(ui)
            }
            Some(Commands::Init(args)) => super::init::InitCommand::new(args.clone()).execute(ui),
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => {
                super::compose::ComposeCommand::new(ComposeArgs::default(), self.debug).execute(ui)
            }
        }
    }
}
