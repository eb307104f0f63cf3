//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Wheelhouse - compose deployment manifests from template packages.
#[derive(Debug, Parser)]
#[command(name = "wheelhouse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging and write expanded definitions
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compose a package into manifest files (default)
    Compose(ComposeArgs),

    /// Print the expanded template for one unit
    Render(RenderArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),

    /// Write a starter package
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `compose` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ComposeArgs {
    /// Package directory
    #[arg(default_value = ".")]
    pub package: PathBuf,

    /// Configuration file (overrides the package's config*)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output directory, emptied before writing
    #[arg(short, long, default_value = "out")]
    pub out: PathBuf,

    /// Write each expanded definition as JSON to this directory
    #[arg(long, value_name = "DIR")]
    pub debug_dir: Option<PathBuf>,

    /// Override a configuration value (dotted.path=value)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Use defaults, no prompts
    #[arg(long)]
    pub non_interactive: bool,
}

impl Default for ComposeArgs {
    fn default() -> Self {
        Self {
            package: PathBuf::from("."),
            config: None,
            out: PathBuf::from("out"),
            debug_dir: None,
            set: Vec::new(),
            non_interactive: false,
        }
    }
}

/// Arguments for the `render` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RenderArgs {
    /// Package directory
    #[arg(default_value = ".")]
    pub package: PathBuf,

    /// Object type whose template to render
    #[arg(short = 't', long)]
    pub object_type: String,

    /// Object name (defaults to the first object with this type)
    #[arg(short = 'O', long)]
    pub object: Option<String>,

    /// Element index for list-valued types
    #[arg(short, long)]
    pub element: Option<usize>,

    /// Configuration file (overrides the package's config*)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override a configuration value (dotted.path=value)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Package directory
    #[arg(default_value = ".")]
    pub package: PathBuf,

    /// Configuration file (overrides the package's config*)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Override a configuration value (dotted.path=value)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

/// Arguments for the `init` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct InitArgs {
    /// Directory to create the package in
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite existing files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
