//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `collect`: Scan sources and write namespace collections (or the
//!   export snapshot in library mode)
//! - `init`: Initialize a taglet configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Project root directory (defaults to the current directory)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Output directory for collections (overrides config file)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Tag identifier to match (overrides config file)
    #[arg(long)]
    pub tag_name: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct CollectArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Remove the output directory first and rebuild from scratch
    #[arg(long)]
    pub clean: bool,

    /// Skip rewriting in-source tag configuration
    #[arg(long)]
    pub no_regenerate: bool,
}

#[derive(Debug, Args)]
pub struct CollectCommand {
    #[command(flatten)]
    pub args: CollectArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan source files and collect translation tags into namespace files
    Collect(CollectCommand),
    /// Initialize a new .tagletrc.json configuration file
    Init,
}
