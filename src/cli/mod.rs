//! CLI surface.
//!
//! Thin by design: argument parsing and dispatch only. Sync, archive, and
//! completion logic live in the library modules; handlers wire them to
//! the workspace and the environment.

use std::ffi::OsString;

use clap::{ArgAction, Parser, Subcommand};

use crate::Result;

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "aocx",
    version,
    about = "Advent of Code input sync and completion tooling",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage puzzle inputs (download, encrypt, decrypt).
    Inputs {
        #[command(subcommand)]
        command: InputsCommand,
    },
    /// Update the README completion table from test results.
    Completion {
        /// Nextest profile whose junit.xml to read.
        #[arg(long, default_value = "ci")]
        profile: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum InputsCommand {
    /// Download missing inputs and re-encrypt the archive.
    Download {
        /// Re-download everything, ignoring the lockfile.
        #[arg(short, long)]
        force: bool,
    },
    /// Encrypt the inputs tree to the archive.
    Encrypt,
    /// Decrypt the archive back into the inputs tree.
    Decrypt,
}

pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::parse_from(args)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Inputs { command } => match command {
            InputsCommand::Download { force } => commands::inputs::download(force),
            InputsCommand::Encrypt => commands::inputs::encrypt(),
            InputsCommand::Decrypt => commands::inputs::decrypt(),
        },
        Command::Completion { profile } => commands::completion::update(&profile),
    }
}
