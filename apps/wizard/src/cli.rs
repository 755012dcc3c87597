//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drives the company registration wizard from the terminal.
#[derive(Debug, Parser)]
#[command(name = "mkp-register")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Fill, inspect and submit a marketplace company registration")]
pub struct Cli {
    /// Configuration file; `mkp-register.toml` in the working directory is used when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write answers into the draft and advance as far as validation allows
    Fill {
        /// TOML file with `[text]`, `[flags]` and `[files]` tables keyed by field name
        #[arg(short, long)]
        answers: PathBuf,
    },
    /// Show the current step and the saved draft
    Status {},
    /// Validate the terminal step and send the registration
    Submit {
        /// Sent upstream when no browser signature is given
        #[arg(long, default_value = concat!("mkp-register/", env!("CARGO_PKG_VERSION")))]
        user_agent: String,

        /// Browser signature used as the rate-limit identity
        #[arg(long)]
        signature: Option<String>,
    },
    /// Discard the saved draft and return to step 1
    Reset {},
}
