//! # `mkp-register`
//!
//! Terminal host for the registration wizard. The draft lives in the configured data
//! directory, so consecutive invocations continue where the previous one stopped.

pub mod answers;
pub mod cli;
pub mod commands;

pub use answers::{Answer, Answers, guess_mime, read_attachment};
pub use cli::{Cli, Command};
pub use commands::{FillReport, StatusReport, describe_outcome, fill, status, step_errors};
