#![allow(clippy::print_stdout)]

use anyhow::Context;
use clap::Parser;
use mkp::domain::config::WizardConfig;
use mkp::gateway::SubmissionContext;
use mkp::kernel::config::load_config;
use mkp::kernel::security::signature::ClientSignature;
use mkp_logger::Logger;
use mkp_wizard::{Answers, Cli, Command, describe_outcome, fill, status};
use std::path::Path;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let cfg: WizardConfig = load_config(cli.config.as_ref()).context("Critical: Configuration is malformed")?;
    let _log = Logger::from_config(&cfg.logging)?;

    let locale = cfg.registration.locale;
    let local = || SubmissionContext { signature: ClientSignature::resolve(None, None), locale };

    match cli.command {
        Command::Fill { answers } => {
            let parsed = Answers::load(&answers).await?;
            let base = answers.parent().unwrap_or_else(|| Path::new("."));
            let mut wizard = mkp::bootstrap(&cfg, local()).await?;
            print!("{}", fill(&mut wizard, &parsed, base).await?);
        },
        Command::Status {} => {
            let wizard = mkp::bootstrap(&cfg, local()).await?;
            print!("{}", status(&wizard));
        },
        Command::Submit { user_agent, signature } => {
            let context = SubmissionContext {
                signature: ClientSignature::resolve(signature.as_deref(), Some(&user_agent)),
                locale,
            };
            let mut wizard = mkp::bootstrap(&cfg, context).await?;
            let outcome = wizard.submit().await;
            println!("{}", describe_outcome(&outcome));
            if !outcome.is_submitted() {
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Reset {} => {
            let mut wizard = mkp::bootstrap(&cfg, local()).await?;
            wizard.reset().await;
            println!("draft cleared");
        },
    }

    Ok(ExitCode::SUCCESS)
}
