use crate::answers::{Answer, Answers, read_attachment};
use anyhow::Result;
use mkp::gateway::SubmissionGateway;
use mkp::registration::{
    AttachmentField, Field, FileRejection, FlagField, FlatValue, NextOutcome, Section, StepChrome, StepCursor,
    SubmitOutcome, TextField, Wizard,
};
use mkp::storage::KeyValueStore;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

const MASK: &str = "********";

/// What `fill` managed to do.
#[derive(Debug, Default)]
pub struct FillReport {
    pub applied: usize,
    pub rejected: Vec<(AttachmentField, FileRejection)>,
    /// Errors that kept the wizard on its current step.
    pub blocked: Vec<(Field, &'static str)>,
    pub step: StepCursor,
}

impl fmt::Display for FillReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "applied {} answer(s), now on step {}", self.applied, self.step)?;
        for (field, rejection) in &self.rejected {
            writeln!(f, "  rejected {field}: {} ({rejection})", rejection.message_key())?;
        }
        for (field, message) in &self.blocked {
            writeln!(f, "  {field}: {message}")?;
        }
        Ok(())
    }
}

/// Writes the answers through the step units, then advances until a step refuses.
///
/// Stops on the terminal step without submitting.
///
/// # Errors
/// Fails when an answer key is unknown or a referenced file cannot be read.
pub async fn fill<S, G>(wizard: &mut Wizard<S, G>, answers: &Answers, base: &Path) -> Result<FillReport>
where
    S: KeyValueStore,
    G: SubmissionGateway,
{
    let mut report = FillReport::default();

    for answer in answers.resolve(base)? {
        match answer {
            Answer::Text(field, value) => set_text(wizard, field, &value).await,
            Answer::Flag(FlagField::AcceptTerms, value) => wizard.security().set_accept_terms(value).await,
            Answer::File(field, path) => {
                let input = read_attachment(&path).await?;
                let picked = match field {
                    AttachmentField::CompanyLogo => wizard.contact().select_logo(Some(input)).await,
                    _ => wizard.documents().select(field, Some(input)).await,
                };
                if let Err(rejection) = picked {
                    report.rejected.push((field, rejection));
                    continue;
                }
            },
        }
        report.applied += 1;
    }

    while !wizard.step().is_last() {
        match wizard.next().await {
            NextOutcome::Advanced(step) => info!(step = %step, "Advanced"),
            NextOutcome::NotReady => {
                report.blocked = step_errors(wizard);
                break;
            },
            NextOutcome::Submit(_) => break,
        }
    }

    report.step = wizard.step();
    Ok(report)
}

async fn set_text<S, G>(wizard: &mut Wizard<S, G>, field: TextField, value: &str)
where
    S: KeyValueStore,
    G: SubmissionGateway,
{
    match field.section() {
        Section::Type => wizard.company_type().unit_mut().set_text(field, value).await,
        Section::Company => wizard.company().set(field, value).await,
        Section::Contact => wizard.contact().set(field, value).await,
        Section::Branch => wizard.branch().set(field, value).await,
        Section::Security => wizard.security().set(field, value).await,
        Section::Documents => warn!(field = %field, "Documents take no text answers"),
    }
}

/// Inline errors of the current step.
pub fn step_errors<S, G>(wizard: &mut Wizard<S, G>) -> Vec<(Field, &'static str)>
where
    S: KeyValueStore,
    G: SubmissionGateway,
{
    let section = wizard.step().section();
    section
        .fields()
        .filter_map(|field| {
            let error = match section {
                Section::Type => wizard.company_type().unit().error(field),
                Section::Company => wizard.company().unit().error(field),
                Section::Contact => wizard.contact().unit().error(field),
                Section::Documents => wizard.documents().unit().error(field),
                Section::Branch => wizard.branch().unit().error(field),
                Section::Security => wizard.security().error(field),
            };
            error.map(|message| (field, message))
        })
        .collect()
}

/// Current step and every non-empty draft value; secrets are masked.
#[derive(Debug)]
pub struct StatusReport {
    pub chrome: StepChrome,
    pub entries: Vec<(&'static str, String)>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.chrome.ordinal, self.chrome.section)?;
        if self.entries.is_empty() {
            return writeln!(f, "  draft is empty");
        }
        for (key, value) in &self.entries {
            writeln!(f, "  {key} = {value}")?;
        }
        Ok(())
    }
}

pub fn status<S, G>(wizard: &Wizard<S, G>) -> StatusReport
where
    S: KeyValueStore,
    G: SubmissionGateway,
{
    let flat = wizard.controller().store().flattened();
    let entries = flat.iter().filter_map(|(key, value)| describe(key, value).map(|text| (key, text))).collect();
    StatusReport { chrome: wizard.chrome(), entries }
}

fn describe(key: &str, value: &FlatValue) -> Option<String> {
    match value {
        FlatValue::Text(text) if text.is_empty() => None,
        FlatValue::Text(_) if matches!(Field::from_key(key), Some(Field::Text(field)) if field.is_secret()) => {
            Some(MASK.to_owned())
        },
        FlatValue::Text(text) => Some(text.clone()),
        FlatValue::Flag(flag) => Some(flag.to_string()),
        FlatValue::Attachment { file: Some(file), .. } => {
            Some(format!("{} ({}, {} bytes)", file.file_name, file.mime, file.size()))
        },
        FlatValue::Attachment { file: None, .. } | FlatValue::Preview { .. } => None,
    }
}

/// Human summary of a submission attempt.
#[must_use]
pub fn describe_outcome(outcome: &SubmitOutcome) -> String {
    match outcome {
        SubmitOutcome::Submitted { redirect, message } => {
            format!("submitted{}; continue at {redirect}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())
        },
        SubmitOutcome::Invalid => "the security step is incomplete; run `status` and `fill` again".to_owned(),
        SubmitOutcome::Rejected(response) => format!(
            "rejected{}: {}",
            response.status.map(|s| format!(" ({s})")).unwrap_or_default(),
            response.message.as_deref().unwrap_or("no reason given")
        ),
        SubmitOutcome::Failed { code, message } => format!("failed [{code}]: {message}"),
        SubmitOutcome::Busy => "a submission is already in flight".to_owned(),
        SubmitOutcome::NotOnTerminalStep { step } => format!("finish the wizard first (currently on step {step})"),
    }
}
