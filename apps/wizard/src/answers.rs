//! Answers file: the terminal stand-in for typing into the wizard.
//!
//! ```toml
//! [text]
//! companyType = "developer"
//! companyName = "Acme"
//!
//! [flags]
//! acceptTerms = true
//!
//! [files]
//! companyLogo = "logo.png"
//! ```
//!
//! Relative file paths resolve against the directory of the answers file.

use anyhow::{Context, Result, bail};
use mkp::registration::{AttachmentField, AttachmentInput, Field, FlagField, TextField};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Answers {
    pub text: BTreeMap<String, String>,
    pub flags: BTreeMap<String, bool>,
    pub files: BTreeMap<String, PathBuf>,
}

/// One answer bound to its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(TextField, String),
    Flag(FlagField, bool),
    File(AttachmentField, PathBuf),
}

impl Answer {
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::Text(field, _) => Field::Text(*field),
            Self::Flag(field, _) => Field::Flag(*field),
            Self::File(field, _) => Field::Attachment(*field),
        }
    }
}

impl Answers {
    /// # Errors
    /// Fails on malformed TOML or unknown tables.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Answers file is not valid TOML")
    }

    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read answers from {}", path.display()))?;
        Self::from_toml(&source)
    }

    /// Binds every entry to its field, in wizard order.
    ///
    /// # Errors
    /// Fails on an unknown key or a key listed under the wrong table.
    pub fn resolve(&self, base: &Path) -> Result<Vec<Answer>> {
        let mut answers = Vec::with_capacity(self.text.len() + self.flags.len() + self.files.len());

        for (key, value) in &self.text {
            let Some(Field::Text(field)) = Field::from_key(key) else {
                bail!("`{key}` is not a text field");
            };
            answers.push(Answer::Text(field, value.clone()));
        }
        for (key, value) in &self.flags {
            let Some(Field::Flag(field)) = Field::from_key(key) else {
                bail!("`{key}` is not a flag");
            };
            answers.push(Answer::Flag(field, *value));
        }
        for (key, path) in &self.files {
            let Some(Field::Attachment(field)) = Field::from_key(key) else {
                bail!("`{key}` is not an attachment");
            };
            answers.push(Answer::File(field, base.join(path)));
        }

        answers.sort_by_key(|answer| (answer.field().section(), answer.field()));
        Ok(answers)
    }
}

/// Content type by file extension; unknown extensions are sent as opaque bytes.
#[must_use]
pub fn guess_mime(path: &Path) -> &'static str {
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Reads a picked file into memory.
///
/// # Errors
/// Fails when the file cannot be read.
pub async fn read_attachment(path: &Path) -> Result<AttachmentInput> {
    let bytes = tokio::fs::read(path).await.with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path.file_name().map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
    Ok(AttachmentInput::new(file_name, guess_mime(path), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkp::registration::Section;

    #[test]
    fn resolves_in_wizard_order_with_paths_relative_to_the_file() {
        let answers = Answers::from_toml(
            r#"
            [text]
            password = "x"
            companyName = "Acme"
            companyType = "broker"

            [flags]
            acceptTerms = true

            [files]
            taxCardFront = "scans/front.jpg"
            "#,
        )
        .unwrap();

        let resolved = answers.resolve(Path::new("/tmp/answers")).unwrap();
        let sections: Vec<_> = resolved.iter().map(|a| a.field().section()).collect();
        assert_eq!(
            sections,
            [Section::Type, Section::Company, Section::Documents, Section::Security, Section::Security]
        );
        assert!(resolved.contains(&Answer::File(
            AttachmentField::TaxCardFront,
            PathBuf::from("/tmp/answers/scans/front.jpg")
        )));
    }

    #[test]
    fn rejects_keys_under_the_wrong_table() {
        let answers = Answers::from_toml("[flags]\ncompanyName = true\n").unwrap();
        assert!(answers.resolve(Path::new(".")).is_err());

        let answers = Answers::from_toml("[text]\nnope = \"x\"\n").unwrap();
        assert!(answers.resolve(Path::new(".")).is_err());
    }

    #[test]
    fn unknown_tables_are_refused() {
        assert!(Answers::from_toml("[extra]\na = 1\n").is_err());
    }

    #[test]
    fn mime_follows_the_extension() {
        assert_eq!(guess_mime(Path::new("logo.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("scan.jpeg")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("contract")), "application/octet-stream");
    }
}
