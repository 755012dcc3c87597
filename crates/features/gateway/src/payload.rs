use std::sync::Arc;

/// A binary part of the registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

/// Wire-ready registration form: ordered text entries plus named binary parts.
///
/// Built once per submission; the gateway consumes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationPayload {
    text: Vec<(String, String)>,
    files: Vec<(&'static str, FilePart)>,
}

impl RegistrationPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.text.push((name.into(), value.into()));
    }

    pub fn push_file(&mut self, part: &'static str, file: FilePart) {
        self.files.push((part, file));
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn file(&self, part: &str) -> Option<&FilePart> {
        self.files.iter().find(|(name, _)| *name == part).map(|(_, file)| file)
    }

    pub fn text_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.text.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn file_parts(&self) -> impl Iterator<Item = (&'static str, &FilePart)> {
        self.files.iter().map(|(part, file)| (*part, file))
    }

    /// Email the rate limiter keys on, if the applicant supplied one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.text("email").map(str::trim).filter(|email| !email.is_empty())
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<(String, String)>, Vec<(&'static str, FilePart)>) {
        (self.text, self.files)
    }
}
