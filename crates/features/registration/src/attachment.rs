use crate::error::RegistrationError;
use crate::field::AttachedFile;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mkp_kernel::domain::config::AttachmentConfig;
use mkp_kernel::safe_nanoid;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A file picked by the user, before pre-validation.
#[derive(Clone, PartialEq, Eq)]
pub struct AttachmentInput {
    pub file_name: String,
    /// Declared MIME type.
    pub mime: String,
    pub bytes: Arc<[u8]>,
}

impl AttachmentInput {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self { file_name: file_name.into(), mime: mime.into(), bytes: bytes.into() }
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }
}

impl fmt::Debug for AttachmentInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentInput")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Why a selected file was refused before it reached the draft.
#[mkp_derive::mkp_error]
#[derive(Clone, PartialEq, Eq)]
pub enum FileRejection {
    #[error("Unsupported file type '{mime}'")]
    UnsupportedType { mime: String },

    #[error("File of {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: u64, max: u64 },
}

impl FileRejection {
    /// Translation key shown on the attachment control.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "validation.file_type_invalid",
            Self::TooLarge { .. } => "validation.file_too_large",
        }
    }
}

/// Allowed types and size ceiling for attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPolicy {
    max_bytes: u64,
    allowed_types: Vec<String>,
}

impl AttachmentPolicy {
    pub fn new(max_bytes: u64, allowed_types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let allowed_types = allowed_types.into_iter().map(|t| t.into().to_ascii_lowercase()).collect();
        Self { max_bytes, allowed_types }
    }

    #[must_use]
    pub fn from_config(config: &AttachmentConfig) -> Self {
        Self::new(config.max_bytes, config.allowed_types.iter().map(String::as_str))
    }

    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Checks the declared type first, then the size.
    ///
    /// # Errors
    /// Returns the first [`FileRejection`] that applies.
    pub fn check(&self, input: &AttachmentInput) -> Result<(), FileRejection> {
        let essence = input.mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        if !self.allowed_types.iter().any(|allowed| *allowed == essence) {
            return Err(FileRejection::UnsupportedType { mime: input.mime.clone() });
        }

        let size = input.size();
        if size > self.max_bytes {
            return Err(FileRejection::TooLarge { size, max: self.max_bytes });
        }
        Ok(())
    }
}

/// Derives a displayable representation of an attachment.
///
/// Runs on the blocking pool, so implementations may do CPU-heavy work.
pub trait PreviewRenderer: Send + Sync + 'static {
    /// # Errors
    /// Returns [`RegistrationError::Preview`] if no representation can be produced.
    fn render(&self, mime: &str, bytes: &[u8]) -> Result<String, RegistrationError>;
}

/// Renders `data:<mime>;base64,<payload>` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlRenderer;

impl PreviewRenderer for DataUrlRenderer {
    fn render(&self, mime: &str, bytes: &[u8]) -> Result<String, RegistrationError> {
        if bytes.is_empty() {
            return Err(RegistrationError::Preview { message: "empty file".into(), context: None });
        }
        Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }
}

/// Pre-validation followed by preview derivation.
#[derive(Clone)]
pub struct AttachmentPipeline {
    policy: AttachmentPolicy,
    renderer: Arc<dyn PreviewRenderer>,
}

impl fmt::Debug for AttachmentPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentPipeline").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl AttachmentPipeline {
    pub fn new(policy: AttachmentPolicy, renderer: impl PreviewRenderer) -> Self {
        Self { policy, renderer: Arc::new(renderer) }
    }

    #[must_use]
    pub fn from_config(config: &AttachmentConfig) -> Self {
        Self::new(AttachmentPolicy::from_config(config), DataUrlRenderer)
    }

    #[must_use]
    pub const fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    /// Validates `input` and, once accepted, derives its preview.
    ///
    /// A failing renderer still yields the attachment, without preview.
    ///
    /// # Errors
    /// Returns a [`FileRejection`] when the policy refuses the file; no preview is rendered then.
    pub async fn accept(&self, input: AttachmentInput) -> Result<AttachedFile, FileRejection> {
        self.policy.check(&input)?;
        let preview = self.render_preview(&input).await;
        let file = AttachedFile {
            id: safe_nanoid!(),
            file_name: input.file_name,
            mime: input.mime,
            bytes: input.bytes,
            preview,
        };
        debug!(file = ?file, "Attachment accepted");
        Ok(file)
    }

    async fn render_preview(&self, input: &AttachmentInput) -> Option<String> {
        let renderer = Arc::clone(&self.renderer);
        let mime = input.mime.clone();
        let bytes = Arc::clone(&input.bytes);

        match tokio::task::spawn_blocking(move || renderer.render(&mime, &bytes)).await {
            Ok(Ok(preview)) => Some(preview),
            Ok(Err(e)) => {
                warn!(file = %input.file_name, error = %e, "Preview rendering failed, storing file without preview");
                None
            },
            Err(e) => {
                warn!(file = %input.file_name, error = %e, "Preview task aborted");
                None
            },
        }
    }
}
