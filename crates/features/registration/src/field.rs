//! Typed field catalogue of the registration draft.
//!
//! Every field belongs to exactly one [`Section`] and has exactly one value kind, so a
//! text field can never hold an attachment and a preview can never exist without its file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use mkp_kernel::domain::constants::{
    COMMERCIAL_REGISTRATION_PART, LOGO_PART, TAX_BACK_PART, TAX_FRONT_PART, TOTAL_STEPS,
};

/// One wizard step's subject matter, in step order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    Type,
    Company,
    Contact,
    Documents,
    Branch,
    Security,
}

impl Section {
    /// 1-based step that owns this section.
    #[must_use]
    pub const fn step(self) -> u8 {
        match self {
            Self::Type => 1,
            Self::Company => 2,
            Self::Contact => 3,
            Self::Documents => 4,
            Self::Branch => 5,
            Self::Security => TOTAL_STEPS,
        }
    }

    #[must_use]
    pub fn from_step(step: u8) -> Option<Self> {
        Self::iter().find(|section| section.step() == step)
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Fields of this section in declaration order.
    pub fn fields(self) -> impl Iterator<Item = Field> {
        Field::all().filter(move |field| field.section() == self)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum TextField {
    CompanyType,
    CompanyName,
    CommercialRegistrationId,
    TaxId,
    CompanyAddress,
    Hotline,
    PhoneNumber,
    Website,
    BranchName,
    BranchAddress,
    BranchEmail,
    BranchHotline,
    BranchPhone,
    Email,
    Password,
    ConfirmPassword,
}

impl TextField {
    #[must_use]
    pub const fn section(self) -> Section {
        match self {
            Self::CompanyType => Section::Type,
            Self::CompanyName
            | Self::CommercialRegistrationId
            | Self::TaxId
            | Self::CompanyAddress => Section::Company,
            Self::Hotline | Self::PhoneNumber | Self::Website => Section::Contact,
            Self::BranchName
            | Self::BranchAddress
            | Self::BranchEmail
            | Self::BranchHotline
            | Self::BranchPhone => Section::Branch,
            Self::Email | Self::Password | Self::ConfirmPassword => Section::Security,
        }
    }

    /// Whether input is normalized to ASCII digits before it is stored.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Hotline | Self::PhoneNumber | Self::BranchHotline | Self::BranchPhone)
    }

    /// Whether the value must be masked when displayed.
    #[must_use]
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::ConfirmPassword)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum FlagField {
    AcceptTerms,
}

impl FlagField {
    #[must_use]
    pub const fn section(self) -> Section {
        match self {
            Self::AcceptTerms => Section::Security,
        }
    }
}

/// The four binary fields of the draft.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum AttachmentField {
    CompanyLogo,
    CommercialRegistrationImage,
    TaxCardFront,
    TaxCardBack,
}

impl AttachmentField {
    #[must_use]
    pub const fn section(self) -> Section {
        match self {
            Self::CompanyLogo => Section::Contact,
            Self::CommercialRegistrationImage | Self::TaxCardFront | Self::TaxCardBack => {
                Section::Documents
            },
        }
    }

    /// Flattened key of the derived preview.
    #[must_use]
    pub const fn preview_key(self) -> &'static str {
        match self {
            Self::CompanyLogo => "companyLogoPreview",
            Self::CommercialRegistrationImage => "commercialRegistrationImagePreview",
            Self::TaxCardFront => "taxCardFrontPreview",
            Self::TaxCardBack => "taxCardBackPreview",
        }
    }

    /// Multipart part name used on the wire.
    #[must_use]
    pub const fn wire_part(self) -> &'static str {
        match self {
            Self::CompanyLogo => LOGO_PART,
            Self::CommercialRegistrationImage => COMMERCIAL_REGISTRATION_PART,
            Self::TaxCardFront => TAX_FRONT_PART,
            Self::TaxCardBack => TAX_BACK_PART,
        }
    }
}

/// Any draft field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Text(TextField),
    Flag(FlagField),
    Attachment(AttachmentField),
}

impl Field {
    #[must_use]
    pub const fn section(self) -> Section {
        match self {
            Self::Text(field) => field.section(),
            Self::Flag(field) => field.section(),
            Self::Attachment(field) => field.section(),
        }
    }

    /// Flattened key (`companyName`, `acceptTerms`, `companyLogo`, ...).
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Text(field) => field.into(),
            Self::Flag(field) => field.into(),
            Self::Attachment(field) => field.into(),
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        TextField::iter()
            .map(Self::Text)
            .chain(FlagField::iter().map(Self::Flag))
            .chain(AttachmentField::iter().map(Self::Attachment))
    }

    /// Looks a field up by its flattened key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        TextField::from_str(key)
            .map(Self::Text)
            .or_else(|_| FlagField::from_str(key).map(Self::Flag))
            .or_else(|_| AttachmentField::from_str(key).map(Self::Attachment))
            .ok()
    }

    /// Value of the field in a freshly created draft.
    #[must_use]
    pub const fn initial_value(self) -> FieldValue {
        match self {
            Self::Text(_) => FieldValue::Text(String::new()),
            Self::Flag(_) => FieldValue::Flag(false),
            Self::Attachment(_) => FieldValue::Attachment(None),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Stored value of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Attachment(Option<AttachedFile>),
}

impl FieldValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_attachment(&self) -> Option<&AttachedFile> {
        match self {
            Self::Attachment(file) => file.as_ref(),
            _ => None,
        }
    }

    /// Whether the value differs from the initial empty value.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        match self {
            Self::Text(value) => !value.is_empty(),
            Self::Flag(value) => *value,
            Self::Attachment(file) => file.is_some(),
        }
    }
}

/// An accepted binary file together with its derived preview.
///
/// The preview lives inside the attachment, so it is replaced or cleared whenever the
/// attachment is.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedFile {
    pub id: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Arc<[u8]>,
    pub preview: Option<String>,
}

impl AttachedFile {
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for AttachedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachedFile")
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .field("has_preview", &self.preview.is_some())
            .finish()
    }
}

/// A single typed write into the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Text(TextField, String),
    Flag(FlagField, bool),
    Attachment(AttachmentField, Option<AttachedFile>),
}

impl FieldUpdate {
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::Text(field, _) => Field::Text(*field),
            Self::Flag(field, _) => Field::Flag(*field),
            Self::Attachment(field, _) => Field::Attachment(*field),
        }
    }

    pub(crate) fn into_parts(self) -> (Field, FieldValue) {
        match self {
            Self::Text(field, value) => (Field::Text(field), FieldValue::Text(value)),
            Self::Flag(field, value) => (Field::Flag(field), FieldValue::Flag(value)),
            Self::Attachment(field, file) => (Field::Attachment(field), FieldValue::Attachment(file)),
        }
    }
}

/// A section-scoped merge update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPatch {
    section: Section,
    updates: Vec<FieldUpdate>,
}

impl SectionPatch {
    #[must_use]
    pub const fn new(section: Section) -> Self {
        Self { section, updates: Vec::new() }
    }

    #[must_use]
    pub fn text(mut self, field: TextField, value: impl Into<String>) -> Self {
        self.updates.push(FieldUpdate::Text(field, value.into()));
        self
    }

    #[must_use]
    pub fn flag(mut self, field: FlagField, value: bool) -> Self {
        self.updates.push(FieldUpdate::Flag(field, value));
        self
    }

    #[must_use]
    pub fn attachment(mut self, field: AttachmentField, file: Option<AttachedFile>) -> Self {
        self.updates.push(FieldUpdate::Attachment(field, file));
        self
    }

    pub fn push(&mut self, update: FieldUpdate) {
        self.updates.push(update);
    }

    #[must_use]
    pub const fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn updates(&self) -> impl Iterator<Item = &FieldUpdate> {
        self.updates.iter()
    }

    pub(crate) fn into_updates(self) -> Vec<FieldUpdate> {
        self.updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_camel_case_and_unique() {
        let keys: Vec<_> = Field::all().map(Field::key).collect();
        assert!(keys.contains(&"commercialRegistrationId"));
        assert!(keys.contains(&"acceptTerms"));
        assert!(keys.contains(&"taxCardBack"));

        let mut dedup = keys.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), keys.len());
    }

    #[test]
    fn preview_keys_never_collide_with_field_keys() {
        for field in AttachmentField::iter() {
            assert_eq!(field.preview_key(), format!("{}Preview", Field::Attachment(field).key()));
            assert!(Field::from_key(field.preview_key()).is_none());
        }
    }

    #[test]
    fn every_section_maps_back_to_its_step() {
        for section in Section::iter() {
            assert_eq!(Section::from_step(section.step()), Some(section));
            assert!(section.fields().count() > 0);
        }
        assert_eq!(Section::from_step(0), None);
        assert_eq!(Section::from_step(7), None);
        assert_eq!(Section::Documents.key(), "documents");
    }

    #[test]
    fn from_key_resolves_each_kind() {
        assert_eq!(Field::from_key("hotline"), Some(Field::Text(TextField::Hotline)));
        assert_eq!(Field::from_key("acceptTerms"), Some(Field::Flag(FlagField::AcceptTerms)));
        assert_eq!(
            Field::from_key("companyLogo"),
            Some(Field::Attachment(AttachmentField::CompanyLogo))
        );
        assert_eq!(Field::from_key("nope"), None);
    }
}
