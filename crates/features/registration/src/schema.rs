//! Declarative per-step validation.
//!
//! A [`StepSchema`] lists [`FieldRules`] for the fields of one section. Every rule except
//! [`Rule::Required`] and [`Rule::MustBeTrue`] passes on an empty value, so optional fields
//! only need format rules. A field reports the message key of its first failing rule.
//!
//! [`StepForm`] is the local form state of a step unit: values mirrored from the draft,
//! touched markers, schema errors and file rejections.

use crate::attachment::FileRejection;
use crate::field::{AttachedFile, AttachmentField, Field, FieldValue, FlagField, Section, SectionPatch, TextField};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::warn;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)https?://[^\s/$.?#][^\s]*\.[^\s]+$").expect("valid url pattern")
});

/// A single constraint on a field value.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Text must be non-blank, an attachment must be present.
    Required,
    OneOf(&'static [&'static str]),
    Pattern(&'static LazyLock<Regex>),
    Email,
    Url,
    MinLength(usize),
    /// Text must equal the value of another field in the same form.
    EqualsField(TextField),
    MustBeTrue,
}

impl Rule {
    fn holds(self, value: &FieldValue, values: &BTreeMap<Field, FieldValue>) -> bool {
        match (self, value) {
            (Self::Required, FieldValue::Text(text)) => !text.trim().is_empty(),
            (Self::Required, FieldValue::Attachment(file)) => file.is_some(),
            (Self::Required | Self::MustBeTrue, FieldValue::Flag(flag)) => *flag,
            (_, FieldValue::Text(text)) if text.is_empty() => true,
            (Self::OneOf(allowed), FieldValue::Text(text)) => allowed.contains(&text.as_str()),
            (Self::Pattern(pattern), FieldValue::Text(text)) => pattern.is_match(text),
            (Self::Email, FieldValue::Text(text)) => EMAIL.is_match(text.trim()),
            (Self::Url, FieldValue::Text(text)) => URL.is_match(text.trim()),
            (Self::MinLength(min), FieldValue::Text(text)) => text.chars().count() >= min,
            (Self::EqualsField(other), FieldValue::Text(text)) => {
                values.get(&Field::Text(other)).and_then(FieldValue::as_text) == Some(text.as_str())
            },
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
struct Check {
    rule: Rule,
    message: &'static str,
}

/// Ordered rules of one field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: Field,
    checks: Vec<Check>,
}

impl FieldRules {
    #[must_use]
    pub const fn new(field: Field) -> Self {
        Self { field, checks: Vec::new() }
    }

    #[must_use]
    pub const fn text(field: TextField) -> Self {
        Self::new(Field::Text(field))
    }

    #[must_use]
    pub const fn flag(field: FlagField) -> Self {
        Self::new(Field::Flag(field))
    }

    #[must_use]
    pub const fn attachment(field: AttachmentField) -> Self {
        Self::new(Field::Attachment(field))
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule, message: &'static str) -> Self {
        self.checks.push(Check { rule, message });
        self
    }

    #[must_use]
    pub fn required(self, message: &'static str) -> Self {
        self.rule(Rule::Required, message)
    }

    #[must_use]
    pub const fn field(&self) -> Field {
        self.field
    }

    /// Message key of the first failing rule.
    fn first_failure(&self, values: &BTreeMap<Field, FieldValue>) -> Option<&'static str> {
        let initial = self.field.initial_value();
        let value = values.get(&self.field).unwrap_or(&initial);
        self.checks.iter().find(|check| !check.rule.holds(value, values)).map(|check| check.message)
    }
}

/// Validation schema of one step.
#[derive(Debug, Clone)]
pub struct StepSchema {
    section: Section,
    fields: Vec<FieldRules>,
}

impl StepSchema {
    #[must_use]
    pub const fn new(section: Section) -> Self {
        Self { section, fields: Vec::new() }
    }

    /// Adds rules for `rules.field()`; fields of other sections are not accepted.
    ///
    /// # Panics
    /// Panics if the field belongs to another section.
    #[must_use]
    pub fn field(mut self, rules: FieldRules) -> Self {
        assert_eq!(rules.field.section(), self.section, "field {} is not in {}", rules.field, self.section);
        self.fields.push(rules);
        self
    }

    #[must_use]
    pub const fn section(&self) -> Section {
        self.section
    }

    /// Every failing field with its message key.
    #[must_use]
    pub fn validate(&self, values: &BTreeMap<Field, FieldValue>) -> BTreeMap<Field, &'static str> {
        self.fields
            .iter()
            .filter_map(|rules| rules.first_failure(values).map(|message| (rules.field, message)))
            .collect()
    }
}

/// Normalizes phone-like input: Arabic-Indic digits become ASCII and everything else
/// that is not a digit is dropped.
#[must_use]
pub fn sanitize_numeric_input(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '0'..='9' => Some(c),
            '\u{0660}'..='\u{0669}' => char::from_digit(u32::from(c) - 0x0660, 10),
            '\u{06F0}'..='\u{06F9}' => char::from_digit(u32::from(c) - 0x06F0, 10),
            _ => None,
        })
        .collect()
}

/// Local form state of one step unit.
#[derive(Debug, Clone)]
pub struct StepForm {
    schema: StepSchema,
    values: BTreeMap<Field, FieldValue>,
    touched: BTreeSet<Field>,
    errors: BTreeMap<Field, &'static str>,
    rejections: BTreeMap<AttachmentField, FileRejection>,
}

impl StepForm {
    #[must_use]
    pub fn new(schema: StepSchema) -> Self {
        let values = schema.section.fields().map(|field| (field, field.initial_value())).collect();
        let mut form =
            Self { schema, values, touched: BTreeSet::new(), errors: BTreeMap::new(), rejections: BTreeMap::new() };
        form.revalidate();
        form
    }

    #[must_use]
    pub const fn section(&self) -> Section {
        self.schema.section
    }

    /// Reinitializes values from the draft; fields of other sections are ignored.
    pub fn load(&mut self, values: impl IntoIterator<Item = (Field, FieldValue)>) {
        let section = self.section();
        for (field, value) in values {
            if field.section() == section {
                self.values.insert(field, value);
            }
        }
        self.revalidate();
    }

    /// Clears touched markers and rejections, then reloads values from the draft.
    pub fn remount(&mut self, values: impl IntoIterator<Item = (Field, FieldValue)>) {
        self.touched.clear();
        self.rejections.clear();
        self.load(values);
    }

    fn owns(&self, field: Field) -> bool {
        let owned = field.section() == self.section();
        if !owned {
            warn!(field = %field, section = %self.section(), "Ignoring change to a field of another step");
        }
        owned
    }

    /// Records a text change and returns the draft update for it.
    pub fn set_text(&mut self, field: TextField, raw: &str) -> SectionPatch {
        if !self.owns(Field::Text(field)) {
            return SectionPatch::new(self.section());
        }
        let value = if field.is_numeric() { sanitize_numeric_input(raw) } else { raw.to_owned() };
        self.values.insert(Field::Text(field), FieldValue::Text(value.clone()));
        self.touched.insert(Field::Text(field));
        self.revalidate();
        SectionPatch::new(self.section()).text(field, value)
    }

    pub fn set_flag(&mut self, field: FlagField, value: bool) -> SectionPatch {
        if !self.owns(Field::Flag(field)) {
            return SectionPatch::new(self.section());
        }
        self.values.insert(Field::Flag(field), FieldValue::Flag(value));
        self.touched.insert(Field::Flag(field));
        self.revalidate();
        SectionPatch::new(self.section()).flag(field, value)
    }

    /// Records an accepted (or cleared) attachment and drops any earlier rejection.
    pub fn set_attachment(&mut self, field: AttachmentField, file: Option<AttachedFile>) -> SectionPatch {
        if !self.owns(Field::Attachment(field)) {
            return SectionPatch::new(self.section());
        }
        self.rejections.remove(&field);
        self.values.insert(Field::Attachment(field), FieldValue::Attachment(file.clone()));
        self.touched.insert(Field::Attachment(field));
        self.revalidate();
        SectionPatch::new(self.section()).attachment(field, file)
    }

    /// Shows a file rejection on the attachment control; the stored value is kept.
    pub fn reject(&mut self, field: AttachmentField, rejection: FileRejection) {
        self.touched.insert(Field::Attachment(field));
        self.rejections.insert(field, rejection);
    }

    pub fn touch_all(&mut self) {
        self.touched.extend(self.values.keys().copied());
    }

    /// Marks every field touched and re-runs the schema; `true` when nothing fails.
    pub fn check(&mut self) -> bool {
        self.touch_all();
        self.revalidate();
        self.errors.is_empty()
    }

    fn revalidate(&mut self) {
        self.errors = self.schema.validate(&self.values);
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    #[must_use]
    pub fn value(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    #[must_use]
    pub fn text(&self, field: TextField) -> &str {
        self.value(Field::Text(field)).and_then(FieldValue::as_text).unwrap_or_default()
    }

    #[must_use]
    pub fn rejection(&self, field: AttachmentField) -> Option<&FileRejection> {
        self.rejections.get(&field)
    }

    /// Inline message key for `field`: a file rejection first, then a schema error once the
    /// field is touched.
    #[must_use]
    pub fn error(&self, field: Field) -> Option<&'static str> {
        if let Field::Attachment(attachment) = field
            && let Some(rejection) = self.rejections.get(&attachment)
        {
            return Some(rejection.message_key());
        }
        self.errors.get(&field).copied().filter(|_| self.touched.contains(&field))
    }

    /// All inline messages currently shown.
    pub fn visible_errors(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.values.keys().filter_map(|field| self.error(*field).map(|message| (*field, message)))
    }
}
