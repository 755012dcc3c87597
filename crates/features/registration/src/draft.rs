use crate::field::{
    AttachedFile, AttachmentField, Field, FieldUpdate, FieldValue, FlagField, Section,
    SectionPatch, TextField,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;
use tracing::warn;

/// The complete in-progress registration, grouped by section.
///
/// Every field of every section is present from construction on, holding its initial
/// empty value until written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    sections: BTreeMap<Section, BTreeMap<Field, FieldValue>>,
}

impl Default for Draft {
    fn default() -> Self {
        let sections = Section::iter()
            .map(|section| {
                let values: BTreeMap<_, _> = section.fields().map(|field| (field, field.initial_value())).collect();
                (section, values)
            })
            .collect();
        Self { sections }
    }
}

impl Draft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.sections.get(&field.section()).and_then(|values| values.get(&field))
    }

    #[must_use]
    pub fn text(&self, field: TextField) -> &str {
        self.get(Field::Text(field)).and_then(FieldValue::as_text).unwrap_or_default()
    }

    #[must_use]
    pub fn flag(&self, field: FlagField) -> bool {
        self.get(Field::Flag(field)).and_then(FieldValue::as_flag).unwrap_or_default()
    }

    #[must_use]
    pub fn attachment(&self, field: AttachmentField) -> Option<&AttachedFile> {
        self.get(Field::Attachment(field)).and_then(FieldValue::as_attachment)
    }

    /// Values of one section in field order.
    pub fn section(&self, section: Section) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.sections.get(&section).into_iter().flat_map(|values| values.iter().map(|(f, v)| (*f, v)))
    }

    /// Merges `patch` into its section and returns how many updates were applied.
    ///
    /// Updates naming a field of another section are skipped.
    pub fn apply(&mut self, patch: SectionPatch) -> usize {
        let section = patch.section();
        let Some(values) = self.sections.get_mut(&section) else {
            return 0;
        };

        let mut applied = 0;
        for update in patch.into_updates() {
            let field = update.field();
            if field.section() != section {
                warn!(
                    section = %section,
                    field = %field,
                    owner = %field.section(),
                    "Ignoring update for a field outside the section"
                );
                continue;
            }
            let (field, value) = FieldUpdate::into_parts(update);
            values.insert(field, value);
            applied += 1;
        }
        applied
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        Section::iter().any(|section| self.section_has_data(section))
    }

    #[must_use]
    pub fn section_has_data(&self, section: Section) -> bool {
        self.section(section).any(|(_, value)| value.is_set())
    }

    /// Unions every section into one key namespace.
    #[must_use]
    pub fn flatten(&self) -> FlattenedDraft {
        let mut entries = BTreeMap::new();
        for (field, value) in self.sections.values().flatten() {
            match (*field, value) {
                (Field::Text(_), FieldValue::Text(text)) => {
                    entries.insert(field.key(), FlatValue::Text(text.clone()));
                },
                (Field::Flag(_), FieldValue::Flag(flag)) => {
                    entries.insert(field.key(), FlatValue::Flag(*flag));
                },
                (Field::Attachment(attachment), FieldValue::Attachment(file)) => {
                    entries.insert(attachment.preview_key(), FlatValue::Preview {
                        of: attachment,
                        preview: file.as_ref().and_then(|file| file.preview.clone()),
                    });
                    entries.insert(field.key(), FlatValue::Attachment {
                        field: attachment,
                        file: file.clone(),
                    });
                },
                _ => {},
            }
        }
        FlattenedDraft { entries }
    }

    /// Restores the full field set after decoding a snapshot.
    ///
    /// Missing fields get their initial value, values of the wrong kind are reset and fields
    /// filed under the wrong section are dropped.
    #[must_use]
    pub(crate) fn normalized(mut self) -> Self {
        let mut fresh = Self::default();
        for (section, values) in &mut fresh.sections {
            let Some(mut stored) = self.sections.remove(section) else {
                continue;
            };
            for (field, value) in values.iter_mut() {
                match stored.remove(field) {
                    Some(candidate) if same_kind(*field, &candidate) => *value = candidate,
                    Some(_) => warn!(field = %field, "Discarding persisted value of the wrong kind"),
                    None => {},
                }
            }
        }
        fresh
    }
}

const fn same_kind(field: Field, value: &FieldValue) -> bool {
    matches!(
        (field, value),
        (Field::Text(_), FieldValue::Text(_))
            | (Field::Flag(_), FieldValue::Flag(_))
            | (Field::Attachment(_), FieldValue::Attachment(_))
    )
}

/// One entry of the flattened view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatValue {
    Text(String),
    Flag(bool),
    Attachment { field: AttachmentField, file: Option<AttachedFile> },
    Preview { of: AttachmentField, preview: Option<String> },
}

/// Every field of every section under a single key namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedDraft {
    entries: BTreeMap<&'static str, FlatValue>,
}

impl FlattenedDraft {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FlatValue> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key)? {
            FlatValue::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.entries.get(key)? {
            FlatValue::Flag(flag) => Some(*flag),
            _ => None,
        }
    }

    #[must_use]
    pub fn attachment(&self, field: AttachmentField) -> Option<&AttachedFile> {
        match self.entries.get(Field::Attachment(field).key())? {
            FlatValue::Attachment { file, .. } => file.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn preview(&self, field: AttachmentField) -> Option<&str> {
        match self.entries.get(field.preview_key())? {
            FlatValue::Preview { preview, .. } => preview.as_deref(),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FlatValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.entries.values().any(|value| match value {
            FlatValue::Text(text) => !text.is_empty(),
            FlatValue::Flag(flag) => *flag,
            FlatValue::Attachment { file, .. } => file.is_some(),
            FlatValue::Preview { .. } => false,
        })
    }
}
