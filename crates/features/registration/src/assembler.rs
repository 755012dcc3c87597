use crate::draft::{FlatValue, FlattenedDraft};
use mkp_gateway::{FilePart, RegistrationPayload};

/// Converts the flattened draft into the wire payload.
///
/// Text and flag fields become text entries under their draft keys (flags as `true`/`false`).
/// Present attachments become binary parts under their wire names; previews never leave the
/// draft. Pure and repeatable.
#[must_use]
pub fn assemble(draft: &FlattenedDraft) -> RegistrationPayload {
    let mut payload = RegistrationPayload::new();

    for (key, value) in draft.iter() {
        match value {
            FlatValue::Text(text) => payload.push_text(key, text.as_str()),
            FlatValue::Flag(flag) => payload.push_text(key, flag.to_string()),
            FlatValue::Attachment { field, file: Some(file) } => payload.push_file(
                field.wire_part(),
                FilePart {
                    file_name: file.file_name.clone(),
                    mime: file.mime.clone(),
                    bytes: file.bytes.clone(),
                },
            ),
            FlatValue::Attachment { file: None, .. } | FlatValue::Preview { .. } => {},
        }
    }

    payload
}
