use crate::bridge::{BridgeResponder, Verdict};
use crate::field::{Field, FlagField, Section, TextField};
use crate::schema::{FieldRules, Rule, StepForm, StepSchema};
use crate::store::DraftWriter;
use mkp_storage::KeyValueStore;
use parking_lot::Mutex;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use tracing::{debug, info};

const MIN_PASSWORD_CHARS: usize = 8;

static UPPERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[A-Z]").expect("valid uppercase pattern"));
static LOWERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[a-z]").expect("valid lowercase pattern"));
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-9]").expect("valid digit pattern"));
static SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).expect("valid special pattern"));

/// Password strength checklist shown next to the password input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum PasswordRequirement {
    MinChars,
    Uppercase,
    Lowercase,
    Number,
    Special,
}

impl PasswordRequirement {
    #[must_use]
    pub const fn label_key(self) -> &'static str {
        match self {
            Self::MinChars => "security.req_min_chars",
            Self::Uppercase => "security.req_uppercase",
            Self::Lowercase => "security.req_lowercase",
            Self::Number => "security.req_number",
            Self::Special => "security.req_special",
        }
    }

    fn rule(self) -> Rule {
        match self {
            Self::MinChars => Rule::MinLength(MIN_PASSWORD_CHARS),
            Self::Uppercase => Rule::Pattern(&UPPERCASE),
            Self::Lowercase => Rule::Pattern(&LOWERCASE),
            Self::Number => Rule::Pattern(&DIGIT),
            Self::Special => Rule::Pattern(&SPECIAL),
        }
    }

    #[must_use]
    pub fn is_met(self, password: &str) -> bool {
        match self {
            Self::MinChars => password.chars().count() >= MIN_PASSWORD_CHARS,
            Self::Uppercase => UPPERCASE.is_match(password),
            Self::Lowercase => LOWERCASE.is_match(password),
            Self::Number => DIGIT.is_match(password),
            Self::Special => SPECIAL.is_match(password),
        }
    }
}

/// Step 6: account credentials and terms acceptance.
///
/// The controller cannot call into this step directly; it asks through the validation
/// bridge, which [`SecurityStep::serve`] answers. Clones share the same form.
pub struct SecurityStep<S> {
    form: Arc<Mutex<StepForm>>,
    draft: DraftWriter<S>,
}

impl<S> Clone for SecurityStep<S> {
    fn clone(&self) -> Self {
        Self { form: Arc::clone(&self.form), draft: self.draft.clone() }
    }
}

impl<S> fmt::Debug for SecurityStep<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityStep").field("valid", &self.form.lock().is_valid()).finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> SecurityStep<S> {
    #[must_use]
    pub fn schema() -> StepSchema {
        let password = PasswordRequirement::iter().fold(
            FieldRules::text(TextField::Password).required("validation.required_field"),
            |rules, requirement| rules.rule(requirement.rule(), requirement.label_key()),
        );

        StepSchema::new(Section::Security)
            .field(
                FieldRules::text(TextField::Email)
                    .required("validation.required_field")
                    .rule(Rule::Email, "validation.email_invalid"),
            )
            .field(password)
            .field(
                FieldRules::text(TextField::ConfirmPassword)
                    .required("validation.required_field")
                    .rule(Rule::EqualsField(TextField::Password), "validation.passwords_not_match"),
            )
            .field(FieldRules::flag(FlagField::AcceptTerms).rule(Rule::MustBeTrue, "validation.must_accept_terms"))
    }

    #[must_use]
    pub fn mount(draft: DraftWriter<S>) -> Self {
        let mut form = StepForm::new(Self::schema());
        form.load(draft.section(Section::Security));
        Self { form: Arc::new(Mutex::new(form)), draft }
    }

    /// Discards local state and reloads from the draft.
    pub fn remount(&self) {
        let values = self.draft.section(Section::Security);
        self.form.lock().remount(values);
    }

    pub async fn set(&self, field: TextField, value: &str) {
        let patch = self.form.lock().set_text(field, value);
        if !patch.is_empty() {
            self.draft.update_section(patch).await;
        }
    }

    pub async fn set_accept_terms(&self, accepted: bool) {
        let patch = self.form.lock().set_flag(FlagField::AcceptTerms, accepted);
        self.draft.update_section(patch).await;
    }

    /// Checklist state for the current password.
    #[must_use]
    pub fn password_requirements(&self) -> Vec<(PasswordRequirement, bool)> {
        let form = self.form.lock();
        let password = form.text(TextField::Password);
        PasswordRequirement::iter().map(|requirement| (requirement, requirement.is_met(password))).collect()
    }

    #[must_use]
    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.form.lock().error(field)
    }

    /// Marks every field touched and runs the full schema.
    #[must_use]
    pub fn check(&self) -> bool {
        self.form.lock().check()
    }

    /// Answers validation requests until the bridge closes.
    pub async fn serve(self, mut responder: BridgeResponder) {
        while let Some(request) = responder.recv().await {
            let valid = self.check();
            info!(request = request.id(), valid, "Terminal step validated");
            request.resolve(Verdict::from_valid(valid));
        }
        debug!("Validation bridge closed");
    }
}
