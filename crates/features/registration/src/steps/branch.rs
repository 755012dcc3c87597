use super::{ReadinessCheck, StepUnit};
use crate::field::{Section, TextField};
use crate::schema::{FieldRules, Rule, StepSchema};
use crate::store::DraftWriter;
use mkp_storage::KeyValueStore;

/// Step 5: main branch details.
#[derive(Debug)]
pub struct BranchStep<S> {
    unit: StepUnit<S>,
}

impl<S: KeyValueStore> BranchStep<S> {
    #[must_use]
    pub fn schema() -> StepSchema {
        StepSchema::new(Section::Branch)
            .field(FieldRules::text(TextField::BranchName).required("validation.please_enter_branch_name"))
            .field(FieldRules::text(TextField::BranchAddress).required("validation.please_enter_branch_address"))
            .field(
                FieldRules::text(TextField::BranchEmail)
                    .required("validation.email_invalid")
                    .rule(Rule::Email, "validation.email_invalid"),
            )
    }

    #[must_use]
    pub fn mount(draft: DraftWriter<S>) -> Self {
        Self { unit: StepUnit::mount(Self::schema(), draft) }
    }

    /// Branch hotline and phone are digit-normalized before they are stored.
    pub async fn set(&mut self, field: TextField, value: &str) {
        self.unit.set_text(field, value).await;
    }

    #[must_use]
    pub const fn unit(&self) -> &StepUnit<S> {
        &self.unit
    }

    pub fn unit_mut(&mut self) -> &mut StepUnit<S> {
        &mut self.unit
    }
}

impl<S: KeyValueStore> ReadinessCheck for BranchStep<S> {
    async fn is_ready(&mut self) -> bool {
        self.unit.is_ready().await
    }
}
