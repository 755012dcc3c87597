use super::{ReadinessCheck, StepUnit};
use crate::field::{Section, TextField};
use crate::schema::{FieldRules, StepSchema};
use crate::store::DraftWriter;
use mkp_storage::KeyValueStore;

/// Step 2: company identity.
#[derive(Debug)]
pub struct CompanyStep<S> {
    unit: StepUnit<S>,
}

impl<S: KeyValueStore> CompanyStep<S> {
    #[must_use]
    pub fn schema() -> StepSchema {
        StepSchema::new(Section::Company)
            .field(FieldRules::text(TextField::CompanyName).required("validation.please_enter_company_name"))
            .field(
                FieldRules::text(TextField::CommercialRegistrationId)
                    .required("validation.please_enter_commercial_reg"),
            )
            .field(FieldRules::text(TextField::TaxId).required("validation.please_enter_tax_id"))
            .field(FieldRules::text(TextField::CompanyAddress).required("validation.please_enter_company_address"))
    }

    #[must_use]
    pub fn mount(draft: DraftWriter<S>) -> Self {
        Self { unit: StepUnit::mount(Self::schema(), draft) }
    }

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

impl<S: KeyValueStore> ReadinessCheck for CompanyStep<S> {
    async fn is_ready(&mut self) -> bool {
        self.unit.is_ready().await
    }
}
