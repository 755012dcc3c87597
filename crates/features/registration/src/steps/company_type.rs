use super::{ReadinessCheck, StepUnit};
use crate::field::{Field, Section, TextField};
use crate::schema::{FieldRules, Rule, StepSchema};
use crate::store::DraftWriter;
use mkp_storage::KeyValueStore;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Business kind chosen on the first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum CompanyType {
    Developer,
    Broker,
}

const COMPANY_TYPES: &[&str] = &["developer", "broker"];

/// Step 1: company type selection.
#[derive(Debug)]
pub struct CompanyTypeStep<S> {
    unit: StepUnit<S>,
}

impl<S: KeyValueStore> CompanyTypeStep<S> {
    #[must_use]
    pub fn schema() -> StepSchema {
        StepSchema::new(Section::Type).field(
            FieldRules::text(TextField::CompanyType)
                .required("step1.please_select")
                .rule(Rule::OneOf(COMPANY_TYPES), "step1.please_select"),
        )
    }

    #[must_use]
    pub fn mount(draft: DraftWriter<S>) -> Self {
        Self { unit: StepUnit::mount(Self::schema(), draft) }
    }

    pub async fn select(&mut self, kind: CompanyType) {
        let value: &'static str = kind.into();
        self.unit.set_text(TextField::CompanyType, value).await;
    }

    /// Currently selected type, if any.
    #[must_use]
    pub fn selected(&self) -> Option<CompanyType> {
        CompanyType::from_str(self.unit.form().text(TextField::CompanyType)).ok()
    }

    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        self.unit.error(Field::Text(TextField::CompanyType))
    }

    #[must_use]
    pub const fn unit(&self) -> &StepUnit<S> {
        &self.unit
    }

    pub fn unit_mut(&mut self) -> &mut StepUnit<S> {
        &mut self.unit
    }
}

impl<S: KeyValueStore> ReadinessCheck for CompanyTypeStep<S> {
    async fn is_ready(&mut self) -> bool {
        self.unit.is_ready().await
    }
}
