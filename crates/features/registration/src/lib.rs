//! # Registration Wizard
//!
//! Six-step company registration flow.
//!
//! - **[`DraftStore`]**: the owned draft (six sections of typed fields) plus the step cursor,
//!   written through to a [`mkp_storage::KeyValueStore`] on every mutation and rehydrated on
//!   open.
//! - **Step units** ([`steps`]): one form per section with a declarative [`StepSchema`],
//!   inline errors and, for contact and documents, file pre-validation with previews.
//! - **[`ValidationBridge`]**: the timed request/response handshake through which the
//!   controller asks the terminal step to validate.
//! - **[`StepController`]**: navigation chrome, readiness-gated advancing and the single-flight
//!   submit protocol.
//! - **[`assemble`]**: the pure draft-to-payload conversion handed to a
//!   [`mkp_gateway::SubmissionGateway`].
//!
//! [`Wizard`] mounts all of the above together.
//!
//! ```rust
//! use mkp_registration::{DraftStore, Section, SectionPatch, TextField};
//! use mkp_storage::MemoryStore;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = DraftStore::open(MemoryStore::new()).await?;
//! store.update_section(SectionPatch::new(Section::Company).text(TextField::CompanyName, "Acme")).await;
//!
//! assert_eq!(store.flattened().text("companyName"), Some("Acme"));
//! assert_eq!(store.next_step().await.get(), 2);
//! # Ok::<(), mkp_registration::RegistrationError>(())
//! # }).unwrap();
//! ```

mod assembler;
mod attachment;
pub mod bridge;
mod controller;
mod draft;
mod error;
mod field;
mod schema;
pub mod steps;
mod store;
mod wizard;

pub use assembler::assemble;
pub use attachment::{
    AttachmentInput, AttachmentPipeline, AttachmentPolicy, DataUrlRenderer, FileRejection, FileRejectionExt,
    PreviewRenderer,
};
pub use bridge::{BridgeResponder, ValidationBridge, ValidationRequest, Verdict};
pub use controller::{NavAction, NextOutcome, StepChrome, StepController, SubmitOutcome, WizardEvent};
pub use draft::{Draft, FlatValue, FlattenedDraft};
pub use error::{RegistrationError, RegistrationErrorExt};
pub use field::{
    AttachedFile, AttachmentField, Field, FieldUpdate, FieldValue, FlagField, Section, SectionPatch, TextField,
};
pub use schema::{FieldRules, Rule, StepForm, StepSchema, sanitize_numeric_input};
pub use steps::ReadinessCheck;
pub use store::{DraftStore, DraftWriter, SNAPSHOT_VERSION, StepCursor};
pub use wizard::Wizard;
