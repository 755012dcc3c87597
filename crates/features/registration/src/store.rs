use crate::draft::{Draft, FlattenedDraft};
use crate::error::{RegistrationError, RegistrationErrorExt};
use crate::field::{Field, FieldValue, Section, SectionPatch};
use mkp_kernel::domain::constants::{DRAFT_STORAGE_KEY, FIRST_STEP, TOTAL_STEPS};
use mkp_storage::{KeyValueStore, StorageKey};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, trace, warn};

/// Layout version of the persisted snapshot.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Active wizard step, always within `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepCursor(u8);

impl StepCursor {
    pub const FIRST: Self = Self(FIRST_STEP);
    pub const LAST: Self = Self(TOTAL_STEPS);

    #[must_use]
    pub const fn new(step: u8) -> Option<Self> {
        if step >= FIRST_STEP && step <= TOTAL_STEPS { Some(Self(step)) } else { None }
    }

    /// Forces an arbitrary number into range.
    #[must_use]
    pub const fn clamped(step: u8) -> Self {
        if step < FIRST_STEP {
            Self::FIRST
        } else if step > TOTAL_STEPS {
            Self::LAST
        } else {
            Self(step)
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self::clamped(self.0.saturating_add(1))
    }

    #[must_use]
    pub const fn previous(self) -> Self {
        Self::clamped(self.0.saturating_sub(1))
    }

    #[must_use]
    pub const fn is_first(self) -> bool {
        self.0 == FIRST_STEP
    }

    #[must_use]
    pub const fn is_last(self) -> bool {
        self.0 == TOTAL_STEPS
    }

    #[must_use]
    pub fn section(self) -> Section {
        Section::from_step(self.0).unwrap_or(Section::Type)
    }
}

impl Default for StepCursor {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for StepCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u16,
    step: u8,
    draft: &'a Draft,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u16,
    step: u8,
    draft: Draft,
}

#[derive(Debug, Default)]
struct DraftState {
    draft: Draft,
    step: StepCursor,
}

impl DraftState {
    fn is_pristine(&self) -> bool {
        self.step.is_first() && !self.draft.has_data()
    }

    fn encode(&self) -> Result<Vec<u8>, RegistrationError> {
        let snapshot = SnapshotRef { version: SNAPSHOT_VERSION, step: self.step.get(), draft: &self.draft };
        postcard::to_stdvec(&snapshot).context("Failed to encode draft snapshot")
    }

    fn decode(bytes: &[u8]) -> Result<Self, RegistrationError> {
        let (version, _) =
            postcard::take_from_bytes::<u16>(bytes).context("Failed to read snapshot version")?;
        if version != SNAPSHOT_VERSION {
            return Err(RegistrationError::SnapshotVersion { found: version, expected: SNAPSHOT_VERSION });
        }
        let snapshot: Snapshot = postcard::from_bytes(bytes).context("Failed to decode draft snapshot")?;
        trace!(version = snapshot.version, step = snapshot.step, bytes = bytes.len(), "Snapshot decoded");
        Ok(Self { draft: snapshot.draft.normalized(), step: StepCursor::clamped(snapshot.step) })
    }
}

/// Owned container of the registration draft and the step cursor.
///
/// Every mutation is written through to `S` under one well-known key. Clones share state.
pub struct DraftStore<S> {
    inner: Arc<DraftStoreInner<S>>,
}

struct DraftStoreInner<S> {
    state: RwLock<DraftState>,
    persist_lock: Mutex<()>,
    backend: S,
    key: StorageKey,
    cursor: watch::Sender<StepCursor>,
}

impl<S> Clone for DraftStore<S> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<S> fmt::Debug for DraftStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftStore").field("key", &self.inner.key).field("step", &self.step()).finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> DraftStore<S> {
    /// Creates the store, rehydrating any snapshot persisted by an earlier session.
    ///
    /// An unreadable snapshot is discarded and the draft starts empty.
    ///
    /// # Errors
    /// Returns [`RegistrationError::Storage`] only if the draft key itself is invalid.
    pub async fn open(backend: S) -> Result<Self, RegistrationError> {
        let key = StorageKey::from_static(DRAFT_STORAGE_KEY)?;

        let state = match Self::load(&backend, &key).await {
            Ok(Some(state)) => {
                info!(step = %state.step, has_data = state.draft.has_data(), "Draft rehydrated");
                state
            },
            Ok(None) => {
                debug!("No persisted draft, starting empty");
                DraftState::default()
            },
            Err(e) => {
                warn!(error = %e, code = e.code(), "Discarding unreadable draft snapshot");
                DraftState::default()
            },
        };

        let (cursor, _) = watch::channel(state.step);
        Ok(Self {
            inner: Arc::new(DraftStoreInner {
                state: RwLock::new(state),
                persist_lock: Mutex::new(()),
                backend,
                key,
                cursor,
            }),
        })
    }

    async fn load(backend: &S, key: &StorageKey) -> Result<Option<DraftState>, RegistrationError> {
        match backend.get(key).await.context("Failed to read draft")? {
            Some(bytes) => DraftState::decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Merges `patch` into its section and persists the result.
    ///
    /// Always succeeds from the caller's point of view; persistence failures are logged.
    pub async fn update_section(&self, patch: SectionPatch) {
        let section = patch.section();
        let applied = self.inner.state.write().draft.apply(patch);
        trace!(section = %section, applied, "Section updated");
        self.persist().await;
    }

    /// Moves the cursor one step forward, stopping at the last step.
    pub async fn next_step(&self) -> StepCursor {
        self.move_cursor(StepCursor::next).await
    }

    /// Moves the cursor one step back; a no-op on the first step.
    pub async fn previous_step(&self) -> StepCursor {
        self.move_cursor(StepCursor::previous).await
    }

    async fn move_cursor(&self, advance: impl FnOnce(StepCursor) -> StepCursor) -> StepCursor {
        let (from, to) = {
            let mut state = self.inner.state.write();
            let from = state.step;
            state.step = advance(from);
            (from, state.step)
        };

        if from != to {
            self.inner.cursor.send_replace(to);
            debug!(from = %from, to = %to, "Step changed");
            self.persist().await;
        }
        to
    }

    /// Restores the empty draft on step 1 and removes the persisted snapshot.
    pub async fn reset_form(&self) {
        let _guard = self.inner.persist_lock.lock().await;
        *self.inner.state.write() = DraftState::default();
        self.inner.cursor.send_replace(StepCursor::FIRST);

        match self.inner.backend.remove(&self.inner.key).await {
            Ok(()) => info!("Draft cleared"),
            Err(e) => warn!(error = %e, "Failed to remove persisted draft"),
        }
    }

    /// Writes the current state; an empty draft on step 1 is stored as no draft at all.
    async fn persist(&self) {
        let _guard = self.inner.persist_lock.lock().await;
        let encoded = {
            let state = self.inner.state.read();
            if state.is_pristine() { None } else { Some(state.encode()) }
        };

        let result = match encoded {
            None => self.inner.backend.remove(&self.inner.key).await.context("Failed to clear draft"),
            Some(Ok(bytes)) => self.inner.backend.put(&self.inner.key, &bytes).await.context("Failed to write draft"),
            Some(Err(e)) => Err(e),
        };

        if let Err(e) = result {
            warn!(error = %e, code = e.code(), "Draft persistence failed");
        }
    }

    /// A handle for step units: section merges and reads, no cursor control.
    #[must_use]
    pub fn writer(&self) -> DraftWriter<S> {
        DraftWriter { store: self.clone() }
    }
}

impl<S> DraftStore<S> {
    #[must_use]
    pub fn step(&self) -> StepCursor {
        self.inner.state.read().step
    }

    /// Receives every cursor change.
    #[must_use]
    pub fn subscribe_step(&self) -> watch::Receiver<StepCursor> {
        self.inner.cursor.subscribe()
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.inner.state.read().draft.clone()
    }

    #[must_use]
    pub fn value(&self, field: Field) -> Option<FieldValue> {
        self.inner.state.read().draft.get(field).cloned()
    }

    /// All sections unioned under one key namespace.
    #[must_use]
    pub fn flattened(&self) -> FlattenedDraft {
        self.inner.state.read().draft.flatten()
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        self.inner.state.read().draft.has_data()
    }
}

/// Section-scoped view of a [`DraftStore`] handed to step units.
pub struct DraftWriter<S> {
    store: DraftStore<S>,
}

impl<S> Clone for DraftWriter<S> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone() }
    }
}

impl<S> fmt::Debug for DraftWriter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DraftWriter").field(&self.store).finish()
    }
}

impl<S: KeyValueStore> DraftWriter<S> {
    pub async fn update_section(&self, patch: SectionPatch) {
        self.store.update_section(patch).await;
    }
}

impl<S> DraftWriter<S> {
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.store.draft()
    }

    #[must_use]
    pub fn value(&self, field: Field) -> Option<FieldValue> {
        self.store.value(field)
    }

    /// Current values of `section`.
    #[must_use]
    pub fn section(&self, section: Section) -> Vec<(Field, FieldValue)> {
        let state = self.store.inner.state.read();
        state.draft.section(section).map(|(field, value)| (field, value.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::TextField;
    use mkp_storage::MemoryStore;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cursor_stays_in_range(moves in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut cursor = StepCursor::default();
            for forward in moves {
                let before = cursor;
                cursor = if forward { cursor.next() } else { cursor.previous() };
                prop_assert!((FIRST_STEP..=TOTAL_STEPS).contains(&cursor.get()));
                prop_assert!(cursor.get().abs_diff(before.get()) <= 1);
            }
        }

        #[test]
        fn clamped_always_lands_in_range(step in any::<u8>()) {
            let cursor = StepCursor::clamped(step);
            prop_assert_eq!(StepCursor::new(cursor.get()), Some(cursor));
        }
    }

    #[test]
    fn cursor_bounds() {
        assert_eq!(StepCursor::FIRST.previous(), StepCursor::FIRST);
        assert_eq!(StepCursor::LAST.next(), StepCursor::LAST);
        assert_eq!(StepCursor::new(0), None);
        assert_eq!(StepCursor::new(7), None);
        assert_eq!(StepCursor::LAST.section(), Section::Security);
    }

    #[test]
    fn snapshot_round_trips_through_postcard() {
        let mut state = DraftState::default();
        state.draft.apply(SectionPatch::new(Section::Company).text(TextField::CompanyName, "Acme"));
        state.step = StepCursor::clamped(4);

        let decoded = DraftState::decode(&state.encode().unwrap()).unwrap();
        assert_eq!(decoded.step.get(), 4);
        assert_eq!(decoded.draft, state.draft);
    }

    #[test]
    fn foreign_snapshot_version_is_rejected() {
        let bytes = postcard::to_stdvec(&SnapshotRef { version: 9, step: 2, draft: &Draft::new() }).unwrap();
        let err = DraftState::decode(&bytes).unwrap_err();
        assert_eq!(err.code(), "snapshot_version");
    }

    #[tokio::test]
    async fn pristine_state_is_not_persisted() {
        let backend = MemoryStore::new();
        let store = DraftStore::open(backend.clone()).await.unwrap();

        store.update_section(SectionPatch::new(Section::Type).text(TextField::CompanyType, "")).await;
        assert_eq!(backend.len(), 0);

        store.update_section(SectionPatch::new(Section::Type).text(TextField::CompanyType, "broker")).await;
        assert_eq!(backend.len(), 1);
    }
}
