//! Process-wide client state: the active session id and the generation state machine.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dcommon::SessionId;

use crate::{InMemorySessionSlot, SessionSlot, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Design,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Sending,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicationState {
    pub active_session_id: Option<SessionId>,
    pub generation: GenerationState,
    pub mode: Mode,
}

/// Narrow mutable cell over [`ApplicationState`].
///
/// The active id only enters memory through [`SessionStore::set`], so an id read back from
/// the slot stays a candidate until somebody validates and adopts it.
pub struct SessionStore {
    slot: Arc<dyn SessionSlot>,
    state: Mutex<ApplicationState>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(slot: Arc<dyn SessionSlot>) -> Self {
        Self {
            slot,
            state: Mutex::new(ApplicationState::default()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemorySessionSlot::new()))
    }

    /// Reads the id recorded by a previous run without adopting it.
    pub fn load_persisted(&self) -> Result<Option<SessionId>, StoreError> {
        Ok(self.slot.load()?.map(SessionId::from))
    }

    pub fn get(&self) -> Option<SessionId> {
        self.state().active_session_id.clone()
    }

    /// Persists `id` and then makes it active; on a storage failure neither changes.
    pub fn set(&self, id: SessionId) -> Result<(), StoreError> {
        let mut state = self.state();
        self.slot.save(id.as_str())?;
        state.active_session_id = Some(id);
        Ok(())
    }

    pub fn is_generating(&self) -> bool {
        self.state().generation == GenerationState::Sending
    }

    pub fn set_generating(&self, generating: bool) {
        self.state().generation = if generating {
            GenerationState::Sending
        } else {
            GenerationState::Idle
        };
    }

    pub fn generation_state(&self) -> GenerationState {
        self.state().generation
    }

    /// Atomically moves Idle -> Sending. The returned guard moves back to Idle when dropped.
    pub fn try_begin_generation(&self) -> Option<GenerationGuard<'_>> {
        let mut state = self.state();
        if state.generation == GenerationState::Sending {
            return None;
        }

        state.generation = GenerationState::Sending;
        Some(GenerationGuard { store: self })
    }

    pub fn mode(&self) -> Mode {
        self.state().mode
    }

    pub fn snapshot(&self) -> ApplicationState {
        self.state().clone()
    }

    fn state(&self) -> MutexGuard<'_, ApplicationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[must_use = "dropping the guard immediately ends the generation"]
#[derive(Debug)]
pub struct GenerationGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for GenerationGuard<'_> {
    fn drop(&mut self) {
        self.store.set_generating(false);
    }
}
