//! Client-side session state: the persisted active-session slot and the generation flag.
//!
//! ```rust
//! use dcommon::SessionId;
//! use dsession::SessionStore;
//!
//! let store = SessionStore::in_memory();
//! store.set(SessionId::from("s-1")).expect("in-memory slot never fails");
//!
//! let guard = store.try_begin_generation().expect("idle store");
//! assert!(store.is_generating());
//! drop(guard);
//! assert!(!store.is_generating());
//! ```

mod error;
mod slot;
mod store;

pub mod prelude {
    pub use crate::{
        ApplicationState, FileSessionSlot, GenerationGuard, GenerationState, InMemorySessionSlot,
        Mode, SessionSlot, SessionStore, StoreError, StoreErrorKind,
    };
    pub use dcommon::SessionId;
}

pub use error::{StoreError, StoreErrorKind};
pub use slot::{FileSessionSlot, InMemorySessionSlot, SessionSlot};
pub use store::{ApplicationState, GenerationGuard, GenerationState, Mode, SessionStore};
