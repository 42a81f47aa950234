//! Per-element action bindings.
//!
//! Every rendered image exposes a fixed set of actions. Binding goes through the registry so
//! that re-rendering the same element never attaches a second handler.

use std::sync::{Mutex, MutexGuard, PoisonError};

use dcommon::{MessageId, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    Rate,
    Favorite,
    StyleFeedback,
}

impl ActionKind {
    /// Actions bound to every message that carries an image.
    pub const IMAGE: [ActionKind; 2] = [ActionKind::Rate, ActionKind::Favorite];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHandle(u64);

impl ActionHandle {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    New(ActionHandle),
    Existing(ActionHandle),
}

impl Registration {
    pub fn handle(&self) -> ActionHandle {
        match self {
            Self::New(handle) | Self::Existing(handle) => *handle,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }
}

type ElementKey = (MessageId, ActionKind);

#[derive(Debug, Default)]
struct Bindings {
    next_handle: u64,
    handles: Registry<ElementKey, ActionHandle>,
}

#[derive(Debug, Default)]
pub struct ActionRegistry {
    bindings: Mutex<Bindings>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, element: &MessageId, kind: ActionKind) -> Registration {
        let mut bindings = self.bindings();
        let key = (element.clone(), kind);
        if let Some(handle) = bindings.handles.get(&key) {
            return Registration::Existing(*handle);
        }

        bindings.next_handle += 1;
        let handle = ActionHandle(bindings.next_handle);
        bindings.handles.insert(key, handle);
        Registration::New(handle)
    }

    pub fn handle(&self, element: &MessageId, kind: ActionKind) -> Option<ActionHandle> {
        self.bindings()
            .handles
            .get(&(element.clone(), kind))
            .copied()
    }

    pub fn release_element(&self, element: &MessageId) {
        self.bindings().handles.retain(|(id, _), _| id != element);
    }

    /// Drops every binding; used when the surface replaces its whole message list.
    pub fn clear(&self) {
        self.bindings().handles.retain(|_, _| false);
    }

    pub fn len(&self) -> usize {
        self.bindings().handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bindings(&self) -> MutexGuard<'_, Bindings> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
