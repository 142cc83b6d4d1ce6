use crate::traits::SessionHandle;
use std::sync::{Arc, PoisonError, RwLock};

/// Single shared register holding the most recently resolved session.
///
/// Written by the resolver on every resolution pass, read by the control
/// relay. Stores and loads are whole-value replacements, so readers observe
/// either no handle or a complete, previously stored one.
#[derive(Default)]
pub struct ActiveSessionSlot {
    inner: RwLock<Option<Arc<dyn SessionHandle>>>,
}

impl ActiveSessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held handle.
    pub fn store(&self, handle: Arc<dyn SessionHandle>) {
        *self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Empty the slot (no active session this pass).
    pub fn clear(&self) {
        *self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Clone out the currently held handle, if any.
    pub fn load(&self) -> Option<Arc<dyn SessionHandle>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
