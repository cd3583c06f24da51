//! # Session State
//!
//! The signed-in user, if any. Set by `sign_in`, cleared by `sign_out`.

use std::sync::{Arc, Mutex, MutexGuard};

use avelar_core::Session;

#[derive(Debug, Default)]
pub struct SessionState {
    session: Arc<Mutex<Option<Session>>>,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current(&self) -> Option<Session> {
        self.lock().clone()
    }

    pub fn set(&self, session: Session) {
        *self.lock() = Some(session);
    }

    /// Clears the session, returning the one that was active.
    pub fn clear(&self) -> Option<Session> {
        self.lock().take()
    }
}
