//! # Session State
//!
//! Who is signed in. The ordering page's auth provider pushes sign-in and
//! sign-out here; the dispatcher reads it through [`IdentityProvider`].

use std::sync::{Mutex, PoisonError};

use tracing::info;

use bistro_core::Identity;

/// Read side of the auth provider.
pub trait IdentityProvider: Send + Sync {
    fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    /// The signed-in user, if any.
    fn identity(&self) -> Option<Identity>;
}

/// In-memory session.
#[derive(Debug, Default)]
pub struct SessionState {
    identity: Mutex<Option<Identity>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session that starts signed in.
    pub fn signed_in(identity: Identity) -> Self {
        SessionState {
            identity: Mutex::new(Some(identity)),
        }
    }

    pub fn sign_in(&self, identity: Identity) {
        info!(user_id = %identity.id, "Signed in");
        *self.lock() = Some(identity);
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.lock().take() {
            info!(user_id = %previous.id, "Signed out");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Identity>> {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IdentityProvider for SessionState {
    fn identity(&self) -> Option<Identity> {
        self.lock().clone()
    }
}
