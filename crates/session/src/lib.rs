//! Client-side authentication state.
//!
//! [`AuthSession`] is an explicit container handed to whoever needs it. It is
//! seeded from the persisted snapshot at startup and wiped on logout.

pub mod store;

pub use store::{FileStore, MemoryStore, SessionStore};

use ssm_core::{Result, Role, Session, User};
use tracing::{info, warn};

#[derive(Debug)]
pub struct AuthSession<S: SessionStore> {
    store:   S,
    current: Option<Session>,
}

impl<S: SessionStore> AuthSession<S> {
    /// Restore from `store`. An unreadable snapshot is discarded and the
    /// session starts logged out.
    pub fn init(store: S) -> Self {
        let current = match store.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Discarding unreadable session snapshot: {e}");
                if let Err(e) = store.clear() {
                    warn!("Could not remove session snapshot: {e}");
                }
                None
            }
        };
        if let Some(s) = &current {
            info!("Restored session for {}", s.user.email);
        }
        Self { store, current }
    }

    /// Adopt a freshly issued session and persist it.
    pub fn login(&mut self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        info!("Logged in as {} ({})", session.user.email, session.user.role);
        self.current = Some(session);
        Ok(())
    }

    /// Forget the session in memory and on disk.
    pub fn logout(&mut self) -> Result<()> {
        self.current = None;
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Record a role change, e.g. after redeeming an invite token.
    /// No-op when logged out.
    pub fn update_role(&mut self, role: Role) -> Result<()> {
        let Some(session) = self.current.as_mut() else {
            return Ok(());
        };
        session.user.role = role;
        self.store.save(session)
    }

    /// Replace the cached user record with a fresh one from `/auth/me`.
    pub fn update_user(&mut self, user: User) -> Result<()> {
        let Some(session) = self.current.as_mut() else {
            return Ok(());
        };
        session.user = user;
        self.store.save(session)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    /// `false` when logged out.
    pub fn has_permission(&self, required: Role) -> bool {
        self.role().is_some_and(|r| r.satisfies(required))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
