use std::sync::{Arc, RwLock};

use oneadmin_api::user::User;
use oneadmin_core::{ConsoleError, Result};
use tracing::info;

use crate::store::{SharedStore, StoreKey};

/// Who is logged in. Pages read it for role checks; the auth flows write it.
/// Every mutation is mirrored into the `user` store entry.
#[derive(Debug, Clone)]
pub struct AuthContext {
    user: Arc<RwLock<Option<User>>>,
    store: SharedStore,
}

impl AuthContext {
    /// Restores the persisted user, if any.
    pub fn hydrate(store: SharedStore) -> Self {
        let user: Option<User> = store.get_json(StoreKey::User);
        Self {
            user: Arc::new(RwLock::new(user)),
            store,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn current(&self) -> Option<User> {
        match self.user.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, user: Option<User>) {
        match self.user.write() {
            Ok(mut guard) => *guard = user,
            Err(poisoned) => *poisoned.into_inner() = user,
        }
    }

    /// Puts `user` into the auth state and persists it.
    pub fn login(&self, user: User) -> Result<()> {
        self.store.set_json(StoreKey::User, &user)?;
        info!(username = %user.username, role = %user.role, "logged in");
        self.replace(Some(user));
        Ok(())
    }

    /// Clears the auth state, the persisted user and the session cookie.
    pub fn logout(&self) -> Result<()> {
        self.replace(None);
        self.store.remove(StoreKey::User)?;
        self.store.remove(StoreKey::Session)?;
        info!("logged out");
        Ok(())
    }

    /// Applies `f` to the logged-in user and persists the result.
    pub fn update<F: FnOnce(&mut User)>(&self, f: F) -> Result<()> {
        let mut user = self.require_user()?;
        f(&mut user);
        self.store.set_json(StoreKey::User, &user)?;
        self.replace(Some(user));
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.current().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current().map(|u| u.role.is_admin()).unwrap_or(false)
    }

    pub fn is_root(&self) -> bool {
        self.current().map(|u| u.role.is_root()).unwrap_or(false)
    }

    pub fn require_user(&self) -> Result<User> {
        self.current().ok_or(ConsoleError::NotLoggedIn)
    }

    pub fn require_admin(&self) -> Result<User> {
        let user = self.require_user()?;
        if !user.role.is_admin() {
            return Err(ConsoleError::PermissionDenied {
                reason: "administrator role required".to_string(),
            });
        }
        Ok(user)
    }

    pub fn require_root(&self) -> Result<User> {
        let user = self.require_user()?;
        if !user.role.is_root() {
            return Err(ConsoleError::PermissionDenied {
                reason: "super administrator role required".to_string(),
            });
        }
        Ok(user)
    }
}
