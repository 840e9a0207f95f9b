//! Signed-in session
//!
//! The one piece of state shared across views. Written only at sign-in and
//! sign-out; read by every view that needs the current user.

use std::sync::{Arc, Mutex};

use aula_core::{Database, Role, UserId, UserProfile};
use tracing::info;

use crate::error::{AppError, Result};
use crate::store::lock;

#[derive(Clone)]
pub struct SessionContext {
    db: Arc<Mutex<Database>>,
    profile: Arc<Mutex<Option<UserProfile>>>,
}

impl SessionContext {
    /// Wrap the client database and restore any persisted profile
    pub fn open(db: Database) -> Result<Self> {
        let session = Self {
            db: Arc::new(Mutex::new(db)),
            profile: Arc::new(Mutex::new(None)),
        };
        session.load()?;
        Ok(session)
    }

    /// Re-read the persisted profile
    pub fn load(&self) -> Result<Option<UserProfile>> {
        let profile = lock(&self.db).profiles().load()?;
        *lock(&self.profile) = profile.clone();
        Ok(profile)
    }

    pub fn current(&self) -> Option<UserProfile> {
        lock(&self.profile).clone()
    }

    pub fn require(&self) -> Result<UserProfile> {
        self.current().ok_or(AppError::NotSignedIn)
    }

    /// Account id of the signed-in user, whatever the role
    pub fn user_id(&self) -> Result<UserId> {
        self.require()?.id.ok_or(AppError::MissingUserId)
    }

    /// Account id of the signed-in user, who must hold `role`
    pub fn require_role(&self, role: Role) -> Result<UserId> {
        let profile = self.require()?;
        if profile.role != role {
            return Err(AppError::WrongRole(role));
        }
        profile.id.ok_or(AppError::MissingUserId)
    }

    pub fn sign_in(&self, profile: UserProfile) -> Result<()> {
        lock(&self.db).profiles().save(&profile)?;
        info!(role = profile.role.as_tag(), "Signed in");
        *lock(&self.profile) = Some(profile);
        Ok(())
    }

    pub fn sign_out(&self) -> Result<()> {
        lock(&self.db).profiles().clear()?;
        *lock(&self.profile) = None;
        info!("Signed out");
        Ok(())
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("profile", &self.current())
            .finish_non_exhaustive()
    }
}
