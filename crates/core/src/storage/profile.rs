//! Signed-in profile persistence
//!
//! The profile is kept as JSON under `userProfile`, with the bare role tag
//! duplicated under `rol`.

use rusqlite::Connection;
use tracing::warn;

use super::ClientStateStore;
use crate::error::Result;
use crate::models::{Role, UserProfile};

pub const PROFILE_KEY: &str = "userProfile";
pub const ROLE_KEY: &str = "rol";

/// Profile store
pub struct ProfileStore<'a> {
    state: ClientStateStore<'a>,
}

impl<'a> ProfileStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            state: ClientStateStore::new(conn),
        }
    }

    /// Save the profile and its role tag
    pub fn save(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.state.set(PROFILE_KEY, &json)?;
        self.state.set(ROLE_KEY, profile.role.as_tag())?;
        Ok(())
    }

    /// Load the persisted profile.
    ///
    /// A record that no longer parses is treated as signed out.
    pub fn load(&self) -> Result<Option<UserProfile>> {
        let Some(json) = self.state.get(PROFILE_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<UserProfile>(&json) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable stored profile");
                Ok(None)
            }
        }
    }

    /// Role tag stored alongside the profile
    pub fn role(&self) -> Result<Option<Role>> {
        Ok(self
            .state
            .get(ROLE_KEY)?
            .and_then(|tag| tag.parse::<Role>().ok()))
    }

    /// Forget the signed-in identity
    pub fn clear(&self) -> Result<()> {
        self.state.remove(PROFILE_KEY)?;
        self.state.remove(ROLE_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;
    use crate::storage::Database;

    fn profile() -> UserProfile {
        UserProfile {
            id: Some(UserId(12)),
            role: Role::Teacher,
            name: "Marta Rivas".to_string(),
            email: "mrivas@utem.cl".to_string(),
            rut: None,
            career: Some("Informática".to_string()),
            phone: None,
        }
    }

    #[test]
    fn test_profile_save_load() {
        let db = Database::open_in_memory().unwrap();
        let store = db.profiles();

        assert!(store.load().unwrap().is_none());
        store.save(&profile()).unwrap();

        assert_eq!(store.load().unwrap(), Some(profile()));
        assert_eq!(store.role().unwrap(), Some(Role::Teacher));
        assert_eq!(
            db.client_state().get(ROLE_KEY).unwrap().as_deref(),
            Some("docente")
        );
    }

    #[test]
    fn test_profile_clear() {
        let db = Database::open_in_memory().unwrap();
        let store = db.profiles();
        store.save(&profile()).unwrap();
        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());
        assert!(store.role().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_profile_reads_as_signed_out() {
        let db = Database::open_in_memory().unwrap();
        db.client_state().set(PROFILE_KEY, "{not json").unwrap();
        assert!(db.profiles().load().unwrap().is_none());
    }

    #[test]
    fn test_profile_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aula.db");

        {
            let db = Database::open(&path).unwrap();
            db.profiles().save(&profile()).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.profiles().load().unwrap(), Some(profile()));
    }
}
