//! Application state management

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aula_core::Database;
use aula_net::{Gateway, HttpGateway};
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::session::SessionContext;

pub const DATABASE_FILE: &str = "aula.db";

/// Main application state
#[derive(Clone)]
pub struct AppState {
    pub session: SessionContext,
    pub gateway: Arc<dyn Gateway>,
    data_dir: PathBuf,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self> {
        let data_dir = config.resolve_data_dir()?;
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| AppError::Config(format!("{}: {e}", data_dir.display())))?;

        let db = Database::open(data_dir.join(DATABASE_FILE))?;
        let gateway = HttpGateway::new(&config.api_base_url, config.request_timeout())?;
        info!(api = %gateway.base_url(), data_dir = %data_dir.display(), "State initialized");

        Ok(Self {
            session: SessionContext::open(db)?,
            gateway: Arc::new(gateway),
            data_dir,
        })
    }

    /// Assemble from parts (used by tests with a fake gateway)
    pub fn with_gateway(session: SessionContext, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            session,
            gateway,
            data_dir: PathBuf::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creates_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().join("nested")),
            ..Config::default()
        };

        let state = AppState::new(&config).unwrap();
        assert!(state.data_dir().join(DATABASE_FILE).exists());
        assert!(state.session.current().is_none());
    }

    #[test]
    fn test_bad_api_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            api_base_url: "::nope".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            AppState::new(&config),
            Err(AppError::Gateway(aula_net::Error::InvalidUrl(_)))
        ));
    }
}
