//! Authentication view model

use aula_core::{UserProfile, ValidationError};
use aula_net::AuthApi;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::scope::ViewScope;
use crate::state::AppState;
use crate::store::InFlight;

pub struct AuthViewModel {
    state: AppState,
    scope: ViewScope,
    signing_in: InFlight<()>,
}

impl AuthViewModel {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            scope: ViewScope::new(),
            signing_in: InFlight::new(),
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn is_signing_in(&self) -> bool {
        !self.signing_in.is_idle()
    }

    /// Authenticate and persist the returned profile
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingField("email").into());
        }
        if password.is_empty() {
            return Err(ValidationError::MissingField("password").into());
        }

        let _guard = self.signing_in.begin(())?;
        let profile = self
            .scope
            .run(self.state.gateway.login(email, password))
            .await
            .ok_or(AppError::Cancelled)??;

        self.state.session.sign_in(profile.clone())?;
        info!(role = profile.role.as_tag(), "Login complete");
        Ok(profile)
    }

    /// End the session; local state is cleared even when the server call fails
    pub async fn logout(&self) -> Result<()> {
        if let Some(Err(e)) = self.scope.run(self.state.gateway.logout()).await {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }
        self.state.session.sign_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{profile, state_with, FakeGateway};
    use aula_core::{ErrorClass, Role};

    fn gateway_with_account() -> std::sync::Arc<FakeGateway> {
        let gateway = FakeGateway::new();
        crate::store::lock(&gateway.accounts).push((
            "u21@utem.cl".to_string(),
            "secreto".to_string(),
            profile(21, Role::Student),
        ));
        gateway
    }

    #[tokio::test]
    async fn test_login_persists_profile() {
        let gateway = gateway_with_account();
        let state = state_with(gateway.clone(), None);
        let vm = AuthViewModel::new(state.clone());

        let signed_in = vm.login(" u21@utem.cl ", "secreto").await.unwrap();
        assert_eq!(signed_in.role, Role::Student);
        assert_eq!(state.session.current(), Some(signed_in));
        assert!(!vm.is_signing_in());
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let state = state_with(gateway_with_account(), None);
        let vm = AuthViewModel::new(state.clone());

        let err = vm.login("u21@utem.cl", "otra").await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Authentication);
        assert!(state.session.current().is_none());
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let gateway = gateway_with_account();
        let vm = AuthViewModel::new(state_with(gateway.clone(), None));

        let err = vm.login("  ", "secreto").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::MissingField("email"))));
        assert_eq!(gateway.count("login"), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_session_when_server_fails() {
        let gateway = FakeGateway::new();
        gateway.fail("logout");
        let state = state_with(gateway.clone(), Some(profile(21, Role::Student)));
        let vm = AuthViewModel::new(state.clone());

        vm.logout().await.unwrap();
        assert_eq!(gateway.count("logout"), 1);
        assert!(state.session.current().is_none());
    }
}
