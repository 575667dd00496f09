//! Authentication service (password sign-in against the backend)

use std::sync::Arc;

use crate::{
    backend::AuthBackend,
    error::{AppError, AppResult},
    models::auth::{AuthUser, Session},
};

#[derive(Clone)]
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
}

impl AuthService {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        Self { backend }
    }

    pub(crate) fn backend(&self) -> Arc<dyn AuthBackend> {
        self.backend.clone()
    }

    /// Sign in with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation("Email and password are required".to_string()));
        }

        match self.backend.sign_in_with_password(email.trim(), password).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user.id, "User signed in");
                Ok(session)
            }
            // The backend reports bad credentials as a client error; show its message
            Err(AppError::Backend { status, message }) if (400..500).contains(&status) => {
                tracing::info!(email = email.trim(), "Sign-in rejected: {}", message);
                Err(AppError::Authentication(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Sign out; the backend revokes the refresh token, while the access
    /// token stays valid until it expires
    pub async fn logout(&self, access_token: &str) -> AppResult<()> {
        self.backend.sign_out(access_token).await
    }

    /// Current user as seen by the backend
    pub async fn me(&self, access_token: &str) -> AppResult<AuthUser> {
        self.backend.get_user(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockAuthBackend;
    use tokio_test::assert_err;

    #[tokio::test]
    async fn test_bad_credentials_become_authentication_error() {
        let mut backend = MockAuthBackend::new();
        backend
            .expect_sign_in_with_password()
            .times(1)
            .returning(|_, _| {
                Err(AppError::Backend {
                    status: 400,
                    message: "Invalid login credentials".to_string(),
                })
            });

        let service = AuthService::new(Arc::new(backend));
        match service.login("admin@library.com", "wrong").await {
            Err(AppError::Authentication(message)) => assert_eq!(message, "Invalid login credentials"),
            other => panic!("unexpected result: {:?}", other.map(|s| s.access_token)),
        }
    }

    #[tokio::test]
    async fn test_empty_credentials_skip_backend() {
        let mut backend = MockAuthBackend::new();
        backend.expect_sign_in_with_password().times(0);

        let service = AuthService::new(Arc::new(backend));
        assert_err!(service.login("  ", "secret").await);
    }
}
