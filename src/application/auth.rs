//! Admin authentication: provider seam, session gate and auth-change events.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use url::Url;

const AUTH_EVENT_CAPACITY: usize = 32;
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires, as reported by the provider.
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider refused the request; the message is shown verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
    #[error("auth provider is not configured")]
    NotConfigured,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl AuthError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Text for the "Authentication Failed" notification.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// User behind a live access token.
    async fn get_session(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<Session, AuthError>;

    /// Register an account; confirmation mail links back to `redirect_to`.
    async fn sign_up(&self, email: &str, password: &str, redirect_to: &Url)
    -> Result<(), AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;
}

/// Tokens carried by the visitor's cookies.
#[derive(Debug, Clone, Default)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Where a visit stands with respect to the admin session.
#[derive(Debug, Clone)]
pub enum AuthState {
    Unauthenticated,
    Checking,
    Authenticated {
        user: AuthUser,
        /// Present when the gate had to refresh; its tokens replace the cookies.
        renewed: Option<Session>,
    },
}

impl AuthState {
    pub fn begin(tokens: &SessionTokens) -> Self {
        if tokens.is_empty() {
            AuthState::Unauthenticated
        } else {
            AuthState::Checking
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { session_key: String },
    SignedOut { session_key: String },
}

/// Stable identifier for a session that never exposes the token itself.
pub fn session_key(access_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(access_token.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    events: broadcast::Sender<AuthEvent>,
    confirm_redirect: Url,
}

impl AuthService {
    pub fn new(provider: Arc<dyn AuthProvider>, public_url: &Url) -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        let confirm_redirect = public_url
            .join("admin/dashboard")
            .unwrap_or_else(|_| public_url.clone());
        Self {
            provider,
            events,
            confirm_redirect,
        }
    }

    /// Resolve the visit's auth state; never returns [`AuthState::Checking`].
    pub async fn gate(&self, tokens: &SessionTokens) -> AuthState {
        let mut state = AuthState::begin(tokens);
        while let AuthState::Checking = state {
            state = self.check(tokens).await;
        }
        state
    }

    async fn check(&self, tokens: &SessionTokens) -> AuthState {
        if let Some(access_token) = tokens.access_token.as_deref() {
            match self.provider.get_session(access_token).await {
                Ok(user) => {
                    return AuthState::Authenticated {
                        user,
                        renewed: None,
                    };
                }
                Err(err) => debug!(
                    target = "akasite::application::auth",
                    error = %err,
                    "access token rejected; trying refresh"
                ),
            }
        }

        let Some(refresh_token) = tokens.refresh_token.as_deref() else {
            return AuthState::Unauthenticated;
        };
        match self.provider.refresh_session(refresh_token).await {
            Ok(session) => AuthState::Authenticated {
                user: session.user.clone(),
                renewed: Some(session),
            },
            Err(err) => {
                debug!(
                    target = "akasite::application::auth",
                    error = %err,
                    "session refresh failed"
                );
                AuthState::Unauthenticated
            }
        }
    }

    /// Whether `access_token` still belongs to a live session.
    pub async fn still_signed_in(&self, access_token: &str) -> bool {
        self.provider.get_session(access_token).await.is_ok()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self
            .provider
            .sign_in_with_password(email.trim(), password)
            .await
            .inspect_err(|err| {
                warn!(target = "akasite::application::auth", error = %err, "sign in failed")
            })?;
        info!(
            target = "akasite::application::auth",
            user_id = %session.user.id,
            "admin signed in"
        );
        self.publish(AuthEvent::SignedIn {
            session_key: session_key(&session.access_token),
        });
        Ok(session)
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<(), AuthError> {
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        self.provider
            .sign_up(form.email.trim(), &form.password, &self.confirm_redirect)
            .await
            .inspect_err(|err| {
                warn!(target = "akasite::application::auth", error = %err, "sign up failed")
            })
    }

    pub async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        self.provider.sign_out(access_token).await?;
        self.publish(AuthEvent::SignedOut {
            session_key: session_key(access_token),
        });
        info!(target = "akasite::application::auth", "admin signed out");
        Ok(())
    }

    /// Auth changes made through this process.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn confirm_redirect(&self) -> &Url {
        &self.confirm_redirect
    }

    fn publish(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }
}
