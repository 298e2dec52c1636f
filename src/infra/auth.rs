//! GoTrue-compatible auth provider client.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::auth::{AuthError, AuthProvider, AuthUser, Session};

use super::error::InfraError;

#[derive(Clone, Debug)]
pub struct GoTrueClient {
    client: Client,
    base: Url,
    api_key: String,
}

#[derive(Deserialize)]
struct UserBody {
    id: String,
    email: Option<String>,
}

impl From<UserBody> for AuthUser {
    fn from(body: UserBody) -> Self {
        Self {
            id: body.id,
            email: body.email,
        }
    }
}

#[derive(Deserialize)]
struct TokenBody {
    access_token: String,
    refresh_token: String,
    expires_in: Option<u64>,
    user: UserBody,
}

impl From<TokenBody> for Session {
    fn from(body: TokenBody) -> Self {
        Self {
            access_token: body.access_token,
            refresh_token: body.refresh_token,
            expires_in: body.expires_in,
            user: body.user.into(),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ErrorBody {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Provider message from an error response, in the order GoTrue populates them.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .or(parsed.error)
        .unwrap_or_else(|| format!("auth request failed with status {status}"))
}

impl GoTrueClient {
    pub fn new(base: Url, api_key: String) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("akasite/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base,
            api_key,
        })
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, AuthError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| AuthError::Unavailable(err.to_string()))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AuthError> {
        let response = request
            .send()
            .await
            .map_err(|err| AuthError::Unavailable(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        debug!(
            target = "akasite::infra::auth",
            status = status.as_u16(),
            message = %message,
            "auth provider rejected request"
        );
        if status.is_server_error() {
            Err(AuthError::Unavailable(message))
        } else {
            Err(AuthError::Rejected(message))
        }
    }

    async fn token(&self, grant_type: &str, body: &impl Serialize) -> Result<Session, AuthError> {
        let url = self.url("token", &[("grant_type", grant_type)])?;
        let response = self.send(self.request(Method::POST, url).json(body)).await?;
        response
            .json::<TokenBody>()
            .await
            .map(Session::from)
            .map_err(|err| AuthError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn get_session(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let url = self.url("user", &[])?;
        let response = self
            .send(self.request(Method::GET, url).bearer_auth(access_token))
            .await?;
        response
            .json::<UserBody>()
            .await
            .map(AuthUser::from)
            .map_err(|err| AuthError::Unavailable(err.to_string()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.token("refresh_token", &RefreshGrant { refresh_token })
            .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        self.token("password", &PasswordCredentials { email, password })
            .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &Url,
    ) -> Result<(), AuthError> {
        let url = self.url("signup", &[("redirect_to", redirect_to.as_str())])?;
        self.send(
            self.request(Method::POST, url)
                .json(&PasswordCredentials { email, password }),
        )
        .await
        .map(|_| ())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = self.url("logout", &[])?;
        self.send(self.request(Method::POST, url).bearer_auth(access_token))
            .await
            .map(|_| ())
    }
}

/// Provider used when no auth service is configured; every call fails with
/// [`AuthError::NotConfigured`] so the public site keeps working.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredAuth;

#[async_trait]
impl AuthProvider for UnconfiguredAuth {
    async fn get_session(&self, _access_token: &str) -> Result<AuthUser, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn refresh_session(&self, _refresh_token: &str) -> Result<Session, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn sign_in_with_password(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Session, AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _password: &str,
        _redirect_to: &Url,
    ) -> Result<(), AuthError> {
        Err(AuthError::NotConfigured)
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        Err(AuthError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoTrueClient {
        let base = Url::parse("https://project.supabase.co/auth/v1/").expect("url");
        GoTrueClient::new(base, "anon-key".to_string()).expect("client")
    }

    #[test]
    fn endpoints_resolve_under_the_base_path() {
        let url = client()
            .url("token", &[("grant_type", "password")])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://project.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn redirect_targets_are_query_encoded() {
        let url = client()
            .url(
                "signup",
                &[("redirect_to", "https://akacorptech.com/admin/dashboard")],
            )
            .expect("url");
        assert_eq!(
            url.query(),
            Some("redirect_to=https%3A%2F%2Fakacorptech.com%2Fadmin%2Fdashboard")
        );
    }

    #[test]
    fn provider_messages_are_extracted_in_order() {
        assert_eq!(
            error_message(
                StatusCode::BAD_REQUEST,
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, r#"{"msg":"User already registered"}"#),
            "User already registered"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>"),
            "auth request failed with status 502 Bad Gateway"
        );
    }
}
