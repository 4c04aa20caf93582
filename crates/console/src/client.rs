//! HTTP client for the campus authentication endpoint.

use campus_console_core::InvalidResponse;
use campus_console_core::redirect::REDIRECT_HEADER;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use crate::error::LoginError;

/// Username and password submitted by the login form.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A successful authentication response.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// Decoded JSON body, not yet validated.
    pub body: Value,
    /// Value of the `x-redirect-to` header, if present.
    pub redirect_header: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Error body of a failed login.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Posts credentials to the configured login URL.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    login_url: Url,
}

impl AuthClient {
    /// Create a client for `login_url`. No request timeout is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(login_url: Url) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, login_url })
    }

    #[must_use]
    pub const fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Authenticate with the campus backend.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` on 401, `AccessDenied` on 403
    /// - `Server` on any other non-success status
    /// - `Network` if no response was received
    /// - `InvalidResponse` if a success body is not JSON
    #[instrument(skip(self, credentials), fields(username = %credentials.username, url = %self.login_url))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, LoginError> {
        let response = self
            .client
            .post(self.login_url.clone())
            .json(&LoginRequest {
                username: &credentials.username,
                password: credentials.password.expose_secret(),
            })
            .send()
            .await
            .map_err(LoginError::Network)?;

        let status = response.status();

        if status.is_success() {
            let redirect_header = response
                .headers()
                .get(REDIRECT_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            let body: Value = response.json().await.map_err(|e| {
                if e.is_decode() {
                    LoginError::InvalidResponse(InvalidResponse::NotAnObject)
                } else {
                    LoginError::Network(e)
                }
            })?;

            tracing::debug!(%status, "authentication succeeded");
            Ok(LoginResponse {
                body,
                redirect_header,
            })
        } else if status == reqwest::StatusCode::UNAUTHORIZED {
            Err(LoginError::InvalidCredentials)
        } else if status == reqwest::StatusCode::FORBIDDEN {
            Err(LoginError::AccessDenied)
        } else {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message.or(body.error))
                .filter(|message| !message.trim().is_empty());

            Err(LoginError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}
