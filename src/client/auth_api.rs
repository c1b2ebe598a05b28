use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::ApiClient;
use crate::auth::{decode_claims, Session};
use crate::error::ClientError;
use crate::models::User;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const INVALID_CREDENTIALS: &str = "Incorrect email or password.";

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Forwarded to the server, which decides whether it grants anything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invitation_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "access_token")]
    token: String,
}

/// Login, registration and logout against `/auth/*`
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ClientError::field_error("password", "Password is required"));
        }

        let request = self
            .api
            .request(Method::POST, "auth/login")?
            .json(&json!({ "email": email.trim(), "password": password }));
        let response: LoginResponse = match self.api.send_json(request).await {
            Ok(response) => response,
            // A rejected login is not an expired session
            Err(ClientError::RequestFailed { status: 400 | 401, .. }) => {
                tracing::info!("Login rejected for {}", email.trim());
                return Err(ClientError::field_error("password", INVALID_CREDENTIALS));
            }
            Err(e) => return Err(e),
        };

        let claims = decode_claims(&response.token)?;
        if claims.is_expired_at(Utc::now()) {
            tracing::warn!("Server issued an already expired token");
            return Err(ClientError::Unauthenticated);
        }

        self.api.store().set(&response.token)?;
        tracing::info!("Logged in as {} ({})", claims.email, claims.role);
        Ok(Session { claims })
    }

    pub async fn register(&self, registration: &RegisterRequest) -> Result<User, ClientError> {
        if registration.name.trim().is_empty() {
            return Err(ClientError::field_error("name", "Name is required"));
        }
        validate_email(&registration.email)?;
        validate_password(&registration.password)?;

        let request = self.api.request(Method::POST, "auth/register")?.json(registration);
        let user: User = self.api.send_json(request).await?;
        tracing::info!("Registered {}", user.email);
        Ok(user)
    }

    pub async fn whoami(&self) -> Result<User, ClientError> {
        let request = self.api.authed(Method::GET, "auth/me")?;
        self.api.send_json(request).await
    }

    /// Always clears the local credential; the server call is best-effort
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Ok(request) = self.api.authed(Method::POST, "auth/logout") {
            if let Err(e) = self.api.send(request).await {
                tracing::warn!("Server logout failed: {}", e);
            }
        }
        self.api.store().clear()
    }
}

pub fn validate_email(email: &str) -> Result<(), ClientError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ClientError::field_error("email", "Enter a valid email address"))
    }
}

pub fn validate_password(password: &str) -> Result<(), ClientError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ClientError::field_error(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}
