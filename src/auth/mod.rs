pub mod guard;
pub mod token_store;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

pub use guard::{Session, SessionGuard};
pub use token_store::{FileTokenStore, MemoryTokenStore, SharedTokenStore, TokenStore};

/// Roles carried in the token. `Admin` satisfies every requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn satisfies(self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::User, Role::User) => true,
            (Role::User, Role::Admin) => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(ClientError::validation(format!("Unknown role '{}'", other))),
        }
    }
}

/// Identity attributes carried in the middle segment of the bearer token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "sub")]
    pub subject_id: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Decode the claims without verifying the signature.
///
/// The role found here is advisory: every backend endpoint re-validates the
/// token, the client only uses it to decide what to show.
pub fn decode_claims(token: &str) -> Result<Claims, ClientError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token.trim(), &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Token decode failed: {}", e);
            ClientError::MalformedToken
        })
}

/// Malformed tokens count as expired
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, Utc::now())
}

pub fn is_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Ok(claims) => claims.is_expired_at(now),
        Err(_) => true,
    }
}

/// Result of inspecting whatever the token store holds
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    Absent,
    Valid { token: String, claims: Claims },
    // Also covers tokens that fail to decode
    Expired { token: String },
}

impl Credential {
    pub fn inspect(token: Option<String>, now: DateTime<Utc>) -> Self {
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            return Credential::Absent;
        };

        match decode_claims(&token) {
            Ok(claims) if !claims.is_expired_at(now) => Credential::Valid { token, claims },
            Ok(_) => Credential::Expired { token },
            Err(_) => {
                tracing::warn!("Stored credential is malformed, treating as expired");
                Credential::Expired { token }
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Credential::Valid { .. })
    }

    pub fn claims(&self) -> Option<&Claims> {
        match self {
            Credential::Valid { claims, .. } => Some(claims),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Credential::Valid { token, .. } => Some(token),
            _ => None,
        }
    }
}
