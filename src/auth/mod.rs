use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::catalog::AreaAccess;
use crate::config;

/// Bearer-token claims for a portal principal.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username, lowercased.
    pub sub: String,
    /// Display name from the credential file.
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: &str, display_name: &str) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: username.to_lowercase(),
            name: display_name.to_string(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("portal config error: {0}")]
    Config(String),

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
}

/// Credentials and the principal-to-area permission map, loaded once from
/// the portal YAML file. Usernames are matched case-insensitively.
#[derive(Debug, Clone, Deserialize)]
pub struct PortalRegistry {
    pub credentials: HashMap<String, UserEntry>,
    #[serde(default)]
    pub permissions: HashMap<String, AreaAccess>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub name: String,
    pub password_sha256: String,
}

impl PortalRegistry {
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AuthError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let registry: PortalRegistry = serde_yaml::from_str(&text)
            .map_err(|e| AuthError::Config(format!("cannot parse {}: {}", path.display(), e)))?;
        Ok(registry.lowercased())
    }

    fn lowercased(self) -> Self {
        Self {
            credentials: self
                .credentials
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
            permissions: self
                .permissions
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }

    /// Check a password against the stored digest. Returns the user entry on
    /// success, None for unknown users or mismatches.
    pub fn verify(&self, username: &str, password: &str) -> Option<&UserEntry> {
        let user = self.credentials.get(&username.to_lowercase())?;
        let digest = sha256_hex(password);
        if digest.eq_ignore_ascii_case(&user.password_sha256) {
            Some(user)
        } else {
            None
        }
    }

    /// Area access for a principal. Principals missing from the permission
    /// map see nothing.
    pub fn access_for(&self, username: &str) -> AreaAccess {
        self.permissions
            .get(&username.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}

static REGISTRY: OnceLock<PortalRegistry> = OnceLock::new();

/// The process-wide registry, loaded from the configured path on first use.
pub fn registry() -> Result<&'static PortalRegistry, AuthError> {
    if let Some(registry) = REGISTRY.get() {
        return Ok(registry);
    }
    let path = &config::config().portal.config_path;
    let loaded = PortalRegistry::load(Path::new(path))?;
    Ok(REGISTRY.get_or_init(|| loaded))
}

pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}
