/// Signed identity assertions
///
/// Every request carries a signed, time-limited assertion of
/// `(principal_id, role)`; it is verified before any operation runs. The
/// encoding is an HS256 JWT; the secret must be at least 32 bytes.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskcrew_shared::auth::token::{issue_token, verify_token, Claims};
/// use taskcrew_shared::models::principal::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let principal_id = Uuid::new_v4();
/// let secret = "test-secret-key-at-least-32-bytes-long";
///
/// let claims = Claims::new(principal_id, Role::Manager, Duration::hours(24));
/// let token = issue_token(&claims, secret)?;
///
/// let verified = verify_token(&token, secret)?;
/// assert_eq!(verified.sub, principal_id);
/// assert_eq!(verified.role, Role::Manager);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::principal::Role;

/// Token issuer claim value
const ISSUER: &str = "taskcrew";

/// Error type for assertion operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token failed validation
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Assertion claims
///
/// Standard claims (`sub`, `iss`, `iat`, `exp`, `nbf`) plus the principal's
/// role. The role is embedded so the boundary layer never needs a lookup to
/// know who it is talking to; it is re-checked against the record for
/// operations that depend on account status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - principal ID
    pub sub: Uuid,

    /// Issuer - always "taskcrew"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Principal role (custom claim)
    pub role: Role,
}

impl Claims {
    /// Creates claims for a principal with the given time to live
    pub fn new(principal_id: Uuid, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + ttl;

        Self {
            sub: principal_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            role,
        }
    }

    /// Checks if the assertion has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `TokenError::CreateError` if encoding fails
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts claims
///
/// Verifies the signature, expiry, not-before, and issuer.
///
/// # Errors
///
/// Returns `TokenError::Expired` for expired tokens and
/// `TokenError::ValidationError` for every other failure
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
