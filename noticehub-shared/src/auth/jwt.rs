//! JWT token generation and validation module
//!
//! Bearer tokens are HS256-signed JWTs carrying the user's identity and role
//! at the time of login. The role claim is informational: the auth middleware
//! re-reads the account from the store on every request.
//!
//! # Security
//!
//! - **Algorithm**: HS256 (HMAC with SHA-256)
//! - **Expiration**: 7 days by default, configurable
//! - **Validation**: Signature, expiration, not-before and issuer checks
//!
//! # Example
//!
//! ```
//! use chrono::Duration;
//! use noticehub_shared::auth::jwt::{create_token, validate_token, Claims};
//! use noticehub_shared::models::user::Role;
//! use uuid::Uuid;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let user_id = Uuid::new_v4();
//! let claims = Claims::new(user_id, "ada@example.com", "Ada", Role::User, Duration::days(7));
//!
//! let secret = "a-development-secret-of-32-bytes!";
//! let token = create_token(&claims, secret)?;
//! let validated = validate_token(&token, secret)?;
//! assert_eq!(validated.sub, user_id);
//! # Ok(())
//! # }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User};

/// Issuer claim stamped on every token
pub const ISSUER: &str = "noticehub";

/// Default token lifetime in days
pub const DEFAULT_TTL_DAYS: i64 = 7;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid issuer: expected {expected}")]
    InvalidIssuer { expected: String },
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "noticehub")
/// - `iat` / `nbf` / `exp`: Unix timestamps
///
/// # Custom Claims
///
/// - `email`, `name`, `role`: snapshot of the account at issuance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "noticehub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Account email
    pub email: String,

    /// Display name
    pub name: String,

    /// Role at issuance
    pub role: Role,
}

impl Claims {
    /// Creates claims valid from now for `expires_in`
    pub fn new(
        user_id: Uuid,
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    /// Creates claims for a stored user
    pub fn for_user(user: &User, expires_in: Duration) -> Self {
        Self::new(user.id, &user.email, &user.name, user.role, expires_in)
    }
}

/// Signs claims into a compact JWT
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies signature, expiry, not-before and that the issuer is
/// [`ISSUER`].
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer {
            expected: ISSUER.to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn claims(expires_in: Duration) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "bob@example.com",
            "Bob Admin",
            Role::Admin,
            expires_in,
        )
    }

    #[test]
    fn test_claims_new() {
        let c = claims(Duration::days(DEFAULT_TTL_DAYS));
        assert_eq!(c.iss, "noticehub");
        assert_eq!(c.exp - c.iat, 7 * 24 * 3600);
        assert_eq!(c.nbf, c.iat);
    }

    #[test]
    fn test_create_and_validate() {
        let c = claims(Duration::hours(1));
        let token = create_token(&c, SECRET).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, c.sub);
        assert_eq!(validated.email, "bob@example.com");
        assert_eq!(validated.name, "Bob Admin");
        assert_eq!(validated.role, Role::Admin);
    }

    #[test]
    fn test_validate_wrong_secret() {
        let token = create_token(&claims(Duration::hours(1)), SECRET).unwrap();
        let result = validate_token(&token, "another-secret-key-at-least-32-bytes");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired() {
        let token = create_token(&claims(Duration::seconds(-120)), SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let mut c = claims(Duration::hours(1));
        c.iss = "someone-else".to_string();
        let token = create_token(&c, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer { .. })
        ));
    }

    #[test]
    fn test_validate_garbage() {
        assert!(validate_token("not.a.token", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }
}
