//! Session credential service.
//!
//! Mints and verifies the signed bearer tokens that represent an
//! authenticated user. Tokens are HS256 JWTs carrying the user ID as the
//! subject and a 30-day expiry; protected routes resolve them back to a
//! database user via the [`crate::middleware::auth`] extractors.

mod error;

pub use error::AuthError;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use velocart_core::UserId;

/// Token lifetime: 30 days, per the session credential contract.
pub const TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// JWT claims carried by a session credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's ID.
    pub sub: String,
    /// Expiration time as a UTC timestamp.
    pub exp: i64,
}

/// Mints and verifies session credentials.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Create a token service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a signed token for `user_id`, expiring 30 days from now.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenCreation` if signing fails.
    pub fn mint(&self, user_id: UserId) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + TOKEN_TTL_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verify a token and return the user ID it was minted for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for expired tokens,
    /// `AuthError::InvalidToken` for any other validation failure, and
    /// `AuthError::InvalidSubject` if the subject is not a user ID.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AuthError::InvalidSubject)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("kJ8#mP2$vN5@qR9!wT4&xZ7*bC1^dF6%"))
    }

    #[test]
    fn test_mint_and_verify_roundtrip() {
        let tokens = service();
        let token = tokens.mint(UserId::new(42)).unwrap();
        let user_id = tokens.verify(&token).unwrap();
        assert_eq!(user_id, UserId::new(42));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let tokens = service();
        assert!(matches!(
            tokens.verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let token = service().mint(UserId::new(1)).unwrap();
        let other = TokenService::new(&SecretString::from("zY3!aQ8@eW5#rT2$uI9%oP6^sD4&fG1*"));
        assert!(matches!(
            other.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expiry_is_thirty_days_out() {
        let tokens = service();
        let token = tokens.mint(UserId::new(7)).unwrap();

        // Decode without verifying to inspect claims
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let key = DecodingKey::from_secret(b"unused");
        let data = jsonwebtoken::decode::<Claims>(&token, &key, &validation).unwrap();

        let now = chrono::Utc::now().timestamp();
        let delta = data.claims.exp - now;
        assert!((TOKEN_TTL_SECS - 60..=TOKEN_TTL_SECS).contains(&delta));
    }
}
