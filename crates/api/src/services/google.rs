//! Google identity assertion verification.
//!
//! The API delegates sign-in to Google: the client completes the federated
//! flow and posts the resulting ID token, which we verify against Google's
//! tokeninfo endpoint before minting our own session credential. Only the
//! fields the user upsert needs (email, name, picture, subject) are kept.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Google's ID-token introspection endpoint.
const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Issuers Google signs ID tokens under.
const VALID_ISSUERS: &[&str] = &["https://accounts.google.com", "accounts.google.com"];

/// Errors that can occur while verifying an identity assertion.
#[derive(Debug, Error)]
pub enum GoogleAuthError {
    /// The tokeninfo request itself failed.
    #[error("identity provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// Google rejected the token (malformed, expired, or revoked).
    #[error("identity provider rejected the token")]
    Rejected,

    /// The token was issued for a different application.
    #[error("token audience mismatch")]
    AudienceMismatch,

    /// The token was not issued by Google.
    #[error("unrecognized token issuer")]
    InvalidIssuer,

    /// The token carries no email claim.
    #[error("token has no email claim")]
    MissingEmail,
}

/// The subset of tokeninfo claims the API consumes.
#[derive(Debug, Deserialize)]
pub struct TokenInfo {
    /// Audience: the OAuth client ID the token was issued for.
    pub aud: String,
    /// Issuer.
    pub iss: String,
    /// Google's stable subject identifier for the account.
    pub sub: String,
    /// Account email.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Avatar URL.
    pub picture: Option<String>,
}

/// A verified identity assertion.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    /// Google's stable account identifier.
    pub uid: String,
    /// Verified email address.
    pub email: String,
    /// Display name, if Google provided one.
    pub name: Option<String>,
    /// Avatar URL, if Google provided one.
    pub picture: Option<String>,
}

/// Verifies Google ID tokens via the tokeninfo endpoint.
pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: String,
}

impl GoogleVerifier {
    /// Create a verifier bound to the configured OAuth client ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(client_id: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            client_id: client_id.to_owned(),
        })
    }

    /// Verify an ID token and return the identity it asserts.
    ///
    /// # Errors
    ///
    /// Returns `GoogleAuthError::Rejected` if Google does not recognize the
    /// token, and audience/issuer variants if the token was minted for
    /// someone else.
    pub async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        let response = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::Rejected);
        }

        let info: TokenInfo = response.json().await?;
        validate_claims(&info, &self.client_id)?;

        Ok(GoogleIdentity {
            uid: info.sub,
            email: info.email.ok_or(GoogleAuthError::MissingEmail)?,
            name: info.name,
            picture: info.picture,
        })
    }
}

/// Validate the audience and issuer of a tokeninfo response.
fn validate_claims(info: &TokenInfo, client_id: &str) -> Result<(), GoogleAuthError> {
    if info.aud != client_id {
        return Err(GoogleAuthError::AudienceMismatch);
    }

    if !VALID_ISSUERS.contains(&info.iss.as_str()) {
        return Err(GoogleAuthError::InvalidIssuer);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_info(aud: &str, iss: &str) -> TokenInfo {
        TokenInfo {
            aud: aud.to_owned(),
            iss: iss.to_owned(),
            sub: "110248495921238986420".to_owned(),
            email: Some("user@example.com".to_owned()),
            name: Some("Test User".to_owned()),
            picture: None,
        }
    }

    #[test]
    fn test_validate_claims_accepts_matching_audience() {
        let info = token_info("my-client-id", "https://accounts.google.com");
        assert!(validate_claims(&info, "my-client-id").is_ok());
    }

    #[test]
    fn test_validate_claims_accepts_bare_issuer() {
        let info = token_info("my-client-id", "accounts.google.com");
        assert!(validate_claims(&info, "my-client-id").is_ok());
    }

    #[test]
    fn test_validate_claims_rejects_wrong_audience() {
        let info = token_info("someone-elses-app", "https://accounts.google.com");
        assert!(matches!(
            validate_claims(&info, "my-client-id"),
            Err(GoogleAuthError::AudienceMismatch)
        ));
    }

    #[test]
    fn test_validate_claims_rejects_unknown_issuer() {
        let info = token_info("my-client-id", "https://evil.example.com");
        assert!(matches!(
            validate_claims(&info, "my-client-id"),
            Err(GoogleAuthError::InvalidIssuer)
        ));
    }
}
