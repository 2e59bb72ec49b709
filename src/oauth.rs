//! Google Sign-In ID token verification.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("could not validate ID token: {0}")]
    Rejected(String),

    #[error("token issued for another client")]
    WrongAudience,

    #[error("token carries no email")]
    MissingEmail,

    #[error("verification request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub email: String,
    pub given_name: String,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<Identity, OAuthError>;
}

#[derive(Deserialize)]
struct TokenInfo {
    aud: String,
    email: Option<String>,
    #[serde(default)]
    given_name: String,
}

/// Checks ID tokens with Google's tokeninfo endpoint, which validates the
/// signature and expiry; we check the audience.
pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: String,
    endpoint: String,
}

impl GoogleVerifier {
    pub fn new(client: reqwest::Client, client_id: String) -> Self {
        Self {
            client,
            client_id,
            endpoint: GOOGLE_TOKENINFO_URL.to_string(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, id_token: &str) -> Result<Identity, OAuthError> {
        // a JWT is base64url segments joined by dots, so it needs no escaping
        let url_safe = id_token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if id_token.is_empty() || !url_safe {
            return Err(OAuthError::Rejected("malformed token".to_string()));
        }

        let res = self
            .client
            .get(format!("{}?id_token={}", self.endpoint, id_token))
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(OAuthError::Rejected(format!("status {}", res.status())));
        }

        let info = res.json::<TokenInfo>().await?;
        check_claims(info, &self.client_id)
    }
}

fn check_claims(info: TokenInfo, client_id: &str) -> Result<Identity, OAuthError> {
    if info.aud != client_id {
        return Err(OAuthError::WrongAudience);
    }
    let email = info
        .email
        .filter(|e| !e.is_empty())
        .ok_or(OAuthError::MissingEmail)?;
    Ok(Identity {
        email,
        given_name: info.given_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(aud: &str, email: Option<&str>) -> TokenInfo {
        serde_json::from_value(serde_json::json!({
            "aud": aud,
            "email": email,
            "given_name": "Dory",
            "exp": "1700000000"
        }))
        .unwrap()
    }

    #[test]
    fn accepts_matching_audience() {
        let identity = check_claims(info("client-1", Some("dory@reef.io")), "client-1").unwrap();
        assert_eq!(
            identity,
            Identity {
                email: "dory@reef.io".to_string(),
                given_name: "Dory".to_string()
            }
        );
    }

    #[test]
    fn rejects_other_audience() {
        assert!(matches!(
            check_claims(info("client-2", Some("dory@reef.io")), "client-1"),
            Err(OAuthError::WrongAudience)
        ));
    }

    #[test]
    fn rejects_missing_email() {
        assert!(matches!(
            check_claims(info("client-1", None), "client-1"),
            Err(OAuthError::MissingEmail)
        ));
    }

    #[tokio::test]
    async fn malformed_token_never_leaves_the_process() {
        let verifier = GoogleVerifier::new(reqwest::Client::new(), "client-1".to_string());

        for token in ["", "abc&aud=client-1", "a b.c"] {
            assert!(matches!(
                verifier.verify(token).await,
                Err(OAuthError::Rejected(_))
            ));
        }
    }
}
