use color_eyre::Result;
use serde::Deserialize;

use crate::names;
use crate::services::auth::{ExternalIdentity, IdentityVerifier};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Deserialize)]
struct TokenInfo {
    iss: String,
    aud: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Verifies Google ID tokens through Google's tokeninfo endpoint.
#[derive(Clone)]
pub struct GoogleTokenInfo {
    client: reqwest::Client,
    client_id: String,
}

impl GoogleTokenInfo {
    pub fn new(client_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id,
        }
    }
}

impl IdentityVerifier for GoogleTokenInfo {
    async fn verify(&self, id_token: &str) -> Result<Option<ExternalIdentity>> {
        let resp = self
            .client
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !resp.status().is_success() {
            tracing::warn!("google rejected id token: {}", resp.status());
            return Ok(None);
        }

        let info: TokenInfo = resp.json().await?;

        if info.aud != self.client_id {
            tracing::warn!("google id token issued for another client: {}", info.aud);
            return Ok(None);
        }

        if !names::GOOGLE_ISSUERS.contains(&info.iss.as_str()) {
            tracing::warn!("google id token has wrong issuer: {}", info.iss);
            return Ok(None);
        }

        let Some(email) = info.email else {
            tracing::warn!("google id token carries no email");
            return Ok(None);
        };

        Ok(Some(ExternalIdentity {
            email,
            name: info.name.unwrap_or_default(),
            picture: info.picture,
        }))
    }
}
