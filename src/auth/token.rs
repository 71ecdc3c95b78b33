//! Authorization code exchange against the Azure AD token endpoint.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ApiError;
use crate::http::{decode_json, expect_ok};
use crate::secure::SecureString;

/// Exchanges authorization codes for access tokens.
pub struct TokenExchanger {
    client_id: String,
    client_secret: SecureString,
    redirect_uri: String,
    token_endpoint: String,
    http_client: reqwest::Client,
}

impl TokenExchanger {
    /// Create a new exchanger from validated configuration.
    pub fn new(config: &Config, http_client: reqwest::Client) -> anyhow::Result<Self> {
        let client_secret = config
            .oauth
            .client_secret
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Azure AD client secret not configured"))?;

        Ok(Self {
            client_id: config.oauth.client_id.clone(),
            client_secret,
            redirect_uri: config.oauth.redirect_uri.clone(),
            token_endpoint: config.token_url(),
            http_client,
        })
    }

    /// Exchange an authorization code for a token.
    pub async fn exchange_code(&self, code: &str) -> Result<Token, ApiError> {
        let response = self.post_code(code).await?;
        let token: Token = decode_json(response).await?;

        match token.expires_at(Utc::now()) {
            Some(expires_at) => info!(
                "Access token acquired ({}, expires at {})",
                token.token_type, expires_at
            ),
            None => info!(
                "Access token acquired ({}, expires_in {}s)",
                token.token_type, token.expires_in
            ),
        }
        Ok(token)
    }

    /// Exchange an authorization code and return the endpoint's body verbatim.
    pub async fn exchange_code_raw(&self, code: &str) -> Result<String, ApiError> {
        let response = self.post_code(code).await?;
        Ok(response.text().await?)
    }

    async fn post_code(&self, code: &str) -> Result<reqwest::Response, ApiError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
            ("client_secret", self.client_secret.as_str()),
        ];

        debug!("Exchanging authorization code at {}", self.token_endpoint);

        let response = self
            .http_client
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await?;

        expect_ok(response, "Token exchange").await
    }
}

/// Token response from Azure AD.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub token_type: String,
    pub scope: String,
    pub expires_in: u64,
    pub ext_expires_in: u64,
    pub access_token: String,
}

impl Token {
    /// Decode a token endpoint body.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(body)?)
    }

    /// When the token stops being accepted, given when it was issued.
    ///
    /// `None` when `expires_in` is too large to land on a representable date.
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        issued_at.checked_add_signed(self.lifetime()?)
    }

    /// Lifetime as granted by the token endpoint, if it fits in a [`Duration`].
    pub fn lifetime(&self) -> Option<Duration> {
        i64::try_from(self.expires_in)
            .ok()
            .and_then(Duration::try_seconds)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("ext_expires_in", &self.ext_expires_in)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}
