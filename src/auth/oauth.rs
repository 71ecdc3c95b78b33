//! Authorization-code request against Azure AD.
//!
//! The user signs in out-of-band in a browser; the redirect URI has no listener, so the
//! code is copied from the address bar and pasted back into the terminal.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Config;
use crate::error::ApiError;
use crate::http::expect_ok;
use crate::prompt;

/// Client for the authorize endpoint.
pub struct AuthClient {
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    state: String,
    authorize_endpoint: Url,
    open_browser: bool,
    http_client: reqwest::Client,
}

impl AuthClient {
    /// Create a new auth client from configuration.
    pub fn new(config: &Config, http_client: reqwest::Client) -> Result<Self> {
        let authorize_endpoint =
            Url::parse(&config.auth_url()).context("Invalid authorize endpoint")?;

        Ok(Self {
            client_id: config.oauth.client_id.clone(),
            redirect_uri: config.oauth.redirect_uri.clone(),
            scopes: config.scopes(),
            state: config.oauth.state.clone().unwrap_or_else(generate_state),
            authorize_endpoint,
            open_browser: config.flow.open_browser,
            http_client,
        })
    }

    /// The anti-forgery state sent with the authorization request.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Build the URL the user opens in a browser to sign in.
    pub fn authorization_url(&self) -> Url {
        let mut url = self.authorize_endpoint.clone();

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_mode", "query")
            .append_pair("state", &self.state)
            .append_pair("scope", &self.scopes.join(" "));

        url
    }

    /// Check that the authorize endpoint answers 200 for this URL.
    ///
    /// The page itself is discarded; sign-in happens in the user's browser.
    pub async fn check_endpoint(&self, url: &Url) -> Result<(), ApiError> {
        debug!("Checking authorize endpoint {}", self.authorize_endpoint);

        let response = self.http_client.get(url.as_str()).send().await?;
        expect_ok(response, "Authorize endpoint check").await?;
        Ok(())
    }

    /// Walk the user through sign-in and return the pasted authorization code.
    pub async fn request_authorization_code<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
    ) -> Result<String, ApiError> {
        let url = self.authorization_url();
        self.check_endpoint(&url).await?;

        let write_err = |e: std::io::Error| ApiError::Input(e.to_string());
        writeln!(
            output,
            "Please enter the following URL in your browser and copy the code from the URL and paste here"
        )
        .map_err(write_err)?;
        writeln!(output, "{}", url).map_err(write_err)?;

        if self.open_browser {
            if let Err(e) = open::that(url.as_str()) {
                warn!("Failed to open browser: {}", e);
            }
        }

        let pasted = prompt::ask(input, output, "Enter code")?;
        let code = parse_pasted_code(&pasted, self.state())?;

        info!("Authorization code received");
        Ok(code)
    }
}

/// Generate a random URL-safe anti-forgery state.
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let state_bytes: Vec<u8> = (0..16).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(state_bytes)
}

/// Accept either a bare authorization code or the full redirect URL from the address bar.
pub fn parse_pasted_code(pasted: &str, expected_state: &str) -> Result<String, ApiError> {
    let pasted = pasted.trim();
    if !(pasted.starts_with("http://") || pasted.starts_with("https://")) {
        return Ok(pasted.to_string());
    }

    let url = Url::parse(pasted).map_err(|e| ApiError::Input(e.to_string()))?;
    let params: HashMap<_, _> = url.query_pairs().collect();

    // Check for error response
    if let Some(error) = params.get("error") {
        let description = params
            .get("error_description")
            .map(|s| s.to_string())
            .unwrap_or_else(|| error.to_string());
        return Err(ApiError::AuthorizationDenied(description));
    }

    // A redirect without our state did not come from this sign-in
    match params.get("state") {
        Some(state) if *state == expected_state => {}
        _ => return Err(ApiError::StateMismatch),
    }

    params
        .get("code")
        .map(|code| code.to_string())
        .ok_or_else(|| ApiError::Input("redirect URL has no code parameter".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use crate::config::RunMode;
    use crate::test_support::{MockServer, Route};
    use reqwest::StatusCode;
    use std::io::Cursor;

    fn auth_client(config: &Config) -> AuthClient {
        AuthClient::new(config, config.http_client().unwrap()).unwrap()
    }

    #[test]
    fn test_authorization_url_parameters() {
        let mut config = test_config("https://login.example.com");
        config.flow.mode = RunMode::Profile;
        let client = auth_client(&config);

        let url = client.authorization_url();
        assert_eq!(url.path(), "/consumers/oauth2/v2.0/authorize");

        let params: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "test-client");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["redirect_uri"], config.oauth.redirect_uri);
        assert_eq!(params["response_mode"], "query");
        assert_eq!(params["state"], "12345");
        assert_eq!(params["scope"], "User.Read");
    }

    #[test]
    fn test_generated_state_when_unset() {
        let mut config = test_config("https://login.example.com");
        config.oauth.state = None;
        let first = auth_client(&config);
        let second = auth_client(&config);

        assert!(!first.state().is_empty());
        assert_ne!(first.state(), second.state());
    }

    #[test]
    fn test_parse_bare_code() {
        assert_eq!(parse_pasted_code(" abc123 ", "s").unwrap(), "abc123");
    }

    #[test]
    fn test_parse_redirect_url() {
        let url = "http://localhost:5000/auth/callback/outlook?code=M.C5_abc&state=12345";
        assert_eq!(parse_pasted_code(url, "12345").unwrap(), "M.C5_abc");
    }

    #[test]
    fn test_parse_redirect_error() {
        let url = "http://localhost:5000/cb?error=access_denied&error_description=User%20cancelled";
        let result = parse_pasted_code(url, "12345");
        assert!(matches!(result, Err(ApiError::AuthorizationDenied(d)) if d == "User cancelled"));
    }

    #[test]
    fn test_parse_redirect_state_mismatch() {
        let url = "http://localhost:5000/cb?code=abc&state=other";
        assert!(matches!(
            parse_pasted_code(url, "12345"),
            Err(ApiError::StateMismatch)
        ));
    }

    #[test]
    fn test_parse_redirect_missing_state() {
        let url = "http://localhost:5000/cb?code=forged";
        assert!(matches!(
            parse_pasted_code(url, "12345"),
            Err(ApiError::StateMismatch)
        ));
    }

    #[test]
    fn test_parse_redirect_missing_code() {
        let url = "http://localhost:5000/cb?state=12345";
        assert!(matches!(
            parse_pasted_code(url, "12345"),
            Err(ApiError::Input(_))
        ));
    }

    #[tokio::test]
    async fn test_request_authorization_code() {
        let server = MockServer::start(vec![Route::new(
            "GET",
            "/consumers/oauth2/v2.0/authorize",
            200,
            "<html>sign in</html>",
        )])
        .await;
        let config = test_config(server.base_url());
        let client = auth_client(&config);

        let mut input = Cursor::new("abc123\n");
        let mut output = Vec::new();
        let code = client
            .request_authorization_code(&mut input, &mut output)
            .await
            .unwrap();

        assert_eq!(code, "abc123");
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains(client.authorization_url().as_str()));
        assert!(printed.contains("Enter code"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].target.contains("response_mode=query"));
    }

    #[tokio::test]
    async fn test_request_authorization_code_provider_error() {
        let server = MockServer::start(vec![Route::new(
            "GET",
            "/consumers/oauth2/v2.0/authorize",
            500,
            "oops",
        )])
        .await;
        let config = test_config(server.base_url());
        let client = auth_client(&config);

        let mut input = Cursor::new("abc123\n");
        let mut output = Vec::new();
        let err = client
            .request_authorization_code(&mut input, &mut output)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        // The prompt is never shown when the endpoint check fails
        assert!(output.is_empty());
        assert_eq!(input.position(), 0);
    }

    #[tokio::test]
    async fn test_request_authorization_code_empty_input() {
        let server = MockServer::start(vec![Route::new(
            "GET",
            "/consumers/oauth2/v2.0/authorize",
            200,
            "",
        )])
        .await;
        let config = test_config(server.base_url());
        let client = auth_client(&config);

        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let err = client
            .request_authorization_code(&mut input, &mut output)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Input(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let config = test_config("http://127.0.0.1:1");
        let client = auth_client(&config);
        let url = client.authorization_url();

        let err = client.check_endpoint(&url).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
