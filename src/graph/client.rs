//! Microsoft Graph API client.
//!
//! One generic fetch-and-decode operation, applied to the profile and mail resources.

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::models::{Message, MessageListPage, UserProfile};
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{decode_json, expect_ok};

/// Microsoft Graph API client.
pub struct GraphClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl GraphClient {
    /// Create a new Graph client.
    pub fn new(config: &Config, http_client: reqwest::Client) -> Self {
        Self {
            base_url: config.api.graph_base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// GET `{base}/{path}` with a bearer token and decode the JSON body as `T`.
    ///
    /// Only a 200 response is decoded; any other status fails with
    /// [`ApiError::Provider`].
    pub async fn fetch_resource<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = expect_ok(response, &format!("GET {}", path)).await?;
        decode_json(response).await
    }

    /// Fetch the current user's profile.
    pub async fn get_user_profile(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let profile: UserProfile = self.fetch_resource("me", access_token).await?;
        info!("Fetched profile for {}", profile.display_name_or_upn());
        Ok(profile)
    }

    /// Fetch the first page of the user's messages.
    pub async fn list_messages(&self, access_token: &str) -> Result<MessageListPage, ApiError> {
        let page: MessageListPage = self.fetch_resource("me/messages", access_token).await?;
        info!("Fetched {} messages", page.messages.len());
        Ok(page)
    }

    /// Fetch a single message by id.
    pub async fn get_message(&self, id: &str, access_token: &str) -> Result<Message, ApiError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::Input("message id is empty".into()));
        }

        let path = format!("me/messages/{}", urlencoding::encode(id));
        self.fetch_resource(&path, access_token).await
    }
}
