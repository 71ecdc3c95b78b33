//! Microsoft Graph resource shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile from Microsoft Graph /me endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Unique identifier for the user.
    pub id: String,

    /// User's display name.
    pub display_name: Option<String>,

    /// User's given (first) name.
    pub given_name: Option<String>,

    /// User's surname (last name).
    pub surname: Option<String>,

    /// User Principal Name (the sign-in email for personal accounts).
    pub user_principal_name: Option<String>,
}

impl UserProfile {
    /// Get the best available display name.
    pub fn display_name_or_upn(&self) -> String {
        self.display_name
            .clone()
            .or_else(|| self.user_principal_name.clone())
            .unwrap_or_else(|| "Unknown User".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Sender or recipient of a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

impl Recipient {
    /// "Name (address)", falling back to whichever part is present.
    pub fn label(&self) -> String {
        let email = &self.email_address;
        match (email.name.as_deref(), email.address.as_deref()) {
            (Some(name), Some(address)) => format!("{} ({})", name, address),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => "(unknown)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// A mail message, as listed under /me/messages or fetched by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub created_date_time: Option<DateTime<Utc>>,
    pub sent_date_time: Option<DateTime<Utc>>,
    pub received_date_time: Option<DateTime<Utc>>,
    pub subject: Option<String>,
    pub body_preview: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_draft: bool,
    pub body: Option<ItemBody>,
    #[serde(default)]
    pub has_attachments: bool,
    pub sender: Option<Recipient>,
    pub from: Option<Recipient>,
    #[serde(default)]
    pub to_recipients: Vec<Recipient>,
}

/// One page of /me/messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageListPage {
    #[serde(rename = "@odata.context", default)]
    pub context: String,

    /// Continuation URL; empty on the last page.
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: String,

    #[serde(rename = "value")]
    pub messages: Vec<Message>,
}

impl MessageListPage {
    pub fn has_next_page(&self) -> bool {
        !self.next_link.is_empty()
    }
}
