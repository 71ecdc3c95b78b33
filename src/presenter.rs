//! Terminal formatting for tokens, profiles and messages.

use std::fmt::Write;

use chrono::{DateTime, Duration, Utc};

use crate::auth::Token;
use crate::graph::{Message, MessageListPage, UserProfile};

const RULE: &str = "*****************************";

/// Format the token summary. The access token is masked unless `reveal` is set.
pub fn format_token(token: &Token, reveal: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Access token*****************");
    let _ = writeln!(out, "Type: {}", token.token_type);
    let _ = writeln!(out, "Scope: {}", token.scope);
    let lifetime = match token.lifetime() {
        Some(duration) => format_duration(duration),
        None => format!("{} s", token.expires_in),
    };
    let _ = writeln!(out, "Expires in: {}", lifetime);
    if reveal {
        let _ = writeln!(out, "{}", token.access_token);
    } else {
        let _ = writeln!(out, "Token: {}", mask_secret(&token.access_token));
    }
    let _ = writeln!(out, "{}", RULE);
    out
}

pub fn format_user_profile(user: &UserProfile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "User info********************");
    let _ = writeln!(out, "Id: {}", user.id);
    let _ = writeln!(out, "Name: {}", optional(&user.given_name));
    let _ = writeln!(out, "Surname: {}", optional(&user.surname));
    let _ = writeln!(out, "Email: {}", optional(&user.user_principal_name));
    let _ = writeln!(out, "Display name: {}", optional(&user.display_name));
    let _ = writeln!(out, "{}", RULE);
    out
}

pub fn format_message_list(page: &MessageListPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Message Id list********************");
    if page.messages.is_empty() {
        let _ = writeln!(out, "(no messages)");
    }
    for message in &page.messages {
        let _ = writeln!(out, "{}  {}", message.id, optional(&message.subject));
    }
    if page.has_next_page() {
        let _ = writeln!(out, "Next link: {}", page.next_link);
    } else {
        let _ = writeln!(out, "Next link: (none, last page)");
    }
    out
}

pub fn format_message(message: &Message) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Message********************");

    let from = message.from.as_ref().or(message.sender.as_ref());
    let _ = writeln!(
        out,
        "From: {}",
        from.map(|r| r.label()).unwrap_or_else(|| "(unknown)".to_string())
    );

    let _ = writeln!(out, "Recipients:");
    for recipient in &message.to_recipients {
        let _ = writeln!(out, "  {}", recipient.label());
    }

    let _ = writeln!(out, "Created: {}", timestamp(message.created_date_time));
    let _ = writeln!(out, "Received: {}", timestamp(message.received_date_time));
    let _ = writeln!(out, "Subject: {}", optional(&message.subject));
    let _ = writeln!(out, "Preview: {}", optional(&message.body_preview));
    let _ = writeln!(out, "Body:");
    if let Some(body) = &message.body {
        let _ = writeln!(out, "{}", body.content);
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Attachments: {}",
        if message.has_attachments { "yes" } else { "no" }
    );
    out
}

/// Format duration as human-readable string (e.g., "45 min", "1 hour").
pub fn format_duration(duration: Duration) -> String {
    let total_minutes = duration.num_minutes();

    if total_minutes < 1 {
        "< 1 min".to_string()
    } else if total_minutes < 60 {
        format!("{} min", total_minutes)
    } else {
        let hours = total_minutes / 60;
        let mins = total_minutes % 60;
        if mins == 0 {
            format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
        } else {
            format!("{}h {}m", hours, mins)
        }
    }
}

/// Keep the first few characters so tokens from different runs can be told apart.
fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(6).collect();
    if prefix.len() == secret.len() {
        "*".repeat(secret.chars().count())
    } else {
        format!("{}... ({} chars)", prefix, secret.chars().count())
    }
}

fn optional(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default()
}
