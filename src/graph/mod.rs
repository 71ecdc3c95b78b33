//! Microsoft Graph integration.
//!
//! This module provides:
//! - A bearer-authenticated client with a single generic fetch-and-decode operation
//! - Record shapes for the user profile and mail resources

pub mod client;
pub mod models;

pub use client::GraphClient;
pub use models::{Message, MessageListPage, UserProfile};
