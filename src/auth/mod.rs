//! Azure AD authentication module.
//!
//! Provides the authorization-code request (browser sign-in with a pasted code) and the
//! code-for-token exchange.

pub mod oauth;
pub mod token;

pub use oauth::AuthClient;
pub use token::{Token, TokenExchanger};
