//! The sign-in and fetch sequence.
//!
//! A single pass through [`Stage`]s with no loops. Any component error aborts the run and
//! is returned with the context of the stage that failed.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::auth::{AuthClient, Token, TokenExchanger};
use crate::config::{Config, RunMode};
use crate::graph::{GraphClient, MessageListPage};
use crate::presenter;
use crate::prompt;

/// Progress through a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingCode,
    AwaitingToken,
    FetchingProfile,
    FetchingMessageList,
    FetchingMessage,
    Done,
}

impl Stage {
    /// The stage after this one, for the given mode.
    pub fn next(self, mode: RunMode) -> Stage {
        match (self, mode) {
            (Stage::AwaitingCode, _) => Stage::AwaitingToken,
            (Stage::AwaitingToken, _) => Stage::FetchingProfile,
            (Stage::FetchingProfile, RunMode::Profile) => Stage::Done,
            (Stage::FetchingProfile, RunMode::Mail) => Stage::FetchingMessageList,
            (Stage::FetchingMessageList, _) => Stage::FetchingMessage,
            (Stage::FetchingMessage, _) | (Stage::Done, _) => Stage::Done,
        }
    }

    /// Message attached to errors raised while in this stage.
    pub fn failure_context(self) -> &'static str {
        match self {
            Stage::AwaitingCode => "Trouble getting authorization code",
            Stage::AwaitingToken => "Trouble getting access token",
            Stage::FetchingProfile => "Trouble getting user info",
            Stage::FetchingMessageList => "Trouble getting message list",
            Stage::FetchingMessage => "Trouble getting message",
            Stage::Done => "Run already finished",
        }
    }
}

/// Components and terminal streams for one run.
pub struct Session<R, W> {
    auth: AuthClient,
    exchanger: TokenExchanger,
    graph: GraphClient,
    mode: RunMode,
    reveal_access_token: bool,
    raw_token_response: bool,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Wire up the components from configuration, sharing one HTTP client.
    pub fn new(config: &Config, input: R, output: W) -> Result<Self> {
        let http_client = config.http_client()?;

        Ok(Self {
            auth: AuthClient::new(config, http_client.clone())?,
            exchanger: TokenExchanger::new(config, http_client.clone())?,
            graph: GraphClient::new(config, http_client),
            mode: config.flow.mode,
            reveal_access_token: config.output.reveal_access_token,
            raw_token_response: config.output.raw_token_response,
            input,
            output,
        })
    }

    /// Run every stage in order until done or the first failure.
    pub async fn run(mut self) -> Result<()> {
        let mut stage = Stage::AwaitingCode;
        let mut code = String::new();
        let mut token: Option<Token> = None;
        let mut page: Option<MessageListPage> = None;

        while stage != Stage::Done {
            debug!("Entering stage {:?}", stage);

            match stage {
                Stage::AwaitingCode => {
                    code = self
                        .auth
                        .request_authorization_code(&mut self.input, &mut self.output)
                        .await
                        .context(stage.failure_context())?;
                }
                Stage::AwaitingToken => {
                    let acquired = if self.raw_token_response {
                        let raw = self
                            .exchanger
                            .exchange_code_raw(&code)
                            .await
                            .context(stage.failure_context())?;
                        self.show(&raw)?;
                        Token::from_json(&raw).context(stage.failure_context())?
                    } else {
                        self.exchanger
                            .exchange_code(&code)
                            .await
                            .context(stage.failure_context())?
                    };
                    self.show(&presenter::format_token(&acquired, self.reveal_access_token))?;
                    token = Some(acquired);
                }
                Stage::FetchingProfile => {
                    let access_token = bearer(&token)?;
                    let user = self
                        .graph
                        .get_user_profile(access_token)
                        .await
                        .context(stage.failure_context())?;
                    self.show(&presenter::format_user_profile(&user))?;
                }
                Stage::FetchingMessageList => {
                    let access_token = bearer(&token)?;
                    let listed = self
                        .graph
                        .list_messages(access_token)
                        .await
                        .context(stage.failure_context())?;
                    self.show(&presenter::format_message_list(&listed))?;
                    page = Some(listed);
                }
                Stage::FetchingMessage => {
                    let id = prompt::ask(&mut self.input, &mut self.output, "Enter msg id")
                        .context("Error reading message id")?;
                    if let Some(listed) = &page {
                        if !listed.messages.iter().any(|m| m.id == id) {
                            warn!("Message id {} is not on the listed page", id);
                        }
                    }

                    let access_token = bearer(&token)?;
                    let message = self
                        .graph
                        .get_message(&id, access_token)
                        .await
                        .context(stage.failure_context())?;
                    self.show(&presenter::format_message(&message))?;
                }
                Stage::Done => {}
            }

            stage = stage.next(self.mode);
        }

        debug!("Run finished");
        Ok(())
    }

    fn show(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write output")?;
        self.output.flush().context("Failed to write output")
    }
}

fn bearer(token: &Option<Token>) -> Result<&str> {
    token
        .as_ref()
        .map(|t| t.access_token.as_str())
        .context("No access token acquired")
}
