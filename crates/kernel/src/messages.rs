//! System messages queued in the session.
//!
//! Handlers queue success and error messages; they are shown (and drained)
//! on the next full page load. Asynchronous requests leave the queue alone so
//! the messages survive until the client refreshes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key holding queued messages.
pub const SESSION_SYSTEM_MESSAGES: &str = "system_messages";

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Success,
    Error,
}

/// A queued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub kind: MessageKind,
    pub text: String,
}

/// Queue a message. Empty messages are ignored.
pub async fn push(session: &Session, kind: MessageKind, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }

    let mut queued = peek(session).await?;
    queued.push(SystemMessage {
        kind,
        text: text.to_string(),
    });

    session
        .insert(SESSION_SYSTEM_MESSAGES, queued)
        .await
        .context("failed to queue system message")?;

    Ok(())
}

/// Read queued messages without draining them.
pub async fn peek(session: &Session) -> Result<Vec<SystemMessage>> {
    let queued = session
        .get::<Vec<SystemMessage>>(SESSION_SYSTEM_MESSAGES)
        .await
        .context("failed to read system messages")?;

    Ok(queued.unwrap_or_default())
}

/// Remove and return all queued messages.
pub async fn drain(session: &Session) -> Result<Vec<SystemMessage>> {
    let queued = session
        .remove::<Vec<SystemMessage>>(SESSION_SYSTEM_MESSAGES)
        .await
        .context("failed to drain system messages")?;

    Ok(queued.unwrap_or_default())
}
