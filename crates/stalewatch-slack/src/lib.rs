//! Slack `chat.postMessage` publisher with size-aware report chunking.
//!
//! Delivery is two-phase: when the whole report fits the per-section budget a
//! single message is attempted first; a size-classified rejection falls back
//! to the chunked path instead of failing the run. Posts are sequential with
//! a fixed pause between successive messages.

mod chunk;

pub use chunk::chunk_lines;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use stalewatch_core::truncate_for_error;
use thiserror::Error;

/// Per-section character budget, kept under Slack's 3000-character section
/// text limit.
pub const DEFAULT_MAX_SECTION_CHARS: usize = 2_900;
/// Pause between successive posts, for the chat.postMessage rate limit.
pub const DEFAULT_PAUSE_BETWEEN_POSTS_MS: u64 = 600;

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub api_base: String,
    pub bot_token: String,
    pub channel_id: String,
    pub max_section_chars: usize,
    pub pause_between_posts_ms: u64,
    pub request_timeout_ms: u64,
}

impl SlackConfig {
    pub fn new(bot_token: &str, channel_id: &str) -> Self {
        Self {
            api_base: "https://slack.com/api".to_string(),
            bot_token: bot_token.to_string(),
            channel_id: channel_id.to_string(),
            max_section_chars: DEFAULT_MAX_SECTION_CHARS,
            pause_between_posts_ms: DEFAULT_PAUSE_BETWEEN_POSTS_MS,
            request_timeout_ms: 15_000,
        }
    }
}

/// Failure modes of one publish call. `NotOk` carries the platform's error
/// token separately from the rendered payload so recoverability is decided on
/// the token, not by searching free text.
#[derive(Debug, Error)]
pub enum SlackPublishError {
    #[error("slack request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("slack api responded with status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("failed to decode slack response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("slack rejected message ({error}): {payload}")]
    NotOk { error: String, payload: String },
}

impl SlackPublishError {
    /// True when Slack rejected the message for size or block-shape reasons,
    /// in which case chunked delivery can still succeed.
    pub fn is_recoverable_size_error(&self) -> bool {
        matches!(
            self,
            Self::NotOk { error, .. } if error == "msg_too_long" || error == "invalid_blocks"
        )
    }
}

#[derive(Debug, Deserialize)]
struct SlackPostResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackPublisher {
    http: reqwest::Client,
    post_url: String,
    bot_token: String,
    channel_id: String,
    max_section_chars: usize,
    pause_between_posts: Duration,
}

impl SlackPublisher {
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create slack api client")?;

        Ok(Self {
            http,
            post_url: format!(
                "{}/chat.postMessage",
                config.api_base.trim_end_matches('/')
            ),
            bot_token: config.bot_token.trim().to_string(),
            channel_id: config.channel_id.to_string(),
            max_section_chars: config.max_section_chars.max(1),
            pause_between_posts: Duration::from_millis(config.pause_between_posts_ms),
        })
    }

    /// Delivers the report, chunking when it exceeds the section budget.
    /// Returns the number of messages posted. A failure aborts remaining
    /// chunks; messages already posted stay posted.
    pub async fn post_report(&self, header: &str, lines: &[String]) -> Result<usize> {
        if lines.is_empty() {
            self.post_message(None, header, header)
                .await
                .context("failed to post empty-report message")?;
            return Ok(1);
        }

        let body = lines.join("\n");
        if body.chars().count() <= self.max_section_chars {
            match self.post_message(Some(header), &body, header).await {
                Ok(()) => return Ok(1),
                Err(error) if error.is_recoverable_size_error() => {
                    tracing::warn!(
                        %error,
                        "single-message post rejected for size, switching to chunked delivery"
                    );
                }
                Err(error) => {
                    return Err(error).context("failed to post report message");
                }
            }
        }

        let parts = chunk_lines(lines, self.max_section_chars);
        let total = parts.len();
        let mut sent = 0usize;
        for (index, part) in parts.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.pause_between_posts).await;
            }
            let chunk_header = if index == 0 {
                header.to_string()
            } else {
                format!("{header} (cont. {index})")
            };
            self.post_message(Some(&chunk_header), part, &chunk_header)
                .await
                .with_context(|| format!("failed to post report chunk {} of {total}", index + 1))?;
            sent += 1;
        }
        Ok(sent)
    }

    async fn post_message(
        &self,
        header: Option<&str>,
        body: &str,
        fallback: &str,
    ) -> Result<(), SlackPublishError> {
        let payload = json!({
            "channel": self.channel_id,
            "text": fallback,
            "blocks": section_blocks(header, body),
        });

        let response = self
            .http
            .post(&self.post_url)
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(SlackPublishError::HttpStatus {
                status: status.as_u16(),
                body: truncate_for_error(&body_text, 800),
            });
        }

        let raw = response.text().await?;
        let decoded: SlackPostResponse = serde_json::from_str(&raw)?;
        if !decoded.ok {
            return Err(SlackPublishError::NotOk {
                error: decoded
                    .error
                    .unwrap_or_else(|| "unknown_error".to_string()),
                payload: truncate_for_error(&raw, 800),
            });
        }
        Ok(())
    }
}

/// mrkdwn section blocks: optional header section followed by the body
/// section.
fn section_blocks(header: Option<&str>, body: &str) -> Value {
    let mut blocks = Vec::new();
    if let Some(header) = header {
        blocks.push(json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": header },
        }));
    }
    blocks.push(json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": body },
    }));
    Value::Array(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_ok(token: &str) -> SlackPublishError {
        SlackPublishError::NotOk {
            error: token.to_string(),
            payload: format!("{{\"ok\":false,\"error\":\"{token}\"}}"),
        }
    }

    #[test]
    fn size_tokens_are_recoverable() {
        assert!(not_ok("msg_too_long").is_recoverable_size_error());
        assert!(not_ok("invalid_blocks").is_recoverable_size_error());
    }

    #[test]
    fn other_failures_are_not_recoverable() {
        assert!(!not_ok("channel_not_found").is_recoverable_size_error());
        assert!(!not_ok("msg_too_long_ish").is_recoverable_size_error());
        let transport = SlackPublishError::HttpStatus {
            status: 500,
            body: "server error".to_string(),
        };
        assert!(!transport.is_recoverable_size_error());
    }

    #[test]
    fn blocks_carry_header_then_body_sections() {
        let blocks = section_blocks(Some("header text"), "body text");
        let sections = blocks.as_array().expect("array");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0]["text"]["text"], "header text");
        assert_eq!(sections[1]["text"]["text"], "body text");
    }

    #[test]
    fn headerless_blocks_have_a_single_section() {
        let blocks = section_blocks(None, "only body");
        let sections = blocks.as_array().expect("array");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0]["text"]["text"], "only body");
    }
}
