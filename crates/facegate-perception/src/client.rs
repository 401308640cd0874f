//! Async HTTP client for the chat completions endpoint.

use std::time::Duration;

use facegate_core::{
  image::ImagePayload,
  perception::PerceptionService,
  score::parse_similarity,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result, prompts};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings, deserialised from the `[perception]` config table.
#[derive(Debug, Clone, Deserialize)]
pub struct PerceptionConfig {
  /// Base URL up to (not including) `/chat/completions`,
  /// e.g. `https://api.openai.com/v1`.
  pub base_url:     String,
  pub api_key:      String,
  #[serde(default = "default_model")]
  pub model:        String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default = "default_max_tokens")]
  pub max_tokens:   u32,
}

fn default_model() -> String { "gpt-4o".to_owned() }

fn default_timeout_secs() -> u64 { 30 }

fn default_max_tokens() -> u32 { 800 }

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  temperature: f32,
  max_tokens:  u32,
  messages:    Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'static str,
  content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
  Text(&'a str),
  Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
  Text { text: &'a str },
  ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
  url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
  content: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// [`PerceptionService`] over an OpenAI-compatible chat API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ChatPerception {
  client: Client,
  config: PerceptionConfig,
}

impl ChatPerception {
  pub fn new(config: PerceptionConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
  }

  /// Send one chat completion and return the reply text.
  async fn complete(&self, user: MessageContent<'_>) -> Result<String> {
    let body = ChatRequest {
      model:       &self.config.model,
      temperature: 0.0,
      max_tokens:  self.config.max_tokens,
      messages:    vec![
        ChatMessage { role: "system", content: MessageContent::Text(prompts::SYSTEM) },
        ChatMessage { role: "user", content: user },
      ],
    };

    let resp = self
      .client
      .post(self.url())
      .bearer_auth(&self.config.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let parsed: ChatResponse = resp
      .json()
      .await
      .map_err(|e| Error::Malformed(format!("undecodable response body: {e}")))?;

    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or_else(|| Error::Malformed("response has no message content".to_owned()))
  }

  async fn ask_about_image(&self, prompt: &str, image: &ImagePayload) -> Result<String> {
    self
      .complete(MessageContent::Parts(vec![
        ContentPart::Text { text: prompt },
        ContentPart::ImageUrl { image_url: ImageUrl { url: image.to_data_url() } },
      ]))
      .await
  }
}

impl PerceptionService for ChatPerception {
  type Error = Error;

  async fn detect_face(&self, image: &ImagePayload) -> Result<bool> {
    let reply = self.ask_about_image(prompts::PRESENCE, image).await?;
    parse_presence(&reply)
  }

  async fn describe(&self, image: &ImagePayload) -> Result<String> {
    self.ask_about_image(prompts::DESCRIBE, image).await
  }

  async fn compare(&self, submitted: &str, stored: &str) -> Result<u8> {
    let prompt = prompts::compare(submitted, stored);
    let reply = self.complete(MessageContent::Text(&prompt)).await?;
    let score = parse_similarity(&reply);
    debug!(score, reply_len = reply.len(), "comparison reply parsed");
    Ok(score)
  }
}

/// Interpret a yes/no presence reply. Anything else is malformed rather than
/// guessed.
pub fn parse_presence(reply: &str) -> Result<bool> {
  let normalized = reply
    .trim()
    .trim_start_matches(|c: char| !c.is_alphanumeric())
    .to_lowercase();

  if normalized.starts_with("yes") {
    Ok(true)
  } else if normalized.starts_with("no") {
    Ok(false)
  } else {
    Err(Error::Malformed(format!("expected YES or NO, got {reply:?}")))
  }
}
