//! Chat-completions backend for name suggestions.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use super::{SuggestError, SuggestionBackend};

const SYSTEM_PROMPT: &str = "You name music files. Given a file name and any known tags, \
reply with exactly one line in the form `Artist - Title`. No extension, no quotes, no commentary.";

/// Settings for [`OpenAiBackend`].
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Connect, read and write timeout.
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Blocking chat-completions client.
pub struct OpenAiBackend {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiBackend")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OpenAiBackend {
    /// Build a client.
    ///
    /// # Errors
    ///
    /// Returns `SuggestError::MissingApiKey` if no non-empty key is configured.
    pub fn new(config: &OpenAiConfig) -> Result<Self, SuggestError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(SuggestError::MissingApiKey)?
            .to_string();

        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.timeout)
            .timeout_read(config.timeout)
            .timeout_write(config.timeout)
            .build();

        Ok(Self {
            agent,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
        })
    }

    fn user_prompt(filename: &str, artist_hint: Option<&str>, title_hint: Option<&str>) -> String {
        format!(
            "File name: {}\nArtist tag: {}\nTitle tag: {}",
            filename,
            artist_hint.unwrap_or("unknown"),
            title_hint.unwrap_or("unknown")
        )
    }

    fn classify(error: ureq::Error) -> SuggestError {
        match error {
            ureq::Error::Status(code, _) => match code {
                401 | 403 => SuggestError::Auth(code),
                429 => SuggestError::RateLimited,
                _ => SuggestError::Http(code),
            },
            ureq::Error::Transport(transport) => SuggestError::Network(transport.to_string()),
        }
    }
}

impl SuggestionBackend for OpenAiBackend {
    fn request(
        &self,
        filename: &str,
        artist_hint: Option<&str>,
        title_hint: Option<&str>,
    ) -> Result<String, SuggestError> {
        log::debug!("Requesting name suggestion for {}", filename);
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::user_prompt(filename, artist_hint, title_hint) },
            ],
        });

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Accept", "application/json")
            .send_json(body)
            .map_err(Self::classify)?;

        let parsed: ChatResponse = response
            .into_json()
            .map_err(|e| SuggestError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SuggestError::Parse("response had no message content".to_string()))
    }
}
