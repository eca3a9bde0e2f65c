//! Comment-language policy classification for pushed diffs.
//!
//! [`PolicyClassifier::classify`] extracts newly added comment lines from a
//! unified diff and decides whether any of them is written in Bahasa
//! Indonesia. Detection is two-stage: a stop-word heuristic answers the
//! obvious cases locally, and an optional chat-completion model handles the
//! rest. Errors on the remote stage never block a push; the classifier
//! degrades to "no violation".

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors from the remote classification stage.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("classifier request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed classifier response: {0}")]
    MalformedResponse(String),
}

/// A remote model that can answer a classification prompt.
///
/// The classifier builds the prompt and normalizes the answer; implementors
/// only transport it.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, PolicyError>;
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Indonesian function words that settle the verdict without a remote call.
const STOP_WORDS: &str =
    r"(?i)\b(yang|bisa|tidak|kita|kami|saya|anda|dengan|untuk|atau|pada|sebuah|adalah)\b";

/// Line-comment, block-comment-open, and doc-style markers.
const COMMENT_MARKERS: &str = r"^(//|#|\*|/\*)";

const SYSTEM_PROMPT: &str = "Respond only with \"true\" or \"false\".";

/// Two-stage policy classifier over diff text.
pub struct PolicyClassifier {
    stop_words: Regex,
    comment_markers: Regex,
    model: Option<Box<dyn LanguageModel>>,
}

impl PolicyClassifier {
    /// Build a classifier. Pass `None` to run with the heuristic stage only.
    pub fn new(model: Option<Box<dyn LanguageModel>>) -> Self {
        Self {
            stop_words: Regex::new(STOP_WORDS).expect("stop-word pattern"),
            comment_markers: Regex::new(COMMENT_MARKERS).expect("comment-marker pattern"),
            model,
        }
    }

    /// Whether the remote stage is available.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Decide whether `diff` introduces Indonesian-language comments.
    ///
    /// Returns `true` only on a heuristic stop-word hit or an affirmative
    /// answer from the remote model; empty candidate sets, a missing model,
    /// and remote failures all yield `false`.
    pub async fn classify(&self, diff: &str) -> bool {
        let lines = self.comment_lines(diff);
        if lines.is_empty() {
            return false;
        }
        tracing::debug!(candidates = lines.len(), "extracted added comment lines");

        if lines.iter().any(|line| self.stop_words.is_match(line)) {
            tracing::info!("stop-word heuristic hit, Indonesian comment detected");
            return true;
        }

        let Some(model) = &self.model else {
            return false;
        };

        match model.complete(SYSTEM_PROMPT, &build_prompt(&lines)).await {
            Ok(answer) => {
                let normalized = answer.trim().to_lowercase();
                tracing::debug!(answer = %normalized, "model answer");
                normalized == "true"
            }
            Err(err) => {
                tracing::warn!(error = %err, "remote classification failed, treating push as clean");
                false
            }
        }
    }

    /// Newly added lines (leading `+`, excluding the `+++` file header) whose
    /// trimmed content opens with a comment marker.
    pub fn comment_lines(&self, diff: &str) -> Vec<String> {
        diff.lines()
            .filter(|line| line.starts_with('+') && !line.starts_with("+++"))
            .map(|line| line[1..].trim().to_string())
            .filter(|line| self.comment_markers.is_match(line))
            .collect()
    }
}

fn build_prompt(lines: &[String]) -> String {
    let mut parts = vec![
        "You are a language detector. Respond only with \"true\" if ANY of the following lines is written in Bahasa Indonesia, otherwise respond \"false\".".to_string(),
        String::new(),
    ];
    parts.extend(lines.iter().map(|line| format!("- {line}")));
    parts.join("\n")
}

// ---------------------------------------------------------------------------
// OpenAI chat-completion backend
// ---------------------------------------------------------------------------

const OPENAI_MODEL: &str = "gpt-3.5-turbo";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// [`LanguageModel`] backed by the OpenAI chat-completions API.
///
/// Requests use deterministic sampling and a one-token response limit; the
/// model is only ever asked for a literal `true`/`false`.
pub struct OpenAiChat {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiChat {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String, PolicyError> {
        let body = serde_json::json!({
            "model": OPENAI_MODEL,
            "temperature": 0,
            "max_tokens": 1,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .client
            .post(OPENAI_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: serde_json::Value = response.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PolicyError::MalformedResponse(payload.to_string()))
    }
}
