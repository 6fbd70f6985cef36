//! AI suggestion provider: one batched Anthropic Messages call per import.
//!
//! The request carries every distinct unknown merchant plus the full category
//! list, so the model sees the whole batch at once and gives mutually
//! consistent suggestions. Any failure here degrades the batch to
//! "no suggestion"; it never fails an import.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use reckon_core::Category;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: i32 = 2000;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
    #[error("api key is not a valid header value")]
    InvalidApiKey,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// External collaborator that maps unknown merchant keys to category codes.
/// Implementations must answer the whole batch in one round-trip.
#[allow(async_fn_in_trait)]
pub trait SuggestionProvider {
    async fn suggest(
        &self,
        merchants: &[String],
        categories: &[Category],
    ) -> Result<HashMap<String, String>, AiError>;
}

/// Anthropic Messages API client with a bounded request timeout.
pub struct AnthropicProvider {
    client: reqwest::Client,
    model: String,
}

impl AnthropicProvider {
    pub fn new(
        api_key: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).map_err(|_| AiError::InvalidApiKey)?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            model: model.into(),
        })
    }

    /// Build a provider from `ANTHROPIC_API_KEY`.
    pub fn from_env(model: impl Into<String>, timeout: Duration) -> Result<Self, AiError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::MissingApiKey)?;
        Self::new(&api_key, model, timeout)
    }
}

impl SuggestionProvider for AnthropicProvider {
    async fn suggest(
        &self,
        merchants: &[String],
        categories: &[Category],
    ) -> Result<HashMap<String, String>, AiError> {
        #[derive(Serialize)]
        struct Msg {
            role: String,
            content: String,
        }

        #[derive(Serialize)]
        struct Req {
            model: String,
            max_tokens: i32,
            messages: Vec<Msg>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Msg {
                role: "user".to_string(),
                content: build_prompt(merchants, categories),
            }],
        };

        let resp = self.client.post(ANTHROPIC_API_URL).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Status { status, body });
        }

        let out: Resp = resp.json().await?;
        let mut text = String::new();
        for block in out.content {
            if block.t == "text" {
                if let Some(t) = block.text {
                    text.push_str(&t);
                }
            }
        }

        parse_suggestions(&text)
    }
}

/// Stand-in used when no API key is configured. Always fails, which the
/// engine degrades to "no suggestion" without rejecting the import.
pub struct UnconfiguredProvider;

impl SuggestionProvider for UnconfiguredProvider {
    async fn suggest(
        &self,
        _merchants: &[String],
        _categories: &[Category],
    ) -> Result<HashMap<String, String>, AiError> {
        Err(AiError::MissingApiKey)
    }
}

fn build_prompt(merchants: &[String], categories: &[Category]) -> String {
    let category_list = categories
        .iter()
        .map(|c| format!("- {}: {} ({})", c.code, c.name, c.category_type.as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    let merchant_list = merchants
        .iter()
        .map(|m| format!("- {m}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Categorize these bank-statement merchants.\n\n\
         Available categories:\n{category_list}\n\n\
         Merchants:\n{merchant_list}\n\n\
         Respond with ONLY a JSON object mapping each merchant string, exactly \
         as given, to the best category code, e.g. \
         {{\"coles 0645 oakleigh 03\": \"100\"}}.\n\
         Use only codes from the list above. If unsure, pick the closest code."
    )
}

/// Extract the JSON object from the model's reply. The prompt demands bare
/// JSON, but replies sometimes wrap it in prose; anything without a parseable
/// object is a whole-batch failure.
fn parse_suggestions(text: &str) -> Result<HashMap<String, String>, AiError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(AiError::MalformedResponse(
            "no JSON object in reply".to_string(),
        ));
    };
    if end < start {
        return Err(AiError::MalformedResponse(
            "no JSON object in reply".to_string(),
        ));
    }
    serde_json::from_str(&text[start..=end]).map_err(|e| AiError::MalformedResponse(e.to_string()))
}
