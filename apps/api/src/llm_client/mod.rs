//! LLM Client: the single point of entry for all generative backend calls.
//!
//! ARCHITECTURAL RULE: No other module may call the backend directly.
//! Flows reach it through the `ModelBackend` trait so tests can swap in a stub.
//!
//! Exactly one outbound call per invocation: no retries, no caching.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::flow::template::{PromptPart, RenderedPrompt};

pub mod prompts;
#[cfg(test)]
pub mod stub;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Used when a flow does not name a model and none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Finish reasons that mean the backend declined to answer.
const REFUSAL_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "RECITATION",
];

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend refused to answer: {0}")]
    Refused(String),

    #[error("backend call timed out after {0:?}")]
    Timeout(Duration),
}

// ────────────────────────────────────────────────────────────────────────────
// Model options
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmCategory {
    HateSpeech,
    DangerousContent,
    Harassment,
    SexuallyExplicit,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::HateSpeech,
        HarmCategory::DangerousContent,
        HarmCategory::Harassment,
        HarmCategory::SexuallyExplicit,
    ];

    fn as_api_str(self) -> &'static str {
        match self {
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmBlockThreshold {
    BlockNone,
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
}

impl HarmBlockThreshold {
    fn as_api_str(self) -> &'static str {
        match self {
            HarmBlockThreshold::BlockNone => "BLOCK_NONE",
            HarmBlockThreshold::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
            HarmBlockThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            HarmBlockThreshold::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: HarmBlockThreshold,
}

/// Per-flow model configuration. Anything left unset uses backend defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOptions {
    pub model: Option<String>,
    pub safety_settings: Vec<SafetySetting>,
    pub temperature: Option<f32>,
}

impl ModelOptions {
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn with_safety(mut self, category: HarmCategory, threshold: HarmBlockThreshold) -> Self {
        self.safety_settings
            .retain(|s| s.category != category);
        self.safety_settings.push(SafetySetting {
            category,
            threshold,
        });
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Everything the backend needs for one call.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub flow: &'a str,
    pub prompt: &'a RenderedPrompt,
    /// Output schema in the backend's `responseSchema` encoding.
    pub response_schema: &'a Value,
    pub options: &'a ModelOptions,
}

/// Generative backend seam. Returns the model's JSON answer, not yet
/// validated against the output schema.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Whether an API credential is configured. Read-only after startup.
    fn has_credential(&self) -> bool;

    async fn generate(&self, request: ModelRequest<'_>) -> Result<Value, ModelError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (generateContent)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<WireSafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub default_model: String,
    pub timeout: Duration,
}

/// The backend used by every flow in production: Gemini `generateContent`
/// with JSON-constrained output.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    api_base: String,
    default_model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            api_key: settings.api_key,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            default_model: settings.default_model,
            timeout: settings.timeout,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout(self.timeout)
        } else {
            ModelError::Unavailable(format!("HTTP error: {e}"))
        }
    }
}

#[async_trait]
impl ModelBackend for GeminiClient {
    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, request: ModelRequest<'_>) -> Result<Value, ModelError> {
        let model = request
            .options
            .model
            .as_deref()
            .unwrap_or(self.default_model.as_str());
        let url = format!("{}/models/{}:generateContent", self.api_base, model);
        let body = build_request_body(&request);

        let mut call = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            call = call.header("x-goog-api-key", key);
        }

        let response = call
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GoogleError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(flow = request.flow, %status, "Model backend returned an error: {message}");
            return Err(ModelError::Unavailable(format!(
                "status {}: {message}",
                status.as_u16()
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                flow = request.flow,
                model,
                "Model call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        }

        interpret_response(parsed)
    }
}

fn build_request_body<'a>(request: &ModelRequest<'a>) -> GenerateContentRequest<'a> {
    let prompt: &'a RenderedPrompt = request.prompt;
    let parts = prompt
        .parts
        .iter()
        .map(|part| match part {
            PromptPart::Text(text) => Part::Text {
                text: text.as_str(),
            },
            PromptPart::Media { mime_type, data } => Part::InlineData {
                inline_data: Blob {
                    mime_type: mime_type.as_str(),
                    data: data.as_str(),
                },
            },
        })
        .collect();

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text {
                text: prompts::STRUCTURED_OUTPUT_SYSTEM,
            }],
        },
        contents: vec![Content {
            role: Some("user"),
            parts,
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: request.response_schema,
            temperature: request.options.temperature,
        },
        safety_settings: request
            .options
            .safety_settings
            .iter()
            .map(|s| WireSafetySetting {
                category: s.category.as_api_str(),
                threshold: s.threshold.as_api_str(),
            })
            .collect(),
    }
}

/// Turns a decoded backend response into the model's JSON answer.
pub fn interpret_response(response: GenerateContentResponse) -> Result<Value, ModelError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|f| f.block_reason)
    {
        return Err(ModelError::Refused(format!("prompt blocked: {reason}")));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::Unavailable("response has no candidates".to_string()))?;

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if REFUSAL_FINISH_REASONS.contains(&reason) {
            return Err(ModelError::Refused(format!("finish reason {reason}")));
        }
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ModelError::Unavailable("model returned empty content".to_string()));
    }

    serde_json::from_str(strip_json_fences(&text))
        .map_err(|e| ModelError::Unavailable(format!("model output is not JSON: {e}")))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
