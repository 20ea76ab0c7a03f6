//! Planner backed by the Google Generative Language API.
//!
//! Each call is a single `generateContent` request with a JSON response
//! schema attached. The model is chosen through the [`AgentTable`]: agents
//! the backend cannot serve are substituted by a default model, and the
//! plan prompt then carries a style note naming the requested agent.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::AgentTable;
use crate::plan::{Meal, WeeklyPlan, parse_alternatives, parse_weekly_plan};
use crate::profile::UserProfile;

use super::{AlternativesRequest, CollaboratorError, MealPlanner, prompt, schema};

/// Header carrying the API key. The key never goes into the URL, which
/// reqwest includes in its error messages.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Base URL for the API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Connection settings for [`GeminiPlanner`].
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

pub struct GeminiPlanner {
    client: Client,
    config: GeminiConfig,
    agents: AgentTable,
}

impl GeminiPlanner {
    /// Build a planner. Fails with [`CollaboratorError::MissingCredential`]
    /// when the API key is blank.
    pub fn new(config: GeminiConfig, agents: AgentTable) -> Result<Self, CollaboratorError> {
        if config.api_key.trim().is_empty() {
            return Err(CollaboratorError::MissingCredential);
        }
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            config,
            agents,
        })
    }

    fn build_url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send one prompt and return the text of the first candidate.
    async fn generate_text(
        &self,
        model: &str,
        prompt: String,
        response_schema: Value,
    ) -> Result<String, CollaboratorError> {
        let request = build_request(prompt, response_schema);
        let started = Instant::now();

        let response = self
            .client
            .post(self.build_url(model))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(
            model,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "planner responded"
        );

        if !status.is_success() {
            tracing::warn!(model, status = %status, "planner API error");
            return Err(map_api_error(status.as_u16(), &body));
        }

        extract_text(&body)
    }
}

impl fmt::Debug for GeminiPlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiPlanner")
            .field("config", &self.config)
            .field("agents", &self.agents)
            .finish()
    }
}

#[async_trait]
impl MealPlanner for GeminiPlanner {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate_plan(&self, profile: &UserProfile) -> Result<WeeklyPlan, CollaboratorError> {
        let agent = self.agents.resolve(&profile.model);
        tracing::info!(
            requested = %agent.requested,
            model = %agent.model,
            emulated = agent.is_emulated(),
            "requesting weekly plan"
        );

        let prompt = prompt::build_plan_prompt(profile, agent.emulation_note.as_deref());
        let text = self
            .generate_text(&agent.model, prompt, schema::weekly_plan_schema())
            .await?;
        Ok(parse_weekly_plan(&text)?)
    }

    async fn meal_alternatives(
        &self,
        request: &AlternativesRequest,
    ) -> Result<Vec<Meal>, CollaboratorError> {
        // Alternatives substitute the model but do not carry the style note.
        let agent = self.agents.resolve(&request.profile.model);
        tracing::info!(
            model = %agent.model,
            slot = %request.slot,
            target_calories = request.target_calories,
            "requesting meal alternatives"
        );

        let prompt = prompt::build_alternatives_prompt(request);
        let text = self
            .generate_text(&agent.model, prompt, schema::alternatives_schema())
            .await?;
        Ok(parse_alternatives(&text)?)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn build_request(prompt: String, response_schema: Value) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part { text: Some(prompt) }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema,
        },
    }
}

/// Concatenate the text parts of the first candidate.
///
/// A response without any text is [`CollaboratorError::EmptyResponse`].
fn extract_text(body: &str) -> Result<String, CollaboratorError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| CollaboratorError::Malformed(format!("unreadable API envelope: {e}")))?;

    if let Some(error) = response.error {
        return Err(CollaboratorError::Api {
            status: 200,
            message: error.message,
        });
    }

    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(CollaboratorError::EmptyResponse);
    }
    Ok(text)
}

/// Map a non-2xx response to an error, preferring the API's own message.
fn map_api_error(status: u16, body: &str) -> CollaboratorError {
    let message = serde_json::from_str::<GenerateResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map_or_else(|| body.trim().to_string(), |e| e.message);
    CollaboratorError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> GeminiPlanner {
        GeminiPlanner::new(
            GeminiConfig::new("test-key").with_base_url("http://localhost:9/v1beta/"),
            AgentTable::builtin(),
        )
        .unwrap()
    }

    #[test]
    fn blank_key_is_missing_credential() {
        let err = GeminiPlanner::new(GeminiConfig::new("  "), AgentTable::builtin()).unwrap_err();
        assert!(matches!(err, CollaboratorError::MissingCredential));
    }

    #[test]
    fn url_includes_model_but_not_key() {
        assert_eq!(
            planner().build_url("gemini-2.5-flash"),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", planner());
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn request_serializes_generation_config() {
        let request = build_request("hi".to_string(), schema::alternatives_schema());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(json["generationConfig"]["responseSchema"]["properties"]["alternatives"].is_object());
    }

    #[test]
    fn extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn extract_text_without_candidates_is_empty_response() {
        assert!(matches!(
            extract_text(r#"{"candidates":[]}"#),
            Err(CollaboratorError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#),
            Err(CollaboratorError::EmptyResponse)
        ));
    }

    #[test]
    fn extract_text_rejects_garbage_envelope() {
        assert!(matches!(
            extract_text("<html>"),
            Err(CollaboratorError::Malformed(_))
        ));
    }

    #[test]
    fn api_error_prefers_json_message() {
        let err = map_api_error(403, r#"{"error":{"message":"API key not valid"}}"#);
        assert!(matches!(
            err,
            CollaboratorError::Api { status: 403, ref message } if message == "API key not valid"
        ));

        let err = map_api_error(502, "bad gateway\n");
        assert!(matches!(
            err,
            CollaboratorError::Api { status: 502, ref message } if message == "bad gateway"
        ));
    }
}
