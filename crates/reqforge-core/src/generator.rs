//! Live generator interface and Gemini client
//!
//! A [`Generator`] turns a description into raw JSON text. It is the only
//! network-bound step of extraction; everything downstream is pure.

use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Debug;

/// Maximum response body kept in [`GeneratorError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// External text-to-structure backend
#[async_trait]
pub trait Generator: Send + Sync + Debug {
    /// Backend name for logs and status
    fn name(&self) -> &str;

    /// Produce raw JSON text for a description
    async fn generate(&self, description: &str) -> Result<String, GeneratorError>;
}

/// Google Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiGenerator {
    /// Build a client from configuration
    ///
    /// # Errors
    /// - `GeneratorError::NotConfigured` if no usable API key is set
    /// - `GeneratorError::Http` if the HTTP client cannot be built
    pub fn new(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let api_key = config
            .effective_api_key()
            .ok_or(GeneratorError::NotConfigured)?
            .to_owned();
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
        })
    }

    /// Model name
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, description: &str) -> Result<String, GeneratorError> {
        tracing::debug!(model = %self.model, "requesting structured extraction");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&request_body(description))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        parsed.into_text().ok_or(GeneratorError::EmptyResponse)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

fn truncate_on_char_boundary(text: &mut String, max: usize) {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
}

fn request_body(description: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt(description) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

fn prompt(description: &str) -> String {
    format!(
        r#"Turn the application description below into structured requirements. Respond with JSON only.

Description: "{description}"

Shape:
{{
  "appName": string,
  "entities": [{{ "name": string, "fields": [{{ "name": string, "type": "text|email|number|date|select|textarea", "required": boolean }}] }}],
  "roles": [string],
  "features": [string],
  "rolePermissions": [{{ "role": string, "canCreate": [string], "canView": [string], "canEdit": [string] }}]
}}

Rules:
- Field types must be one of the six listed.
- roles[] are grouping labels: real user roles, or feature groups when the app has no roles.
- Emit exactly one rolePermissions record per role, using the same role name.
- Every role needs a non-empty canView.
- At least one admin-like role (Admin, Administrator, Owner, Manager, Supervisor, or the most responsible role) gets canCreate and canEdit on every entity.
- Never return canEdit empty for every role.
- Keep lists short and relevant. No commentary."#
    )
}

fn response_schema() -> Value {
    let names = json!({ "type": "array", "items": { "type": "string" } });
    json!({
        "type": "object",
        "properties": {
            "appName": { "type": "string" },
            "entities": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "fields": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "name": { "type": "string" },
                                    "type": {
                                        "type": "string",
                                        "enum": ["text", "email", "number", "date", "select", "textarea"]
                                    },
                                    "required": { "type": "boolean" }
                                },
                                "required": ["name", "type", "required"]
                            }
                        }
                    },
                    "required": ["name", "fields"]
                }
            },
            "roles": names.clone(),
            "features": names.clone(),
            "rolePermissions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "role": { "type": "string" },
                        "canCreate": names.clone(),
                        "canView": names.clone(),
                        "canEdit": names
                    },
                    "required": ["role", "canCreate", "canView", "canEdit"]
                }
            }
        },
        "required": ["appName", "entities", "roles", "features", "rolePermissions"]
    })
}
