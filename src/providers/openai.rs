use serde_json::{Value, json};

use crate::api::GenerationRequest;
use crate::config::ApiConfig;
use crate::errors::{GenerationError, SetupError};
use crate::types::ModelId;

use super::{ProviderHttpClient, QueryGenerator, parse_query_list, query_writer_prompt, status_error};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Chat-completions backed generator. Works against any OpenAI-compatible gateway via `base_url`.
pub struct OpenAiGenerator {
    http: ProviderHttpClient,
    key: String,
    model: ModelId,
    base_url: String,
}

impl OpenAiGenerator {
    pub fn new(config: &ApiConfig) -> Result<Self, SetupError> {
        if config.api_key.trim().is_empty() {
            return Err(SetupError::MissingApiKey {
                provider: "openai".to_string(),
                env_vars: "OPENAI_API_KEY".to_string(),
            });
        }

        Ok(Self {
            http: ProviderHttpClient::new(config.timeout_secs)?,
            key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        json!({
            "model": &self.model,
            "messages": [
                { "role": "user", "content": query_writer_prompt(request) }
            ],
            "response_format": { "type": "json_object" }
        })
    }

    pub(crate) fn extract_text(response: &Value) -> Result<String, GenerationError> {
        let choice = response
            .get("choices")
            .and_then(|arr| arr.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| GenerationError::MalformedResponse("No choices in response".into()))?;

        choice
            .pointer("/message/content")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                let finish = choice
                    .get("finish_reason")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                GenerationError::MalformedResponse(format!(
                    "choice has no content (finish_reason: {finish})"
                ))
            })
    }
}

#[async_trait::async_trait]
impl QueryGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerationError> {
        log::debug!("openai request: model={} count={}", self.model, request.count);

        let res = self
            .http
            .client()
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.key)
            .json(&self.request_body(request))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let err_text = res.text().await.unwrap_or_default();
            return Err(status_error(status, &err_text));
        }

        let response_json: Value = res
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.without_url().to_string()))?;

        parse_query_list(&Self::extract_text(&response_json)?)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &ModelId {
        &self.model
    }
}
