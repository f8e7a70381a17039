use serde_json::{Value, json};

use crate::api::GenerationRequest;
use crate::config::ApiConfig;
use crate::errors::{GenerationError, SetupError};
use crate::types::ModelId;

use super::{ProviderHttpClient, QueryGenerator, parse_query_list, query_writer_prompt, status_error};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiGenerator {
    http: ProviderHttpClient,
    key: String,
    model: ModelId,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(config: &ApiConfig) -> Result<Self, SetupError> {
        if config.api_key.trim().is_empty() {
            return Err(SetupError::MissingApiKey {
                provider: "gemini".to_string(),
                env_vars: "GEMINI_API_KEY".to_string(),
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

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn request_body(request: &GenerationRequest) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": query_writer_prompt(request) }]
            }],
            "generationConfig": {
                "temperature": 1.0,
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "rationale": { "type": "STRING" },
                        "query": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["rationale", "query"]
                }
            }
        })
    }

    pub(crate) fn extract_text(response: &Value) -> Result<String, GenerationError> {
        let candidate = response
            .get("candidates")
            .and_then(|arr| arr.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| {
                let reason = response
                    .pointer("/promptFeedback/blockReason")
                    .and_then(|v| v.as_str())
                    .unwrap_or("no candidates in response");
                GenerationError::MalformedResponse(reason.to_string())
            })?;

        let text: String = candidate
            .pointer("/content/parts")
            .and_then(|v| v.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let finish = candidate
                .get("finishReason")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            return Err(GenerationError::MalformedResponse(format!(
                "candidate has no text (finishReason: {finish})"
            )));
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl QueryGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerationError> {
        log::debug!("gemini request: model={} count={}", self.model, request.count);

        let res = self
            .http
            .client()
            .post(self.endpoint())
            .header("x-goog-api-key", &self.key)
            .json(&Self::request_body(request))
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
        "gemini"
    }

    fn model(&self) -> &ModelId {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use crate::types::TestQuery;

    fn config(base_url: Option<&str>) -> ApiConfig {
        ApiConfig {
            provider: ProviderKind::Gemini,
            api_key: "test-key".to_string(),
            model: ModelId::new("gemini-2.5-flash"),
            base_url: base_url.map(str::to_string),
            timeout_secs: 5,
        }
    }

    #[test]
    fn endpoint_uses_model_and_trims_base() {
        let generator = GeminiGenerator::new(&config(Some("http://localhost:8080/"))).unwrap();
        assert_eq!(
            generator.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn request_body_asks_for_json() {
        let req = GenerationRequest::new(TestQuery::new("gene editing risks").unwrap(), 2);
        let body = GeminiGenerator::request_body(&req);
        assert_eq!(
            body.pointer("/generationConfig/responseMimeType"),
            Some(&json!("application/json"))
        );
        let prompt = body
            .pointer("/contents/0/parts/0/text")
            .and_then(|v| v.as_str())
            .unwrap();
        assert!(prompt.contains("gene editing risks"));
    }

    #[test]
    fn extracts_joined_part_text() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "{\"rationale\": \"r\", " },
                    { "text": "\"query\": [\"a\", \"b\"]}" }
                ]},
                "finishReason": "STOP"
            }]
        });
        let text = GeminiGenerator::extract_text(&response).unwrap();
        assert_eq!(parse_query_list(&text).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn blocked_prompt_is_malformed() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = GeminiGenerator::extract_text(&response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn empty_candidate_reports_finish_reason() {
        let response = json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] });
        let err = GeminiGenerator::extract_text(&response).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }
}
