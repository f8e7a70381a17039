use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub mod gemini;
pub mod openai;

use crate::api::GenerationRequest;
use crate::config::{ApiConfig, ProviderKind};
use crate::errors::{GenerationError, SetupError};
use crate::types::ModelId;

pub(crate) struct ProviderHttpClient {
    client: Client,
}

impl ProviderHttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, SetupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// The external query-generation capability.
///
/// Implementations turn a conversation into at most `request.count` search queries. The
/// harness never relies on the exact length; it only reports it.
#[async_trait::async_trait]
pub trait QueryGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerationError>;

    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &ModelId;
}

/// Build the generator selected by `config`. Credentials are taken from `config` only.
pub fn create_generator(config: &ApiConfig) -> Result<Box<dyn QueryGenerator>, SetupError> {
    match config.provider {
        ProviderKind::Gemini => Ok(Box::new(gemini::GeminiGenerator::new(config)?)),
        ProviderKind::OpenAi => Ok(Box::new(openai::OpenAiGenerator::new(config)?)),
    }
}

/// Structured payload both providers are asked to return.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchQueryList {
    #[serde(default)]
    pub rationale: Option<String>,
    pub query: Vec<String>,
}

pub(crate) fn query_writer_prompt(request: &GenerationRequest) -> String {
    let today = chrono::Local::now().format("%B %d, %Y");
    format!(
        "You write web search queries for a research assistant.\n\
         Produce at most {count} diverse search queries for the research topic below. \
         Prefer a single query unless the topic has several distinct aspects; \
         never emit near-duplicates. Queries should target the most current information; \
         today's date is {today}.\n\n\
         Reply with JSON only, in the form {{\"rationale\": \"<why these queries>\", \"query\": [\"<query>\", ...]}}.\n\n\
         Research topic:\n{topic}",
        count = request.count,
        topic = request.context.research_topic(),
    )
}

/// Parse the model's JSON text into trimmed, non-blank queries.
pub(crate) fn parse_query_list(text: &str) -> Result<Vec<String>, GenerationError> {
    let cleaned = strip_code_fence(text);
    let list: SearchQueryList = serde_json::from_str(cleaned).map_err(|e| {
        GenerationError::MalformedResponse(format!("query list is not valid JSON: {e}"))
    })?;

    if let Some(rationale) = &list.rationale {
        log::debug!("generator rationale: {rationale}");
    }

    let queries: Vec<String> = list
        .query
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    if queries.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(queries)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Map a non-success HTTP status to the matching error kind.
pub(crate) fn status_error(status: StatusCode, body: &str) -> GenerationError {
    let message = crate::sanitize::redact_secrets(body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Authentication {
            status: status.as_u16(),
            message,
        },
        _ => GenerationError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TestQuery;

    #[test]
    fn parses_plain_json() {
        let text = r#"{"rationale": "two angles", "query": ["ai news 2024", " llm benchmarks "]}"#;
        let queries = parse_query_list(text).unwrap();
        assert_eq!(queries, vec!["ai news 2024", "llm benchmarks"]);
    }

    #[test]
    fn parses_fenced_json() {
        let text = "```json\n{\"query\": [\"renewable energy benefits\"]}\n```";
        let queries = parse_query_list(text).unwrap();
        assert_eq!(queries, vec!["renewable energy benefits"]);
    }

    #[test]
    fn blank_queries_are_dropped() {
        let err = parse_query_list(r#"{"query": ["  ", ""]}"#).unwrap_err();
        assert!(matches!(err, GenerationError::Empty));
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_query_list("Sure! Here are some queries:").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedResponse(_)));
    }

    #[test]
    fn auth_statuses_map_to_authentication() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = status_error(status, "API key not valid");
            assert!(matches!(err, GenerationError::Authentication { .. }));
            assert!(err.to_string().contains("API key not valid"));
        }
        let err = status_error(StatusCode::TOO_MANY_REQUESTS, "quota");
        assert!(matches!(err, GenerationError::Api { status: 429, .. }));
    }

    #[test]
    fn prompt_mentions_count_and_topic() {
        let req = GenerationRequest::new(TestQuery::new("Explain React vs Vue").unwrap(), 4);
        let prompt = query_writer_prompt(&req);
        assert!(prompt.contains("at most 4"));
        assert!(prompt.contains("Explain React vs Vue"));
    }
}
