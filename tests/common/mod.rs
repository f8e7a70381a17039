#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use querygen_harness::{GenerationError, GenerationRequest, ModelId, QueryGenerator};

type Script = dyn Fn(&GenerationRequest) -> Result<Vec<String>, GenerationError> + Send + Sync;

/// Deterministic stand-in for a live model. Records every request it receives.
pub struct ScriptedGenerator {
    script: Box<Script>,
    calls: Arc<Mutex<Vec<(String, u32)>>>,
    model: ModelId,
}

impl ScriptedGenerator {
    pub fn new<F>(script: F) -> (Self, Arc<Mutex<Vec<(String, u32)>>>)
    where
        F: Fn(&GenerationRequest) -> Result<Vec<String>, GenerationError> + Send + Sync + 'static,
    {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let generator = Self {
            script: Box::new(script),
            calls: Arc::clone(&calls),
            model: ModelId::new("scripted"),
        };
        (generator, calls)
    }

    /// Returns exactly `count` queries derived from the question.
    pub fn echoing() -> (Self, Arc<Mutex<Vec<(String, u32)>>>) {
        Self::new(|req| {
            Ok((1..=req.count)
                .map(|i| format!("{} #{i}", req.query.as_str()))
                .collect())
        })
    }
}

#[async_trait::async_trait]
impl QueryGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, GenerationError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.query.as_str().to_string(), request.count));
        (self.script)(request)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &ModelId {
        &self.model
    }
}

pub fn auth_error() -> GenerationError {
    GenerationError::Authentication {
        status: 401,
        message: "API key not valid. Please pass a valid API key.".to_string(),
    }
}
