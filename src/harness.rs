//! Drives a [`QueryGenerator`] through single queries, batches and count sweeps.
//!
//! Input is validated up front; nothing reaches the generator until every query and count in
//! the call has been checked. Generator failures are recorded in the returned results and never
//! abort a run.

use crate::api::GenerationRequest;
use crate::config::MAX_QUERY_COUNT;
use crate::errors::ValidationError;
use crate::providers::QueryGenerator;
use crate::result::{GenerationResult, RunKind, TestRun};
use crate::sanitize::redact_secrets;
use crate::types::TestQuery;

/// The fixed ten-question sample set.
pub const SAMPLE_QUERIES: [&str; 10] = [
    "What are the latest developments in artificial intelligence for 2024?",
    "How does Tesla's stock performance compare to traditional automakers?",
    "What are the environmental impacts of cryptocurrency mining?",
    "Explain the differences between React and Vue.js frameworks",
    "What are the health benefits of intermittent fasting?",
    "How is climate change affecting global food security?",
    "What are the latest trends in cybersecurity threats?",
    "Compare the economic policies of different countries during COVID-19",
    "What are the potential risks and benefits of gene editing technology?",
    "How has remote work affected productivity in tech companies?",
];

pub const COUNT_VARIATION_QUERY: &str =
    "What are the latest developments in artificial intelligence?";

pub const COUNT_VARIATION_COUNTS: [u32; 5] = [1, 2, 3, 4, 5];

/// `max_count` can only narrow the permitted range; values above `MAX_QUERY_COUNT` are clamped.
#[derive(Debug, Clone, Copy)]
pub struct HarnessSettings {
    pub max_count: u32,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            max_count: MAX_QUERY_COUNT,
        }
    }
}

pub struct QueryGenerationHarness {
    generator: Box<dyn QueryGenerator>,
    settings: HarnessSettings,
}

impl QueryGenerationHarness {
    pub fn new(generator: Box<dyn QueryGenerator>) -> Self {
        Self::with_settings(generator, HarnessSettings::default())
    }

    pub fn with_settings(generator: Box<dyn QueryGenerator>, settings: HarnessSettings) -> Self {
        let settings = HarnessSettings {
            max_count: settings.max_count.min(MAX_QUERY_COUNT),
        };
        Self {
            generator,
            settings,
        }
    }

    pub fn generator(&self) -> &dyn QueryGenerator {
        self.generator.as_ref()
    }

    pub fn validate_count(&self, count: u32) -> Result<u32, ValidationError> {
        if count == 0 || count > self.settings.max_count {
            return Err(ValidationError::CountOutOfRange {
                count,
                max: self.settings.max_count,
            });
        }
        Ok(count)
    }

    /// One request/response cycle against the generator.
    pub async fn run_single(
        &self,
        query: &str,
        count: u32,
    ) -> Result<GenerationResult, ValidationError> {
        let query = TestQuery::new(query)?;
        let count = self.validate_count(count)?;
        Ok(self.invoke(query, count).await)
    }

    /// Runs every query in order with the same count. An empty slice yields an empty run.
    pub async fn run_batch<S: AsRef<str>>(
        &self,
        queries: &[S],
        count: u32,
    ) -> Result<TestRun, ValidationError> {
        self.run_batch_observed(queries, count, |_, _| {}).await
    }

    /// [`run_batch`](Self::run_batch), calling `observer(index, result)` as each result lands.
    pub async fn run_batch_observed<S, F>(
        &self,
        queries: &[S],
        count: u32,
        mut observer: F,
    ) -> Result<TestRun, ValidationError>
    where
        S: AsRef<str>,
        F: FnMut(usize, &GenerationResult),
    {
        let count = self.validate_count(count)?;
        let queries = queries
            .iter()
            .map(|q| TestQuery::new(q.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let kind = if queries.len() == 1 {
            RunKind::Single
        } else {
            RunKind::SampleBatch
        };
        let mut run = TestRun::new(kind);
        let total = queries.len();
        for (i, query) in queries.into_iter().enumerate() {
            log::info!("batch query {}/{}: {}", i + 1, total, query);
            let result = self.invoke(query, count).await;
            observer(i, &result);
            run.push(result);
        }
        Ok(run)
    }

    /// Runs one query once per requested count, in the given order.
    pub async fn run_count_variation(
        &self,
        query: &str,
        counts: &[u32],
    ) -> Result<TestRun, ValidationError> {
        self.run_count_variation_observed(query, counts, |_, _| {})
            .await
    }

    pub async fn run_count_variation_observed<F>(
        &self,
        query: &str,
        counts: &[u32],
        mut observer: F,
    ) -> Result<TestRun, ValidationError>
    where
        F: FnMut(usize, &GenerationResult),
    {
        let query = TestQuery::new(query)?;
        for &count in counts {
            self.validate_count(count)?;
        }

        let mut run = TestRun::new(RunKind::CountVariation);
        for (i, &count) in counts.iter().enumerate() {
            log::info!("count variation: {count} requested");
            let result = self.invoke(query.clone(), count).await;
            observer(i, &result);
            run.push(result);
        }
        Ok(run)
    }

    async fn invoke(&self, query: TestQuery, count: u32) -> GenerationResult {
        let request = GenerationRequest::new(query, count);
        match self.generator.generate(&request).await {
            Ok(queries) => {
                if queries.len() != count as usize {
                    log::debug!(
                        "{} returned {} queries for {} requested",
                        self.generator.name(),
                        queries.len(),
                        count
                    );
                }
                GenerationResult::succeeded(request.query, count, queries)
            }
            Err(err) => {
                log::warn!("generation failed for {:?}: {err}", request.query.as_str());
                GenerationResult::failed(request.query, count, redact_secrets(&err.to_string()))
            }
        }
    }
}
