use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MAX_QUERY_COUNT;
use crate::errors::{GenerationError, ValidationError};
use crate::types::TestQuery;

/// Outcome of one generator invocation.
///
/// Only built through [`GenerationResult::succeeded`] and [`GenerationResult::failed`], so a
/// result is successful exactly when it holds at least one query and no error. Loaded records
/// are checked against the same rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GenerationRecord", into = "GenerationRecord")]
pub struct GenerationResult {
    original_query: TestQuery,
    requested_count: u32,
    success: bool,
    generated_queries: Vec<String>,
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

/// On-disk shape of a [`GenerationResult`].
#[derive(Serialize, Deserialize)]
struct GenerationRecord {
    original_query: TestQuery,
    requested_count: u32,
    success: bool,
    #[serde(default)]
    generated_queries: Vec<String>,
    #[serde(default, skip_deserializing)]
    num_generated: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl From<GenerationResult> for GenerationRecord {
    fn from(result: GenerationResult) -> Self {
        Self {
            num_generated: result.generated_queries.len(),
            original_query: result.original_query,
            requested_count: result.requested_count,
            success: result.success,
            generated_queries: result.generated_queries,
            error: result.error,
            timestamp: result.timestamp,
        }
    }
}

impl TryFrom<GenerationRecord> for GenerationResult {
    type Error = ValidationError;

    fn try_from(record: GenerationRecord) -> Result<Self, Self::Error> {
        if record.requested_count == 0 || record.requested_count > MAX_QUERY_COUNT {
            return Err(ValidationError::CountOutOfRange {
                count: record.requested_count,
                max: MAX_QUERY_COUNT,
            });
        }
        if record.generated_queries.iter().any(|q| q.trim().is_empty()) {
            return Err(ValidationError::InconsistentResult("blank generated query"));
        }
        if record.success {
            if record.generated_queries.is_empty() || record.error.is_some() {
                return Err(ValidationError::InconsistentResult(
                    "success requires queries and no error",
                ));
            }
        } else if !record.generated_queries.is_empty() || record.error.is_none() {
            return Err(ValidationError::InconsistentResult(
                "failure requires an error and no queries",
            ));
        }

        Ok(Self {
            original_query: record.original_query,
            requested_count: record.requested_count,
            success: record.success,
            generated_queries: record.generated_queries,
            error: record.error,
            timestamp: record.timestamp,
        })
    }
}

impl GenerationResult {
    /// Trims every query and drops blank ones; falls back to a failed result when none remain.
    pub fn succeeded(query: TestQuery, requested_count: u32, queries: Vec<String>) -> Self {
        let queries: Vec<String> = queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();
        if queries.is_empty() {
            return Self::failed(query, requested_count, GenerationError::Empty.to_string());
        }
        Self {
            original_query: query,
            requested_count,
            success: true,
            generated_queries: queries,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(query: TestQuery, requested_count: u32, error: impl Into<String>) -> Self {
        Self {
            original_query: query,
            requested_count,
            success: false,
            generated_queries: Vec::new(),
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn original_query(&self) -> &TestQuery {
        &self.original_query
    }

    pub fn requested_count(&self) -> u32 {
        self.requested_count
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn generated_queries(&self) -> &[String] {
        &self.generated_queries
    }

    pub fn num_generated(&self) -> usize {
        self.generated_queries.len()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Single,
    SampleBatch,
    CountVariation,
}

/// Ordered results of one harness session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRun {
    pub session_timestamp: DateTime<Utc>,
    pub kind: RunKind,
    pub results: Vec<GenerationResult>,
}

impl TestRun {
    pub fn new(kind: RunKind) -> Self {
        Self {
            session_timestamp: Utc::now(),
            kind,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: GenerationResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        let successful = self.results.iter().filter(|r| r.success()).count();
        RunSummary {
            total: self.results.len(),
            successful,
            failed: self.results.len() - successful,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Percentage in `[0, 100]`; an empty run reports 0.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> TestQuery {
        TestQuery::new(s).unwrap()
    }

    #[test]
    fn succeeded_with_queries_is_success() {
        let r = GenerationResult::succeeded(q("a"), 2, vec!["x".into(), "y".into()]);
        assert!(r.success());
        assert_eq!(r.num_generated(), 2);
        assert!(r.error().is_none());
    }

    #[test]
    fn succeeded_without_queries_becomes_failure() {
        let r = GenerationResult::succeeded(q("a"), 3, Vec::new());
        assert!(!r.success());
        assert_eq!(r.error(), Some("generator returned no queries"));
    }

    #[test]
    fn succeeded_trims_and_drops_blank_queries() {
        let r = GenerationResult::succeeded(
            q("a"),
            3,
            vec!["  solar power ".into(), "   ".into(), "".into()],
        );
        assert!(r.success());
        assert_eq!(r.generated_queries(), ["solar power".to_string()]);

        let r = GenerationResult::succeeded(q("a"), 2, vec!["   ".into(), "".into()]);
        assert!(!r.success());
        assert!(r.generated_queries().is_empty());
        assert_eq!(r.error(), Some("generator returned no queries"));
    }

    #[test]
    fn serialized_record_carries_num_generated() {
        let r = GenerationResult::succeeded(q("a"), 2, vec!["x".into(), "y".into()]);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["num_generated"], 2);
        let back: GenerationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn inconsistent_records_are_rejected() {
        let base = serde_json::json!({
            "original_query": "question",
            "requested_count": 3,
            "success": false,
            "generated_queries": [],
            "error": "boom",
            "timestamp": "2024-03-09T14:05:07Z"
        });
        assert!(serde_json::from_value::<GenerationResult>(base.clone()).is_ok());

        let cases = [
            ("original_query", serde_json::json!("")),
            ("requested_count", serde_json::json!(99)),
            ("requested_count", serde_json::json!(0)),
            ("generated_queries", serde_json::json!(["x"])),
            ("success", serde_json::json!(true)),
        ];
        for (field, value) in cases {
            let mut record = base.clone();
            record[field] = value;
            assert!(
                serde_json::from_value::<GenerationResult>(record).is_err(),
                "{field} should be rejected"
            );
        }
    }

    #[test]
    fn failed_never_carries_queries() {
        let r = GenerationResult::failed(q("a"), 3, "boom");
        assert!(!r.success());
        assert!(r.generated_queries().is_empty());
        assert_eq!(r.error(), Some("boom"));
    }

    #[test]
    fn summary_counts_and_rate() {
        let mut run = TestRun::new(RunKind::SampleBatch);
        run.push(GenerationResult::succeeded(q("a"), 3, vec!["x".into()]));
        run.push(GenerationResult::failed(q("b"), 3, "nope"));
        run.push(GenerationResult::succeeded(q("c"), 3, vec!["y".into()]));
        run.push(GenerationResult::failed(q("d"), 3, "nope"));

        let summary = run.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 2);
        assert!((summary.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_run_has_zero_rate() {
        let run = TestRun::new(RunKind::Single);
        assert!(run.is_empty());
        assert_eq!(run.summary().success_rate(), 0.0);
    }
}
