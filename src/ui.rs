use colored::*;

use crate::result::{GenerationResult, RunSummary};
use crate::sanitize;

const RULE_WIDTH: usize = 60;

pub fn init_logging() {
    // Internal logs are opt-in via RUST_LOG. Console output below stays separate.
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(log::LevelFilter::Warn);
    }
    let _ = builder.try_init();
}

/// Plain-text rendering of one result. Output depends only on the result; the preview length is
/// fixed when the process first renders anything.
pub fn format_result(result: &GenerationResult) -> String {
    let mut out = format!(
        "Original query: {}\nRequested: {}\n",
        sanitize::sanitize_for_console(result.original_query().as_str()),
        result.requested_count()
    );

    match result.error() {
        None if result.success() => {
            out.push_str(&format!(
                "Success: generated {} queries\n",
                result.num_generated()
            ));
            for (i, query) in result.generated_queries().iter().enumerate() {
                out.push_str(&format!(
                    "  {}. {}\n",
                    i + 1,
                    sanitize::sanitize_for_console(query)
                ));
            }
        }
        error => {
            out.push_str(&format!(
                "Failed: {}\n",
                sanitize::sanitize_for_console(error.unwrap_or("unknown error"))
            ));
        }
    }

    out
}

pub fn display(result: &GenerationResult) {
    let text = format_result(result);
    for line in text.lines() {
        if line.starts_with("Success:") {
            println!("{} {}", "✓".green().bold(), line.green());
        } else if line.starts_with("Failed:") {
            println!("{} {}", "✗".red().bold(), line.red());
        } else if line.starts_with("Original query:") {
            println!("{}", line.bold());
        } else {
            println!("{line}");
        }
    }
}

pub fn header(provider: &str, model: &str) {
    let p = sanitize::sanitize_for_console(provider);
    let m = sanitize::sanitize_for_console(model);
    println!(
        "{} {} | {}",
        ">>".bold(),
        "querygen-harness".bold(),
        format!("{p}/{m}").cyan()
    );
}

pub fn section_title(title: &str) {
    println!("\n{}", "=".repeat(RULE_WIDTH).dimmed());
    println!("{}", title.bold());
    println!("{}", "=".repeat(RULE_WIDTH).dimmed());
}

pub fn test_heading(index: usize, total: usize) {
    println!("\n{}", format!("[Test {index}/{total}]").cyan().bold());
    println!("{}", "-".repeat(40).dimmed());
}

pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "Total tests: {}\nSuccessful: {}\nFailed: {}\nSuccess rate: {:.1}%",
        summary.total,
        summary.successful,
        summary.failed,
        summary.success_rate()
    )
}

pub fn summary(summary: &RunSummary) {
    section_title("TEST SUMMARY");
    println!("{}", format_summary(summary));
}

pub fn saved_to(path: &std::path::Path) {
    println!("\n{} Results saved to: {}", "●".blue(), path.display());
}

pub fn info(msg: impl AsRef<str>) {
    println!("{}", msg.as_ref().dimmed());
}

pub fn error(msg: impl AsRef<str>) {
    let safe = sanitize::sanitize_for_console(msg.as_ref());
    eprintln!("{} {}", "✗".red().bold(), safe.red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TestQuery;

    fn q(s: &str) -> TestQuery {
        TestQuery::new(s).unwrap()
    }

    #[test]
    fn formats_success_with_numbered_queries() {
        let r = GenerationResult::succeeded(
            q("What are the benefits of renewable energy?"),
            2,
            vec!["solar cost trends".into(), "wind power benefits".into()],
        );
        assert_eq!(
            format_result(&r),
            "Original query: What are the benefits of renewable energy?\n\
             Requested: 2\n\
             Success: generated 2 queries\n  \
             1. solar cost trends\n  \
             2. wind power benefits\n"
        );
    }

    #[test]
    fn formats_failure_with_error() {
        let r = GenerationResult::failed(q("Explain machine learning"), 3, "Network error: timeout");
        assert_eq!(
            format_result(&r),
            "Original query: Explain machine learning\nRequested: 3\nFailed: Network error: timeout\n"
        );
    }

    #[test]
    fn formatting_is_idempotent() {
        let r = GenerationResult::succeeded(q("a"), 1, vec!["b".into()]);
        assert_eq!(format_result(&r), format_result(&r));
    }

    #[test]
    fn preview_length_is_fixed_for_the_process() {
        let first = sanitize::preview_len();
        let long = "x".repeat(first + 10);
        let r = GenerationResult::succeeded(q("a"), 1, vec![long]);
        let before = format_result(&r);
        assert_eq!(sanitize::preview_len(), first);
        assert_eq!(format_result(&r), before);
        assert!(before.contains("[truncated 10 chars]"));
    }

    #[test]
    fn summary_text() {
        let s = RunSummary {
            total: 10,
            successful: 7,
            failed: 3,
        };
        assert_eq!(
            format_summary(&s),
            "Total tests: 10\nSuccessful: 7\nFailed: 3\nSuccess rate: 70.0%"
        );
    }
}
