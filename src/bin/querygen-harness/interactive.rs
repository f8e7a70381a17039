use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::Path;

use querygen_harness::harness::{COUNT_VARIATION_COUNTS, COUNT_VARIATION_QUERY, SAMPLE_QUERIES};
use querygen_harness::{QueryGenerationHarness, ui};

/// Prompted walk through the three test sets: custom query, samples, count sweep.
pub async fn run(harness: &QueryGenerationHarness, count: u32, output_dir: &Path) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    ui::section_title("OPTION 1: Test a custom query");
    let Some(custom) = prompt(&mut rl, "Enter a custom query to test (or press Enter to skip): ")?
    else {
        return goodbye();
    };
    if !custom.is_empty() {
        let result = harness.run_single(&custom, count).await?;
        ui::display(&result);
    }

    ui::section_title("OPTION 2: Test all sample queries");
    let Some(answer) = prompt(&mut rl, "Test all sample queries? (y/n): ")? else {
        return goodbye();
    };
    if is_yes(&answer) {
        let run = harness
            .run_batch_observed(&SAMPLE_QUERIES, count, |i, result| {
                ui::test_heading(i + 1, SAMPLE_QUERIES.len());
                ui::display(result);
            })
            .await?;
        ui::summary(&run.summary());

        let Some(answer) = prompt(&mut rl, "Save results to file? (y/n): ")? else {
            return goodbye();
        };
        if is_yes(&answer) {
            crate::save(&run, None, output_dir, true)?;
        }
    }

    ui::section_title("OPTION 3: Test different query counts");
    let Some(answer) = prompt(&mut rl, "Test different query counts? (y/n): ")? else {
        return goodbye();
    };
    if is_yes(&answer) {
        ui::info(format!("Using test query: {COUNT_VARIATION_QUERY}"));
        let run = harness
            .run_count_variation_observed(
                COUNT_VARIATION_QUERY,
                &COUNT_VARIATION_COUNTS,
                |i, result| {
                    ui::test_heading(i + 1, COUNT_VARIATION_COUNTS.len());
                    ui::display(result);
                },
            )
            .await?;
        crate::save(&run, None, output_dir, true)?;
    }

    ui::info("\nTesting completed!");
    Ok(())
}

/// `None` on Ctrl-C / Ctrl-D.
fn prompt(rl: &mut DefaultEditor, message: &str) -> Result<Option<String>> {
    match rl.readline(message) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

fn goodbye() -> Result<()> {
    ui::info("\nGoodbye!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_answers() {
        assert!(is_yes("y"));
        assert!(is_yes("Y"));
        assert!(is_yes("yes"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
