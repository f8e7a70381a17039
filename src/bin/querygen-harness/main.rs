use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use querygen_harness::config::{DEFAULT_OUTPUT_DIR, DEFAULT_QUERY_COUNT};
use querygen_harness::harness::{COUNT_VARIATION_COUNTS, COUNT_VARIATION_QUERY, SAMPLE_QUERIES};
use querygen_harness::{
    ApiConfig, ConfigOverrides, HarnessConfigFile, ModelId, QueryGenerationHarness, TestRun,
    create_generator, default_results_path, persist, ui,
};

mod args;
mod interactive;

use args::{CliArgs, USAGE};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    ui::init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config_file = HarnessConfigFile::load()
        .with_context(|| format!("failed to read {}", querygen_harness::config_file::CONFIG_PATH))?;
    let overrides = ConfigOverrides {
        provider: args.provider.clone(),
        model: args.model.clone().map(ModelId::new),
    };
    let api_config = ApiConfig::from_env(&config_file, &overrides)?;
    log::debug!("resolved {api_config:?}");

    let generator = create_generator(&api_config)?;
    let harness = QueryGenerationHarness::new(generator);

    let count = args
        .count
        .or(config_file.default_count)
        .unwrap_or(DEFAULT_QUERY_COUNT);
    let output_dir = config_file
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    if !args.json_output {
        ui::header(harness.generator().name(), harness.generator().model().as_str());
    }

    if args.interactive {
        return interactive::run(&harness, count, &output_dir).await;
    }

    let quiet = args.json_output;
    let run = if args.vary_counts {
        let query = args.query.as_deref().unwrap_or(COUNT_VARIATION_QUERY);
        if !quiet {
            ui::section_title("TESTING DIFFERENT QUERY COUNTS");
            ui::info(format!("Using test query: {query}"));
        }
        harness
            .run_count_variation_observed(query, &COUNT_VARIATION_COUNTS, |i, result| {
                if !quiet {
                    ui::test_heading(i + 1, COUNT_VARIATION_COUNTS.len());
                    ui::display(result);
                }
            })
            .await?
    } else if let Some(query) = args.query.as_deref() {
        if !quiet {
            ui::section_title("TESTING CUSTOM QUERY");
        }
        harness
            .run_batch_observed(&[query], count, |_, result| {
                if !quiet {
                    ui::display(result);
                }
            })
            .await?
    } else {
        if !quiet {
            ui::section_title("TESTING QUERY GENERATION FUNCTIONALITY");
            ui::info(format!("Testing {} sample queries...", SAMPLE_QUERIES.len()));
        }
        harness
            .run_batch_observed(&SAMPLE_QUERIES, count, |i, result| {
                if !quiet {
                    ui::test_heading(i + 1, SAMPLE_QUERIES.len());
                    ui::display(result);
                }
            })
            .await?
    };

    if args.json_output {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else if run.len() > 1 {
        ui::summary(&run.summary());
    }

    if args.wants_persist() {
        save(&run, args.output.as_deref(), &output_dir, !quiet)?;
    }

    Ok(())
}

pub(crate) fn save(
    run: &TestRun,
    explicit: Option<&Path>,
    output_dir: &Path,
    announce: bool,
) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_results_path(output_dir, run.kind, chrono::Local::now()),
    };
    let written = persist(run, &path)?;
    if announce {
        ui::saved_to(&written);
    }
    Ok(written)
}
