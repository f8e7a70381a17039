use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::PersistError;
use crate::result::{RunKind, TestRun};

/// `<dir>/query_generation_test_results_YYYYMMDD_HHMMSS.json`, or the
/// `query_count_test_results_` prefix for count sweeps.
pub fn default_results_path(dir: &Path, kind: RunKind, now: DateTime<Local>) -> PathBuf {
    let prefix = match kind {
        RunKind::CountVariation => "query_count_test_results",
        RunKind::Single | RunKind::SampleBatch => "query_generation_test_results",
    };
    dir.join(format!("{prefix}_{}.json", now.format("%Y%m%d_%H%M%S")))
}

/// Write the whole run as pretty JSON, creating parent directories.
pub fn persist(run: &TestRun, destination: &Path) -> Result<PathBuf, PersistError> {
    let io_err = |source| PersistError::Io {
        path: destination.display().to_string(),
        source,
    };

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let content = serde_json::to_string_pretty(run)?;
    fs::write(destination, content).map_err(io_err)?;
    log::info!(
        "saved {} results to {}",
        run.results.len(),
        destination.display()
    );
    Ok(destination.to_path_buf())
}

pub fn load_run(path: &Path) -> Result<TestRun, PersistError> {
    let content = fs::read_to_string(path).map_err(|source| PersistError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
