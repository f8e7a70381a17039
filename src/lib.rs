pub mod api;
pub mod config;
pub mod config_file;
pub mod errors;
pub mod harness;
pub mod persist;
pub mod providers;
pub mod result;
pub mod sanitize;
pub mod types;
pub mod ui;

pub use crate::api::{GenerationContext, GenerationRequest, Message};
pub use crate::config::{ApiConfig, ConfigOverrides, ProviderKind};
pub use crate::config_file::HarnessConfigFile;
pub use crate::errors::{GenerationError, PersistError, SetupError, ValidationError};
pub use crate::harness::{HarnessSettings, QueryGenerationHarness};
pub use crate::persist::{default_results_path, load_run, persist};
pub use crate::providers::{QueryGenerator, create_generator};
pub use crate::result::{GenerationResult, RunKind, RunSummary, TestRun};
pub use crate::types::{ModelId, TestQuery};
