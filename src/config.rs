use std::fmt;

use crate::config_file::HarnessConfigFile;
use crate::errors::SetupError;
use crate::types::ModelId;

pub const MAX_QUERY_COUNT: u32 = 5;
pub const DEFAULT_QUERY_COUNT: u32 = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_OUTPUT_DIR: &str = ".";

pub const PROVIDER_ENV: &str = "QUERYGEN_PROVIDER";
pub const MODEL_ENV: &str = "QUERYGEN_MODEL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn parse(name: &str) -> Result<Self, SetupError> {
        match name.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => Err(SetupError::UnknownProvider(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Environment variables checked for the key, in priority order.
    pub fn key_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            Self::OpenAi => &["OPENAI_API_KEY"],
        }
    }

    pub fn default_model(&self) -> ModelId {
        match self {
            Self::Gemini => ModelId::gemini_flash(),
            Self::OpenAi => ModelId::gpt_4o_mini(),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values given on the command line; they beat both environment and config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub provider: Option<String>,
    pub model: Option<ModelId>,
}

/// Everything a generator needs, resolved once at startup.
#[derive(Clone)]
pub struct ApiConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: ModelId,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("provider", &self.provider)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ApiConfig {
    /// Resolve from the process environment (after loading `.env`) and the config file.
    pub fn from_env(
        config_file: &HarnessConfigFile,
        overrides: &ConfigOverrides,
    ) -> Result<Self, SetupError> {
        let _ = dotenvy::dotenv();
        Self::resolve(|key| std::env::var(key).ok(), config_file, overrides)
    }

    /// Resolution order for every value: override, environment, config file, built-in default.
    pub fn resolve<F>(
        lookup: F,
        config_file: &HarnessConfigFile,
        overrides: &ConfigOverrides,
    ) -> Result<Self, SetupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup_nonblank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match overrides
            .provider
            .clone()
            .or_else(|| lookup_nonblank(PROVIDER_ENV))
            .or_else(|| config_file.provider.clone())
        {
            Some(name) => ProviderKind::parse(&name)?,
            None => detect_provider(&lookup_nonblank),
        };

        let settings = config_file.merged_settings(provider.name());

        let api_key = provider
            .key_env_vars()
            .iter()
            .find_map(|var| lookup_nonblank(*var))
            .or_else(|| settings.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| SetupError::MissingApiKey {
                provider: provider.name().to_string(),
                env_vars: provider.key_env_vars().join(" or "),
            })?;

        let model = overrides
            .model
            .clone()
            .or_else(|| lookup_nonblank(MODEL_ENV).map(ModelId::new))
            .or_else(|| settings.model.clone().map(ModelId::new))
            .unwrap_or_else(|| provider.default_model());

        let timeout_secs = settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(SetupError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            provider,
            api_key: api_key.trim().to_string(),
            model,
            base_url: settings.base_url,
            timeout_secs,
        })
    }
}

/// Gemini unless only an OpenAI key is available.
fn detect_provider(lookup: &impl Fn(&str) -> Option<String>) -> ProviderKind {
    let has_key = |kind: ProviderKind| kind.key_env_vars().iter().any(|v| lookup(*v).is_some());
    if !has_key(ProviderKind::Gemini) && has_key(ProviderKind::OpenAi) {
        ProviderKind::OpenAi
    } else {
        ProviderKind::Gemini
    }
}
