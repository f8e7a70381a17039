use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH: &str = ".querygen/config.json";

/// Per-provider configuration settings
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Model name/ID (overrides the built-in default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Used only when no key is present in the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API root, e.g. a proxy or a compatible gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Harness configuration file schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfigFile {
    /// Active provider (overrides auto-detection from available keys)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini: Option<ProviderSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<ProviderSettings>,

    /// Default settings applied to all providers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<ProviderSettings>,

    /// Requested count when `-n` is not given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_count: Option<u32>,

    /// Directory for saved result files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl HarnessConfigFile {
    /// Load config from `.querygen/config.json`
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn get_provider_settings(&self, provider_name: &str) -> Option<&ProviderSettings> {
        match provider_name {
            "gemini" => self.gemini.as_ref(),
            "openai" => self.openai.as_ref(),
            _ => None,
        }
    }

    /// Merge provider-specific settings with defaults
    pub fn merged_settings(&self, provider_name: &str) -> ProviderSettings {
        let mut merged = self.defaults.clone().unwrap_or_default();

        if let Some(provider_settings) = self.get_provider_settings(provider_name) {
            if let Some(model) = &provider_settings.model {
                merged.model = Some(model.clone());
            }
            if let Some(api_key) = &provider_settings.api_key {
                merged.api_key = Some(api_key.clone());
            }
            if let Some(base_url) = &provider_settings.base_url {
                merged.base_url = Some(base_url.clone());
            }
            if let Some(timeout_secs) = provider_settings.timeout_secs {
                merged.timeout_secs = Some(timeout_secs);
            }
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_settings_override_defaults() {
        let config = HarnessConfigFile {
            provider: Some("gemini".to_string()),
            defaults: Some(ProviderSettings {
                timeout_secs: Some(30),
                model: Some("default-model".to_string()),
                ..Default::default()
            }),
            gemini: Some(ProviderSettings {
                model: Some("gemini-2.5-flash".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = config.merged_settings("gemini");
        assert_eq!(merged.model, Some("gemini-2.5-flash".to_string()));
        assert_eq!(merged.timeout_secs, Some(30));

        let other = config.merged_settings("openai");
        assert_eq!(other.model, Some("default-model".to_string()));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = HarnessConfigFile::load_from(&dir.path().join("nope.json")).unwrap();
        assert!(config.provider.is_none());
        assert!(config.default_count.is_none());
    }

    #[test]
    fn parses_file_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "provider": "openai",
                "openai": { "model": "gpt-4.1-mini", "base_url": "http://localhost:9000" },
                "default_count": 4,
                "output_dir": "results"
            }"#,
        )
        .unwrap();

        let config = HarnessConfigFile::load_from(&path).unwrap();
        assert_eq!(config.provider.as_deref(), Some("openai"));
        assert_eq!(config.default_count, Some(4));
        assert_eq!(config.output_dir, Some(PathBuf::from("results")));
        let merged = config.merged_settings("openai");
        assert_eq!(merged.base_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(HarnessConfigFile::load_from(&path).is_err());
    }

    #[test]
    fn debug_hides_api_key() {
        let settings = ProviderSettings {
            api_key: Some("AIzaSySecretSecretSecret".to_string()),
            ..Default::default()
        };
        let out = format!("{settings:?}");
        assert!(!out.contains("AIzaSySecret"));
    }
}
