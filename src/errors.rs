use thiserror::Error;

/// Failures that stop the harness before any query is issued.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("No API key for {provider}: set {env_vars} or add api_key to .querygen/config.json")]
    MissingApiKey {
        provider: String,
        env_vars: String,
    },

    #[error("Unknown provider: {0} (expected gemini or openai)")]
    UnknownProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Anything that goes wrong inside the external query-generation capability.
///
/// The harness converts these into failed results instead of propagating them.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("generator returned no queries")]
    Empty,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest includes the request URL in its message; drop it.
        GenerationError::Network(err.without_url().to_string())
    }
}

/// Harness input rejected before any external call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Requested query count {count} is outside the permitted range 1..={max}")]
    CountOutOfRange { count: u32, max: u32 },

    #[error("Inconsistent result record: {0}")]
    InconsistentResult(&'static str),
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to write results to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read results from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
