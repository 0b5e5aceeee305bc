use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Error creating request for {url}: {source}")]
    RequestConstruction {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Received non-200 status code for {url}: {status}")]
    NonSuccessStatus { url: String, status: u16 },

    #[error("Error reading body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl ScanError {
    /// Whether this error belongs to a single crawl task rather than the whole run.
    pub fn is_task_local(&self) -> bool {
        matches!(
            self,
            ScanError::RequestConstruction { .. }
                | ScanError::Network { .. }
                | ScanError::NonSuccessStatus { .. }
                | ScanError::BodyRead { .. }
                | ScanError::ParseError(_)
                | ScanError::InvalidUrl(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
