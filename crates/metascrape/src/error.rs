// ABOUTME: Error types for metascrape including the ErrorCode classification and ScrapeError enum.
// ABOUTME: Construction errors are returned synchronously; fetch errors come back from scrape futures.

use std::fmt;

use thiserror::Error;

/// Error codes representing the different categories of scrape failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MissingConfig,
    MissingHost,
    HostContainsPath,
    InvalidArgument,
    Fetch,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::MissingConfig => "missing config",
            ErrorCode::MissingHost => "missing host",
            ErrorCode::HostContainsPath => "host contains path",
            ErrorCode::InvalidArgument => "invalid argument",
            ErrorCode::Fetch => "fetch error",
        };
        write!(f, "{}", s)
    }
}

/// The error type for target normalization and scraping.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No configuration was supplied at all.
    #[error("must provide a configuration")]
    MissingConfig,

    /// Neither `host` nor `url` yielded a usable host.
    #[error("must provide a string for host or url")]
    MissingHost,

    /// The host field carried a path, query or fragment.
    #[error("host must not contain path: {0}")]
    HostContainsPath(String),

    /// A caller-supplied argument had the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport failure, non-success status, or a refused response.
    #[error("{}", fetch_message(.url, .status, .source))]
    Fetch {
        url: String,
        status: Option<u16>,
        #[source]
        source: anyhow::Error,
    },
}

fn fetch_message(url: &str, status: &Option<u16>, source: &anyhow::Error) -> String {
    match status {
        Some(code) => format!("fetch {}: HTTP status {}: {}", url, code, source),
        None => format!("fetch {}: {}", url, source),
    }
}

impl ScrapeError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ScrapeError::InvalidArgument(msg.into())
    }

    /// Create a Fetch error without an HTTP status.
    pub fn fetch(url: impl Into<String>, source: anyhow::Error) -> Self {
        ScrapeError::Fetch {
            url: url.into(),
            status: None,
            source,
        }
    }

    /// Create a Fetch error for a non-success HTTP status.
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        ScrapeError::Fetch {
            url: url.into(),
            status: Some(status),
            source: anyhow::anyhow!("non-success response"),
        }
    }

    /// The category of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ScrapeError::MissingConfig => ErrorCode::MissingConfig,
            ScrapeError::MissingHost => ErrorCode::MissingHost,
            ScrapeError::HostContainsPath(_) => ErrorCode::HostContainsPath,
            ScrapeError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            ScrapeError::Fetch { .. } => ErrorCode::Fetch,
        }
    }

    /// HTTP status of a failed fetch, if the server answered.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ScrapeError::Fetch { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code() == ErrorCode::Fetch
    }

    /// Returns true if this is an InvalidArgument error.
    pub fn is_invalid_argument(&self) -> bool {
        self.code() == ErrorCode::InvalidArgument
    }

    /// Returns true for errors raised while validating a target.
    pub fn is_construction(&self) -> bool {
        matches!(
            self.code(),
            ErrorCode::MissingConfig | ErrorCode::MissingHost | ErrorCode::HostContainsPath
        )
    }
}
