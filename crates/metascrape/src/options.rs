// ABOUTME: Configuration options for metascrape and the ScraperBuilder fluent API.
// ABOUTME: The builder collects the target config, HTTP options and an optional custom Fetcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::client::Scraper;
use crate::error::ScrapeError;
use crate::resource::Fetcher;
use crate::target::ScrapeConfig;

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("metascrape/", env!("CARGO_PKG_VERSION"));

/// HTTP options for the default fetcher.
#[derive(Debug, Clone)]
pub struct Options {
    pub user_agent: String,
    /// Per-request timeout. `None` leaves latency bounds to the caller.
    pub timeout: Option<Duration>,
    pub allow_private_networks: bool,
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::Client>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            allow_private_networks: true,
            headers: HashMap::new(),
            http_client: None,
        }
    }
}

/// Builder for constructing [`Scraper`] instances.
///
/// `build()` fails with [`ScrapeError::MissingConfig`] when no target was
/// supplied through `config`, `host`, `path` or `url`.
#[derive(Clone, Default)]
pub struct ScraperBuilder {
    config: Option<ScrapeConfig>,
    opts: Options,
    fetcher: Option<Arc<dyn Fetcher>>,
}

impl ScraperBuilder {
    /// Create a new ScraperBuilder with default options and no target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the whole target configuration.
    pub fn config(mut self, config: ScrapeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the target host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.get_or_insert_with(ScrapeConfig::default).host = Some(host.into());
        self
    }

    /// Set the target path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.get_or_insert_with(ScrapeConfig::default).path = Some(path.into());
        self
    }

    /// Set the target as a full URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.get_or_insert_with(ScrapeConfig::default).url = Some(url.into());
        self
    }

    /// Replace all HTTP options.
    pub fn options(mut self, opts: Options) -> Self {
        self.opts = opts;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set a per-request timeout on the default fetcher.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = Some(timeout);
        self
    }

    /// Allow or refuse requests to private and loopback networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom reqwest client for the default fetcher.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Replace the HTTP fetcher entirely.
    pub fn fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    /// Validate the target and build the Scraper.
    pub fn build(self) -> Result<Scraper, ScrapeError> {
        Scraper::from_parts(self.config.as_ref(), self.opts, self.fetcher)
    }
}
