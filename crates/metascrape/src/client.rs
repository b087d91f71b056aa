// ABOUTME: The Scraper that ties target normalization, the injected Fetcher and the meta parser together.
// ABOUTME: scrape() performs one GET against the target and parses the body into a MetaRecord.

use std::fmt;
use std::sync::Arc;

use crate::error::ScrapeError;
use crate::options::{Options, ScraperBuilder};
use crate::parser::MetaParser;
use crate::record::MetaRecord;
use crate::resource::{Fetcher, HttpFetcher};
use crate::target::{self, ScrapeConfig, ScrapeTarget};

/// Fetches one page and extracts its metadata.
///
/// The target is validated once at construction and never changes. A
/// Scraper holds no per-call state, so clones can scrape concurrently.
#[derive(Clone)]
pub struct Scraper {
    target: ScrapeTarget,
    opts: Options,
    fetcher: Arc<dyn Fetcher>,
    meta_parser: MetaParser,
}

impl fmt::Debug for Scraper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scraper")
            .field("target", &self.target)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl Scraper {
    /// Create a new ScraperBuilder for configuring the scraper.
    pub fn builder() -> ScraperBuilder {
        ScraperBuilder::new()
    }

    /// Create a Scraper with default options and the HTTP fetcher.
    ///
    /// `None` fails with [`ScrapeError::MissingConfig`].
    pub fn new(config: Option<ScrapeConfig>) -> Result<Self, ScrapeError> {
        Self::from_parts(config.as_ref(), Options::default(), None)
    }

    pub(crate) fn from_parts(
        config: Option<&ScrapeConfig>,
        opts: Options,
        fetcher: Option<Arc<dyn Fetcher>>,
    ) -> Result<Self, ScrapeError> {
        let target = target::normalize(config)?;
        let fetcher = match fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::from_options(&opts)?),
        };
        Ok(Self {
            target,
            opts,
            fetcher,
            meta_parser: MetaParser::new(),
        })
    }

    /// The scheme-free host of the configured target.
    pub fn host(&self) -> &str {
        self.target.host()
    }

    pub fn target(&self) -> &ScrapeTarget {
        &self.target
    }

    /// The absolute URL `scrape()` fetches.
    pub fn url(&self) -> String {
        self.target.url()
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn meta_parser(&self) -> &MetaParser {
        &self.meta_parser
    }

    /// Syntactic URL check, see [`target::is_valid_url`].
    pub fn is_valid_url(&self, candidate: &str) -> bool {
        target::is_valid_url(candidate)
    }

    /// Fetch the configured target and extract its metadata.
    pub async fn scrape(&self) -> Result<MetaRecord, ScrapeError> {
        self.scrape_url(&self.target.url()).await
    }

    /// Fetch a different target with this scraper's fetcher.
    ///
    /// The override is validated like a constructor config; its errors are
    /// returned rather than affecting this instance.
    pub async fn scrape_target(&self, config: &ScrapeConfig) -> Result<MetaRecord, ScrapeError> {
        let target = target::normalize(Some(config))?;
        self.scrape_url(&target.url()).await
    }

    /// Extract metadata from markup already in hand.
    pub fn parse_html(&self, html: &str) -> MetaRecord {
        self.meta_parser.parse(html)
    }

    async fn scrape_url(&self, url: &str) -> Result<MetaRecord, ScrapeError> {
        let fetched = match self.fetcher.get(url).await {
            Ok(fetched) => fetched,
            Err(err) => {
                tracing::warn!(url, error = %err, "scrape fetch failed");
                return Err(err);
            }
        };
        let record = self.meta_parser.parse(&fetched.text());
        tracing::debug!(url, fields = record.len(), "scraped page");
        Ok(record)
    }
}
