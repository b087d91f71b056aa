// ABOUTME: Main library entry point for metascrape, a page metadata scraper.
// ABOUTME: Re-exports the public API: Scraper, ScraperBuilder, ScrapeConfig, MetaParser, MetaRecord, ScrapeError.

//! metascrape - fetch a web page and extract its Open Graph, Twitter Card,
//! App Links and standard meta tags into one flat record.
//!
//! # Example
//!
//! ```no_run
//! use metascrape::{ScrapeConfig, ScrapeError, Scraper};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ScrapeError> {
//!     let scraper = Scraper::new(Some(ScrapeConfig::url(
//!         "https://www.youtube.com/watch?v=oWnAvDsZKaY",
//!     )))?;
//!     let record = scraper.scrape().await?;
//!     println!("{:?}", record.get("alAndroidPackage"));
//!     Ok(())
//! }
//! ```
//!
//! Markup already in hand can skip the fetch:
//!
//! ```
//! let record = metascrape::parse_meta(r#"<meta property="og:title" content="Hi">"#);
//! assert_eq!(record.get("ogTitle"), Some("Hi"));
//! ```

pub mod client;
pub mod error;
pub mod options;
pub mod parser;
pub mod record;
pub mod resource;
pub mod target;

pub use crate::client::Scraper;
pub use crate::error::{ErrorCode, ScrapeError};
pub use crate::options::{Options, ScraperBuilder};
pub use crate::parser::{parse_meta, MetaParser};
pub use crate::record::MetaRecord;
pub use crate::resource::{FetchResult, Fetcher, HttpFetcher};
pub use crate::target::{
    is_valid_url, is_valid_url_value, normalize, Scheme, ScrapeConfig, ScrapeTarget,
};
