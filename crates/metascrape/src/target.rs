// ABOUTME: Target normalization: turns host/path or url input into an immutable ScrapeTarget.
// ABOUTME: Also provides the syntactic is_valid_url filter used before fetching.

//! Target normalization.
//!
//! Callers describe the page to scrape either as a `host` plus optional
//! `path`, or as a single `url`. [`normalize`] validates that input and
//! produces a [`ScrapeTarget`] whose host never carries a scheme, path,
//! query or fragment.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ScrapeError;

/// URL scheme used for the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied description of the page to scrape.
///
/// Either `url` or `host` (with an optional `path`) must be set, not both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ScrapeConfig {
    /// Config for a bare host.
    pub fn host(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Default::default()
        }
    }

    /// Config for a host and a path.
    pub fn host_path(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            path: Some(path.into()),
            url: None,
        }
    }

    /// Config for a full URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

/// A normalized, immutable fetch target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTarget {
    scheme: Scheme,
    host: String,
    path: Option<String>,
}

impl ScrapeTarget {
    /// The scheme-free host, possibly with a port.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The absolute URL to fetch: scheme, host, then path.
    pub fn url(&self) -> String {
        format!(
            "{}://{}{}",
            self.scheme,
            self.host,
            self.path.as_deref().unwrap_or("")
        )
    }

    /// Same target with a different scheme.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }
}

impl fmt::Display for ScrapeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

impl TryFrom<&ScrapeConfig> for ScrapeTarget {
    type Error = ScrapeError;

    fn try_from(config: &ScrapeConfig) -> Result<Self, Self::Error> {
        normalize(Some(config))
    }
}

/// Validate and canonicalize caller input into a [`ScrapeTarget`].
///
/// Explicit `http://` in the input selects the http scheme; otherwise https
/// is used. The scheme prefix is always removed from the stored host.
pub fn normalize(config: Option<&ScrapeConfig>) -> Result<ScrapeTarget, ScrapeError> {
    let config = config.ok_or(ScrapeError::MissingConfig)?;

    let target = match (config.url.as_deref(), config.host.as_deref()) {
        (Some(_), Some(_)) => {
            return Err(ScrapeError::invalid_argument(
                "provide either host or url, not both",
            ))
        }
        (Some(url), None) => from_url(url)?,
        (None, Some(host)) => from_host(host, config.path.as_deref())?,
        (None, None) => return Err(ScrapeError::MissingHost),
    };

    tracing::debug!(host = %target.host, url = %target.url(), "normalized scrape target");
    Ok(target)
}

fn from_url(url: &str) -> Result<ScrapeTarget, ScrapeError> {
    let (scheme, rest) = strip_scheme(url.trim());
    let split = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (host, path) = rest.split_at(split);
    if host.is_empty() {
        return Err(ScrapeError::MissingHost);
    }
    Ok(ScrapeTarget {
        scheme: scheme.unwrap_or_default(),
        host: host.to_string(),
        path: normalize_path(path),
    })
}

fn from_host(host: &str, path: Option<&str>) -> Result<ScrapeTarget, ScrapeError> {
    let (scheme, host) = strip_scheme(host.trim());
    if host.is_empty() {
        return Err(ScrapeError::MissingHost);
    }
    if host.contains(['/', '?', '#']) {
        return Err(ScrapeError::HostContainsPath(host.to_string()));
    }
    Ok(ScrapeTarget {
        scheme: scheme.unwrap_or_default(),
        host: host.to_string(),
        path: path.and_then(normalize_path),
    })
}

/// Remove a leading `http://` or `https://`, matched case-insensitively.
fn strip_scheme(value: &str) -> (Option<Scheme>, &str) {
    for (prefix, scheme) in [("https://", Scheme::Https), ("http://", Scheme::Http)] {
        if value.len() >= prefix.len()
            && value.is_char_boundary(prefix.len())
            && value[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            return (Some(scheme), &value[prefix.len()..]);
        }
    }
    (None, value)
}

fn normalize_path(path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        None
    } else if path.starts_with('/') || path.starts_with('?') {
        Some(path.to_string())
    } else {
        Some(format!("/{}", path))
    }
}

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:https?://)?",
        r"(?:(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z][a-z0-9-]*[a-z0-9]",
        r"|(?P<ip>[0-9]{1,3}(?:\.[0-9]{1,3}){3})",
        r"|localhost)",
        r"(?::[0-9]{1,5})?",
        r"(?:[/?#]\S*)?$",
    ))
    .expect("URL pattern is valid")
});

/// Syntactic sanity check for a URL-like string. Performs no network access.
///
/// Accepts http/https URLs, bare domains such as `www.example.com`, and
/// dotted-quad IPv4 addresses optionally followed by a port and path.
pub fn is_valid_url(candidate: &str) -> bool {
    let Some(caps) = URL_RE.captures(candidate.trim()) else {
        return false;
    };
    match caps.name("ip") {
        Some(ip) => ip.as_str().split('.').all(|octet| octet.parse::<u8>().is_ok()),
        None => true,
    }
}

/// [`is_valid_url`] for dynamically typed input, rejecting non-strings.
pub fn is_valid_url_value(candidate: &serde_json::Value) -> Result<bool, ScrapeError> {
    match candidate {
        serde_json::Value::String(s) => Ok(is_valid_url(s)),
        _ => Err(ScrapeError::invalid_argument("string value must be provided")),
    }
}
