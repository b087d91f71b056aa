// ABOUTME: MetaParser walks <meta> and <link> elements of tolerant-parsed HTML into a MetaRecord.
// ABOUTME: Later duplicates overwrite earlier ones; unknown or empty tags are skipped silently.

//! Meta tag extraction.
//!
//! Key behaviors:
//! - Elements are visited in document order.
//! - `name`, then `property`, then `rel` identify an element; the first one
//!   that matches a rule in [`rules::RULES`] decides the field.
//! - `<meta>` contributes its `content`, `<link>` its `href`.
//! - The last matching element for a field wins.
//! - Malformed markup never fails; it just yields fewer fields.

pub mod rules;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::record::MetaRecord;
use rules::{lookup, normalize_key, MetaRule, TagKind};

static META_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta, link").expect("selector is valid"));

/// Stateless parser from HTML text to [`MetaRecord`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaParser;

impl MetaParser {
    pub fn new() -> Self {
        MetaParser
    }

    /// Extract the recognized metadata fields from `html`.
    pub fn parse(&self, html: &str) -> MetaRecord {
        parse_meta(html)
    }
}

/// Extract the recognized metadata fields from `html`.
pub fn parse_meta(html: &str) -> MetaRecord {
    let mut record = MetaRecord::new();
    if html.trim().is_empty() {
        return record;
    }

    let doc = Html::parse_document(html);
    for el in doc.select(&META_LINK_SELECTOR) {
        let Some(kind) = tag_kind(&el) else {
            continue;
        };
        let Some(rule) = match_rule(&el, kind) else {
            continue;
        };
        let Some(value) = el.value().attr(kind.value_attr()) else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        record.insert(rule.field, value.to_string());
    }

    tracing::trace!(fields = record.len(), "parsed meta tags");
    record
}

fn tag_kind(el: &ElementRef<'_>) -> Option<TagKind> {
    match el.value().name() {
        "meta" => Some(TagKind::Meta),
        "link" => Some(TagKind::Link),
        _ => None,
    }
}

/// First identifying attribute whose value is a known key for this kind.
fn match_rule(el: &ElementRef<'_>, kind: TagKind) -> Option<&'static MetaRule> {
    kind.key_attrs().iter().find_map(|attr| {
        let raw = el.value().attr(attr)?;
        lookup(kind, &normalize_key(raw))
    })
}
