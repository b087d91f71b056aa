// ABOUTME: The fixed table of recognized meta/link keys and the record field each one fills.
// ABOUTME: Field names follow a camel-case flattening of the source key (al:android:package -> alAndroidPackage).

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Which element a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// `<meta>`, keyed by `name` or `property`, value in `content`.
    Meta,
    /// `<link>`, keyed by `rel`, value in `href`.
    Link,
}

impl TagKind {
    /// Identifying attributes in the order they are consulted.
    pub fn key_attrs(&self) -> &'static [&'static str] {
        match self {
            TagKind::Meta => &["name", "property"],
            TagKind::Link => &["rel"],
        }
    }

    pub fn value_attr(&self) -> &'static str {
        match self {
            TagKind::Meta => "content",
            TagKind::Link => "href",
        }
    }
}

/// One recognized `(element, key) -> field` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaRule {
    pub kind: TagKind,
    pub key: &'static str,
    pub field: &'static str,
}

const fn meta(key: &'static str, field: &'static str) -> MetaRule {
    MetaRule {
        kind: TagKind::Meta,
        key,
        field,
    }
}

const fn link(key: &'static str, field: &'static str) -> MetaRule {
    MetaRule {
        kind: TagKind::Link,
        key,
        field,
    }
}

pub static RULES: &[MetaRule] = &[
    // Open Graph
    meta("og:title", "ogTitle"),
    meta("og:type", "ogType"),
    meta("og:url", "ogUrl"),
    meta("og:image", "ogImage"),
    meta("og:image:url", "ogImageUrl"),
    meta("og:image:secure_url", "ogImageSecureUrl"),
    meta("og:image:type", "ogImageType"),
    meta("og:image:width", "ogImageWidth"),
    meta("og:image:height", "ogImageHeight"),
    meta("og:image:alt", "ogImageAlt"),
    meta("og:description", "ogDescription"),
    meta("og:site_name", "ogSiteName"),
    meta("og:locale", "ogLocale"),
    meta("og:locale:alternate", "ogLocaleAlternate"),
    meta("og:determiner", "ogDeterminer"),
    meta("og:audio", "ogAudio"),
    meta("og:audio:secure_url", "ogAudioSecureUrl"),
    meta("og:audio:type", "ogAudioType"),
    meta("og:video", "ogVideo"),
    meta("og:video:url", "ogVideoUrl"),
    meta("og:video:secure_url", "ogVideoSecureUrl"),
    meta("og:video:type", "ogVideoType"),
    meta("og:video:width", "ogVideoWidth"),
    meta("og:video:height", "ogVideoHeight"),
    meta("og:video:tag", "ogVideoTag"),
    meta("article:published_time", "articlePublishedTime"),
    meta("article:modified_time", "articleModifiedTime"),
    meta("article:author", "articleAuthor"),
    meta("article:section", "articleSection"),
    meta("article:tag", "articleTag"),
    meta("fb:app_id", "fbAppId"),
    // Twitter Card
    meta("twitter:card", "twitterCard"),
    meta("twitter:site", "twitterSite"),
    meta("twitter:site:id", "twitterSiteId"),
    meta("twitter:creator", "twitterCreator"),
    meta("twitter:creator:id", "twitterCreatorId"),
    meta("twitter:url", "twitterUrl"),
    meta("twitter:title", "twitterTitle"),
    meta("twitter:description", "twitterDescription"),
    meta("twitter:image", "twitterImage"),
    meta("twitter:image:src", "twitterImageSrc"),
    meta("twitter:image:alt", "twitterImageAlt"),
    meta("twitter:player", "twitterPlayer"),
    meta("twitter:player:width", "twitterPlayerWidth"),
    meta("twitter:player:height", "twitterPlayerHeight"),
    meta("twitter:player:stream", "twitterPlayerStream"),
    meta("twitter:app:name:iphone", "twitterAppNameIphone"),
    meta("twitter:app:id:iphone", "twitterAppIdIphone"),
    meta("twitter:app:url:iphone", "twitterAppUrlIphone"),
    meta("twitter:app:name:ipad", "twitterAppNameIpad"),
    meta("twitter:app:id:ipad", "twitterAppIdIpad"),
    meta("twitter:app:url:ipad", "twitterAppUrlIpad"),
    meta("twitter:app:name:googleplay", "twitterAppNameGoogleplay"),
    meta("twitter:app:id:googleplay", "twitterAppIdGoogleplay"),
    meta("twitter:app:url:googleplay", "twitterAppUrlGoogleplay"),
    meta("twitter:app:country", "twitterAppCountry"),
    // App Links
    meta("al:ios:url", "alIosUrl"),
    meta("al:ios:app_store_id", "alIosAppStoreId"),
    meta("al:ios:app_name", "alIosAppName"),
    meta("al:iphone:url", "alIphoneUrl"),
    meta("al:iphone:app_store_id", "alIphoneAppStoreId"),
    meta("al:iphone:app_name", "alIphoneAppName"),
    meta("al:ipad:url", "alIpadUrl"),
    meta("al:ipad:app_store_id", "alIpadAppStoreId"),
    meta("al:ipad:app_name", "alIpadAppName"),
    meta("al:android:url", "alAndroidUrl"),
    meta("al:android:package", "alAndroidPackage"),
    meta("al:android:class", "alAndroidClass"),
    meta("al:android:app_name", "alAndroidAppName"),
    meta("al:windows_phone:url", "alWindowsPhoneUrl"),
    meta("al:windows_phone:app_id", "alWindowsPhoneAppId"),
    meta("al:windows_phone:app_name", "alWindowsPhoneAppName"),
    meta("al:windows:url", "alWindowsUrl"),
    meta("al:windows:app_id", "alWindowsAppId"),
    meta("al:windows:app_name", "alWindowsAppName"),
    meta("al:windows_universal:url", "alWindowsUniversalUrl"),
    meta("al:windows_universal:app_id", "alWindowsUniversalAppId"),
    meta("al:windows_universal:app_name", "alWindowsUniversalAppName"),
    meta("al:web:url", "alWebUrl"),
    meta("al:web:should_fallback", "alWebShouldFallback"),
    // Standard meta
    meta("description", "description"),
    meta("keywords", "keywords"),
    meta("author", "author"),
    meta("title", "title"),
    meta("robots", "robots"),
    meta("viewport", "viewport"),
    meta("theme-color", "themeColor"),
    meta("application-name", "applicationName"),
    meta("generator", "generator"),
    meta("referrer", "referrer"),
    // Links
    link("canonical", "canonical"),
    link("icon", "icon"),
    link("shortcut icon", "shortcutIcon"),
    link("apple-touch-icon", "appleTouchIcon"),
    link("manifest", "manifest"),
    link("amphtml", "amphtml"),
    link("image_src", "imageSrc"),
];

static INDEX: Lazy<HashMap<TagKind, HashMap<&'static str, &'static MetaRule>>> = Lazy::new(|| {
    let mut index: HashMap<TagKind, HashMap<&'static str, &'static MetaRule>> = HashMap::new();
    for rule in RULES {
        index.entry(rule.kind).or_default().insert(rule.key, rule);
    }
    index
});

/// Canonical form of an attribute value used as a rule key:
/// trimmed, lowercased, inner whitespace collapsed.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up the rule for an already-normalized key.
pub fn lookup(kind: TagKind, key: &str) -> Option<&'static MetaRule> {
    INDEX.get(&kind)?.get(key).copied()
}

/// Flatten a source key into its record field name.
///
/// Splits on `:`, `_`, `-`, `.` and whitespace, then camel-cases the parts.
pub fn field_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let parts = key
        .split(|c: char| matches!(c, ':' | '_' | '-' | '.') || c.is_whitespace())
        .filter(|p| !p.is_empty());
    for (i, part) in parts.enumerate() {
        let lower = part.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
