// src/utils/url.rs

//! Archive viewer link construction.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::{ParseError, Url};

use crate::error::{AppError, Result};

static TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,14}$").expect("valid timestamp pattern"));

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid scheme pattern"));

static PLACEHOLDER: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://localhost/").expect("valid placeholder URL"));

static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("valid slash pattern"));

/// How the captured URL is rendered after the timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlPolicy {
    /// The record's URL, unmodified
    #[default]
    Simple,
    /// Host plus percent-encoded path, `index.html` for directory paths
    PathRewrite,
}

impl std::str::FromStr for UrlPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "simple" => Ok(UrlPolicy::Simple),
            "path_rewrite" => Ok(UrlPolicy::PathRewrite),
            other => Err(AppError::config(format!("unknown url policy '{other}'"))),
        }
    }
}

/// Builds `<base><timestamp>/<target>` viewer links.
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    base: String,
    policy: UrlPolicy,
}

impl UrlNormalizer {
    pub fn new(base: impl Into<String>, policy: UrlPolicy) -> Self {
        Self {
            base: base.into(),
            policy,
        }
    }

    /// Build the viewer link for one capture.
    ///
    /// # Examples
    /// ```
    /// use cdx_filter::utils::url::{UrlNormalizer, UrlPolicy};
    ///
    /// let normalizer = UrlNormalizer::new("https://web.archive.org/web/", UrlPolicy::Simple);
    /// assert_eq!(
    ///     normalizer.normalize("http://a.com/x.jpg", "20200101").unwrap(),
    ///     "https://web.archive.org/web/20200101/http://a.com/x.jpg"
    /// );
    /// ```
    pub fn normalize(&self, url: &str, timestamp: &str) -> Result<String> {
        if !TIMESTAMP.is_match(timestamp) {
            return Err(AppError::format(format!(
                "invalid capture timestamp '{timestamp}' for {url}"
            )));
        }

        let target = match self.policy {
            UrlPolicy::Simple => url.to_string(),
            UrlPolicy::PathRewrite => rewrite_target(url),
        };

        Ok(format!("{}{}/{}", self.base, timestamp, target))
    }
}

/// Rebuild a captured URL as `host/path`, dropping scheme, credentials and port.
///
/// The path comes out percent-encoded with runs of `/` collapsed. Directory
/// paths (empty or ending in `/`) get `index.html` appended; a query string is
/// kept after it. URLs without a scheme are read as `http://`. Anything the
/// URL parser rejects (bad ports, hosts with spaces) is split by hand instead,
/// so every captured URL yields a target.
pub fn rewrite_target(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{url}")),
        other => other,
    };

    match parsed {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => compose(host, parsed.path(), parsed.query()),
            None => lenient_target(url),
        },
        Err(e) => {
            log::debug!("Splitting unparseable URL {url} by hand: {e}");
            lenient_target(url)
        }
    }
}

/// Split `url` into host, path and query without validating any of them.
fn lenient_target(url: &str) -> String {
    let rest = SCHEME.replace(url, "");
    let rest = rest.split('#').next().unwrap_or_default();
    let (authority, tail) = match rest.find(['/', '?']) {
        Some(at) => rest.split_at(at),
        None => (rest, ""),
    };
    let host = authority.rsplit('@').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    let (path, query) = match tail.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (tail, None),
    };

    let mut encoded = PLACEHOLDER.clone();
    encoded.set_path(path);
    encoded.set_query(query);
    compose(host, encoded.path(), encoded.query())
}

fn compose(host: &str, path: &str, query: Option<&str>) -> String {
    let path = REPEATED_SLASHES.replace_all(path, "/");
    let mut target = format!("{host}{path}");
    if !path.starts_with('/') {
        target.push('/');
    }
    if target.ends_with('/') {
        target.push_str("index.html");
    }
    if let Some(query) = query {
        target.push('?');
        target.push_str(query);
    }
    target
}
