//! `config_url` indirection.
//!
//! A merged document may point at a remote document through a top-level
//! `config_url` string. The remote document is fetched, parsed, and replaces
//! the local tree wholesale. Only one hop is followed: a `config_url` inside the
//! fetched document is kept as plain data.
//!
//! Transport goes through the [`Fetcher`] trait so tests and embedders can plug
//! in anything that turns a URL into bytes. [`HttpFetcher`] is the default,
//! available with the `remote` feature.

use crate::diag::{scan_info, scan_warn};
use crate::document::{ParsedDocument, parse_document};
use crate::error::KConfigError;
use crate::types::ConfigTree;

/// Top-level key naming a remote document.
pub const CONFIG_URL_KEY: &str = "config_url";

/// Anything that can fetch the body behind a URL.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, KConfigError>;
}

/// Blocking HTTP(S) fetcher. Non-2xx responses are errors.
#[cfg(feature = "remote")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: std::time::Duration,
}

#[cfg(feature = "remote")]
impl HttpFetcher {
    pub fn new(timeout: std::time::Duration) -> Self {
        Self { timeout }
    }
}

#[cfg(feature = "remote")]
impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, KConfigError> {
        let fail = |reason: String| KConfigError::RemoteFetch {
            url: url.to_string(),
            reason,
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| fail(format!("failed to build HTTP client: {e}")))?;
        let response = client
            .get(url)
            .send()
            .map_err(|e| fail(e.to_string()))?
            .error_for_status()
            .map_err(|e| fail(e.to_string()))?;
        let body = response.bytes().map_err(|e| fail(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// The `config_url` of a tree, if it is a non-empty string.
pub fn config_url(tree: &ConfigTree) -> Option<&str> {
    tree.get(CONFIG_URL_KEY)?
        .as_str()
        .map(str::trim)
        .filter(|url| !url.is_empty())
}

/// Expand `config_url` in `doc`, if present.
///
/// On success the fetched tree replaces `doc.tree`; the fetched header wins
/// when there is one. On failure the local document is returned unchanged,
/// unless `strict` is set.
pub fn resolve_remote(
    doc: ParsedDocument,
    fetcher: Option<&dyn Fetcher>,
    strict: bool,
    quiet: bool,
    recognized: &[&str],
) -> Result<ParsedDocument, KConfigError> {
    let Some(url) = config_url(&doc.tree).map(str::to_string) else {
        return Ok(doc);
    };

    match fetch_document(&url, fetcher, recognized) {
        Ok(fetched) => {
            scan_info!(quiet, url = %url, "resolved config_url");
            Ok(ParsedDocument {
                header: fetched.header.or(doc.header),
                tree: fetched.tree,
            })
        }
        Err(e) if strict => Err(e),
        Err(e) => {
            scan_warn!(quiet, url = %url, error = %e, "config_url not resolved, keeping local config");
            Ok(doc)
        }
    }
}

fn fetch_document(
    url: &str,
    fetcher: Option<&dyn Fetcher>,
    recognized: &[&str],
) -> Result<ParsedDocument, KConfigError> {
    let fetcher = fetcher.ok_or_else(|| KConfigError::RemoteFetch {
        url: url.to_string(),
        reason: "no fetcher available".into(),
    })?;
    let bytes = fetcher.fetch(url)?;
    let text = String::from_utf8(bytes).map_err(|e| KConfigError::RemoteFetch {
        url: url.to_string(),
        reason: format!("body is not UTF-8: {e}"),
    })?;
    parse_document(&text, recognized).map_err(|e| KConfigError::RemoteParse {
        url: url.to_string(),
        source: e,
    })
}
