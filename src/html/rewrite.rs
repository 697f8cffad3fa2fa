//! Relative link rewriting for served text content
//!
//! Pages inside an EPUB reference their neighbours with paths like
//! `../Images/cover.jpg`. Once the book is browsed over HTTP those paths no
//! longer line up with the archive's layout, so every `src="../…"` and
//! `href="../…"` is turned into an absolute URL on the serving host.
//!
//! Only the exact double-quoted form is touched; everything else in the
//! content is passed through byte for byte.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;
use url::Url;

use super::listing::encode_path;

static RELATIVE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(src|href)="(\.\./[^"]+)""#).unwrap());

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBase {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Where the rewritten content is being served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteBase {
    /// Content inside an archive. Leading `../` segments are dropped and the
    /// remainder is resolved against `http://{host}/{archive_path}/`.
    Archive { host: String, archive_path: String },
    /// Content on disk, resolved against the URL of the document itself
    Plain { host: String, request_path: String },
}

impl RewriteBase {
    pub fn archive(host: impl Into<String>, archive_path: impl Into<String>) -> Self {
        RewriteBase::Archive {
            host: host.into(),
            archive_path: archive_path.into(),
        }
    }

    pub fn plain(host: impl Into<String>, request_path: impl Into<String>) -> Self {
        RewriteBase::Plain {
            host: host.into(),
            request_path: request_path.into(),
        }
    }

    /// Absolute URL references are joined against
    pub fn base_url(&self) -> Result<Url, RewriteError> {
        let raw = match self {
            RewriteBase::Archive { host, archive_path } => format!(
                "http://{}/{}/",
                host,
                encode_path(archive_path.trim_matches('/'))
            ),
            RewriteBase::Plain { host, request_path } => format!(
                "http://{}/{}",
                host,
                encode_path(request_path.trim_start_matches('/'))
            ),
        };

        Url::parse(&raw).map_err(|source| RewriteError::InvalidBase { url: raw, source })
    }

    fn strips_traversal(&self) -> bool {
        matches!(self, RewriteBase::Archive { .. })
    }
}

/// Rewrite `src="../…"` and `href="../…"` references into absolute URLs
///
/// Works line by line, so a match never spans a line break. Running it on
/// its own output changes nothing.
pub fn rewrite_links(content: &str, base: &RewriteBase) -> Result<String, RewriteError> {
    let base_url = base.base_url()?;
    let strip = base.strips_traversal();

    let mut output = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        let rewritten = RELATIVE_REFERENCE.replace_all(line, |caps: &Captures| {
            let attribute = &caps[1];
            let mut reference = &caps[2];

            if strip {
                while let Some(rest) = reference.strip_prefix("../") {
                    reference = rest;
                }
            }

            match base_url.join(reference) {
                Ok(url) => format!("{}=\"{}\"", attribute, url),
                Err(_) => caps[0].to_string(),
            }
        });
        output.push_str(&rewritten);
    }

    Ok(output)
}

/// Lossy UTF-8 decode, rewrite, re-encode
pub fn rewrite_bytes(data: &[u8], base: &RewriteBase) -> Result<Vec<u8>, RewriteError> {
    let text = String::from_utf8_lossy(data);
    rewrite_links(&text, base).map(String::into_bytes)
}
