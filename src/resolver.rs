use crate::error::{GrabError, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

/// Schemes whose references are already absolute and pass through untouched
static ABSOLUTE_SCHEME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?|ftp|file|data):").expect("Absolute scheme pattern should be valid")
});

/// A validated absolute http(s) URL that relative references are resolved against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    url: Url,
}

impl BaseUrl {
    /// Parse and validate a base URL.
    ///
    /// Anything that is not an absolute `http`/`https` URL with a host is
    /// rejected with [`GrabError::InvalidArgument`].
    pub fn parse(input: &str) -> Result<Self> {
        let url = Url::parse(input.trim()).map_err(|e| {
            GrabError::InvalidArgument(format!("{:?} is not an absolute URL: {}", input, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(GrabError::InvalidArgument(format!(
                "{:?} must use http or https, not {}",
                input,
                url.scheme()
            )));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(GrabError::InvalidArgument(format!(
                "{:?} has no host",
                input
            )));
        }

        Ok(Self { url })
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host with any explicit, non-default port appended
    pub fn authority(&self) -> String {
        let host = self.url.host_str().unwrap_or_default().trim_end_matches('/');
        match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Non-empty segments of the directory that contains the document,
    /// i.e. everything before the last `/` of the path.
    pub fn directory_segments(&self) -> Vec<&str> {
        let path = self.url.path();
        let dir = match path.rfind('/') {
            Some(idx) => &path[..idx],
            None => "",
        };
        dir.split('/').filter(|s| !s.is_empty()).collect()
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// A raw reference paired with the base it is resolved against
#[derive(Debug, Clone, Copy)]
pub struct ResolvedReference<'a> {
    pub base: &'a BaseUrl,
    pub raw: &'a str,
}

impl<'a> ResolvedReference<'a> {
    pub fn new(base: &'a BaseUrl, raw: &'a str) -> Self {
        Self { base, raw }
    }

    /// The fully-qualified URL for this reference
    pub fn absolute_url(&self) -> String {
        resolve(self.base, self.raw)
    }
}

/// Resolves a raw reference found in markup into an absolute URL.
///
/// The rules are tried in order and the first match wins:
///
/// 1. references with a known scheme (`http:`, `https:`, `ftp:`, `file:`, `data:`)
///    are returned unchanged
/// 2. `//host/path` inherits the base scheme (see [`needs_www_label`])
/// 3. `/path` is appended to the base scheme and host
/// 4. leading `../` segments pop directories off the base document's directory,
///    clamping at the host root
/// 5. a leading `./` is stripped, then
/// 6. the reference is appended to the base document's directory
///
/// The prefixes overlap (`//` also starts with `/`), so the order matters.
pub fn resolve(base: &BaseUrl, reference: &str) -> String {
    if ABSOLUTE_SCHEME.is_match(reference) {
        return reference.to_string();
    }

    if let Some(rest) = reference.strip_prefix("//") {
        return resolve_protocol_relative(base, rest);
    }

    if reference.starts_with('/') {
        return format!("{}://{}{}", base.scheme(), base.authority(), reference);
    }

    if reference.starts_with("../") {
        return resolve_parent_relative(base, reference);
    }

    let reference = reference.strip_prefix("./").unwrap_or(reference);
    let segments = base.directory_segments();
    join_under_root(base, &segments, reference)
}

fn resolve_protocol_relative(base: &BaseUrl, rest: &str) -> String {
    let rest = rest.trim_start_matches('/');
    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let hostname = rest[..host_end].split(':').next().unwrap_or_default();

    if needs_www_label(hostname) {
        ::log::trace!("Injecting www. into protocol-relative host {}", hostname);
        format!("{}://www.{}", base.scheme(), rest)
    } else {
        format!("{}://{}", base.scheme(), rest)
    }
}

/// Heuristic for protocol-relative references: a bare registered domain
/// (`example.com`, exactly one dot) gets a `www.` label, since some pages
/// omit a label their host actually requires. Hosts that already carry a
/// subdomain, or contain no dot at all (`localhost`), are left alone.
///
/// This is a guess about the target site, not URL semantics.
pub fn needs_www_label(hostname: &str) -> bool {
    hostname.matches('.').count() == 1 && hostname.split('.').all(|label| !label.is_empty())
}

fn resolve_parent_relative(base: &BaseUrl, reference: &str) -> String {
    let mut remainder = reference;
    let mut pops = 0;
    while let Some(rest) = remainder.strip_prefix("../") {
        remainder = rest;
        pops += 1;
    }

    let segments = base.directory_segments();
    if pops > segments.len() {
        ::log::debug!(
            "Reference {} climbs above the root of {}, clamping",
            reference,
            base
        );
    }
    let keep = segments.len().saturating_sub(pops);

    join_under_root(base, &segments[..keep], remainder)
}

fn join_under_root(base: &BaseUrl, segments: &[&str], tail: &str) -> String {
    if segments.is_empty() {
        format!("{}://{}/{}", base.scheme(), base.authority(), tail)
    } else {
        format!(
            "{}://{}/{}/{}",
            base.scheme(),
            base.authority(),
            segments.join("/"),
            tail
        )
    }
}
