use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssetError {
    #[error("invalid asset url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("cache version tag must not be empty")]
    EmptyVersion,

    #[error("unsupported request method: {0}")]
    UnknownMethod(String),
}

//
// ─── REQUESTS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl RequestMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Head => "HEAD",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Options => "OPTIONS",
        }
    }

    /// Only plain reads are eligible for offline caching.
    #[must_use]
    pub fn is_cacheable(self) -> bool {
        matches!(self, RequestMethod::Get)
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestMethod {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(AssetError::UnknownMethod(s.to_string())),
        }
    }
}

/// A resource fetch seen by the offline layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    method: RequestMethod,
    url: Url,
}

impl AssetRequest {
    #[must_use]
    pub fn new(method: RequestMethod, url: Url) -> Self {
        Self { method, url }
    }

    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(RequestMethod::Get, url)
    }

    /// Build a request from a raw URL string.
    ///
    /// # Errors
    ///
    /// Returns `AssetError::InvalidUrl` if `raw` is not an absolute URL.
    pub fn parse(method: RequestMethod, raw: &str) -> Result<Self, AssetError> {
        Ok(Self::new(method, Url::parse(raw)?))
    }

    #[must_use]
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn is_same_origin(&self, origin: &Url) -> bool {
        self.url.origin() == origin.origin()
    }

    /// Cache identity of this request: method plus URL without fragment.
    #[must_use]
    pub fn key(&self) -> RequestKey {
        let mut url = self.url.clone();
        url.set_fragment(None);
        RequestKey {
            method: self.method,
            url: url.into(),
        }
    }
}

/// Identity under which a response is stored in a cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: RequestMethod,
    url: String,
}

impl RequestKey {
    /// Rehydrate a key read back from storage.
    #[must_use]
    pub fn from_parts(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    #[must_use]
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

//
// ─── RESPONSES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    status: u16,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl AssetResponse {
    #[must_use]
    pub fn new(status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            body,
        }
    }

    /// A `200 OK` response with the given body.
    #[must_use]
    pub fn ok(content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, content_type.map(str::to_string), body.into())
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

//
// ─── CACHE VERSION ────────────────────────────────────────────────────────────
//

/// Opaque tag naming one generation of cached assets.
///
/// Any change to the manifest or to cached file contents needs a new tag,
/// otherwise installed clients keep serving the old copies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheVersion(String);

impl CacheVersion {
    /// # Errors
    ///
    /// Returns `AssetError::EmptyVersion` for blank tags.
    pub fn new(tag: impl Into<String>) -> Result<Self, AssetError> {
        let tag = tag.into().trim().to_string();
        if tag.is_empty() {
            return Err(AssetError::EmptyVersion);
        }
        Ok(Self(tag))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
