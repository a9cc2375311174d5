//! URL composition against the remote image service.
//!
//! Every URL produced by this crate has the shape:
//!
//! ```text
//! {base}/{resource-root}/{organization}/{path}?{transform-query}
//! ```
//!
//! Paths that are already absolute http(s) URLs are left as they are and only
//! get the transform query appended. Relative paths are percent-encoded.
//!
//! # Example
//!
//! ```
//! use pixelway::compose::UrlComposer;
//! use pixelway::transform::TransformSet;
//!
//! let composer = UrlComposer::default();
//! let transforms = TransformSet::new().with_size(Some(320), None);
//!
//! let url = composer.build_transformed_url("/photos/cat.jpg", &transforms, Some("acme"));
//! assert_eq!(url, "https://cdn.pixelway.io/image/acme/photos/cat.jpg?w=320");
//! ```

mod srcset;

use crate::transform::TransformSet;

pub use srcset::FormatUrls;

/// Default base URL of the transformation service.
pub const DEFAULT_BASE_URL: &str = "https://cdn.pixelway.io";

/// Default resource root segment under the base URL.
pub const DEFAULT_RESOURCE_ROOT: &str = "image";

// =============================================================================
// UrlComposer
// =============================================================================

/// Builds service URLs for one base URL and resource root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlComposer {
    /// Base URL without trailing slash
    base_url: String,

    /// Resource root without surrounding slashes
    resource_root: String,

    /// Organization used when a call does not name one
    default_organization: Option<String>,
}

impl UrlComposer {
    /// Create a composer for the given service location.
    pub fn new(base_url: impl Into<String>, resource_root: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let resource_root = resource_root.into().trim_matches('/').to_string();
        Self {
            base_url,
            resource_root,
            default_organization: None,
        }
    }

    /// Set the organization used when a call passes `None`.
    pub fn with_default_organization(mut self, organization: impl Into<String>) -> Self {
        self.default_organization = Some(organization.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resource_root(&self) -> &str {
        &self.resource_root
    }

    /// Build the untransformed URL of an image.
    ///
    /// Absolute http(s) URLs are returned unchanged. Relative paths are
    /// normalized to a single leading `/`, percent-encoded segment by segment
    /// and placed under the organization. A query already on the path is kept.
    pub fn build_image_url(&self, path: &str, organization: &str) -> String {
        if is_absolute_url(path) {
            return path.to_string();
        }

        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let mut url = self.base_url.clone();
        if !self.resource_root.is_empty() {
            url.push('/');
            url.push_str(&self.resource_root);
        }
        if !organization.is_empty() {
            url.push('/');
            url.push_str(&urlencoding::encode(organization));
        }
        url.push('/');
        url.push_str(&encode_path(path.trim_start_matches('/')));
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Build the URL of an image with the transform query appended.
    pub fn build_transformed_url(
        &self,
        path: &str,
        transforms: &TransformSet,
        organization: Option<&str>,
    ) -> String {
        let url = self.build_image_url(path, self.organization(organization));
        append_query(&url, &transforms.to_query())
    }

    fn organization<'a>(&'a self, organization: Option<&'a str>) -> &'a str {
        organization
            .or(self.default_organization.as_deref())
            .unwrap_or("")
    }
}

impl Default for UrlComposer {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_RESOURCE_ROOT)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Whether `path` is an absolute `http` or `https` URL.
///
/// Other `scheme:` prefixes (`photos:2024.jpg`) are treated as relative paths.
pub fn is_absolute_url(path: &str) -> bool {
    url::Url::parse(path)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Percent-encode each `/`-separated segment of a relative path.
///
/// Segments that are already encoded are decoded first so they are not
/// encoded twice.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => urlencoding::encode(&decoded).into_owned(),
            Err(_) => urlencoding::encode(segment).into_owned(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Append a query string, using `&` when the URL already carries one.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }

    let separator = if url.contains('?') {
        if url.ends_with('?') || url.ends_with('&') {
            ""
        } else {
            "&"
        }
    } else {
        "?"
    };
    format!("{}{}{}", url, separator, query)
}
