//! Filename and URL templates.
//!
//! Two placeholders are recognized: `%package%` and `%hash%`. Anything else is
//! literal text. Substitution always happens package first, then hash, so a
//! package name that happens to contain `%hash%` is itself hashed over.

use url::Url;

/// Placeholder for the package name.
pub const PACKAGE_PLACEHOLDER: &str = "%package%";

/// Placeholder for the content hash.
pub const HASH_PLACEHOLDER: &str = "%hash%";

/// Stand-in for `%hash%` while the content hash is not yet known.
pub const PREP_SENTINEL: &str = "prep";

/// Template for per-package provider files.
pub const PROVIDERS_TEMPLATE: &str = "p/%package%$%hash%.json";

/// A filename or URL template with `%package%` and `%hash%` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilenameTemplate(String);

impl FilenameTemplate {
    /// Wrap a raw template string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Return the raw template.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the template carries a `%hash%` segment.
    pub fn has_hash(&self) -> bool {
        self.0.contains(HASH_PLACEHOLDER)
    }

    /// Substitute the given placeholders, leaving the others in place.
    ///
    /// ```
    /// use repodex_core::FilenameTemplate;
    ///
    /// let t = FilenameTemplate::new("p/%package%$%hash%.json");
    /// assert_eq!(t.expand(Some("acme/log"), None), "p/acme/log$%hash%.json");
    /// assert_eq!(t.expand(Some("acme/log"), Some("ab12")), "p/acme/log$ab12.json");
    /// ```
    pub fn expand(&self, package: Option<&str>, hash: Option<&str>) -> String {
        let mut out = self.0.clone();
        if let Some(package) = package {
            out = out.replace(PACKAGE_PLACEHOLDER, package);
        }
        if let Some(hash) = hash {
            out = out.replace(HASH_PLACEHOLDER, hash);
        }
        out
    }

    /// A new template with `%package%` already substituted.
    pub fn for_package(&self, package: &str) -> Self {
        Self(self.expand(Some(package), None))
    }
}

impl std::fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build the URL clients use to fetch files produced from `template`.
///
/// `%package%` is substituted when given; `%hash%` is kept for the client. With
/// a homepage, the template is prefixed by the homepage's URL path.
///
/// ```
/// use repodex_core::FilenameTemplate;
/// use repodex_core::template::advertised_url;
///
/// let t = FilenameTemplate::new("p/%package%$%hash%.json");
/// assert_eq!(
///     advertised_url(&t, None, Some("https://example.com/repo/")),
///     "/repo/p/%package%$%hash%.json"
/// );
/// assert_eq!(advertised_url(&t, None, None), "p/%package%$%hash%.json");
/// ```
pub fn advertised_url(
    template: &FilenameTemplate,
    package: Option<&str>,
    homepage: Option<&str>,
) -> String {
    let expanded = template.expand(package, None);
    match homepage.filter(|h| !h.is_empty()) {
        Some(homepage) => format!("{}/{expanded}", homepage_path(homepage)),
        None => expanded,
    }
}

/// The path component of a homepage, without trailing slash.
///
/// A homepage without a path (or with `/` only) yields an empty string. Strings
/// that do not parse as URLs with an authority are treated as a bare path. The
/// path is taken verbatim, never percent-encoded.
fn homepage_path(homepage: &str) -> String {
    let path = match Url::parse(homepage) {
        Ok(url) if url.has_authority() => raw_path(homepage),
        _ => homepage,
    };
    path.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/')
        .to_string()
}

/// Everything from the first `/`, `?` or `#` after the authority.
fn raw_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.find(['/', '?', '#']).map_or("", |i| &rest[i..])
}
