use crate::UrlError;
use url::{Host, Url};

/// Canonicalizes a URL for visited-set membership and page keys
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only HTTP and HTTPS
/// 3. Lowercase scheme and host (done by the parser for special schemes)
/// 4. Normalize path:
///    - Remove dot segments (. and ..)
///    - Collapse repeated slashes
///    - Remove trailing slashes, including the root slash when there is no query
/// 5. Remove fragment (everything after #)
///
/// Query strings are kept verbatim; two URLs that differ only by query are
/// different pages.
///
/// # Examples
///
/// ```
/// use linkscout::url::canonicalize_url;
///
/// let url = canonicalize_url("HTTPS://Example.COM/Docs/").unwrap();
/// assert_eq!(url, "https://example.com/Docs");
/// ```
pub fn canonicalize_url(url_str: &str) -> Result<String, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);
    url.set_fragment(None);

    let serialized = url.to_string();
    if url.path() == "/" && url.query().is_none() {
        Ok(serialized.trim_end_matches('/').to_string())
    } else {
        Ok(serialized)
    }
}

/// Returns the URL with its `www.` host prefix toggled
///
/// Adds `www.` when absent and strips it when present. Returns `None` for
/// unparsable URLs and for IP-literal hosts, which have no `www.` variant.
///
/// # Examples
///
/// ```
/// use linkscout::url::toggle_www;
///
/// assert_eq!(toggle_www("https://site.org/a").as_deref(), Some("https://www.site.org/a"));
/// assert_eq!(toggle_www("https://www.site.org/a").as_deref(), Some("https://site.org/a"));
/// assert_eq!(toggle_www("http://127.0.0.1:8080/"), None);
/// ```
pub fn toggle_www(url_str: &str) -> Option<String> {
    let mut url = Url::parse(url_str).ok()?;

    let toggled = match url.host()? {
        Host::Domain(domain) => match domain.strip_prefix("www.") {
            Some(bare) if !bare.is_empty() => bare.to_string(),
            Some(_) => return None,
            None => format!("www.{}", domain),
        },
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };

    url.set_host(Some(&toggled)).ok()?;
    Some(url.to_string())
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}
