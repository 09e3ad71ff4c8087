//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - The page title
//! - Every followable `<a href>` link, in document order
//! - A short piece of surrounding text per link, used for classification

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Longest context kept per link, in characters
pub const MAX_CONTEXT_CHARS: usize = 500;

/// Elements whose text is taken as the context of a link they contain
const BLOCK_ELEMENTS: &[&str] = &[
    "p",
    "div",
    "section",
    "article",
    "li",
    "td",
    "th",
    "blockquote",
    "pre",
    "ul",
    "ol",
    "header",
    "footer",
    "nav",
];

/// A page body could not be turned into links
#[derive(Debug, Clone, Error)]
#[error("Link extraction failed: {reason}")]
pub struct ExtractionError {
    pub reason: String,
}

/// One outbound link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    /// Absolute URL after resolving against the page URL
    pub url: String,

    /// Visible anchor text
    pub text: String,

    /// Whitespace-collapsed text around the link
    pub context: String,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All links found on the page, in document order
    pub links: Vec<ExtractedLink>,
}

/// Turns a fetched body into a title and outbound links
pub trait LinkExtractor {
    fn extract(&self, body: &str, page_url: &str) -> Result<ParsedPage, ExtractionError>;
}

/// [`LinkExtractor`] backed by `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, body: &str, page_url: &str) -> Result<ParsedPage, ExtractionError> {
        let base_url = Url::parse(page_url).map_err(|e| ExtractionError {
            reason: format!("invalid page URL '{}': {}", page_url, e),
        })?;
        parse_html(body, &base_url)
    }
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document, including `download` links
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only anchors
/// - Anything that is not HTTP(S) after resolution
///
/// **Note:** `rel="nofollow"` links are kept
///
/// # Context
///
/// The context of a link is the text of its nearest block-level ancestor. A
/// link with no such ancestor uses its own anchor text, and a link with no
/// text at all gets `From page: <title or page URL>`.
///
/// # Example
///
/// ```
/// use linkscout::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><p>See the <a href="/budget">budget</a></p></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url).unwrap();
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].context, "See the budget");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> Result<ParsedPage, ExtractionError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let links = extract_links(&document, base_url, title.as_deref())?;

    Ok(ParsedPage { title, links })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from the HTML document
fn extract_links(
    document: &Html,
    base_url: &Url,
    title: Option<&str>,
) -> Result<Vec<ExtractedLink>, ExtractionError> {
    let a_selector = Selector::parse("a[href]").map_err(|e| ExtractionError {
        reason: format!("bad anchor selector: {:?}", e),
    })?;

    let mut links = Vec::new();
    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute_url) = resolve_link(href, base_url) else {
            continue;
        };

        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        let mut context = block_context(element).unwrap_or_else(|| text.clone());
        if context.is_empty() {
            context = format!("From page: {}", title.unwrap_or(base_url.as_str()));
        }

        links.push(ExtractedLink {
            url: absolute_url,
            text,
            context: truncate_context(context),
        });
    }

    Ok(links)
}

/// Text of the nearest block-level ancestor, if there is one
fn block_context(element: ElementRef<'_>) -> Option<String> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| BLOCK_ELEMENTS.contains(&ancestor.value().name()))
        .map(|block| collapse_whitespace(&block.text().collect::<Vec<_>>().join(" ")))
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    // Same-page anchors
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_context(context: String) -> String {
    if context.chars().count() <= MAX_CONTEXT_CHARS {
        return context;
    }
    let mut truncated: String = context.chars().take(MAX_CONTEXT_CHARS - 3).collect();
    truncated.push_str("...");
    truncated
}
