//! Deterministic keyword-based tier assignment

use crate::classify::PriorityTier;

/// Keywords that matched a piece of link text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMatches {
    /// High-priority keywords found, in configured order
    pub high: Vec<String>,

    /// Medium-priority keywords found, in configured order
    pub medium: Vec<String>,
}

/// Assigns priority tiers from two configured keyword sets
///
/// Matching is a case-insensitive substring search over both the link context
/// and the link URL. The classifier holds no mutable state, so the same input
/// always yields the same tier.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    high: Vec<Keyword>,
    medium: Vec<Keyword>,
}

#[derive(Debug, Clone)]
struct Keyword {
    original: String,
    folded: String,
}

impl KeywordClassifier {
    /// Creates a classifier; blank keywords are ignored
    pub fn new<H, M>(high: H, medium: M) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
    {
        Self {
            high: fold_keywords(high),
            medium: fold_keywords(medium),
        }
    }

    /// Classifies a link from its context text and URL
    ///
    /// # Examples
    ///
    /// ```
    /// use linkscout::classify::{KeywordClassifier, PriorityTier};
    ///
    /// let classifier = KeywordClassifier::new(["Budget"], ["Finance"]);
    /// assert_eq!(classifier.tier("FY24 budget book", "https://a.gov/x"), PriorityTier::High);
    /// assert_eq!(classifier.tier("About us", "https://a.gov/finance"), PriorityTier::Medium);
    /// assert_eq!(classifier.tier("About us", "https://a.gov/about"), PriorityTier::Low);
    /// assert_eq!(classifier.tier("  ", "https://a.gov/about"), PriorityTier::None);
    /// ```
    pub fn tier(&self, text: &str, url: &str) -> PriorityTier {
        let haystack = Haystack::new(text, url);

        if self.high.iter().any(|k| haystack.contains(&k.folded)) {
            PriorityTier::High
        } else if self.medium.iter().any(|k| haystack.contains(&k.folded)) {
            PriorityTier::Medium
        } else if !text.trim().is_empty() {
            PriorityTier::Low
        } else {
            PriorityTier::None
        }
    }

    /// Reports every configured keyword that occurs in the text or URL
    pub fn matches(&self, text: &str, url: &str) -> KeywordMatches {
        let haystack = Haystack::new(text, url);
        let collect = |keywords: &[Keyword]| -> Vec<String> {
            keywords
                .iter()
                .filter(|k| haystack.contains(&k.folded))
                .map(|k| k.original.clone())
                .collect()
        };

        KeywordMatches {
            high: collect(&self.high),
            medium: collect(&self.medium),
        }
    }

    /// Configured high-priority keywords
    pub fn high_keywords(&self) -> impl Iterator<Item = &str> {
        self.high.iter().map(|k| k.original.as_str())
    }

    /// Configured medium-priority keywords
    pub fn medium_keywords(&self) -> impl Iterator<Item = &str> {
        self.medium.iter().map(|k| k.original.as_str())
    }
}

struct Haystack {
    text: String,
    url: String,
}

impl Haystack {
    fn new(text: &str, url: &str) -> Self {
        Self {
            text: text.to_lowercase(),
            url: url.to_lowercase(),
        }
    }

    fn contains(&self, needle: &str) -> bool {
        self.text.contains(needle) || self.url.contains(needle)
    }
}

fn fold_keywords<I>(keywords: I) -> Vec<Keyword>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_string())
        .filter(|k| !k.is_empty())
        .map(|original| Keyword {
            folded: original.to_lowercase(),
            original,
        })
        .collect()
}
