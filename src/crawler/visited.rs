use std::collections::HashSet;

/// Set of canonical URLs already claimed during one crawl
///
/// Callers pass URLs that have been through
/// [`canonicalize_url`](crate::url::canonicalize_url); the set does no
/// normalization of its own.
#[derive(Debug, Default, Clone)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `canonical_url`, returning `true` only the first time
    ///
    /// # Examples
    ///
    /// ```
    /// use linkscout::VisitedSet;
    ///
    /// let mut visited = VisitedSet::new();
    /// assert!(visited.mark_if_new("https://a.gov/x"));
    /// assert!(!visited.mark_if_new("https://a.gov/x"));
    /// ```
    pub fn mark_if_new(&mut self, canonical_url: &str) -> bool {
        if self.urls.contains(canonical_url) {
            return false;
        }
        self.urls.insert(canonical_url.to_string())
    }

    pub fn contains(&self, canonical_url: &str) -> bool {
        self.urls.contains(canonical_url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
