//! Depth-first crawl frontier
//!
//! Entries live in an append-only arena so every entry can name its parent by
//! index. The traversal order is a LIFO stack of arena indices.

/// One URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Canonical URL
    pub url: String,
    pub depth: u32,
    /// Arena index of the page this URL was found on; `None` for seeds
    pub parent: Option<usize>,
}

/// Arena plus LIFO stack
#[derive(Debug, Default)]
pub struct Frontier {
    arena: Vec<FrontierEntry>,
    stack: Vec<usize>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes seeds so the first one is popped first
    pub fn push_seeds<I>(&mut self, seeds: I)
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: DoubleEndedIterator,
    {
        for url in seeds.into_iter().rev() {
            self.push(url, 0, None);
        }
    }

    /// Pushes the children of `parent` so the first extracted child is popped next
    ///
    /// Children are explored before any sibling of `parent`, which is what
    /// makes the traversal depth-first.
    pub fn push_children(&mut self, parent: usize, children: Vec<String>) {
        let depth = self.arena[parent].depth + 1;
        for url in children.into_iter().rev() {
            self.push(url, depth, Some(parent));
        }
    }

    fn push(&mut self, url: String, depth: u32, parent: Option<usize>) {
        let index = self.arena.len();
        self.arena.push(FrontierEntry { url, depth, parent });
        self.stack.push(index);
    }

    /// Pops the next entry, returning its arena index
    pub fn pop(&mut self) -> Option<(usize, &FrontierEntry)> {
        let index = self.stack.pop()?;
        Some((index, &self.arena[index]))
    }

    /// URL of the page that linked to the entry at `index`
    pub fn parent_url(&self, index: usize) -> Option<&str> {
        let parent = self.arena.get(index)?.parent?;
        self.arena.get(parent).map(|entry| entry.url.as_str())
    }

    /// Entries still waiting on the stack
    pub fn pending(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Drops every pending entry, returning how many were dropped
    pub fn discard(&mut self) -> usize {
        let dropped = self.stack.len();
        self.stack.clear();
        dropped
    }
}
