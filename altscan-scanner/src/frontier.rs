use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
}

/// Breadth-first work queue with a visited set and a page budget.
///
/// URLs are marked visited when dequeued, not when enqueued. Pending URLs are
/// tracked in a set so enqueue dedup does not scan the queue.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    pending: HashSet<String>,
    visited: HashSet<String>,
    pages_visited: usize,
    max_pages: usize,
    max_depth: usize,
}

impl Frontier {
    pub fn new(max_pages: usize, max_depth: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            pending: HashSet::new(),
            visited: HashSet::new(),
            pages_visited: 0,
            max_pages,
            max_depth,
        }
    }

    /// Add an entry unconditionally (apart from visited/pending dedup).
    pub fn push(&mut self, url: String, depth: usize) -> bool {
        if self.visited.contains(&url) || self.pending.contains(&url) {
            return false;
        }
        self.pending.insert(url.clone());
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Enqueue links found on a page processed at `from_depth`.
    ///
    /// Pages at the depth limit contribute nothing. Returns how many were queued.
    pub fn enqueue_discovered<I>(&mut self, from_depth: usize, links: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        if !self.can_expand(from_depth) {
            return 0;
        }
        links
            .into_iter()
            .filter(|url| {
                let queued = self.push(url.clone(), from_depth + 1);
                if queued {
                    debug!("Queued {} at depth {}", url, from_depth + 1);
                }
                queued
            })
            .count()
    }

    pub fn can_expand(&self, depth: usize) -> bool {
        depth < self.max_depth
    }

    pub fn budget_exhausted(&self) -> bool {
        self.pages_visited >= self.max_pages
    }

    /// Next entry to process, marking it visited and charging the page budget.
    pub fn next_entry(&mut self) -> Option<FrontierEntry> {
        while !self.budget_exhausted() {
            let entry = self.queue.pop_front()?;
            self.pending.remove(&entry.url);
            if !self.visited.insert(entry.url.clone()) {
                continue;
            }
            self.pages_visited += 1;
            return Some(entry);
        }
        None
    }

    /// Up to `size` entries, in queue order.
    pub fn next_batch(&mut self, size: usize) -> Vec<FrontierEntry> {
        let mut batch = Vec::with_capacity(size);
        while batch.len() < size {
            match self.next_entry() {
                Some(entry) => batch.push(entry),
                None => break,
            }
        }
        batch
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
