//! Work queue for pages still to be fetched
//!
//! Pages are popped by kind (ceremonies, then categories, then films, then
//! people) and first-in first-out within a kind. Every URL is queued at most
//! once per run, compared in normalized form.

use crate::schema::Id;
use crate::url::normalize_url;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use url::Url;

/// What a queued page is expected to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Ceremony page for one edition
    Ceremony { edition: u32 },

    /// Listing page `attempt` of configured category `index`
    Category { index: usize, attempt: usize },

    /// Film page enriching an existing movie
    Movie { movie_id: Id },

    /// Person page enriching an existing person
    Person { person_id: Id },
}

impl PageKind {
    /// Pop order; lower ranks first
    fn rank(&self) -> u8 {
        match self {
            Self::Ceremony { .. } => 0,
            Self::Category { .. } => 1,
            Self::Movie { .. } => 2,
            Self::Person { .. } => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ceremony { .. } => "ceremony",
            Self::Category { .. } => "category",
            Self::Movie { .. } => "movie",
            Self::Person { .. } => "person",
        }
    }
}

/// A page waiting in the queue
#[derive(Debug, Clone)]
pub struct QueuedPage {
    /// The URL to fetch
    pub url: Url,

    pub kind: PageKind,

    /// Insertion sequence number, for FIFO order within a kind
    seq: u64,
}

// BinaryHeap is a max-heap, so the comparison is reversed
impl Ord for QueuedPage {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .kind
            .rank()
            .cmp(&self.kind.rank())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedPage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedPage {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedPage {}

/// Priority queue of pages with a visited-set guard
#[derive(Debug, Default)]
pub struct WorkQueue {
    heap: BinaryHeap<QueuedPage>,
    seen: HashSet<String>,
    next_seq: u64,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a page unless its URL was queued before
    ///
    /// # Returns
    ///
    /// `true` if the page was added; `false` for a repeat or a URL that
    /// cannot be normalized
    pub fn push(&mut self, url: &Url, kind: PageKind) -> bool {
        let normalized = match normalize_url(url.as_str()) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::debug!("Not queueing {}: {}", url, e);
                return false;
            }
        };

        if !self.seen.insert(normalized.to_string()) {
            return false;
        }

        self.heap.push(QueuedPage {
            url: normalized,
            kind,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        true
    }

    /// Removes the next page to fetch
    pub fn pop(&mut self) -> Option<QueuedPage> {
        self.heap.pop()
    }

    /// Pages still waiting
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Distinct URLs queued over the whole run
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
