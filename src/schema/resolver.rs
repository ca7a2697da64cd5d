//! Natural key to surrogate id mapping
//!
//! Two mentions of the same film, person or category on different pages
//! resolve to one id. Keys are compared after trimming, lower-casing and
//! collapsing whitespace; nothing else distinguishes two people with the
//! same name.

use crate::schema::tables::Id;
use std::collections::HashMap;
use std::fmt;

/// Entity families, each with its own id sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Venue,
    Edition,
    Category,
    Position,
    Person,
    Movie,
    ProductionCompany,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Venue => "venue",
            Self::Edition => "edition",
            Self::Category => "category",
            Self::Position => "position",
            Self::Person => "person",
            Self::Movie => "movie",
            Self::ProductionCompany => "production_company",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical form of a natural key
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Id allocator and lookup table for all entity kinds
#[derive(Debug, Default)]
pub struct Resolver {
    ids: HashMap<(EntityKind, String), Id>,
    counts: HashMap<EntityKind, Id>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `key`, allocating the next id of `kind` if unseen
    ///
    /// Ids start at 1 per kind and are never reused.
    pub fn resolve(&mut self, key: &str, kind: EntityKind) -> Id {
        let normalized = normalize_key(key);
        if let Some(id) = self.ids.get(&(kind, normalized.clone())) {
            return *id;
        }

        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        let id = *count;
        self.ids.insert((kind, normalized), id);
        id
    }

    /// Like [`resolve`](Self::resolve) but also reports whether the id is new
    pub fn resolve_new(&mut self, key: &str, kind: EntityKind) -> (Id, bool) {
        let before = self.count(kind);
        let id = self.resolve(key, kind);
        (id, self.count(kind) > before)
    }

    /// Makes `key` another name for an existing id
    ///
    /// A key that already maps to an id keeps it. Returns whether the alias
    /// was added.
    pub fn alias(&mut self, key: &str, kind: EntityKind, id: Id) -> bool {
        let normalized = normalize_key(key);
        if normalized.is_empty() || self.ids.contains_key(&(kind, normalized.clone())) {
            return false;
        }
        self.ids.insert((kind, normalized), id);
        true
    }

    /// Id previously assigned to `key`, without allocating
    pub fn lookup(&self, key: &str, kind: EntityKind) -> Option<Id> {
        self.ids.get(&(kind, normalize_key(key))).copied()
    }

    /// Number of ids allocated for `kind`
    pub fn count(&self, kind: EntityKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0) as usize
    }
}
