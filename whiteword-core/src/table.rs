//! Dictionary tables and the capabilities the tokenizer binds to
//!
//! A [`Table`] is anything that can be registered in a [`Catalog`]. Only
//! tables that hand out a [`Scanner`] can back a tokenizer session; the
//! check happens when the session is opened, never lazily.

use std::fmt;
use std::num::NonZeroU32;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Identifier of a dictionary entry (0 is reserved as the nil id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(NonZeroU32);

impl EntryId {
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Position of the entry in a zero-based key array
    pub(crate) fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index + 1).ok().and_then(Self::new)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One dictionary match, relative to the text passed to [`Scanner::scan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: EntryId,
    pub offset: usize,
    pub length: usize,
}

impl Hit {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Structural kind of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Prefix-searchable key table; supports scanning
    PatKey,
    /// Exact-match key table
    HashKey,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::PatKey => f.write_str("TABLE_PAT_KEY"),
            TableKind::HashKey => f.write_str("TABLE_HASH_KEY"),
        }
    }
}

/// Resolves an entry id back to the key stored in the table
pub trait KeyResolver {
    fn key(&self, id: EntryId) -> Option<&str>;
}

/// Finds dictionary entries inside a span of text
pub trait Scanner: KeyResolver {
    /// Collect up to `max_hits` matches from `text` into `hits`.
    ///
    /// `hits` is cleared first. Matches are appended in ascending offset
    /// order, never overlap, are never empty, and start and end on char
    /// boundaries of `text`. Returns the resume offset: the first byte of
    /// `text` the scanner has not yet settled. It is a char boundary, is
    /// never before the end of the last hit, and equals `text.len()`
    /// whenever fewer than `max_hits` matches were found.
    ///
    /// Sessions drop hits that break these rules and round the resume
    /// offset up to the next char boundary.
    fn scan(&self, text: &str, hits: &mut Vec<Hit>, max_hits: usize) -> usize;
}

/// A named structure that can be registered in a [`Catalog`]
pub trait Table: Send + Sync {
    fn kind(&self) -> TableKind;

    /// The scan capability, if this table has one
    fn scanner(&self) -> Option<&dyn Scanner>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exact-lookup table without scan support
#[derive(Debug, Default, Clone)]
pub struct HashTable {
    ids: AHashMap<String, EntryId>,
    keys: Vec<String>,
}

impl HashTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, returning its id (existing keys keep their id)
    pub fn insert(&mut self, key: &str) -> Option<EntryId> {
        if let Some(&id) = self.ids.get(key) {
            return Some(id);
        }
        let id = EntryId::from_index(self.keys.len())?;
        self.keys.push(key.to_owned());
        self.ids.insert(key.to_owned(), id);
        Some(id)
    }

    pub fn get(&self, key: &str) -> Option<EntryId> {
        self.ids.get(key).copied()
    }
}

impl KeyResolver for HashTable {
    fn key(&self, id: EntryId) -> Option<&str> {
        self.keys.get(id.index()).map(String::as_str)
    }
}

impl Table for HashTable {
    fn kind(&self) -> TableKind {
        TableKind::HashKey
    }

    fn scanner(&self) -> Option<&dyn Scanner> {
        None
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Named tables available for binding
#[derive(Default)]
pub struct Catalog {
    tables: AHashMap<String, Box<dyn Table>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table, replacing any table with the same name
    pub fn insert(&mut self, name: impl Into<String>, table: impl Table + 'static) {
        self.tables.insert(name.into(), Box::new(table));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Table> {
        self.tables.get(name).map(|table| &**table)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.tables.iter().map(|(name, table)| (name, table.kind())))
            .finish()
    }
}
