//! Prefix-searchable key table
//!
//! Keys live in a byte trie. Scanning is leftmost-longest: at every
//! grapheme cluster start the longest key beginning there wins, and the
//! scan resumes right after it.

use ahash::AHashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::table::{EntryId, Hit, KeyResolver, Scanner, Table, TableKind};

#[derive(Debug, Default, Clone)]
struct Node {
    children: AHashMap<u8, usize>,
    entry: Option<EntryId>,
}

/// Dictionary table that supports scanning text for its keys
#[derive(Debug, Clone)]
pub struct PatTable {
    nodes: Vec<Node>,
    // Indexed by `EntryId::index`; removed keys leave a hole so ids stay stable
    keys: Vec<Option<String>>,
    live: usize,
}

impl Default for PatTable {
    fn default() -> Self {
        Self {
            nodes: vec![Node::default()],
            keys: Vec::new(),
            live: 0,
        }
    }
}

impl PatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a newline-separated word list.
    ///
    /// Surrounding whitespace is trimmed; blank lines and lines starting
    /// with `#` are ignored.
    pub fn from_word_list(list: &str) -> Self {
        list.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    /// Insert a key and return its id.
    ///
    /// Inserting an existing key returns the id it already has. Empty keys
    /// can never match anything and are rejected with `None`.
    pub fn insert(&mut self, key: &str) -> Option<EntryId> {
        if key.is_empty() {
            return None;
        }
        let mut node = 0;
        for &byte in key.as_bytes() {
            node = match self.nodes[node].children.get(&byte) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(byte, child);
                    child
                }
            };
        }
        if let Some(id) = self.nodes[node].entry {
            return Some(id);
        }
        let id = EntryId::from_index(self.keys.len())?;
        self.keys.push(Some(key.to_owned()));
        self.nodes[node].entry = Some(id);
        self.live += 1;
        Some(id)
    }

    /// Remove a key; its id will no longer resolve
    pub fn remove(&mut self, key: &str) -> Option<EntryId> {
        let node = self.walk(key.as_bytes())?;
        let id = self.nodes[node].entry.take()?;
        self.keys[id.index()] = None;
        self.live -= 1;
        Some(id)
    }

    pub fn get(&self, key: &str) -> Option<EntryId> {
        self.walk(key.as_bytes())
            .and_then(|node| self.nodes[node].entry)
    }

    fn walk(&self, bytes: &[u8]) -> Option<usize> {
        bytes
            .iter()
            .try_fold(0, |node, byte| self.nodes[node].children.get(byte).copied())
    }

    /// Longest key that is a prefix of `bytes`, with its length
    fn longest_prefix(&self, bytes: &[u8]) -> Option<(EntryId, usize)> {
        let mut node = 0;
        let mut best = None;
        for (depth, byte) in bytes.iter().enumerate() {
            match self.nodes[node].children.get(byte) {
                Some(&child) => node = child,
                None => break,
            }
            if let Some(id) = self.nodes[node].entry {
                best = Some((id, depth + 1));
            }
        }
        best
    }
}

impl<S: AsRef<str>> FromIterator<S> for PatTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        for word in iter {
            table.insert(word.as_ref());
        }
        table
    }
}

impl KeyResolver for PatTable {
    fn key(&self, id: EntryId) -> Option<&str> {
        self.keys.get(id.index())?.as_deref()
    }
}

impl Scanner for PatTable {
    fn scan(&self, text: &str, hits: &mut Vec<Hit>, max_hits: usize) -> usize {
        hits.clear();
        if max_hits == 0 {
            return 0;
        }

        let bytes = text.as_bytes();
        let mut pos = 0;
        while pos < text.len() {
            match self.longest_prefix(&bytes[pos..]) {
                Some((id, length)) => {
                    hits.push(Hit { id, offset: pos, length });
                    pos += length;
                    if hits.len() == max_hits {
                        return pos;
                    }
                }
                None => {
                    // Keys are whole UTF-8 strings, so `pos` is always a char boundary
                    let step = text[pos..].graphemes(true).next().map_or(1, str::len);
                    pos += step;
                }
            }
        }
        text.len()
    }
}

impl Table for PatTable {
    fn kind(&self) -> TableKind {
        TableKind::PatKey
    }

    fn scanner(&self) -> Option<&dyn Scanner> {
        Some(self)
    }

    fn len(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(table: &PatTable, text: &str) -> Vec<(String, usize, usize)> {
        let mut hits = Vec::new();
        let resume = table.scan(text, &mut hits, usize::MAX);
        assert_eq!(resume, text.len());
        hits.iter()
            .map(|hit| (table.key(hit.id).unwrap().to_string(), hit.offset, hit.length))
            .collect()
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = PatTable::new();
        let cat = table.insert("cat").unwrap();
        let dog = table.insert("dog").unwrap();
        assert_ne!(cat, dog);
        assert_eq!(table.insert("cat"), Some(cat));
        assert_eq!(table.get("dog"), Some(dog));
        assert_eq!(table.get("ca"), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.insert(""), None);
    }

    #[test]
    fn test_longest_match_wins() {
        let table: PatTable = ["new", "new york", "york"].into_iter().collect();
        assert_eq!(
            scan_all(&table, "new york city"),
            vec![("new york".to_string(), 0, 8)]
        );
        assert_eq!(
            scan_all(&table, "newyork"),
            vec![("new".to_string(), 0, 3), ("york".to_string(), 3, 4)]
        );
    }

    #[test]
    fn test_scan_skips_unmatched_text() {
        let table: PatTable = ["cat", "dog"].into_iter().collect();
        assert_eq!(
            scan_all(&table, "a cat and a dog"),
            vec![("cat".to_string(), 2, 3), ("dog".to_string(), 12, 3)]
        );
        assert!(scan_all(&table, "nothing here").is_empty());
    }

    #[test]
    fn test_multibyte_keys() {
        let table: PatTable = ["東京", "café"].into_iter().collect();
        assert_eq!(
            scan_all(&table, "東京のcafé"),
            vec![("東京".to_string(), 0, 6), ("café".to_string(), 9, 5)]
        );
    }

    #[test]
    fn test_scan_stops_at_max_hits() {
        let table: PatTable = ["ab"].into_iter().collect();
        let mut hits = Vec::new();
        let resume = table.scan("ab ab ab", &mut hits, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(resume, 5);

        let resume = table.scan(&"ab ab ab"[resume..], &mut hits, 2);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].offset, 1);
        assert_eq!(resume, 3);
    }

    #[test]
    fn test_remove_unresolves_id() {
        let mut table: PatTable = ["cat", "dog"].into_iter().collect();
        let cat = table.remove("cat").unwrap();
        assert_eq!(table.key(cat), None);
        assert_eq!(table.get("cat"), None);
        assert_eq!(table.len(), 1);
        assert_eq!(table.remove("cat"), None);
        assert!(scan_all(&table, "cat dog").iter().all(|(key, _, _)| key == "dog"));
    }

    #[test]
    fn test_from_word_list() {
        let table = PatTable::from_word_list("# animals\ncat\n\n  dog  \n");
        assert_eq!(table.len(), 2);
        assert!(table.get("cat").is_some());
        assert!(table.get("dog").is_some());
        assert!(table.get("# animals").is_none());
    }
}
