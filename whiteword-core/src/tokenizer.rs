//! White-word tokenizer
//!
//! Emits dictionary matches and the unmatched gaps between them, so that
//! every byte of the input is covered by exactly one token. Matches are
//! pulled from the dictionary in bounded batches; the batch size never
//! changes the token stream.

use std::fmt;
use std::iter::FusedIterator;
use std::num::NonZeroUsize;
use std::ops::Range;

use tracing::{debug, trace, warn};

use crate::config::TokenizerConfig;
use crate::error::{Result, TokenizerError};
use crate::table::{Catalog, EntryId, Hit, Scanner, TableKind};
use crate::token::Token;

/// Tokenizer bound to a scannable dictionary
#[derive(Clone, Copy)]
pub struct Tokenizer<'d> {
    scanner: &'d dyn Scanner,
    batch_capacity: NonZeroUsize,
}

impl<'d> Tokenizer<'d> {
    /// Bind to the table named by `config`.
    ///
    /// The table must exist and must be a patricia-key table with scan
    /// support.
    pub fn bind(catalog: &'d Catalog, config: &TokenizerConfig) -> Result<Self> {
        let name = &config.table_name;
        let table = catalog
            .get(name)
            .ok_or_else(|| TokenizerError::DictionaryUnavailable { name: name.clone() })?;

        let scanner = match (table.kind(), table.scanner()) {
            (TableKind::PatKey, Some(scanner)) => scanner,
            (kind, _) => {
                return Err(TokenizerError::IncompatibleDictionary {
                    name: name.clone(),
                    kind,
                })
            }
        };

        debug!(table = %name, entries = table.len(), "bound white tokenizer");
        Ok(Self::with_scanner(scanner, config.batch_capacity))
    }

    /// Bind to a scanner that was validated elsewhere
    pub fn with_scanner(scanner: &'d dyn Scanner, batch_capacity: NonZeroUsize) -> Self {
        Self {
            scanner,
            batch_capacity,
        }
    }

    pub fn batch_capacity(&self) -> NonZeroUsize {
        self.batch_capacity
    }

    /// Start a token stream over `input`
    pub fn open<'a>(&self, input: &'a str) -> Result<Session<'a>>
    where
        'd: 'a,
    {
        Session::new(input, self.scanner, self.batch_capacity)
    }

    /// Tokenize the whole input
    pub fn tokenize<'a>(&self, input: &'a str) -> Result<Vec<Token<'a>>>
    where
        'd: 'a,
    {
        Ok(self.open(input)?.collect())
    }

    /// Indexable terms in input order (skipped tokens dropped)
    pub fn terms<'a>(&self, input: &'a str) -> Result<Vec<&'a str>>
    where
        'd: 'a,
    {
        Ok(self.open(input)?.terms().collect())
    }

    /// Unique indexable terms, sorted
    pub fn terms_unique<'a>(&self, input: &'a str) -> Result<Vec<&'a str>>
    where
        'd: 'a,
    {
        let mut terms = self.terms(input)?;
        terms.sort_unstable();
        terms.dedup();
        Ok(terms)
    }
}

impl fmt::Debug for Tokenizer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("batch_capacity", &self.batch_capacity)
            .finish_non_exhaustive()
    }
}

/// Tokenize `input` against the table named by `config`
pub fn tokenize<'a>(
    input: &'a str,
    catalog: &'a Catalog,
    config: &TokenizerConfig,
) -> Result<Vec<Token<'a>>> {
    Session::open(input, catalog, config).map(Iterator::collect)
}

/// A single pass over one input.
///
/// Yields tokens until one flagged `LAST` has been returned, then `None`.
/// A session cannot be rewound; open a new one to tokenize again.
pub struct Session<'a> {
    input: &'a str,
    scanner: &'a dyn Scanner,
    batch_capacity: usize,
    /// Current batch, reused across refills
    hits: Vec<Hit>,
    hit_index: usize,
    /// Absolute offset the current batch was scanned from
    window_start: usize,
    /// Everything before this offset has been scanned
    cursor: usize,
    /// Everything before this offset has been emitted
    emitted: usize,
    finished: bool,
}

enum Step {
    Gap(Range<usize>),
    Hit(EntryId, Range<usize>),
}

/// Drop hits that are empty, overlap an earlier hit, run past the window
/// or split a character. Their bytes end up in gap tokens instead.
fn retain_valid_hits(window: &str, window_start: usize, hits: &mut Vec<Hit>) {
    let mut settled = 0;
    hits.retain(|hit| {
        let valid = hit.length > 0
            && hit.offset >= settled
            && hit.offset.checked_add(hit.length).is_some_and(|end| end <= window.len())
            && window.is_char_boundary(hit.offset)
            && window.is_char_boundary(hit.end());
        if valid {
            settled = hit.end();
        } else {
            warn!(
                id = %hit.id,
                offset = window_start.saturating_add(hit.offset),
                length = hit.length,
                "dropping invalid hit from scanner"
            );
        }
        valid
    });
}

impl<'a> Session<'a> {
    /// Bind to the configured table and start a token stream over `input`
    #[tracing::instrument(level = "debug", skip_all, fields(table = %config.table_name, len = input.len()))]
    pub fn open(input: &'a str, catalog: &'a Catalog, config: &TokenizerConfig) -> Result<Self> {
        Tokenizer::bind(catalog, config)?.open(input)
    }

    fn new(input: &'a str, scanner: &'a dyn Scanner, batch_capacity: NonZeroUsize) -> Result<Self> {
        let mut hits = Vec::new();
        hits.try_reserve_exact(batch_capacity.get())?;

        Ok(Self {
            input,
            scanner,
            batch_capacity: batch_capacity.get(),
            hits,
            hit_index: 0,
            window_start: 0,
            cursor: 0,
            emitted: 0,
            finished: false,
        })
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Whether the final token has been returned or the session was closed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Produce the next token, or `None` once the stream has ended
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }

        self.refill();
        let step = self.step();
        let last = self.is_drained();
        if last {
            self.finished = true;
        }

        let token = match step {
            Step::Gap(span) => Token::gap(self.input, span, last),
            Step::Hit(id, span) => self.resolve(id, span, last),
        };
        Some(token)
    }

    /// Indexable token texts only
    pub fn terms(self) -> impl Iterator<Item = &'a str> {
        self.filter(|token| !token.is_skip()).map(|token| token.text)
    }

    /// Release the hit buffer and end the stream. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.finished && self.hits.capacity() == 0 {
            return;
        }
        debug!(
            emitted = self.emitted,
            len = self.input.len(),
            drained = self.is_drained(),
            "closing white tokenizer session"
        );
        self.hits = Vec::new();
        self.hit_index = 0;
        self.finished = true;
    }

    /// Scan ahead until a hit is pending or the whole input is scanned
    fn refill(&mut self) {
        let input = self.input;
        while self.hit_index >= self.hits.len() && self.cursor < input.len() {
            self.window_start = self.cursor;
            let window = &input[self.window_start..];
            let resume = self.scanner.scan(window, &mut self.hits, self.batch_capacity);
            self.hit_index = 0;
            retain_valid_hits(window, self.window_start, &mut self.hits);

            let settled = self.hits.last().map_or(0, Hit::end);
            let mut resume = resume.max(settled).min(window.len());
            while !window.is_char_boundary(resume) {
                resume += 1;
            }
            if resume == 0 && self.hits.is_empty() {
                warn!(offset = self.window_start, "scanner made no progress; settling the rest of the input");
                resume = window.len();
            }
            self.cursor = self.window_start + resume;

            trace!(
                window_start = self.window_start,
                hits = self.hits.len(),
                cursor = self.cursor,
                "scanned window"
            );
        }
    }

    /// Advance past the next span, returning what covers it
    fn step(&mut self) -> Step {
        match self.hits.get(self.hit_index).copied() {
            Some(hit) => {
                let start = self.window_start + hit.offset;
                if start > self.emitted {
                    return self.gap_to(start);
                }
                let span = start..start + hit.length;
                let id = hit.id;
                self.hit_index += 1;
                self.emitted = span.end;
                Step::Hit(id, span)
            }
            None => self.gap_to(self.cursor),
        }
    }

    fn gap_to(&mut self, end: usize) -> Step {
        let span = self.emitted..end;
        self.emitted = end;
        Step::Gap(span)
    }

    fn is_drained(&self) -> bool {
        let len = self.input.len();
        self.emitted == len && self.cursor == len && self.hit_index >= self.hits.len()
    }

    fn resolve(&self, id: EntryId, span: Range<usize>, last: bool) -> Token<'a> {
        let scanner: &'a dyn Scanner = self.scanner;
        match scanner.key(id).filter(|key| !key.is_empty()) {
            Some(key) => Token::matched(id, key, span, last),
            None => {
                debug!(%id, start = span.start, end = span.end, "matched entry has no key; emitting as skipped gap");
                Token::gap(self.input, span, last)
            }
        }
    }
}

impl<'a> Iterator for Session<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

impl FusedIterator for Session<'_> {}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("len", &self.input.len())
            .field("cursor", &self.cursor)
            .field("emitted", &self.emitted)
            .field("pending_hits", &(self.hits.len().saturating_sub(self.hit_index)))
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
