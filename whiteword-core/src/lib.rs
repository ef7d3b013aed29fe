//! Whiteword Core - dictionary-driven tokenization for search indexing
//!
//! This library splits already-normalized text into dictionary matches and
//! the unmatched gaps between them, scanning the dictionary in bounded
//! batches so memory use does not grow with the input.

pub mod config;
pub mod error;
pub mod pat;
pub mod table;
pub mod token;
pub mod tokenizer;

pub use config::TokenizerConfig;
pub use error::{ConfigError, TokenizerError};
pub use pat::PatTable;
pub use table::{Catalog, EntryId, HashTable, Hit, KeyResolver, Scanner, Table, TableKind};
pub use token::{Token, TokenKind, TokenStatus};
pub use tokenizer::{tokenize, Session, Tokenizer};
