//! Tokens emitted by a tokenizer session

use std::ops::Range;

use bitflags::bitflags;
use serde::Serialize;

use crate::table::EntryId;

bitflags! {
    /// Stream status attached to every token.
    ///
    /// Exactly one of `CONTINUE` and `LAST` is set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    #[serde(transparent)]
    pub struct TokenStatus: u32 {
        /// More tokens follow
        const CONTINUE = 1 << 0;
        /// Final token of the stream
        const LAST = 1 << 1;
        /// Not indexable; kept for positional continuity
        const SKIP = 1 << 2;
    }
}

impl TokenStatus {
    pub(crate) fn position(last: bool) -> Self {
        if last {
            Self::LAST
        } else {
            Self::CONTINUE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum TokenKind {
    /// Dictionary entry matched at this span
    Match(EntryId),
    /// Input that matched nothing
    Gap,
}

/// One unit of the token stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    /// Canonical dictionary key for matches, raw input for gaps
    pub text: &'a str,
    /// Byte range of the input this token accounts for
    pub span: Range<usize>,
    pub kind: TokenKind,
    pub status: TokenStatus,
}

impl<'a> Token<'a> {
    pub(crate) fn matched(id: EntryId, key: &'a str, span: Range<usize>, last: bool) -> Self {
        Self {
            text: key,
            span,
            kind: TokenKind::Match(id),
            status: TokenStatus::position(last),
        }
    }

    pub(crate) fn gap(input: &'a str, span: Range<usize>, last: bool) -> Self {
        Self {
            text: &input[span.clone()],
            span,
            kind: TokenKind::Gap,
            status: TokenStatus::position(last) | TokenStatus::SKIP,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self.kind, TokenKind::Match(_))
    }

    pub fn is_last(&self) -> bool {
        self.status.contains(TokenStatus::LAST)
    }

    pub fn is_skip(&self) -> bool {
        self.status.contains(TokenStatus::SKIP)
    }

    pub fn entry_id(&self) -> Option<EntryId> {
        match self.kind {
            TokenKind::Match(id) => Some(id),
            TokenKind::Gap => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_is_always_skip() {
        let input = "cat dog";
        let gap = Token::gap(input, 3..4, false);
        assert_eq!(gap.text, " ");
        assert!(gap.is_skip());
        assert!(!gap.is_match());
        assert_eq!(gap.status, TokenStatus::CONTINUE | TokenStatus::SKIP);

        let tail = Token::gap(input, 7..7, true);
        assert_eq!(tail.status, TokenStatus::LAST | TokenStatus::SKIP);
        assert!(tail.text.is_empty());
    }

    #[test]
    fn test_match_status() {
        let id = EntryId::new(2).unwrap();
        let token = Token::matched(id, "dog", 4..7, true);
        assert!(token.is_match());
        assert!(token.is_last());
        assert!(!token.is_skip());
        assert_eq!(token.entry_id(), Some(id));
    }

    #[test]
    fn test_serialize() {
        let id = EntryId::new(1).unwrap();
        let token = Token::matched(id, "cat", 0..3, false);
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["text"], "cat");
        assert_eq!(json["kind"]["type"], "match");
        assert_eq!(json["kind"]["id"], 1);
        assert_eq!(json["span"]["start"], 0);
        assert_eq!(json["span"]["end"], 3);
    }
}
