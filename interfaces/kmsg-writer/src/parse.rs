// Copyright (C) 2019-2021  Pierre Krieger
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Splitting of a written message into a severity and a text.

use crate::ffi::{Severity, MAX_LEN, MAX_TAG_LEN};

/// Message after it has been split.
///
/// The text borrows from the buffer that was parsed and never contains the tag, nor the comma
/// and blanks that separate it from the text.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParsedMessage<'a> {
    /// Severity selected by the tag, or [`Severity::Info`] if there was no recognized tag.
    pub severity: Severity,
    /// Text to log.
    pub text: &'a [u8],
}

/// Splits `raw` into a severity and a text.
///
/// The input is considered to end at its first NUL byte, if any, and is cut down to
/// `MAX_LEN - 1` bytes. Everything before the first comma is the tag. An unrecognized tag is
/// not an error: it is thrown away and the message is logged at the default severity.
pub fn parse(raw: &[u8]) -> ParsedMessage {
    let raw = match raw.iter().position(|b| *b == 0) {
        Some(nul) => &raw[..nul],
        None => raw,
    };
    let raw = &raw[..raw.len().min(MAX_LEN - 1)];

    let comma = match raw.iter().position(|b| *b == b',') {
        Some(pos) => pos,
        None => {
            return ParsedMessage {
                severity: Severity::default(),
                text: raw,
            }
        }
    };

    let tag = &raw[..comma.min(MAX_TAG_LEN)];
    let text = &raw[comma + 1..];
    let blanks = text
        .iter()
        .take_while(|b| **b == b' ' || **b == b'\t')
        .count();

    ParsedMessage {
        severity: Severity::from_tag(tag).unwrap_or_default(),
        text: &text[blanks..],
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::ffi::{Severity, MAX_LEN};
    use alloc::{format, vec};

    #[test]
    fn no_comma() {
        let msg = parse(b"no comma here");
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text, b"no comma here");
    }

    #[test]
    fn no_comma_is_not_trimmed() {
        let msg = parse(b"  \tspaced out \t");
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text, b"  \tspaced out \t");
    }

    #[test]
    fn macro_tag() {
        let msg = parse(b"KERN_ERR, disk failure on sdb");
        assert_eq!(msg.severity, Severity::Error);
        assert_eq!(msg.text, b"disk failure on sdb");
    }

    #[test]
    fn dotted_tag_strips_all_leading_blanks() {
        let msg = parse(b"kern.debug,   verbose trace");
        assert_eq!(msg.severity, Severity::Debug);
        assert_eq!(msg.text, b"verbose trace");

        let msg = parse(b"kern.notice,\t \t mixed");
        assert_eq!(msg.severity, Severity::Notice);
        assert_eq!(msg.text, b"mixed");
    }

    #[test]
    fn every_spelling() {
        for severity in Severity::ALL.iter() {
            for name in [severity.macro_name(), severity.dotted_name()].iter() {
                let raw = format!("{},payload", name);
                let msg = parse(raw.as_bytes());
                assert_eq!(msg.severity, *severity, "{}", name);
                assert_eq!(msg.text, b"payload");
            }
        }
    }

    #[test]
    fn unknown_tag_is_discarded() {
        let msg = parse(b"hello, world");
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text, b"world");

        let msg = parse(b"KERN_ERROR,\tnot quite");
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text, b"not quite");
    }

    #[test]
    fn empty_tag() {
        let msg = parse(b",hello");
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text, b"hello");
    }

    #[test]
    fn tag_without_text() {
        let msg = parse(b"KERN_CRIT,");
        assert_eq!(msg.severity, Severity::Critical);
        assert_eq!(msg.text, b"");

        let msg = parse(b"kern.alert,   ");
        assert_eq!(msg.severity, Severity::Alert);
        assert_eq!(msg.text, b"");
    }

    #[test]
    fn only_first_comma_separates() {
        let msg = parse(b"KERN_WARNING,a, b, c");
        assert_eq!(msg.severity, Severity::Warning);
        assert_eq!(msg.text, b"a, b, c");
    }

    #[test]
    fn other_whitespace_kept() {
        let msg = parse(b"KERN_INFO,\nnext line ");
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text, b"\nnext line ");
    }

    #[test]
    fn long_tag_never_matches() {
        // A valid spelling followed with enough garbage to go past the tag limit.
        let raw = format!("KERN_EMERG{},boom", "x".repeat(40));
        let msg = parse(raw.as_bytes());
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text, b"boom");
    }

    #[test]
    fn stops_at_nul() {
        let msg = parse(b"KERN_ERR,first\0KERN_DEBUG,second");
        assert_eq!(msg.severity, Severity::Error);
        assert_eq!(msg.text, b"first");

        let msg = parse(b"\0KERN_ERR,hidden");
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text, b"");
    }

    #[test]
    fn exactly_max_accepted_whole() {
        let raw = vec![b'a'; MAX_LEN - 1];
        let msg = parse(&raw);
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text.len(), MAX_LEN - 1);
    }

    #[test]
    fn too_long_is_truncated() {
        let raw = vec![b'a'; MAX_LEN + 1];
        let msg = parse(&raw);
        assert_eq!(msg.severity, Severity::Info);
        assert_eq!(msg.text, &raw[..MAX_LEN - 1]);
    }

    #[test]
    fn text_never_contains_tag() {
        for severity in Severity::ALL.iter() {
            let raw = format!("{}, \tsome text", severity.macro_name());
            let msg = parse(raw.as_bytes());
            assert!(!msg.text.starts_with(severity.macro_name().as_bytes()));
            assert!(!msg.text.contains(&b','));
            assert_eq!(msg.text, b"some text");
        }
    }
}
