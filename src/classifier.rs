// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Line classifier for assembly source.
//!
//! Classification is purely syntactic: the first candidate token of an
//! instruction line is located by byte offset, and everything else on the
//! line (indentation, label, operands, comment) is preserved verbatim by
//! the translators. Whether the token exists in the table is the
//! translator's concern, not the classifier's.

use std::ops::Range;

/// Assembler directives and pseudo-ops that are never translated.
const DIRECTIVES: &[&str] = &[
    "LIST", "INCLUDE", "CONFIG", "ORG", "EQU", "SET", "CONSTANT", "VARIABLE", "CBLOCK", "ENDC",
    "DB", "DW", "DE", "DT", "DATA", "RES", "FILL", "IF", "ELSE", "ENDIF", "IFDEF", "IFNDEF",
    "WHILE", "ENDW", "MACRO", "ENDM", "LOCAL", "EXITM", "EXPAND", "NOEXPAND", "MESSG", "ERROR",
    "ERRORLEVEL", "PAGE", "TITLE", "SUBTITLE", "SPACE", "NOLIST", "RADIX", "PROCESSOR", "END",
    "BANKSEL", "BANKISEL", "PAGESEL", "__CONFIG", "__IDLOCS", "__BADRAM", "__MAXRAM", "EXTERN",
    "GLOBAL", "CODE", "UDATA", "UDATA_SHR", "UDATA_ACS", "IDATA",
];

/// Kind of a classified source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Label,
    Directive,
    Instruction,
    Assignment,
}

/// One classified line of input.
///
/// Spans are byte ranges into `raw`. Produced transiently per line and
/// discarded once the corresponding output line is emitted.
#[derive(Debug, Clone)]
pub struct SourceLine<'a> {
    pub raw: &'a str,
    pub kind: LineKind,
    /// Label token including the trailing `:`, when present.
    pub label: Option<Range<usize>>,
    /// Candidate mnemonic/readable-name token for `Instruction` lines.
    pub token: Option<Range<usize>>,
    /// Byte offset of the `;` starting the preserved comment suffix.
    pub comment: Option<usize>,
    /// Byte offset of the top-level `=` for `Assignment` lines.
    pub eq: Option<usize>,
}

impl<'a> SourceLine<'a> {
    fn plain(raw: &'a str, kind: LineKind, comment: Option<usize>) -> Self {
        Self {
            raw,
            kind,
            label: None,
            token: None,
            comment,
            eq: None,
        }
    }

    /// Candidate token text for `Instruction` lines.
    pub fn token_text(&self) -> Option<&'a str> {
        self.token.clone().map(|span| &self.raw[span])
    }
}

pub fn is_directive(token: &str) -> bool {
    if token.starts_with('#') || token.starts_with('.') {
        return true;
    }
    DIRECTIVES.iter().any(|d| d.eq_ignore_ascii_case(token))
}

/// Classify one source line (without its terminator).
pub fn classify(raw: &str) -> SourceLine<'_> {
    let comment = find_comment(raw);
    let content_end = comment.unwrap_or(raw.len());
    let content = &raw[..content_end];

    if content.trim().is_empty() {
        let kind = if comment.is_some() {
            LineKind::Comment
        } else {
            LineKind::Blank
        };
        return SourceLine::plain(raw, kind, comment);
    }

    let (first_start, first_end) = match next_token(content, 0) {
        Some(span) => span,
        None => return SourceLine::plain(raw, LineKind::Blank, comment),
    };
    let first = &content[first_start..first_end];

    // Label token; the remainder of the line classifies on its own.
    if let Some(stripped) = first.strip_suffix(':') {
        if !stripped.is_empty() {
            let rest = classify_body(raw, content, first_end, comment);
            return SourceLine {
                label: Some(first_start..first_end),
                ..rest
            };
        }
    }

    if is_directive(first) {
        return SourceLine::plain(raw, LineKind::Directive, comment);
    }

    // MPASM symbol definition: a column-1 symbol followed by a directive
    // (`COUNT EQU 0x20`). Treating COUNT as a candidate mnemonic would
    // produce a spurious warning for every symbol definition.
    if first_start == 0 {
        if let Some((next_start, next_end)) = next_token(content, first_end) {
            if is_directive(&content[next_start..next_end]) {
                return SourceLine::plain(raw, LineKind::Directive, comment);
            }
        }
    }

    classify_body(raw, content, first_start, comment)
}

/// Classify the instruction/assignment body starting at `from`.
fn classify_body<'a>(
    raw: &'a str,
    content: &str,
    from: usize,
    comment: Option<usize>,
) -> SourceLine<'a> {
    let (start, end) = match next_token(content, from) {
        Some(span) => span,
        None => return SourceLine::plain(raw, LineKind::Label, comment),
    };

    let token = &content[start..end];
    if is_directive(token) {
        return SourceLine::plain(raw, LineKind::Directive, comment);
    }

    if let Some(eq) = find_assignment_eq(content, start) {
        return SourceLine {
            raw,
            kind: LineKind::Assignment,
            label: None,
            token: None,
            comment,
            eq: Some(eq),
        };
    }

    SourceLine {
        raw,
        kind: LineKind::Instruction,
        label: None,
        token: Some(start..end),
        comment,
        eq: None,
    }
}

/// First `;` outside single- or double-quoted regions.
fn find_comment(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    for (idx, &b) in bytes.iter().enumerate() {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'\'' | b'"' => quote = Some(b),
                b';' => return Some(idx),
                _ => {}
            },
        }
    }
    None
}

/// Next whitespace-delimited token at or after `from`, as byte offsets.
fn next_token(content: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = content.as_bytes();
    let mut start = from;
    while start < bytes.len() && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    if start >= bytes.len() {
        return None;
    }
    let mut end = start;
    while end < bytes.len() && !bytes[end].is_ascii_whitespace() {
        end += 1;
    }
    Some((start, end))
}

/// Top-level `=` of an assignment body, ignoring `==`/`<=`/`>=`/`!=`.
fn find_assignment_eq(content: &str, from: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut idx = from;
    while idx < bytes.len() {
        if bytes[idx] == b'=' {
            let prev = if idx > 0 { bytes[idx - 1] } else { b' ' };
            let next = bytes.get(idx + 1).copied().unwrap_or(b' ');
            if prev != b'=' && prev != b'<' && prev != b'>' && prev != b'!' && next != b'=' {
                return Some(idx);
            }
        }
        idx += 1;
    }
    None
}
