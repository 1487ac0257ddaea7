// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Reverse translator: standard PIC assembly (.asm) to readable assembly.
//!
//! The caller declares the instruction-set family, since standard assembly
//! does not self-identify its family when ambiguous mnemonics are present.
//! Reverse lookup is family-sensitive: where PIC16 redefines a PIC18
//! mnemonic, the family-qualified readable name (`_16` tag) is chosen so
//! that forward translation reproduces the original mnemonic exactly.

use crate::classifier::{classify, LineKind, SourceLine};
use crate::error::Diagnostic;
use crate::table::{Family, InstructionTable, Language};
use crate::translate::Translation;

/// Options for one reverse-translation pass.
#[derive(Debug, Clone, Copy)]
pub struct ReverseOptions {
    pub family: Family,
    pub language: Language,
    /// Render MOVLW/MOVWF/MOVFF as assignment sugar (`wreg = 0x05`).
    /// Off by default: assignment output is not byte-exact under a
    /// forward round-trip, plain readable names are.
    pub assignment_style: bool,
}

impl Default for ReverseOptions {
    fn default() -> Self {
        Self {
            family: Family::Pic16,
            language: Language::En,
            assignment_style: false,
        }
    }
}

/// Translate standard PIC assembly into readable assembly.
pub fn reverse_translate(
    source: &str,
    table: &InstructionTable,
    options: ReverseOptions,
) -> Translation {
    let mut out: Vec<String> = Vec::new();
    let mut diagnostics = Vec::new();

    for (idx, raw) in source.split('\n').enumerate() {
        let line_no = (idx + 1) as u32;
        let line = classify(raw);
        match line.kind {
            LineKind::Instruction => {
                out.push(reverse_instruction(
                    &line,
                    table,
                    options,
                    line_no,
                    &mut diagnostics,
                ));
            }
            _ => out.push(raw.to_string()),
        }
    }

    Translation {
        text: out.join("\n"),
        diagnostics,
    }
}

fn reverse_instruction(
    line: &SourceLine<'_>,
    table: &InstructionTable,
    options: ReverseOptions,
    line_no: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let Some(span) = line.token.clone() else {
        return line.raw.to_string();
    };
    let token = &line.raw[span.clone()];

    let Some(readable) = table.lookup_reverse(token, options.family, options.language) else {
        // Already-readable names pass through silently so a partially
        // translated file can be run through again.
        if table.lookup_forward_any(token).is_none() {
            diagnostics.push(Diagnostic::unknown_instruction(
                line_no,
                span.start + 1,
                token,
            ));
        }
        return line.raw.to_string();
    };

    if options.assignment_style {
        if let Some(rewritten) = assignment_sugar(line, token) {
            return rewritten;
        }
    }

    let mut rewritten = String::with_capacity(line.raw.len() + readable.len());
    rewritten.push_str(&line.raw[..span.start]);
    rewritten.push_str(readable);
    rewritten.push_str(&line.raw[span.end..]);
    rewritten
}

/// Render MOVLW/MOVWF/MOVFF as assignment syntax.
///
///   MOVLW <literal>         ->  wreg = <literal>
///   MOVWF <dest>[, extra]   ->  <dest> = wreg[, extra]
///   MOVFF <src>, <dest>     ->  <dest> = <src>
///
/// Returns `None` when the mnemonic has no sugar form or its operands do
/// not fit it; the caller falls back to plain name substitution.
fn assignment_sugar(line: &SourceLine<'_>, token: &str) -> Option<String> {
    let span = line.token.clone()?;
    let content_end = line.comment.unwrap_or(line.raw.len());
    let (ops_start, ops_end) = trim_span(line.raw, span.end, content_end)?;
    let operands = &line.raw[ops_start..ops_end];

    let sugar = if token.eq_ignore_ascii_case("MOVLW") {
        format!("wreg = {operands}")
    } else if token.eq_ignore_ascii_case("MOVWF") {
        match operands.split_once(',') {
            Some((dest, extra)) => format!("{} = wreg, {}", dest.trim(), extra.trim()),
            None => format!("{operands} = wreg"),
        }
    } else if token.eq_ignore_ascii_case("MOVFF") {
        let (src, dest) = operands.split_once(',')?;
        format!("{} = {}", dest.trim(), src.trim())
    } else {
        return None;
    };

    let mut out = String::with_capacity(line.raw.len());
    out.push_str(&line.raw[..span.start]);
    out.push_str(&sugar);
    out.push_str(&line.raw[ops_end..]);
    Some(out)
}

fn trim_span(raw: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let bytes = raw.as_bytes();
    let mut s = start;
    while s < end && bytes[s].is_ascii_whitespace() {
        s += 1;
    }
    let mut e = end;
    while e > s && bytes[e - 1].is_ascii_whitespace() {
        e -= 1;
    }
    if s == e {
        None
    } else {
        Some((s, e))
    }
}
