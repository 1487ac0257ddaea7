// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Forward translator: readable assembly (.rasm) to standard PIC assembly.
//!
//! One pass, one line at a time, stateless per line. Only the candidate
//! mnemonic token is rewritten; operands, labels, comments, indentation,
//! and blank lines are copied through byte-for-byte. English and Slovenian
//! readable names may be mixed within one file.

use crate::classifier::{classify, LineKind, SourceLine};
use crate::error::Diagnostic;
use crate::table::InstructionTable;

/// Result of one translation pass: full output text plus the recoverable
/// diagnostics collected along the way.
#[derive(Debug)]
pub struct Translation {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate a readable-assembly source to standard PIC assembly.
pub fn translate(source: &str, table: &InstructionTable) -> Translation {
    let mut out: Vec<String> = Vec::new();
    let mut diagnostics = Vec::new();

    for (idx, raw) in source.split('\n').enumerate() {
        let line_no = (idx + 1) as u32;
        let line = classify(raw);
        match line.kind {
            LineKind::Instruction => {
                out.push(translate_instruction(&line, table, line_no, &mut diagnostics));
            }
            LineKind::Assignment => {
                out.push(translate_assignment(&line).unwrap_or_else(|| raw.to_string()));
            }
            _ => out.push(raw.to_string()),
        }
    }

    Translation {
        text: out.join("\n"),
        diagnostics,
    }
}

fn translate_instruction(
    line: &SourceLine<'_>,
    table: &InstructionTable,
    line_no: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let Some(span) = line.token.clone() else {
        return line.raw.to_string();
    };
    let token = &line.raw[span.clone()];

    if let Some(mnemonic) = table.lookup_forward_any(token) {
        let mut rewritten = String::with_capacity(line.raw.len());
        rewritten.push_str(&line.raw[..span.start]);
        rewritten.push_str(mnemonic);
        rewritten.push_str(&line.raw[span.end..]);
        return rewritten;
    }

    // Standard mnemonics are legal in readable files and pass through
    // silently; anything else is worth a warning.
    if !table.is_mnemonic(token) {
        diagnostics.push(Diagnostic::unknown_instruction(
            line_no,
            span.start + 1,
            token,
        ));
    }
    line.raw.to_string()
}

/// Rewrite assignment sugar to its MOV instruction.
///
///   wreg = <literal>        ->  MOVLW <literal>
///   <dest> = wreg[, extra]  ->  MOVWF <dest>[, extra]
///   <dest> = <src>          ->  MOVFF <src>, <dest>
///
/// Returns `None` for malformed assignments, which then pass through
/// unchanged.
fn translate_assignment(line: &SourceLine<'_>) -> Option<String> {
    let eq = line.eq?;
    let content_end = line.comment.unwrap_or(line.raw.len());
    let body_start = line.label.clone().map(|l| l.end).unwrap_or(0);

    let (lhs_start, lhs_end) = trim_span(line.raw, body_start, eq)?;
    let (rhs_start, rhs_end) = trim_span(line.raw, eq + 1, content_end)?;
    let lhs = &line.raw[lhs_start..lhs_end];
    let rhs = &line.raw[rhs_start..rhs_end];

    let rewritten = if lhs.eq_ignore_ascii_case("wreg") {
        format!("MOVLW {rhs}")
    } else if rhs.eq_ignore_ascii_case("wreg") {
        format!("MOVWF {lhs}")
    } else if let Some(extra) = rhs
        .split_once(',')
        .filter(|(dest, _)| dest.trim().eq_ignore_ascii_case("wreg"))
        .map(|(_, extra)| extra.trim())
    {
        format!("MOVWF {lhs}, {extra}")
    } else {
        format!("MOVFF {rhs}, {lhs}")
    };

    let mut out = String::with_capacity(line.raw.len());
    out.push_str(&line.raw[..lhs_start]);
    out.push_str(&rewritten);
    out.push_str(&line.raw[rhs_end..]);
    Some(out)
}

/// Trim a byte range to its non-whitespace core; `None` when empty.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::InstructionTable;

    fn table() -> InstructionTable {
        InstructionTable::bundled().expect("bundled tables load")
    }

    #[test]
    fn substitutes_mnemonic_and_preserves_spacing() {
        let result = translate("    move_literal_to_w 0x05         ; load 5", &table());
        assert_eq!(result.text, "    MOVLW 0x05         ; load 5");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn mixed_languages_translate_without_warnings() {
        let source = "\
    move_literal_to_w 0x05\n\
    premakni_w_v_f COUNTER\n\
    zmanjsaj_f_preskoci_ce_nic COUNTER, F\n\
    branch_always LOOP\n";
        let result = translate(source, &table());
        assert_eq!(
            result.text,
            "\
    MOVLW 0x05\n\
    MOVWF COUNTER\n\
    DECFSZ COUNTER, F\n\
    BRA LOOP\n"
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn unknown_token_warns_once_and_passes_through() {
        let source = "    move_literal_to_w 1\n    move_litteral_to_w 2\n";
        let result = translate(source, &table());
        assert!(result.text.contains("    MOVLW 1"));
        assert!(result.text.contains("    move_litteral_to_w 2"));
        assert_eq!(result.diagnostics.len(), 1);
        let diag = &result.diagnostics[0];
        assert_eq!(diag.line(), 2);
        assert_eq!(diag.token(), "move_litteral_to_w");
    }

    #[test]
    fn standard_mnemonics_pass_through_silently() {
        let result = translate("    MOVLW 0x05\n    movwf COUNTER\n", &table());
        assert_eq!(result.text, "    MOVLW 0x05\n    movwf COUNTER\n");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn labels_comments_and_directives_are_untouched() {
        let source = "\
; delay loop\n\
DELAY_COUNT1 EQU 0x20\n\
\n\
DELAY: decrement_f_skip_if_zero DELAY_COUNT1, F\n\
    goto_address DELAY\n\
    END\n";
        let result = translate(source, &table());
        assert_eq!(
            result.text,
            "\
; delay loop\n\
DELAY_COUNT1 EQU 0x20\n\
\n\
DELAY: DECFSZ DELAY_COUNT1, F\n\
    GOTO DELAY\n\
    END\n"
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn readable_name_case_is_folded_to_canonical_mnemonic() {
        let result = translate("    Move_Literal_To_W 1", &table());
        assert_eq!(result.text, "    MOVLW 1");
    }

    #[test]
    fn assignment_sugar_is_rewritten() {
        let t = table();
        assert_eq!(
            translate("    wreg = 0x05 ; load", &t).text,
            "    MOVLW 0x05 ; load"
        );
        assert_eq!(translate("    COUNTER = wreg", &t).text, "    MOVWF COUNTER");
        assert_eq!(
            translate("    COUNTER = wreg, ACCESS", &t).text,
            "    MOVWF COUNTER, ACCESS"
        );
        assert_eq!(
            translate("    DEST = SRC ; copy", &t).text,
            "    MOVFF SRC, DEST ; copy"
        );
    }

    #[test]
    fn labeled_assignment_keeps_the_label() {
        let result = translate("INIT: wreg = 0x10", &table());
        assert_eq!(result.text, "INIT: MOVLW 0x10");
    }

    #[test]
    fn trailing_newline_is_preserved_exactly() {
        let t = table();
        assert_eq!(translate("    no_operation\n", &t).text, "    NOP\n");
        assert_eq!(translate("    no_operation", &t).text, "    NOP");
    }
}
