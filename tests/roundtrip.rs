// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! End-to-end round-trip checks over complete programs.

use picrasm::reverse::{reverse_translate, ReverseOptions};
use picrasm::table::{Family, InstructionTable, Language};
use picrasm::translate::translate;

fn table() -> InstructionTable {
    InstructionTable::bundled().expect("bundled tables load")
}

const BLINK_RASM: &str = "\
; LED blink for PIC18F4550
    LIST P=18F4550
#include <p18f4550.inc>

DELAY_COUNT1 EQU 0x20
DELAY_COUNT2 EQU 0x21

    ORG 0x0000
    goto_address MAIN

MAIN:
    clear_f TRISD, ACCESS          ; port D output
LOOP:
    set_f LATD, ACCESS
    call_subroutine DELAY
    clear_f LATD, ACCESS
    call_subroutine DELAY
    branch_always LOOP

DELAY:
    move_literal_to_w 0xFF
    move_w_to_f DELAY_COUNT1
OUTER:
    move_literal_to_w 0xFF
    move_w_to_f DELAY_COUNT2
INNER:
    decrement_f_skip_if_zero DELAY_COUNT2, F
    goto_address INNER
    decrement_f_skip_if_zero DELAY_COUNT1, F
    goto_address OUTER
    return_from_subroutine

    END
";

const BLINK_ASM: &str = "\
; LED blink for PIC18F4550
    LIST P=18F4550
#include <p18f4550.inc>

DELAY_COUNT1 EQU 0x20
DELAY_COUNT2 EQU 0x21

    ORG 0x0000
    GOTO MAIN

MAIN:
    CLRF TRISD, ACCESS          ; port D output
LOOP:
    SETF LATD, ACCESS
    CALL DELAY
    CLRF LATD, ACCESS
    CALL DELAY
    BRA LOOP

DELAY:
    MOVLW 0xFF
    MOVWF DELAY_COUNT1
OUTER:
    MOVLW 0xFF
    MOVWF DELAY_COUNT2
INNER:
    DECFSZ DELAY_COUNT2, F
    GOTO INNER
    DECFSZ DELAY_COUNT1, F
    GOTO OUTER
    RETURN

    END
";

#[test]
fn forward_translation_of_a_full_program() {
    let result = translate(BLINK_RASM, &table());
    assert_eq!(result.text, BLINK_ASM);
    assert!(result.diagnostics.is_empty());
}

#[test]
fn reverse_then_forward_is_byte_exact() {
    let t = table();
    let options = ReverseOptions {
        family: Family::Pic18,
        language: Language::En,
        assignment_style: false,
    };
    let readable = reverse_translate(BLINK_ASM, &t, options);
    assert!(readable.diagnostics.is_empty());
    assert_eq!(readable.text, BLINK_RASM);

    let back = translate(&readable.text, &t);
    assert!(back.diagnostics.is_empty());
    assert_eq!(back.text, BLINK_ASM);
}

#[test]
fn slovenian_round_trip_is_byte_exact() {
    let t = table();
    let options = ReverseOptions {
        family: Family::Pic18,
        language: Language::Si,
        assignment_style: false,
    };
    let readable = reverse_translate(BLINK_ASM, &t, options);
    assert!(readable.diagnostics.is_empty());
    assert!(readable.text.contains("premakni_konstanto_v_w 0xFF"));

    let back = translate(&readable.text, &t);
    assert!(back.diagnostics.is_empty());
    assert_eq!(back.text, BLINK_ASM);
}

#[test]
fn pic16_enhanced_program_round_trips_under_its_own_family() {
    let t = table();
    let source = "\
    MOVLB 0x01
    MOVLW 0x0F
    MOVWF COUNT
STEP:
    LSLF COUNT, F
    ADDFSR FSR0, 4
    BRA STEP
    RESET
";
    let options = ReverseOptions {
        family: Family::Pic16,
        language: Language::En,
        assignment_style: false,
    };
    let readable = reverse_translate(source, &t, options);
    assert!(readable.diagnostics.is_empty());
    assert!(readable.text.contains("move_literal_to_bsr_16 0x01"));
    assert!(readable.text.contains("branch_relative STEP"));
    assert!(readable.text.contains("software_reset_16"));

    let back = translate(&readable.text, &t);
    assert!(back.diagnostics.is_empty());
    assert_eq!(back.text, source);
}

#[test]
fn assignment_output_survives_a_forward_pass() {
    let t = table();
    let source = "\
    MOVLW 0x05
    MOVWF COUNTER
    MOVFF SRC, DEST
";
    let options = ReverseOptions {
        family: Family::Pic18,
        language: Language::En,
        assignment_style: true,
    };
    let readable = reverse_translate(source, &t, options);
    assert_eq!(
        readable.text,
        "\
    wreg = 0x05
    COUNTER = wreg
    DEST = SRC
"
    );
    let back = translate(&readable.text, &t);
    assert!(back.diagnostics.is_empty());
    assert_eq!(back.text, source);
}

#[test]
fn partially_translated_input_converges() {
    let t = table();
    // A file where some lines were already translated by an earlier pass.
    let mixed = "\
    MOVLW 0x05
    move_w_to_f COUNTER
    premakni_konstanto_v_w 0x0A
";
    let result = translate(mixed, &t);
    assert_eq!(
        result.text,
        "\
    MOVLW 0x05
    MOVWF COUNTER
    MOVLW 0x0A
"
    );
    assert!(result.diagnostics.is_empty());
}
