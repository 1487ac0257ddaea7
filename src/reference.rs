// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Instruction reference listing, rendered from the loaded table.
//!
//! Four sections in fixed order: PIC18 English, PIC18 Slovenian, PIC16
//! English, PIC16 Slovenian. The PIC18 sections list shared entries too;
//! the PIC16 sections list only the PIC16-specific additions.

use serde_json::{json, Value};

use crate::table::{Category, EntryFamily, InstructionEntry, InstructionTable, Language};

const BANNER_WIDTH: usize = 72;
const NAME_COLUMN: usize = 48;

struct Section {
    title: &'static str,
    language: Language,
    mnemonic_header: &'static str,
    families: &'static [EntryFamily],
    categories: &'static [Category],
}

const SECTIONS: &[Section] = &[
    Section {
        title: "PIC18 READABLE ASSEMBLY - INSTRUCTION REFERENCE (ENGLISH)",
        language: Language::En,
        mnemonic_header: "PIC18 Mnemonic",
        families: &[EntryFamily::Shared, EntryFamily::Pic18],
        categories: &[
            Category::ByteOriented,
            Category::BitOriented,
            Category::Literal,
            Category::ControlBranch,
            Category::TableReadWrite,
            Category::Extended,
        ],
    },
    Section {
        title: "PIC18 BERLJIV ZBIRNIK - SEZNAM UKAZOV (SLOVENSCINA)",
        language: Language::Si,
        mnemonic_header: "PIC18 Mnemonic",
        families: &[EntryFamily::Shared, EntryFamily::Pic18],
        categories: &[
            Category::ByteOriented,
            Category::BitOriented,
            Category::Literal,
            Category::ControlBranch,
            Category::TableReadWrite,
            Category::Extended,
        ],
    },
    Section {
        title: "PIC16 READABLE ASSEMBLY - INSTRUCTION REFERENCE (ENGLISH)",
        language: Language::En,
        mnemonic_header: "PIC16 Mnemonic",
        families: &[EntryFamily::Pic16],
        categories: &[Category::Pic16Base, Category::Pic16Enhanced],
    },
    Section {
        title: "PIC16 BERLJIV ZBIRNIK - SEZNAM UKAZOV (SLOVENSCINA)",
        language: Language::Si,
        mnemonic_header: "PIC16 Mnemonic",
        families: &[EntryFamily::Pic16],
        categories: &[Category::Pic16Base, Category::Pic16Enhanced],
    },
];

fn readable<'a>(entry: &'a InstructionEntry, language: Language) -> &'a str {
    match language {
        Language::En => &entry.readable_en,
        Language::Si => &entry.readable_si,
    }
}

/// Render the full plain-text reference listing.
pub fn render_reference(table: &InstructionTable) -> String {
    let mut out = String::new();
    for section in SECTIONS {
        out.push_str(&"=".repeat(BANNER_WIDTH));
        out.push('\n');
        out.push_str(&format!("  {}\n", section.title));
        out.push_str(&"=".repeat(BANNER_WIDTH));
        out.push('\n');

        for &category in section.categories {
            let rows: Vec<&InstructionEntry> = table
                .all_entries()
                .iter()
                .filter(|e| section.families.contains(&e.family) && e.category == category)
                .collect();
            if rows.is_empty() {
                continue;
            }

            let heading = category.heading(section.language);
            let pad = BANNER_WIDTH.saturating_sub(heading.len() + 4).max(4);
            out.push_str(&format!("\n-- {heading} {}\n", "-".repeat(pad)));
            out.push_str(&format!(
                "  {:<width$} {}\n",
                "Readable Name",
                section.mnemonic_header,
                width = NAME_COLUMN
            ));
            out.push_str(&format!(
                "  {} {}\n",
                "-".repeat(NAME_COLUMN),
                "-".repeat(14)
            ));
            for entry in rows {
                out.push_str(&format!(
                    "  {:<width$} {}\n",
                    readable(entry, section.language),
                    entry.mnemonic,
                    width = NAME_COLUMN
                ));
            }
        }
        out.push('\n');
    }
    out
}

/// Render the reference as a JSON document, one object per table entry.
pub fn render_reference_json(table: &InstructionTable) -> Value {
    let entries: Vec<Value> = table
        .all_entries()
        .iter()
        .map(|entry| {
            json!({
                "mnemonic": entry.mnemonic,
                "family": entry.family.as_str(),
                "category": entry.category.heading(Language::En),
                "readable_en": entry.readable_en,
                "readable_si": entry.readable_si,
            })
        })
        .collect();
    json!({ "instructions": entries })
}
