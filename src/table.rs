// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Static bidirectional instruction table.
//!
//! The table is built once at startup from two JSON sources (one per
//! instruction-set family) and is read-only afterwards. Each source is a
//! two-level mapping `language -> { readable_name: standard_mnemonic }`.
//! The loader validates integrity eagerly: ambiguous forward mappings are
//! rejected at load time, never deferred to first lookup.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::de::{Deserializer, Error as DeError, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::{RasmError, RasmErrorKind};

pub const PIC16_TABLE_FILE: &str = "pic16_instructions.json";
pub const PIC18_TABLE_FILE: &str = "pic18_instructions.json";

const BUNDLED_PIC16: &str = include_str!("../instructions/pic16_instructions.json");
const BUNDLED_PIC18: &str = include_str!("../instructions/pic18_instructions.json");

/// Readable-name language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    En,
    Si,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Si => "si",
        }
    }
}

/// Instruction-set family a caller translates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Pic16,
    Pic18,
}

impl Family {
    pub fn as_str(self) -> &'static str {
        match self {
            Family::Pic16 => "pic16",
            Family::Pic18 => "pic18",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family applicability of one table entry.
///
/// `Shared` entries resolve in both families. A PIC18-source entry becomes
/// family-specific only when the PIC16 source redefines its mnemonic with
/// a different meaning (ADDWFC, SUBWFB, BRA, CALLW, ADDFSR, MOVLB, RESET).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFamily {
    Pic16,
    Pic18,
    Shared,
}

impl EntryFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryFamily::Pic16 => "pic16",
            EntryFamily::Pic18 => "pic18",
            EntryFamily::Shared => "shared",
        }
    }

    /// Sort rank: PIC18-source entries (shared included) before PIC16 ones.
    fn rank(self) -> u8 {
        match self {
            EntryFamily::Pic18 | EntryFamily::Shared => 0,
            EntryFamily::Pic16 => 1,
        }
    }
}

/// Operation category, in reference-listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    ByteOriented,
    BitOriented,
    Literal,
    ControlBranch,
    TableReadWrite,
    Extended,
    Pic16Base,
    Pic16Enhanced,
}

impl Category {
    pub fn heading(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Category::ByteOriented, Language::En) => "Byte-oriented file register operations",
            (Category::ByteOriented, Language::Si) => "Bajtno usmerjene operacije z registrom",
            (Category::BitOriented, Language::En) => "Bit-oriented file register operations",
            (Category::BitOriented, Language::Si) => "Bitno usmerjene operacije z registrom",
            (Category::Literal, Language::En) => "Literal operations",
            (Category::Literal, Language::Si) => "Operacije s konstantami",
            (Category::ControlBranch, Language::En) => "Control / branch operations",
            (Category::ControlBranch, Language::Si) => "Krmilne / vejne operacije",
            (Category::TableReadWrite, Language::En) => "Table read / write operations",
            (Category::TableReadWrite, Language::Si) => "Operacije branja / pisanja tabele",
            (Category::Extended, Language::En) => "Extended instruction set (XINST = 1)",
            (Category::Extended, Language::Si) => "Razsirjeni nabor ukazov (XINST = 1)",
            (Category::Pic16Base, Language::En) => "PIC16 base set (unique to PIC16)",
            (Category::Pic16Base, Language::Si) => "PIC16 osnovna (samo PIC16)",
            (Category::Pic16Enhanced, Language::En) => "PIC16 enhanced mid-range (PIC16F1xxx)",
            (Category::Pic16Enhanced, Language::Si) => {
                "PIC16 razsirjeni srednji razred (PIC16F1xxx)"
            }
        }
    }
}

/// One immutable instruction mapping record.
#[derive(Debug, Clone)]
pub struct InstructionEntry {
    pub family: EntryFamily,
    pub category: Category,
    pub mnemonic: String,
    pub readable_en: String,
    pub readable_si: String,
    pub disambiguation_tag: Option<&'static str>,
}

/// Raw two-level table source schema.
///
/// The editor extension consumes these files directly, so the schema is
/// stable: top-level `en` and `si` keys, each mapping readable names to
/// standard mnemonics. Values may carry an operand-pattern indicator after
/// the mnemonic; only the first token is used.
#[derive(Debug, Deserialize)]
struct RawTableSource {
    en: NameMap,
    si: NameMap,
}

/// A readable-name map that rejects duplicate keys during deserialization.
///
/// `serde_json` silently keeps the last value for a repeated key, which
/// would turn an ambiguous forward mapping into a silent overwrite.
#[derive(Debug)]
struct NameMap(BTreeMap<String, String>);

impl<'de> Deserialize<'de> for NameMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NameMapVisitor;

        impl<'de> Visitor<'de> for NameMapVisitor {
            type Value = NameMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of readable names to standard mnemonics")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = BTreeMap::new();
                while let Some((name, mnemonic)) = access.next_entry::<String, String>()? {
                    let key = name.to_ascii_lowercase();
                    if map.insert(key, mnemonic).is_some() {
                        return Err(A::Error::custom(format!(
                            "duplicate readable name '{name}'"
                        )));
                    }
                }
                Ok(NameMap(map))
            }
        }

        deserializer.deserialize_map(NameMapVisitor)
    }
}

/// The full lookup table; immutable after construction, `Send + Sync`, and
/// safe to share across concurrent translation calls without locking.
#[derive(Debug)]
pub struct InstructionTable {
    entries: Vec<InstructionEntry>,
    forward_en: HashMap<String, String>,
    forward_si: HashMap<String, String>,
    reverse_pic16_en: HashMap<String, String>,
    reverse_pic16_si: HashMap<String, String>,
    reverse_pic18_en: HashMap<String, String>,
    reverse_pic18_si: HashMap<String, String>,
}

impl InstructionTable {
    /// Build the table from the two family sources.
    pub fn load(pic16_json: &str, pic18_json: &str) -> Result<Self, RasmError> {
        let pic16 = parse_source(pic16_json, PIC16_TABLE_FILE)?;
        let pic18 = parse_source(pic18_json, PIC18_TABLE_FILE)?;

        let pic16_pairs = pair_languages(&pic16, PIC16_TABLE_FILE)?;
        let pic18_pairs = pair_languages(&pic18, PIC18_TABLE_FILE)?;

        let pic16_mnemonics: Vec<&str> = pic16_pairs.iter().map(|p| p.mnemonic.as_str()).collect();

        let mut entries = Vec::with_capacity(pic16_pairs.len() + pic18_pairs.len());
        for pair in pic18_pairs {
            let family = if pic16_mnemonics
                .iter()
                .any(|m| m.eq_ignore_ascii_case(&pair.mnemonic))
            {
                EntryFamily::Pic18
            } else {
                EntryFamily::Shared
            };
            entries.push(InstructionEntry {
                family,
                category: category_for(Family::Pic18, &pair.mnemonic),
                disambiguation_tag: None,
                mnemonic: pair.mnemonic,
                readable_en: pair.readable_en,
                readable_si: pair.readable_si,
            });
        }
        for pair in pic16_pairs {
            entries.push(InstructionEntry {
                family: EntryFamily::Pic16,
                category: category_for(Family::Pic16, &pair.mnemonic),
                disambiguation_tag: if pair.readable_en.ends_with("_16") {
                    Some("_16")
                } else {
                    None
                },
                mnemonic: pair.mnemonic,
                readable_en: pair.readable_en,
                readable_si: pair.readable_si,
            });
        }

        entries.sort_by(|a, b| {
            (a.family.rank(), a.category, a.mnemonic.as_str()).cmp(&(
                b.family.rank(),
                b.category,
                b.mnemonic.as_str(),
            ))
        });

        let mut table = Self {
            entries,
            forward_en: HashMap::new(),
            forward_si: HashMap::new(),
            reverse_pic16_en: HashMap::new(),
            reverse_pic16_si: HashMap::new(),
            reverse_pic18_en: HashMap::new(),
            reverse_pic18_si: HashMap::new(),
        };
        table.build_forward_maps()?;
        table.build_reverse_maps();
        Ok(table)
    }

    /// Load the table sources bundled into the binary.
    pub fn bundled() -> Result<Self, RasmError> {
        Self::load(BUNDLED_PIC16, BUNDLED_PIC18)
    }

    /// Load both table sources from a directory.
    pub fn load_dir(dir: &Path) -> Result<Self, RasmError> {
        let pic16 = read_table_file(&dir.join(PIC16_TABLE_FILE))?;
        let pic18 = read_table_file(&dir.join(PIC18_TABLE_FILE))?;
        Self::load(&pic16, &pic18)
    }

    /// Look up a readable name in one language's forward map.
    pub fn lookup_forward(&self, token: &str, lang: Language) -> Option<&str> {
        let key = token.to_ascii_lowercase();
        match lang {
            Language::En => self.forward_en.get(&key),
            Language::Si => self.forward_si.get(&key),
        }
        .map(String::as_str)
    }

    /// Look up a readable name in either language.
    ///
    /// Safe without a language hint: a name mapping to two different
    /// mnemonics is rejected at load time, so at most one target exists.
    pub fn lookup_forward_any(&self, token: &str) -> Option<&str> {
        self.lookup_forward(token, Language::En)
            .or_else(|| self.lookup_forward(token, Language::Si))
    }

    /// Look up a standard mnemonic for the given target family and language.
    pub fn lookup_reverse(&self, mnemonic: &str, family: Family, lang: Language) -> Option<&str> {
        let key = mnemonic.to_ascii_uppercase();
        self.reverse_map(family, lang).get(&key).map(String::as_str)
    }

    /// All entries, sorted by family, category, then mnemonic.
    pub fn all_entries(&self) -> &[InstructionEntry] {
        &self.entries
    }

    /// Whether `token` is a known standard mnemonic in any family.
    pub fn is_mnemonic(&self, token: &str) -> bool {
        let key = token.to_ascii_uppercase();
        self.reverse_pic16_en.contains_key(&key) || self.reverse_pic18_en.contains_key(&key)
    }

    fn reverse_map(&self, family: Family, lang: Language) -> &HashMap<String, String> {
        match (family, lang) {
            (Family::Pic16, Language::En) => &self.reverse_pic16_en,
            (Family::Pic16, Language::Si) => &self.reverse_pic16_si,
            (Family::Pic18, Language::En) => &self.reverse_pic18_en,
            (Family::Pic18, Language::Si) => &self.reverse_pic18_si,
        }
    }

    fn build_forward_maps(&mut self) -> Result<(), RasmError> {
        for entry in &self.entries {
            insert_forward(&mut self.forward_en, &entry.readable_en, &entry.mnemonic)?;
            insert_forward(&mut self.forward_si, &entry.readable_si, &entry.mnemonic)?;
        }
        Ok(())
    }

    fn build_reverse_maps(&mut self) {
        // Shared entries first; family-specific entries overlay them so the
        // disambiguated readable name wins within its own family.
        for pass in [EntryFamily::Shared, EntryFamily::Pic16, EntryFamily::Pic18] {
            for entry in self.entries.iter().filter(|e| e.family == pass) {
                let key = entry.mnemonic.to_ascii_uppercase();
                match entry.family {
                    EntryFamily::Shared => {
                        self.reverse_pic16_en
                            .insert(key.clone(), entry.readable_en.clone());
                        self.reverse_pic16_si
                            .insert(key.clone(), entry.readable_si.clone());
                        self.reverse_pic18_en
                            .insert(key.clone(), entry.readable_en.clone());
                        self.reverse_pic18_si.insert(key, entry.readable_si.clone());
                    }
                    EntryFamily::Pic16 => {
                        self.reverse_pic16_en
                            .insert(key.clone(), entry.readable_en.clone());
                        self.reverse_pic16_si.insert(key, entry.readable_si.clone());
                    }
                    EntryFamily::Pic18 => {
                        self.reverse_pic18_en
                            .insert(key.clone(), entry.readable_en.clone());
                        self.reverse_pic18_si.insert(key, entry.readable_si.clone());
                    }
                }
            }
        }
    }
}

struct EntryPair {
    mnemonic: String,
    readable_en: String,
    readable_si: String,
}

fn parse_source(json: &str, file: &str) -> Result<RawTableSource, RasmError> {
    serde_json::from_str(json).map_err(|err| {
        RasmError::new(
            RasmErrorKind::Table,
            &format!("Malformed instruction table source {file}"),
            Some(&err.to_string()),
        )
    })
}

fn read_table_file(path: &Path) -> Result<String, RasmError> {
    std::fs::read_to_string(path).map_err(|err| {
        RasmError::new(
            RasmErrorKind::Io,
            &format!("Error reading instruction table {}", path.display()),
            Some(&err.to_string()),
        )
    })
}

/// Pair one source's `en` and `si` maps by mnemonic.
///
/// Within one family a mnemonic must map back to exactly one readable name
/// per language, and both languages must cover the same mnemonic set.
fn pair_languages(source: &RawTableSource, file: &str) -> Result<Vec<EntryPair>, RasmError> {
    let en = invert_language(&source.en.0, file, "en")?;
    let si = invert_language(&source.si.0, file, "si")?;

    for mnemonic in si.keys() {
        if !en.contains_key(mnemonic) {
            return Err(RasmError::new(
                RasmErrorKind::Table,
                &format!("Mnemonic defined only for 'si' in {file}"),
                Some(mnemonic),
            ));
        }
    }

    let mut pairs = Vec::with_capacity(en.len());
    for (mnemonic, readable_en) in en {
        let readable_si = si.get(&mnemonic).ok_or_else(|| {
            RasmError::new(
                RasmErrorKind::Table,
                &format!("Mnemonic defined only for 'en' in {file}"),
                Some(&mnemonic),
            )
        })?;
        pairs.push(EntryPair {
            mnemonic,
            readable_en,
            readable_si: readable_si.clone(),
        });
    }
    Ok(pairs)
}

fn invert_language(
    map: &BTreeMap<String, String>,
    file: &str,
    lang: &str,
) -> Result<BTreeMap<String, String>, RasmError> {
    let mut inverted = BTreeMap::new();
    for (readable, value) in map {
        let mnemonic = value
            .split_whitespace()
            .next()
            .ok_or_else(|| {
                RasmError::new(
                    RasmErrorKind::Table,
                    &format!("Empty mnemonic for readable name in {file} ({lang})"),
                    Some(readable),
                )
            })?
            .to_ascii_uppercase();
        if let Some(previous) = inverted.insert(mnemonic.clone(), readable.clone()) {
            return Err(RasmError::new(
                RasmErrorKind::Table,
                &format!("Mnemonic {mnemonic} has two readable names in {file} ({lang})"),
                Some(&format!("{previous}, {readable}")),
            ));
        }
    }
    Ok(inverted)
}

fn insert_forward(
    map: &mut HashMap<String, String>,
    readable: &str,
    mnemonic: &str,
) -> Result<(), RasmError> {
    let key = readable.to_ascii_lowercase();
    if let Some(existing) = map.get(&key) {
        // Same-target duplicates across families are harmless; different
        // targets would make forward translation ambiguous.
        if existing.eq_ignore_ascii_case(mnemonic) {
            return Ok(());
        }
        return Err(RasmError::new(
            RasmErrorKind::Table,
            "Readable name maps to two different mnemonics",
            Some(&format!("{readable}: {existing}, {mnemonic}")),
        ));
    }
    map.insert(key, mnemonic.to_string());
    Ok(())
}

fn category_for(source: Family, mnemonic: &str) -> Category {
    const BYTE_ORIENTED: &[&str] = &[
        "ADDWF", "ADDWFC", "ANDWF", "CLRF", "COMF", "CPFSEQ", "CPFSGT", "CPFSLT", "DECF", "DECFSZ",
        "DCFSNZ", "INCF", "INCFSZ", "INFSNZ", "IORWF", "MOVF", "MOVFF", "MOVWF", "MULWF", "NEGF",
        "RLCF", "RLNCF", "RRCF", "RRNCF", "SETF", "SUBFWB", "SUBWF", "SUBWFB", "SWAPF", "TSTFSZ",
        "XORWF",
    ];
    const BIT_ORIENTED: &[&str] = &["BCF", "BSF", "BTFSC", "BTFSS", "BTG"];
    const LITERAL: &[&str] = &[
        "ADDLW", "ANDLW", "IORLW", "MOVLB", "MOVLW", "MULLW", "SUBLW", "XORLW",
    ];
    const CONTROL_BRANCH: &[&str] = &[
        "BC", "BN", "BNC", "BNN", "BNOV", "BNZ", "BOV", "BRA", "BZ", "CALL", "CLRWDT", "DAW",
        "GOTO", "NOP", "POP", "PUSH", "RCALL", "RESET", "RETFIE", "RETLW", "RETURN", "SLEEP",
    ];
    const PIC16_BASE: &[&str] = &["CLRW", "RLF", "RRF", "OPTION", "TRIS"];

    let contains = |set: &[&str]| set.iter().any(|m| m.eq_ignore_ascii_case(mnemonic));

    match source {
        Family::Pic16 => {
            if contains(PIC16_BASE) {
                Category::Pic16Base
            } else {
                Category::Pic16Enhanced
            }
        }
        Family::Pic18 => {
            if contains(BYTE_ORIENTED) {
                Category::ByteOriented
            } else if contains(BIT_ORIENTED) {
                Category::BitOriented
            } else if contains(LITERAL) {
                Category::Literal
            } else if contains(CONTROL_BRANCH) {
                Category::ControlBranch
            } else if mnemonic.starts_with("TBLRD") || mnemonic.starts_with("TBLWT") {
                Category::TableReadWrite
            } else {
                Category::Extended
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> InstructionTable {
        InstructionTable::bundled().expect("bundled tables load")
    }

    #[test]
    fn bundled_tables_load() {
        let table = table();
        assert!(table.all_entries().len() > 90);
    }

    #[test]
    fn forward_lookup_is_case_insensitive() {
        let table = table();
        assert_eq!(
            table.lookup_forward("Move_Literal_To_W", Language::En),
            Some("MOVLW")
        );
        assert_eq!(
            table.lookup_forward("premakni_konstanto_v_w", Language::Si),
            Some("MOVLW")
        );
        assert_eq!(table.lookup_forward("move_literal_to_w", Language::Si), None);
    }

    #[test]
    fn reverse_lookup_is_family_sensitive() {
        let table = table();
        assert_eq!(
            table.lookup_reverse("ADDFSR", Family::Pic18, Language::En),
            Some("add_literal_to_fsr")
        );
        assert_eq!(
            table.lookup_reverse("ADDFSR", Family::Pic16, Language::En),
            Some("add_literal_to_fsr_16")
        );
        assert_eq!(
            table.lookup_reverse("BRA", Family::Pic16, Language::En),
            Some("branch_relative")
        );
        assert_eq!(
            table.lookup_reverse("BRA", Family::Pic18, Language::En),
            Some("branch_always")
        );
    }

    #[test]
    fn shared_mnemonics_resolve_in_both_families() {
        let table = table();
        for family in [Family::Pic16, Family::Pic18] {
            assert_eq!(
                table.lookup_reverse("DECFSZ", family, Language::En),
                Some("decrement_f_skip_if_zero")
            );
        }
    }

    #[test]
    fn pic16_unique_mnemonics_do_not_resolve_as_pic18() {
        let table = table();
        assert_eq!(
            table.lookup_reverse("RLF", Family::Pic16, Language::En),
            Some("rotate_left_f")
        );
        assert_eq!(table.lookup_reverse("RLF", Family::Pic18, Language::En), None);
    }

    #[test]
    fn every_entry_round_trips_per_token() {
        let table = table();
        for entry in table.all_entries() {
            let families: &[Family] = match entry.family {
                EntryFamily::Shared => &[Family::Pic16, Family::Pic18],
                EntryFamily::Pic16 => &[Family::Pic16],
                EntryFamily::Pic18 => &[Family::Pic18],
            };
            for &family in families {
                for (lang, readable) in [
                    (Language::En, &entry.readable_en),
                    (Language::Si, &entry.readable_si),
                ] {
                    let mnemonic = table
                        .lookup_forward(readable, lang)
                        .unwrap_or_else(|| panic!("forward lookup for {readable}"));
                    assert_eq!(
                        table.lookup_reverse(mnemonic, family, lang),
                        Some(readable.as_str()),
                        "token round-trip for {readable} ({family})"
                    );
                }
            }
        }
    }

    #[test]
    fn entries_are_sorted_and_tagged() {
        let table = table();
        let entries = table.all_entries();
        let keys: Vec<_> = entries
            .iter()
            .map(|e| {
                (
                    matches!(e.family, EntryFamily::Pic16) as u8,
                    e.category,
                    e.mnemonic.clone(),
                )
            })
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        let addfsr16 = entries
            .iter()
            .find(|e| e.family == EntryFamily::Pic16 && e.mnemonic == "ADDFSR")
            .expect("pic16 ADDFSR entry");
        assert_eq!(addfsr16.disambiguation_tag, Some("_16"));
        assert_eq!(addfsr16.category, Category::Pic16Enhanced);
    }

    #[test]
    fn duplicate_readable_name_in_one_source_is_rejected() {
        let pic16 = r#"{"en": {"clear_w": "CLRW", "CLEAR_W": "CLRF"}, "si": {"pocisti_w": "CLRW"}}"#;
        let pic18 = r#"{"en": {}, "si": {}}"#;
        let err = InstructionTable::load(pic16, pic18).unwrap_err();
        assert_eq!(err.kind(), RasmErrorKind::Table);
        assert!(err.to_string().contains("duplicate readable name"));
    }

    #[test]
    fn conflicting_forward_targets_are_rejected() {
        let pic16 = r#"{"en": {"no_operation": "CLRW"}, "si": {"brez_operacije": "CLRW"}}"#;
        let pic18 = r#"{"en": {"no_operation": "NOP"}, "si": {"brez_operacije": "NOP"}}"#;
        let err = InstructionTable::load(pic16, pic18).unwrap_err();
        assert_eq!(err.kind(), RasmErrorKind::Table);
        assert!(err.to_string().contains("two different mnemonics"));
    }

    #[test]
    fn language_mnemonic_set_mismatch_is_rejected() {
        let pic16 = r#"{"en": {"clear_w": "CLRW"}, "si": {}}"#;
        let pic18 = r#"{"en": {}, "si": {}}"#;
        let err = InstructionTable::load(pic16, pic18).unwrap_err();
        assert_eq!(err.kind(), RasmErrorKind::Table);
    }

    #[test]
    fn malformed_json_is_a_table_error() {
        let err = InstructionTable::load("{", "{}").unwrap_err();
        assert_eq!(err.kind(), RasmErrorKind::Table);
        assert!(err.to_string().contains("pic16_instructions.json"));
    }

    #[test]
    fn operand_pattern_suffix_in_values_is_ignored() {
        let pic16 = r#"{"en": {"clear_w": "CLRW"}, "si": {"pocisti_w": "CLRW"}}"#;
        let pic18 = r#"{"en": {"move_literal_to_w": "MOVLW k"}, "si": {"premakni_konstanto_v_w": "MOVLW k"}}"#;
        let table = InstructionTable::load(pic16, pic18).expect("loads");
        assert_eq!(
            table.lookup_forward("move_literal_to_w", Language::En),
            Some("MOVLW")
        );
    }
}
