// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types and diagnostics for the translator.

use std::fmt;

/// Categories of translator errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasmErrorKind {
    Cli,
    Io,
    Table,
}

/// A fatal translator error with a kind and message.
///
/// `Table` errors abort before any line is processed; table integrity is a
/// precondition for round-trip correctness.
#[derive(Debug, Clone)]
pub struct RasmError {
    kind: RasmErrorKind,
    message: String,
}

impl RasmError {
    pub fn new(kind: RasmErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: match param {
                Some(p) => format!("{msg}: {p}"),
                None => msg.to_string(),
            },
        }
    }

    pub fn kind(&self) -> RasmErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RasmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RasmError {}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A per-line diagnostic collected during a translation pass.
///
/// Diagnostics are recoverable: the offending line is passed through
/// unchanged and processing continues, so one unrecognized token never
/// loses a file-worth of work.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    line: u32,
    column: Option<usize>,
    code: String,
    severity: Severity,
    token: String,
    message: String,
}

/// Diagnostic code for a token not found in the applicable map.
pub const CODE_UNKNOWN_INSTRUCTION: &str = "rasm001";

impl Diagnostic {
    pub fn unknown_instruction(line: u32, column: usize, token: &str) -> Self {
        Self {
            line,
            column: Some(column),
            code: CODE_UNKNOWN_INSTRUCTION.to_string(),
            severity: Severity::Warning,
            token: token.to_string(),
            message: format!("unknown instruction '{token}'"),
        }
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "line {}: {sev} [{}]: {}",
            self.line, self.code, self.message
        )
    }
}
