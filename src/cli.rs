// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing, environment overlays, and the
//! diagnostics sink shared by both translator binaries.

use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::builder::PossibleValue;
use clap::{ArgAction, Args, ValueEnum};
use serde_json::json;

use crate::error::{Diagnostic, RasmError, RasmErrorKind, Severity};
use crate::table::{Family, InstructionTable, Language};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

impl ValueEnum for Language {
    fn value_variants<'a>() -> &'a [Self] {
        &[Language::En, Language::Si]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.as_str()))
    }
}

impl ValueEnum for Family {
    fn value_variants<'a>() -> &'a [Self] {
        &[Family::Pic16, Family::Pic18]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Flags shared by both binaries: diagnostics routing, warning policy,
/// table source, and output format.
#[derive(Args, Debug)]
pub struct CommonOpts {
    #[arg(
        long = "tables",
        value_name = "DIR",
        long_help = "Load pic16_instructions.json and pic18_instructions.json from DIR instead of the bundled tables."
    )]
    pub tables: Option<PathBuf>,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select global CLI output format. text is default; json enables machine-readable output where supported."
    )]
    pub format: OutputFormat,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress the success note printed after writing an output file. Warnings are still reported unless -w is set."
    )]
    pub quiet: bool,
    #[arg(
        short = 'E',
        long = "error",
        value_name = "FILE",
        long_help = "Write diagnostics to FILE instead of stderr."
    )]
    pub error_file: Option<PathBuf>,
    #[arg(
        long = "error-append",
        action = ArgAction::SetTrue,
        requires = "error_file",
        long_help = "Append diagnostics to --error FILE instead of truncating it."
    )]
    pub error_append: bool,
    #[arg(
        long = "no-error",
        action = ArgAction::SetTrue,
        conflicts_with_all = ["error_file", "error_append"],
        long_help = "Disable all diagnostic output routing."
    )]
    pub no_error: bool,
    #[arg(
        short = 'w',
        long = "no-warn",
        action = ArgAction::SetTrue,
        conflicts_with = "warn_error",
        long_help = "Suppress warning diagnostics."
    )]
    pub no_warn: bool,
    #[arg(
        long = "Werror",
        action = ArgAction::SetTrue,
        conflicts_with = "no_warn",
        long_help = "Treat warnings as errors (non-zero exit status)."
    )]
    pub warn_error: bool,
}

#[derive(Debug, Clone)]
pub enum DiagnosticsSinkConfig {
    Stderr,
    File { path: PathBuf, append: bool },
    Disabled,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WarningPolicy {
    pub emit_warnings: bool,
    pub treat_warnings_as_errors: bool,
}

/// Validated shared configuration after environment overlays.
#[derive(Debug)]
pub struct CommonConfig {
    pub table_dir: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub diagnostics_sink: DiagnosticsSinkConfig,
    pub warning_policy: WarningPolicy,
}

/// Resolve the shared flags against their PICRASM_* environment overlays.
/// Explicit CLI flags win over the environment.
pub fn validate_common(opts: &CommonOpts) -> Result<CommonConfig, RasmError> {
    let env_table_dir = parse_env_path("PICRASM_TABLE_DIR")?;
    let env_quiet = parse_env_bool("PICRASM_QUIET")?;
    let env_no_warn = parse_env_bool("PICRASM_NO_WARN")?;
    let env_warn_error = parse_env_bool("PICRASM_WERROR")?;
    let env_error_file = parse_env_path("PICRASM_ERROR_FILE")?;
    let env_error_append = parse_env_bool("PICRASM_ERROR_APPEND")?;
    let env_no_error = parse_env_bool("PICRASM_NO_ERROR")?;

    let table_dir = opts.tables.clone().or(env_table_dir);
    let quiet = opts.quiet || env_quiet.unwrap_or(false);
    let no_warn = opts.no_warn || env_no_warn.unwrap_or(false);
    let warn_error = opts.warn_error || env_warn_error.unwrap_or(false);
    let error_file = opts.error_file.clone().or(env_error_file);
    let error_append = opts.error_append || env_error_append.unwrap_or(false);
    let no_error = opts.no_error || env_no_error.unwrap_or(false);

    if no_warn && warn_error {
        return Err(RasmError::new(
            RasmErrorKind::Cli,
            "Conflicting options: --no-warn with --Werror",
            None,
        ));
    }

    Ok(CommonConfig {
        table_dir,
        output_format: opts.format,
        quiet,
        diagnostics_sink: if no_error {
            DiagnosticsSinkConfig::Disabled
        } else if let Some(path) = error_file {
            DiagnosticsSinkConfig::File {
                path,
                append: error_append,
            }
        } else {
            DiagnosticsSinkConfig::Stderr
        },
        warning_policy: WarningPolicy {
            emit_warnings: !no_warn,
            treat_warnings_as_errors: warn_error,
        },
    })
}

/// Load the instruction table per the resolved configuration.
pub fn load_table(config: &CommonConfig) -> Result<InstructionTable, RasmError> {
    match &config.table_dir {
        Some(dir) => InstructionTable::load_dir(dir),
        None => InstructionTable::bundled(),
    }
}

fn parse_env_bool(var_name: &str) -> Result<Option<bool>, RasmError> {
    let Some(raw) = env::var_os(var_name) else {
        return Ok(None);
    };
    let value = raw.to_string_lossy().trim().to_ascii_lowercase();
    let parsed = match value.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        "" => None,
        _ => {
            return Err(RasmError::new(
                RasmErrorKind::Cli,
                &format!("Invalid boolean value for {var_name}"),
                Some(&value),
            ))
        }
    };
    Ok(parsed)
}

fn parse_env_path(var_name: &str) -> Result<Option<PathBuf>, RasmError> {
    let Some(raw) = env::var_os(var_name) else {
        return Ok(None);
    };
    let value = raw.to_string_lossy().trim().to_string();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(value)))
}

/// Where translation diagnostics go.
pub struct DiagnosticsSink {
    writer: Option<Box<dyn Write>>,
    use_color: bool,
}

impl DiagnosticsSink {
    pub fn from_config(config: &DiagnosticsSinkConfig) -> Result<Self, RasmError> {
        match config {
            DiagnosticsSinkConfig::Disabled => Ok(Self {
                writer: None,
                use_color: false,
            }),
            DiagnosticsSinkConfig::Stderr => Ok(Self {
                writer: Some(Box::new(io::stderr())),
                use_color: env::var_os("NO_COLOR").is_none(),
            }),
            DiagnosticsSinkConfig::File { path, append } => {
                let mut opts = OpenOptions::new();
                opts.create(true).write(true);
                if *append {
                    opts.append(true);
                } else {
                    opts.truncate(true);
                }
                let file = opts.open(path).map_err(|err| {
                    RasmError::new(
                        RasmErrorKind::Io,
                        &format!("Error opening diagnostics file {}", path.display()),
                        Some(&err.to_string()),
                    )
                })?;
                Ok(Self {
                    writer: Some(Box::new(file)),
                    use_color: false,
                })
            }
        }
    }

    fn emit_line(&mut self, line: &str) {
        if let Some(writer) = &mut self.writer {
            let _ = writeln!(writer, "{line}");
        }
    }

    pub fn emit_diagnostics(
        &mut self,
        file: &Path,
        diagnostics: &[Diagnostic],
        policy: WarningPolicy,
        format: OutputFormat,
    ) {
        for diag in diagnostics {
            if diag.severity() == Severity::Warning && !policy.emit_warnings {
                continue;
            }
            self.emit_line(&format_diagnostic_line(file, diag, format, self.use_color));
        }
    }
}

fn severity_to_str(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

fn format_diagnostic_line(
    file: &Path,
    diag: &Diagnostic,
    format: OutputFormat,
    use_color: bool,
) -> String {
    if format == OutputFormat::Json {
        return json!({
            "file": file.display().to_string(),
            "line": diag.line(),
            "column": diag.column(),
            "code": diag.code(),
            "severity": severity_to_str(diag.severity()),
            "token": diag.token(),
            "message": diag.message(),
        })
        .to_string();
    }

    let sev = severity_to_str(diag.severity());
    let sev = if use_color {
        match diag.severity() {
            Severity::Warning => format!("\x1b[33m{sev}\x1b[0m"),
            Severity::Error => format!("\x1b[31m{sev}\x1b[0m"),
        }
    } else {
        sev.to_string()
    };
    format!(
        "{}:{}: {sev} [{}]: {}",
        file.display(),
        diag.line(),
        diag.code(),
        diag.message()
    )
}

/// Exit status for a completed translation run.
pub fn exit_code(diagnostics: &[Diagnostic], policy: WarningPolicy) -> i32 {
    let has_warnings = diagnostics
        .iter()
        .any(|d| d.severity() == Severity::Warning);
    let has_errors = diagnostics.iter().any(|d| d.severity() == Severity::Error);
    if has_errors || (has_warnings && policy.treat_warnings_as_errors) {
        1
    } else {
        0
    }
}

/// Read a source file, mapping failures to an `Io` error.
pub fn read_input(path: &Path) -> Result<String, RasmError> {
    std::fs::read_to_string(path).map_err(|err| {
        RasmError::new(
            RasmErrorKind::Io,
            &format!("Error reading input file {}", path.display()),
            Some(&err.to_string()),
        )
    })
}

/// Write translated output to `path`, or to stdout when no path is given.
/// Returns true when a file was written (so the caller can print its
/// success note).
pub fn write_output(path: Option<&Path>, text: &str) -> Result<bool, RasmError> {
    match path {
        Some(path) => {
            std::fs::write(path, text).map_err(|err| {
                RasmError::new(
                    RasmErrorKind::Io,
                    &format!("Error writing output file {}", path.display()),
                    Some(&err.to_string()),
                )
            })?;
            Ok(true)
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes()).map_err(|err| {
                RasmError::new(
                    RasmErrorKind::Io,
                    "Error writing to stdout",
                    Some(&err.to_string()),
                )
            })?;
            Ok(false)
        }
    }
}
