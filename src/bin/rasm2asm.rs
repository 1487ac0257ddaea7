// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Readable assembly (.rasm) to standard PIC assembly (.asm).

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser};

use picrasm::cli::{
    exit_code, load_table, read_input, validate_common, write_output, CommonOpts, DiagnosticsSink,
    OutputFormat, VERSION,
};
use picrasm::reference::{render_reference, render_reference_json};
use picrasm::translate::translate;

const LONG_ABOUT: &str = "Translate readable PIC16/PIC18 assembly (.rasm) to standard PIC assembly.

English and Slovenian readable names may be mixed within one input file.
Standard mnemonics already present in the input pass through unchanged.
Omit INPUT to print the full instruction reference instead.";

#[derive(Parser, Debug)]
#[command(
    name = "rasm2asm",
    version = VERSION,
    about = "Readable PIC16/PIC18 assembly to standard assembly",
    long_about = LONG_ABOUT
)]
struct Cli {
    #[arg(
        value_name = "INPUT",
        long_help = "Input file with readable assembly (.rasm). Omit to print the instruction reference."
    )]
    input: Option<PathBuf>,
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        long_help = "Output file for the translated assembly. Defaults to stdout."
    )]
    output: Option<PathBuf>,
    #[arg(
        long = "ref",
        action = ArgAction::SetTrue,
        long_help = "Print the full instruction reference table and exit."
    )]
    show_reference: bool,
    #[command(flatten)]
    common: CommonOpts,
}

fn run(cli: &Cli) -> Result<i32, picrasm::error::RasmError> {
    let config = validate_common(&cli.common)?;
    let table = load_table(&config)?;

    if cli.show_reference || cli.input.is_none() {
        match config.output_format {
            OutputFormat::Text => print!("{}", render_reference(&table)),
            OutputFormat::Json => println!("{}", render_reference_json(&table)),
        }
    }

    let Some(input) = cli.input.as_deref() else {
        return Ok(0);
    };
    let source = read_input(input)?;
    let result = translate(&source, &table);

    let mut sink = DiagnosticsSink::from_config(&config.diagnostics_sink)?;
    sink.emit_diagnostics(
        input,
        &result.diagnostics,
        config.warning_policy,
        config.output_format,
    );

    if write_output(cli.output.as_deref(), &result.text)? && !config.quiet {
        if let Some(path) = &cli.output {
            eprintln!("Translated assembly written to: {}", path.display());
        }
    }

    Ok(exit_code(&result.diagnostics, config.warning_policy))
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("rasm2asm: {err}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_is_optional() {
        let cli = Cli::parse_from(["rasm2asm"]);
        assert!(cli.input.is_none());
        assert!(!cli.show_reference);
    }

    #[test]
    fn reference_flag_parses_alongside_an_input() {
        let cli = Cli::parse_from(["rasm2asm", "--ref", "blink.rasm"]);
        assert!(cli.show_reference);
        assert_eq!(cli.input, Some(PathBuf::from("blink.rasm")));
    }

    #[test]
    fn output_and_diagnostics_flags_parse() {
        let cli = Cli::parse_from([
            "rasm2asm", "blink.rasm", "-o", "blink.asm", "-q", "-E", "diag.log",
        ]);
        assert_eq!(cli.output, Some(PathBuf::from("blink.asm")));
        assert!(cli.common.quiet);
        assert_eq!(cli.common.error_file, Some(PathBuf::from("diag.log")));
    }
}
