// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command line interface definition and validation.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};

use crate::core::error::{RunError, TranslateError, TranslateErrorKind};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "vmforge translates stack VM code into symbolic Hack assembly.

A single .vm file translates alone. A directory translates as one program:
modules link in a deterministic order, a Sys module (when present) moves to
the front, and the bootstrap hands control to Sys.init. Diagnostics can be
routed to stderr or a file, as plain text or JSON lines.";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "vmforge",
    version = VERSION,
    about = "Stack VM to Hack assembly translator",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    /// Diagnostics output format
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Select the diagnostics output format.\n\
                     text: human-readable diagnostics with source context.\n\
                     json: one JSON object per diagnostic line, for tooling."
    )]
    pub format: OutputFormat,

    /// Suppress diagnostics on success
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress warning output for successful runs. Errors are\n\
                     still reported and still fail the run."
    )]
    pub quiet: bool,

    /// Write diagnostics to FILE instead of stderr
    #[arg(
        short = 'E',
        long = "error",
        value_name = "FILE",
        long_help = "Route diagnostics to FILE instead of stderr. The file is\n\
                     truncated unless --error-append is also given."
    )]
    pub error_file: Option<PathBuf>,

    /// Append to the diagnostics file instead of truncating it
    #[arg(
        long = "error-append",
        action = ArgAction::SetTrue,
        requires = "error_file",
        long_help = "Append to the diagnostics file given with -E/--error\n\
                     instead of truncating it."
    )]
    pub error_append: bool,

    /// Disable the diagnostics sink entirely
    #[arg(
        long = "no-error",
        action = ArgAction::SetTrue,
        conflicts_with_all = ["error_file", "error_append"],
        long_help = "Disable diagnostics output entirely. The exit code still\n\
                     reflects translation failures."
    )]
    pub no_error: bool,

    /// Suppress warnings
    #[arg(
        short = 'w',
        long = "no-warn",
        action = ArgAction::SetTrue,
        conflicts_with = "warn_error",
        long_help = "Suppress warning diagnostics. Errors are unaffected."
    )]
    pub no_warn: bool,

    /// Treat warnings as errors
    #[arg(
        long = "Werror",
        action = ArgAction::SetTrue,
        conflicts_with = "no_warn",
        long_help = "Treat warnings as errors. Any warning fails the run and\n\
                     no output file is written."
    )]
    pub warn_error: bool,

    /// Print capability metadata and exit
    #[arg(
        long = "print-capabilities",
        action = ArgAction::SetTrue,
        long_help = "Print a deterministic description of this build's\n\
                     features and supported segments, honoring --format, then\n\
                     exit without translating."
    )]
    pub print_capabilities: bool,

    /// Output file path
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        long_help = "Write the assembly program to FILE. Defaults to the input\n\
                     stem with an .asm extension beside a file input, or\n\
                     <dir>/<dirname>.asm for a directory input."
    )]
    pub outfile: Option<PathBuf>,

    /// Write the assembly program to stdout
    #[arg(
        long = "stdout",
        action = ArgAction::SetTrue,
        conflicts_with = "outfile",
        long_help = "Write the assembly program to stdout instead of a file.\n\
                     Diagnostics keep going to the diagnostics sink."
    )]
    pub to_stdout: bool,

    /// Preload segment base registers in the bootstrap
    #[arg(
        long = "init-segments",
        action = ArgAction::SetTrue,
        long_help = "Make the bootstrap preload the segment base registers\n\
                     (LCL=300, ARG=400, THIS=3000, THAT=3010), the convention\n\
                     expected by bare-module test harnesses."
    )]
    pub init_segments: bool,

    /// Input .vm file or module directory
    #[arg(
        value_name = "INPUT",
        long_help = "Input to translate: either a single .vm file or a\n\
                     directory whose .vm files form one program."
    )]
    pub input: Option<PathBuf>,
}

/// Diagnostics output format.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where diagnostics are routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticsSinkConfig {
    Stderr,
    File { path: PathBuf, append: bool },
    Disabled,
}

/// How warnings are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningPolicy {
    pub emit_warnings: bool,
    pub treat_warnings_as_errors: bool,
}

/// Where the assembly program goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub input: PathBuf,
    pub output: OutputTarget,
    pub quiet: bool,
    pub output_format: OutputFormat,
    pub diagnostics_sink: DiagnosticsSinkConfig,
    pub warning_policy: WarningPolicy,
    pub init_segments: bool,
}

/// Validate CLI arguments, merge environment fallbacks, and build the run
/// configuration.
pub fn validate_cli(cli: &Cli) -> Result<CliConfig, RunError> {
    let Some(input) = cli.input.clone() else {
        return Err(cli_error(
            "No input specified. Provide a .vm source file or a module folder",
        ));
    };
    if !input.exists() {
        return Err(cli_error(format!(
            "Input path not found: {}",
            input.display()
        )));
    }
    let input_is_dir = input.is_dir();
    if !input_is_dir {
        let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("vm") {
            return Err(cli_error(format!(
                "Input file must use the .vm extension: {}",
                input.display()
            )));
        }
    }

    let quiet = cli.quiet || parse_env_bool("VMFORGE_QUIET")?.unwrap_or(false);
    let init_segments =
        cli.init_segments || parse_env_bool("VMFORGE_INIT_SEGMENTS")?.unwrap_or(false);

    let env_no_warn = parse_env_bool("VMFORGE_NO_WARN")?;
    let env_warn_error = parse_env_bool("VMFORGE_WERROR")?;
    let no_warn = if cli.no_warn {
        true
    } else if cli.warn_error {
        false
    } else {
        env_no_warn.unwrap_or(false)
    };
    let warn_error = if cli.warn_error {
        true
    } else if no_warn {
        false
    } else {
        env_warn_error.unwrap_or(false)
    };
    let warning_policy = WarningPolicy {
        emit_warnings: !no_warn,
        treat_warnings_as_errors: warn_error,
    };

    let env_error_file = parse_env_path("VMFORGE_ERROR_FILE");
    let env_error_append = parse_env_bool("VMFORGE_ERROR_APPEND")?.unwrap_or(false);
    let env_no_error = parse_env_bool("VMFORGE_NO_ERROR")?.unwrap_or(false);
    let diagnostics_sink = if cli.no_error || (env_no_error && cli.error_file.is_none()) {
        DiagnosticsSinkConfig::Disabled
    } else if let Some(path) = cli.error_file.clone().or(env_error_file) {
        DiagnosticsSinkConfig::File {
            path,
            append: cli.error_append || env_error_append,
        }
    } else {
        DiagnosticsSinkConfig::Stderr
    };

    let output = if cli.to_stdout {
        OutputTarget::Stdout
    } else {
        let path = match &cli.outfile {
            Some(path) => {
                let mut path = path.clone();
                if path.extension().is_none() {
                    path.set_extension("asm");
                }
                path
            }
            None => default_output_path(&input, input_is_dir),
        };
        OutputTarget::File(path)
    };

    Ok(CliConfig {
        input,
        output,
        quiet,
        output_format: cli.format,
        diagnostics_sink,
        warning_policy,
        init_segments,
    })
}

/// Default output path: beside a file input, inside a directory input.
pub fn default_output_path(input: &Path, input_is_dir: bool) -> PathBuf {
    if input_is_dir {
        let name = input.file_name().and_then(|s| s.to_str()).unwrap_or("out");
        input.join(format!("{name}.asm"))
    } else {
        input.with_extension("asm")
    }
}

fn cli_error(message: impl Into<String>) -> RunError {
    RunError::new(
        TranslateError::new(TranslateErrorKind::Cli, &message.into(), None),
        Vec::new(),
        Vec::new(),
    )
}

fn parse_env_bool(var: &str) -> Result<Option<bool>, RunError> {
    let value = match std::env::var(var) {
        Ok(value) => value,
        Err(_) => return Ok(None),
    };
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(cli_error(format!(
            "Invalid boolean value for {var}: {value}"
        ))),
    }
}

fn parse_env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var).map(PathBuf::from)
}
