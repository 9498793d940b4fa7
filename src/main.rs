// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for vmforge.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use serde_json::json;

use vmforge::core::error::{Diagnostic, RunError, RunReport, Severity};
use vmforge::translator::cli::{validate_cli, Cli, DiagnosticsSinkConfig, OutputFormat};

struct DiagnosticsSink {
    writer: Option<Box<dyn Write>>,
}

impl DiagnosticsSink {
    fn from_config(config: &DiagnosticsSinkConfig) -> io::Result<Self> {
        match config {
            DiagnosticsSinkConfig::Disabled => Ok(Self { writer: None }),
            DiagnosticsSinkConfig::Stderr => Ok(Self {
                writer: Some(Box::new(io::stderr())),
            }),
            DiagnosticsSinkConfig::File { path, append } => {
                let mut opts = OpenOptions::new();
                opts.create(true).write(true);
                if *append {
                    opts.append(true);
                } else {
                    opts.truncate(true);
                }
                let file = opts.open(path)?;
                Ok(Self {
                    writer: Some(Box::new(file)),
                })
            }
        }
    }

    fn emit_line(&mut self, line: &str) {
        if let Some(writer) = &mut self.writer {
            let _ = writeln!(writer, "{line}");
        }
    }

    fn emit_report_diagnostics(
        &mut self,
        report: &RunReport,
        diagnostics: &[Diagnostic],
        use_color: bool,
        format: OutputFormat,
    ) {
        for diag in diagnostics {
            self.emit_line(&format_diagnostic_line(
                diag,
                Some(report.source_lines()),
                use_color,
                format,
            ));
        }
    }

    fn emit_error_diagnostics(
        &mut self,
        err: &RunError,
        diagnostics: &[Diagnostic],
        use_color: bool,
        format: OutputFormat,
    ) {
        for diag in diagnostics {
            self.emit_line(&format_diagnostic_line(
                diag,
                Some(err.source_lines()),
                use_color,
                format,
            ));
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
    diag: &Diagnostic,
    source_lines: Option<&[String]>,
    use_color: bool,
    format: OutputFormat,
) -> String {
    if format == OutputFormat::Json {
        json!({
            "code": diag.code(),
            "severity": severity_to_str(diag.severity()),
            "message": diag.message(),
            "file": diag.file(),
            "line": diag.line(),
            "col": diag.column(),
            "help": diag.help(),
        })
        .to_string()
    } else {
        diag.format_with_context(source_lines, use_color)
    }
}

fn with_fallback_file(
    diagnostics: Vec<Diagnostic>,
    fallback_file: Option<&Path>,
) -> Vec<Diagnostic> {
    let fallback = fallback_file.map(|path| path.to_string_lossy().to_string());
    diagnostics
        .into_iter()
        .map(|diag| {
            if diag.file().is_none() {
                diag.with_file(fallback.clone())
            } else {
                diag
            }
        })
        .collect()
}

fn main() {
    let cli = Cli::parse();
    if cli.print_capabilities {
        if cli.format == OutputFormat::Json {
            println!("{}", vmforge::translator::capabilities_report_json());
        } else {
            println!("{}", vmforge::translator::capabilities_report());
        }
        return;
    }
    let cli_config = match validate_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let mut sink = match DiagnosticsSink::from_config(&cli_config.diagnostics_sink) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("Failed to open diagnostics sink: {err}");
            std::process::exit(1);
        }
    };

    let use_color = std::env::var("NO_COLOR").is_err();
    match vmforge::translator::run_with_cli(&cli) {
        Ok(report) => {
            if cli_config.quiet {
                return;
            }
            let diagnostics: Vec<Diagnostic> = report
                .diagnostics()
                .iter()
                .filter(|diag| {
                    cli_config.warning_policy.emit_warnings || diag.severity() != Severity::Warning
                })
                .cloned()
                .collect();
            let diagnostics = with_fallback_file(diagnostics, Some(cli_config.input.as_path()));
            sink.emit_report_diagnostics(
                &report,
                &diagnostics,
                use_color,
                cli_config.output_format,
            );
        }
        Err(err) => {
            let diagnostics: Vec<Diagnostic> = err
                .diagnostics()
                .iter()
                .filter(|diag| {
                    cli_config.warning_policy.emit_warnings || diag.severity() != Severity::Warning
                })
                .cloned()
                .collect();
            let diagnostics = with_fallback_file(diagnostics, Some(cli_config.input.as_path()));
            sink.emit_error_diagnostics(&err, &diagnostics, use_color, cli_config.output_format);

            if cli_config.output_format != OutputFormat::Json
                && !matches!(cli_config.diagnostics_sink, DiagnosticsSinkConfig::Disabled)
            {
                sink.emit_line(&err.to_string());
            }
            std::process::exit(1);
        }
    }
}
