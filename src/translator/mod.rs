// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! VM-to-assembly translation - main entry point.
//!
//! Ties the command classifier and the code generators together with the
//! CLI run flow. [`program`] assembles whole programs; [`cli`] owns the
//! argument surface; the engine translates one module at a time.

pub mod cli;
mod engine;
pub mod program;


use clap::Parser;
use serde_json::json;

use crate::core::command::Segment;
use crate::core::error::{RunError, RunReport};
use cli::Cli;

pub use cli::VERSION;

/// Run the translator with command-line arguments.
pub fn run() -> Result<RunReport, RunError> {
    let cli = Cli::parse();
    run_with_cli(&cli)
}

/// Run the translator with an already-parsed CLI.
pub fn run_with_cli(cli: &Cli) -> Result<RunReport, RunError> {
    program::run_with_cli(cli)
}

/// Deterministic capability listing for tooling, text form.
pub fn capabilities_report() -> String {
    let mut lines = vec![
        "vmforge-capabilities-v1".to_string(),
        format!("version={VERSION}"),
        "feature=directory-programs".to_string(),
        "feature=bootstrap-election".to_string(),
        "feature=segment-preload".to_string(),
        "feature=diagnostics-routing".to_string(),
        "feature=warning-policy".to_string(),
    ];
    for segment in Segment::ALL {
        lines.push(format!("segment={}", segment.name()));
    }
    format!("{}\n", lines.join("\n"))
}

/// Deterministic capability listing for tooling, JSON form.
pub fn capabilities_report_json() -> String {
    let segments: Vec<&str> = Segment::ALL.iter().map(|segment| segment.name()).collect();
    json!({
        "schema": "vmforge-capabilities-v1",
        "version": VERSION,
        "features": [
            "directory-programs",
            "bootstrap-election",
            "segment-preload",
            "diagnostics-routing",
            "warning-policy",
        ],
        "segments": segments,
    })
    .to_string()
}
