// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Program assembly: module discovery, link order, bootstrap, and epilogue.
//!
//! A program is one or more modules translated with a shared label
//! allocator. Modules link in name order with a `Sys` module moved to the
//! front; the bootstrap runs first and the terminal spin loop comes last,
//! so a machine that falls off the end idles instead of executing garbage.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::codegen::frame;
use crate::core::error::{
    Diagnostic, RunError, RunReport, Severity, TranslateError, TranslateErrorKind,
};
use crate::core::labels::LabelAllocator;

use super::cli::{validate_cli, Cli, CliConfig, OutputTarget};
use super::engine::Translator;

/// Runtime stack base; the bootstrap points SP here.
pub(crate) const STACK_BASE: u16 = 256;

// Test-harness convention for bare-module programs.
const SEGMENT_PRELOAD: [(&str, u16); 4] =
    [("LCL", 300), ("ARG", 400), ("THIS", 3000), ("THAT", 3010)];

/// One named module's source lines.
#[derive(Debug, Clone)]
pub struct SourceModule {
    pub name: String,
    pub lines: Vec<String>,
}

/// Knobs for assembling a program.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramOptions {
    pub init_segments: bool,
}

/// A translated program plus any warnings raised while assembling it.
#[derive(Debug)]
pub struct ProgramOutput {
    pub assembly: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Translate a set of modules into one assembly program.
///
/// The presence of a module named `Sys` decides the bootstrap: with one,
/// the bootstrap calls `Sys.init`; without one, it only seats the stack
/// pointer. A multi-module program with no `Sys` module raises a warning.
pub fn translate_program(
    modules: &[SourceModule],
    options: &ProgramOptions,
) -> Result<ProgramOutput, RunError> {
    let ordered = link_order(modules);
    let has_sys = ordered.iter().any(|module| module.name == "Sys");

    let mut labels = LabelAllocator::new();
    let mut assembly = Vec::new();
    let mut diagnostics = Vec::new();

    emit_bootstrap(&mut assembly, has_sys, options.init_segments, &mut labels);
    if !has_sys && ordered.len() > 1 {
        let err = TranslateError::new(
            TranslateErrorKind::Translator,
            "No Sys module in program; bootstrap will not call Sys.init",
            None,
        );
        diagnostics.push(
            Diagnostic::new(1, Severity::Warning, err)
                .with_help("add a Sys module with a Sys.init function to receive control"),
        );
    }

    for module in ordered {
        let translator = Translator::new(&module.name, &mut labels);
        match translator.translate(&module.lines) {
            Ok(block) => assembly.extend(block),
            Err(diag) => {
                let line_idx = diag.line().saturating_sub(1) as usize;
                let source = module.lines.get(line_idx).cloned();
                let diag = diag
                    .with_file(Some(format!("{}.vm", module.name)))
                    .with_source(source);
                return Err(RunError::new(
                    TranslateError::new(
                        TranslateErrorKind::Translator,
                        "Errors detected in source. No assembly file written.",
                        None,
                    ),
                    vec![diag],
                    module.lines.clone(),
                ));
            }
        }
    }

    emit_epilogue(&mut assembly, &mut labels);
    Ok(ProgramOutput {
        assembly,
        diagnostics,
    })
}

/// Modules sort by name, then a `Sys` module is pulled to position 0, so
/// link order is independent of filesystem enumeration order.
fn link_order(modules: &[SourceModule]) -> Vec<&SourceModule> {
    let mut ordered: Vec<&SourceModule> = modules.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(pos) = ordered.iter().position(|module| module.name == "Sys") {
        let sys = ordered.remove(pos);
        ordered.insert(0, sys);
    }
    ordered
}

fn emit_bootstrap(
    out: &mut Vec<String>,
    call_sys_init: bool,
    init_segments: bool,
    labels: &mut LabelAllocator,
) {
    out.push(format!("@{STACK_BASE}"));
    out.push("D=A".to_string());
    out.push("@SP".to_string());
    out.push("M=D".to_string());
    if init_segments {
        for (register, value) in SEGMENT_PRELOAD {
            out.push(format!("@{value}"));
            out.push("D=A".to_string());
            out.push(format!("@{register}"));
            out.push("M=D".to_string());
        }
    }
    if call_sys_init {
        frame::emit_call(out, "Sys.init", 0, labels);
    }
}

fn emit_epilogue(out: &mut Vec<String>, labels: &mut LabelAllocator) {
    let halt = labels.next();
    out.push(format!("({halt})"));
    out.push(format!("@{halt}"));
    out.push("0;JMP".to_string());
}

pub(super) fn run_with_cli(cli: &Cli) -> Result<RunReport, RunError> {
    if cli.print_capabilities {
        return Ok(RunReport::new(Vec::new(), Vec::new()));
    }
    let config = validate_cli(cli)?;
    let modules = load_modules(&config.input)?;
    let source_lines: Vec<String> = if modules.len() == 1 {
        modules[0].lines.clone()
    } else {
        Vec::new()
    };

    let options = ProgramOptions {
        init_segments: config.init_segments,
    };
    let output = translate_program(&modules, &options)?;

    if config.warning_policy.treat_warnings_as_errors {
        let mut escalated: Vec<Diagnostic> = Vec::new();
        for diag in &output.diagnostics {
            if diag.severity() == Severity::Warning {
                let mut diag = diag.clone();
                diag.severity = Severity::Error;
                escalated.push(diag);
            }
        }
        if !escalated.is_empty() {
            return Err(RunError::new(
                TranslateError::new(
                    TranslateErrorKind::Translator,
                    "Warnings treated as errors (--Werror)",
                    None,
                ),
                escalated,
                source_lines,
            ));
        }
    }

    write_output(&config, &output.assembly)?;
    Ok(RunReport::new(output.diagnostics, source_lines))
}

fn load_modules(input: &Path) -> Result<Vec<SourceModule>, RunError> {
    if input.is_dir() {
        load_module_dir(input)
    } else {
        Ok(vec![load_module_file(input)?])
    }
}

fn load_module_file(path: &Path) -> Result<SourceModule, RunError> {
    let name = match path.file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => {
            return Err(io_error(
                "Invalid input file name",
                &path.to_string_lossy(),
            ));
        }
    };
    let text = fs::read_to_string(path)
        .map_err(|_| io_error("Error reading input file", &path.to_string_lossy()))?;
    Ok(SourceModule {
        name,
        lines: text.lines().map(str::to_string).collect(),
    })
}

fn load_module_dir(dir: &Path) -> Result<Vec<SourceModule>, RunError> {
    let entries = fs::read_dir(dir)
        .map_err(|_| io_error("Error reading input folder", &dir.to_string_lossy()))?;
    let mut modules = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|_| io_error("Error reading input folder", &dir.to_string_lossy()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("vm") {
            continue;
        }
        modules.push(load_module_file(&path)?);
    }
    if modules.is_empty() {
        return Err(io_error(
            "Input folder contains no .vm modules",
            &dir.to_string_lossy(),
        ));
    }
    Ok(modules)
}

fn write_output(config: &CliConfig, assembly: &[String]) -> Result<(), RunError> {
    let mut text = assembly.join("\n");
    text.push('\n');
    match &config.output {
        OutputTarget::Stdout => io::stdout()
            .write_all(text.as_bytes())
            .map_err(|_| io_error("Error writing to stdout", "")),
        OutputTarget::File(path) => fs::write(path, text)
            .map_err(|_| io_error("Error opening file for write", &path.to_string_lossy())),
    }
}

fn io_error(message: &str, param: &str) -> RunError {
    let param = if param.is_empty() { None } else { Some(param) };
    RunError::new(
        TranslateError::new(TranslateErrorKind::Io, message, param),
        Vec::new(),
        Vec::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str, source: &[&str]) -> SourceModule {
        SourceModule {
            name: name.to_string(),
            lines: source.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn assemble(modules: &[SourceModule]) -> ProgramOutput {
        translate_program(modules, &ProgramOptions::default()).unwrap()
    }

    #[test]
    fn bootstrap_without_sys_only_seats_the_stack_pointer() {
        let out = assemble(&[module("Main", &["push constant 1"])]);
        assert_eq!(&out.assembly[..4], ["@256", "D=A", "@SP", "M=D"]);
        assert!(!out.assembly.contains(&"@Sys.init".to_string()));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn bootstrap_with_sys_calls_sys_init() {
        let out = assemble(&[
            module("Main", &["function Main.main 0", "return"]),
            module("Sys", &["function Sys.init 0", "label halt", "goto halt"]),
        ]);
        assert!(out.assembly.contains(&"@Sys.init".to_string()));
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn init_segments_preloads_the_four_bases() {
        let options = ProgramOptions {
            init_segments: true,
        };
        let out = translate_program(&[module("Main", &["push constant 1"])], &options).unwrap();
        let text = out.assembly.join("\n");
        assert!(text.contains("@300\nD=A\n@LCL\nM=D"));
        assert!(text.contains("@400\nD=A\n@ARG\nM=D"));
        assert!(text.contains("@3000\nD=A\n@THIS\nM=D"));
        assert!(text.contains("@3010\nD=A\n@THAT\nM=D"));
    }

    #[test]
    fn sys_module_links_first_regardless_of_input_order() {
        let main = module("Main", &["function Main.main 0", "return"]);
        let sys = module("Sys", &["function Sys.init 0", "label halt", "goto halt"]);
        let forward = assemble(&[main.clone(), sys.clone()]);
        let reversed = assemble(&[sys, main]);
        assert_eq!(forward.assembly, reversed.assembly);

        let sys_at = forward
            .assembly
            .iter()
            .position(|l| l == "(Sys.init)")
            .unwrap();
        let main_at = forward
            .assembly
            .iter()
            .position(|l| l == "(Main.main)")
            .unwrap();
        assert!(sys_at < main_at);
    }

    #[test]
    fn non_sys_modules_link_in_name_order() {
        let out = assemble(&[
            module("Zebra", &["function Zebra.z 0", "return"]),
            module("Alpha", &["function Alpha.a 0", "return"]),
        ]);
        let alpha_at = out
            .assembly
            .iter()
            .position(|l| l == "(Alpha.a)")
            .unwrap();
        let zebra_at = out
            .assembly
            .iter()
            .position(|l| l == "(Zebra.z)")
            .unwrap();
        assert!(alpha_at < zebra_at);
    }

    #[test]
    fn multi_module_program_without_sys_warns() {
        let out = assemble(&[
            module("One", &["push constant 1"]),
            module("Two", &["push constant 2"]),
        ]);
        assert_eq!(out.diagnostics.len(), 1);
        let warning = &out.diagnostics[0];
        assert_eq!(warning.severity(), Severity::Warning);
        assert_eq!(warning.code(), "vmt001");
        assert!(warning.message().contains("No Sys module"));
    }

    #[test]
    fn single_module_without_sys_does_not_warn() {
        let out = assemble(&[module("Main", &["push constant 1"])]);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn epilogue_is_a_terminal_spin_loop() {
        let out = assemble(&[module("Main", &["push constant 1"])]);
        let n = out.assembly.len();
        let label = out.assembly[n - 3].trim_matches(&['(', ')'][..]).to_string();
        assert_eq!(out.assembly[n - 3], format!("({label})"));
        assert_eq!(out.assembly[n - 2], format!("@{label}"));
        assert_eq!(out.assembly[n - 1], "0;JMP");
        assert!(label.starts_with("LABEL_"));
    }

    #[test]
    fn generated_labels_stay_unique_across_modules() {
        let out = assemble(&[
            module("One", &["eq", "gt"]),
            module("Two", &["lt"]),
            module("Sys", &["function Sys.init 0", "eq", "label halt", "goto halt"]),
        ]);
        let mut defined: Vec<&String> = out
            .assembly
            .iter()
            .filter(|l| l.starts_with("(LABEL_"))
            .collect();
        let total = defined.len();
        defined.sort();
        defined.dedup();
        assert_eq!(defined.len(), total);
        // four comparisons, one call in the bootstrap, one epilogue label
        assert_eq!(total, 4 * 2 + 1 + 1);
    }

    #[test]
    fn failing_module_aborts_with_file_and_source_attached() {
        let err = translate_program(
            &[
                module("Good", &["push constant 1"]),
                module("Bad", &["push constant 1", "pop stack 0"]),
            ],
            &ProgramOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Errors detected in source"));
        assert_eq!(err.diagnostics().len(), 1);
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.file(), Some("Bad.vm"));
        assert_eq!(diag.line(), 2);
        let rendered = diag.format_with_context(None, false);
        assert!(rendered.contains("pop stack 0"));
    }
}
