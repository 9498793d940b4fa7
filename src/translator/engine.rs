// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Per-module translation engine.
//!
//! One engine translates one module, line by line, appending each command's
//! assembly to a contiguous output block. The label allocator is borrowed
//! from the surrounding program run so generated labels stay unique across
//! modules.

use crate::codegen::{arith, emit, frame, segment, stack};
use crate::core::command::{self, VmCommand};
use crate::core::error::{Diagnostic, Severity, TranslateError, TranslateErrorKind};
use crate::core::labels::LabelAllocator;

pub(crate) struct Translator<'a> {
    labels: &'a mut LabelAllocator,
    module: String,
    current_function: Option<String>,
    output: Vec<String>,
}

impl<'a> Translator<'a> {
    pub(crate) fn new(module: &str, labels: &'a mut LabelAllocator) -> Self {
        Self {
            labels,
            module: module.to_string(),
            current_function: None,
            output: Vec::new(),
        }
    }

    /// Translate the module's lines. Aborts on the first malformed command,
    /// returning a diagnostic without a file attribution; the caller knows
    /// which module it handed in.
    pub(crate) fn translate(mut self, lines: &[String]) -> Result<Vec<String>, Diagnostic> {
        for (idx, line) in lines.iter().enumerate() {
            let line_num = idx as u32 + 1;
            match command::classify(line) {
                Ok(None) => {}
                Ok(Some(cmd)) => self.dispatch(cmd, line_num)?,
                Err(err) => return Err(err.into_diagnostic(line_num)),
            }
        }
        Ok(self.output)
    }

    fn dispatch(&mut self, cmd: VmCommand, line_num: u32) -> Result<(), Diagnostic> {
        match cmd {
            VmCommand::Arithmetic(op) => arith::emit_arith(&mut self.output, op, self.labels),
            VmCommand::Push { segment, index } => {
                segment::emit_push(&mut self.output, segment, index, &self.module);
            }
            VmCommand::Pop { segment, index } => {
                segment::emit_pop(&mut self.output, segment, index, &self.module);
            }
            VmCommand::Label(name) => {
                let target = self.scoped_label(&name);
                self.output.push(format!("({target})"));
            }
            VmCommand::Goto(name) => {
                let target = self.scoped_label(&name);
                self.output.push(format!("@{target}"));
                self.output.push("0;JMP".to_string());
            }
            VmCommand::IfGoto(name) => {
                let target = self.scoped_label(&name);
                emit(&mut self.output, stack::pop_to_d());
                self.output.push(format!("@{target}"));
                self.output.push("D;JNE".to_string());
            }
            VmCommand::Function { name, locals } => {
                self.current_function = Some(name.clone());
                frame::emit_function(&mut self.output, &name, locals);
            }
            VmCommand::Call { name, args } => {
                frame::emit_call(&mut self.output, &name, args, self.labels);
            }
            VmCommand::Return => {
                if self.current_function.is_none() {
                    let err = TranslateError::new(
                        TranslateErrorKind::Function,
                        "Found return outside a function body",
                        None,
                    );
                    return Err(Diagnostic::new(line_num, Severity::Error, err)
                        .with_column(Some(1))
                        .with_help("top-level module code cannot return; wrap it in a function"));
                }
                frame::emit_return(&mut self.output);
            }
        }
        Ok(())
    }

    /// User labels are scoped to the module so two modules can reuse a name.
    fn scoped_label(&self, name: &str) -> String {
        format!("{}${}", self.module, name)
    }
}
