// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Function entry, call, and return protocol.
//!
//! A call saves the return address and the four segment bases below the
//! callee's arguments, then repoints ARG and LCL. Return walks that frame
//! back through the scratch cells.

use crate::core::labels::LabelAllocator;

use super::{emit, stack, SCRATCH_R13, SCRATCH_R14};

/// Cells occupied by a saved frame: return address plus LCL, ARG, THIS, THAT.
pub(crate) const FRAME_SAVED_CELLS: u16 = 5;

const SAVED_BASES: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

/// Emit a call to `name` with `args` arguments already on the stack.
pub fn emit_call(out: &mut Vec<String>, name: &str, args: u16, labels: &mut LabelAllocator) {
    let return_label = labels.next();
    // return address travels as data, not as a jump
    out.push(format!("@{return_label}"));
    out.push("D=A".to_string());
    emit(out, stack::push_from_d());
    for base in SAVED_BASES {
        out.push(format!("@{base}"));
        out.push("D=M".to_string());
        emit(out, stack::push_from_d());
    }
    out.push("@SP".to_string());
    out.push("D=M".to_string());
    out.push(format!("@{args}"));
    out.push("D=D-A".to_string());
    out.push(format!("@{FRAME_SAVED_CELLS}"));
    out.push("D=D-A".to_string());
    out.push("@ARG".to_string());
    out.push("M=D".to_string());
    out.push("@SP".to_string());
    out.push("D=M".to_string());
    out.push("@LCL".to_string());
    out.push("M=D".to_string());
    out.push(format!("@{name}"));
    out.push("0;JMP".to_string());
    out.push(format!("({return_label})"));
}

/// Emit the entry point for `function name locals`. Locals start zeroed.
pub fn emit_function(out: &mut Vec<String>, name: &str, locals: u16) {
    out.push(format!("({name})"));
    for _ in 0..locals {
        out.push("@0".to_string());
        out.push("D=A".to_string());
        emit(out, stack::push_from_d());
    }
}

/// Emit a return through the saved frame.
///
/// The return address is captured into scratch before the return value
/// lands in the caller's argument slot; for a zero-argument callee that
/// slot aliases the cell holding the saved return address.
pub fn emit_return(out: &mut Vec<String>) {
    out.push("@LCL".to_string());
    out.push("D=M".to_string());
    out.push(format!("@{SCRATCH_R13}"));
    out.push("M=D".to_string());
    out.push(format!("@{FRAME_SAVED_CELLS}"));
    out.push("A=D-A".to_string());
    out.push("D=M".to_string());
    out.push(format!("@{SCRATCH_R14}"));
    out.push("M=D".to_string());
    emit(out, stack::pop_to_d());
    out.push("@ARG".to_string());
    out.push("A=M".to_string());
    out.push("M=D".to_string());
    out.push("@ARG".to_string());
    out.push("D=M+1".to_string());
    out.push("@SP".to_string());
    out.push("M=D".to_string());
    for (offset, base) in ["THAT", "THIS", "ARG", "LCL"].into_iter().enumerate() {
        out.push(format!("@{SCRATCH_R13}"));
        out.push("D=M".to_string());
        out.push(format!("@{}", offset + 1));
        out.push("A=D-A".to_string());
        out.push("D=M".to_string());
        out.push(format!("@{base}"));
        out.push("M=D".to_string());
    }
    out.push(format!("@{SCRATCH_R14}"));
    out.push("A=M".to_string());
    out.push("0;JMP".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_saves_the_frame_in_protocol_order() {
        let mut labels = LabelAllocator::new();
        let mut out = Vec::new();
        emit_call(&mut out, "Math.max", 2, &mut labels);

        assert_eq!(out[0], "@LABEL_0");
        assert_eq!(out[1], "D=A");
        let saves: Vec<usize> = ["@LCL", "@ARG", "@THIS", "@THAT"]
            .iter()
            .map(|reg| out.iter().position(|l| l == *reg).unwrap())
            .collect();
        assert!(saves.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(out[out.len() - 3], "@Math.max");
        assert_eq!(out[out.len() - 2], "0;JMP");
        assert_eq!(out[out.len() - 1], "(LABEL_0)");
        assert_eq!(labels.allocated(), 1);
    }

    #[test]
    fn call_repoints_arg_past_the_saved_frame() {
        let mut labels = LabelAllocator::new();
        let mut out = Vec::new();
        emit_call(&mut out, "f", 3, &mut labels);
        let text = out.join("\n");
        assert!(text.contains("@3\nD=D-A\n@5\nD=D-A\n@ARG\nM=D"));
        assert!(text.contains("@SP\nD=M\n@LCL\nM=D"));
    }

    #[test]
    fn function_entry_zeroes_each_local() {
        let mut out = Vec::new();
        emit_function(&mut out, "Main.run", 2);
        assert_eq!(out[0], "(Main.run)");
        assert_eq!(out.len(), 1 + 2 * 7);
        assert_eq!(out[1], "@0");
        assert_eq!(out[2], "D=A");
    }

    #[test]
    fn function_with_no_locals_is_just_a_label() {
        let mut out = Vec::new();
        emit_function(&mut out, "Sys.halt", 0);
        assert_eq!(out, ["(Sys.halt)"]);
    }

    #[test]
    fn return_captures_the_address_before_placing_the_value() {
        let mut out = Vec::new();
        emit_return(&mut out);
        let text = out.join("\n");
        let capture = text.find("@R14\nM=D").unwrap();
        let place = text.find("@ARG\nA=M\nM=D").unwrap();
        assert!(capture < place);
        assert!(text.ends_with("@R14\nA=M\n0;JMP"));
    }

    #[test]
    fn return_restores_bases_in_reverse_save_order() {
        let mut out = Vec::new();
        emit_return(&mut out);
        let text = out.join("\n");
        let restores: Vec<usize> = ["@THAT\nM=D", "@THIS\nM=D", "@ARG\nM=D", "@LCL\nM=D"]
            .iter()
            .map(|probe| text.find(probe).unwrap())
            .collect();
        assert!(restores.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(text.contains("@1\nA=D-A"));
        assert!(text.contains("@4\nA=D-A"));
    }
}
