// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Push and pop emitters across the virtual segments.
//!
//! Pointer-backed segments (argument, local, this, that) are addressed
//! through their base registers. The fixed segments map straight onto RAM
//! cells, static references become per-module assembler symbols, and
//! constant is an immediate source.

use crate::core::command::Segment;

use super::{emit, stack, SCRATCH_R13, SCRATCH_R14};

/// First RAM cell of the fixed temp segment.
pub(crate) const TEMP_BASE: u16 = 5;

/// Emit a push of `segment[index]` onto the stack.
pub fn emit_push(out: &mut Vec<String>, segment: Segment, index: u16, module: &str) {
    match segment {
        Segment::Argument => push_indirect(out, "ARG", index),
        Segment::Constant => {
            out.push(format!("@{index}"));
            out.push("D=A".to_string());
            emit(out, stack::push_from_d());
        }
        Segment::Local => push_indirect(out, "LCL", index),
        Segment::Pointer => push_direct(out, pointer_cell(index)),
        Segment::Static => push_direct(out, &static_cell(module, index)),
        Segment::Temp => push_direct(out, &temp_cell(index)),
        Segment::That => push_indirect(out, "THAT", index),
        Segment::This => push_indirect(out, "THIS", index),
    }
}

/// Emit a pop of the stack top into `segment[index]`.
pub fn emit_pop(out: &mut Vec<String>, segment: Segment, index: u16, module: &str) {
    match segment {
        Segment::Argument => pop_indirect(out, "ARG", index),
        // pop constant is rejected during classification and never dispatched
        Segment::Constant => debug_assert!(false, "pop constant reached codegen"),
        Segment::Local => pop_indirect(out, "LCL", index),
        Segment::Pointer => pop_direct(out, pointer_cell(index)),
        Segment::Static => pop_direct(out, &static_cell(module, index)),
        Segment::Temp => pop_direct(out, &temp_cell(index)),
        Segment::That => pop_indirect(out, "THAT", index),
        Segment::This => pop_indirect(out, "THIS", index),
    }
}

fn push_indirect(out: &mut Vec<String>, base: &str, index: u16) {
    out.push(format!("@{base}"));
    out.push("D=M".to_string());
    out.push(format!("@{index}"));
    out.push("A=D+A".to_string());
    out.push("D=M".to_string());
    emit(out, stack::push_from_d());
}

// The popped value parks in R13 while the destination address is formed in
// R14, so the base register itself is never disturbed.
fn pop_indirect(out: &mut Vec<String>, base: &str, index: u16) {
    emit(out, stack::pop_to_d());
    out.push(format!("@{SCRATCH_R13}"));
    out.push("M=D".to_string());
    out.push(format!("@{base}"));
    out.push("D=M".to_string());
    out.push(format!("@{index}"));
    out.push("D=D+A".to_string());
    out.push(format!("@{SCRATCH_R14}"));
    out.push("M=D".to_string());
    out.push(format!("@{SCRATCH_R13}"));
    out.push("D=M".to_string());
    out.push(format!("@{SCRATCH_R14}"));
    out.push("A=M".to_string());
    out.push("M=D".to_string());
}

fn push_direct(out: &mut Vec<String>, cell: &str) {
    out.push(format!("@{cell}"));
    out.push("D=M".to_string());
    emit(out, stack::push_from_d());
}

fn pop_direct(out: &mut Vec<String>, cell: &str) {
    emit(out, stack::pop_to_d());
    out.push(format!("@{cell}"));
    out.push("M=D".to_string());
}

// index is 0 or 1 after classification
fn pointer_cell(index: u16) -> &'static str {
    if index == 0 { "THIS" } else { "THAT" }
}

fn temp_cell(index: u16) -> String {
    format!("{}", TEMP_BASE + index)
}

fn static_cell(module: &str, index: u16) -> String {
    format!("{module}.{index}")
}
