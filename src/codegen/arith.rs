// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Arithmetic, logic, and comparison emitters.

use crate::core::command::ArithOp;
use crate::core::labels::LabelAllocator;

use super::{emit, stack};

// Binary operators pop the right operand into D and rewrite the new stack
// top in place. Operand order matters only for sub.
const BINARY_ADD: &[&str] = &["@SP", "AM=M-1", "D=M", "A=A-1", "M=D+M"];
const BINARY_SUB: &[&str] = &["@SP", "AM=M-1", "D=M", "A=A-1", "M=M-D"];
const BINARY_AND: &[&str] = &["@SP", "AM=M-1", "D=M", "A=A-1", "M=D&M"];
const BINARY_OR: &[&str] = &["@SP", "AM=M-1", "D=M", "A=A-1", "M=D|M"];

// Unary operators rewrite the stack top without moving SP.
const UNARY_NEG: &[&str] = &["@SP", "A=M-1", "M=-M"];
const UNARY_NOT: &[&str] = &["@SP", "A=M-1", "M=!M"];

/// Translate one arithmetic or logic command.
pub fn emit_arith(out: &mut Vec<String>, op: ArithOp, labels: &mut LabelAllocator) {
    match op {
        ArithOp::Add => emit(out, BINARY_ADD),
        ArithOp::And => emit(out, BINARY_AND),
        ArithOp::Eq => emit_comparison(out, "JEQ", labels),
        ArithOp::Gt => emit_comparison(out, "JGT", labels),
        ArithOp::Lt => emit_comparison(out, "JLT", labels),
        ArithOp::Neg => emit(out, UNARY_NEG),
        ArithOp::Not => emit(out, UNARY_NOT),
        ArithOp::Or => emit(out, BINARY_OR),
        ArithOp::Sub => emit(out, BINARY_SUB),
    }
}

/// Comparisons leave -1 (all ones) for true and 0 for false. Each one
/// consumes two fresh labels, the true target first.
fn emit_comparison(out: &mut Vec<String>, jump: &str, labels: &mut LabelAllocator) {
    let true_label = labels.next();
    let end_label = labels.next();
    emit(out, stack::pop_to_d());
    out.push("@SP".to_string());
    out.push("A=M-1".to_string());
    out.push("D=M-D".to_string());
    out.push(format!("@{true_label}"));
    out.push(format!("D;{jump}"));
    out.push("@SP".to_string());
    out.push("A=M-1".to_string());
    out.push("M=0".to_string());
    out.push(format!("@{end_label}"));
    out.push("0;JMP".to_string());
    out.push(format!("({true_label})"));
    out.push("@SP".to_string());
    out.push("A=M-1".to_string());
    out.push("M=-1".to_string());
    out.push(format!("({end_label})"));
}
