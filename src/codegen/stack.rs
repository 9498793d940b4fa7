// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Stack-transfer fragments shared by every emitter. The working register D
// is the only value channel between the stack and the rest of the machine.

/// Push the working register onto the stack.
pub fn push_from_d() -> &'static [&'static str] {
    &["@SP", "A=M", "M=D", "@SP", "M=M+1"]
}

/// Pop the stack top into the working register.
pub fn pop_to_d() -> &'static [&'static str] {
    &["@SP", "AM=M-1", "D=M"]
}
