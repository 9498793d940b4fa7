// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Assembly emitters for the stack machine.
//!
//! - [`arith`] - Arithmetic, logic, and comparison commands
//! - [`frame`] - Function entry, call, and return protocol
//! - [`segment`] - Push and pop across the virtual segments
//! - [`stack`] - Shared stack-transfer fragments

pub mod arith;
pub mod frame;
pub mod segment;
pub mod stack;

/// First reserved scratch cell. Holds the popped value during segment
/// stores and the frame cursor during returns.
pub(crate) const SCRATCH_R13: &str = "R13";

/// Second reserved scratch cell. Holds computed store addresses and the
/// saved return address during returns.
pub(crate) const SCRATCH_R14: &str = "R14";

pub(crate) fn emit(out: &mut Vec<String>, fragment: &[&str]) {
    out.extend(fragment.iter().map(|line| line.to_string()));
}
