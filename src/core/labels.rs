// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Allocation of generated jump targets.

/// Allocator for program-unique generated labels.
///
/// Labels are handed out as `LABEL_<n>` with `n` counting up from zero.
/// One allocator is owned per translation run and threaded by mutable
/// reference through every emitter that needs a fresh target, so labels
/// stay unique across all modules of a program.
#[derive(Debug, Default)]
pub struct LabelAllocator {
    next_id: u32,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fresh label, never repeated for the lifetime of the allocator.
    pub fn next(&mut self) -> String {
        let label = format!("LABEL_{}", self.next_id);
        self.next_id += 1;
        label
    }

    /// Number of labels handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next_id
    }
}
