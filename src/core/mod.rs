// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Core translator components shared by codegen and the run surface.
//!
//! - [`command`] - VM command classification
//! - [`error`] - Error types, diagnostics, and run reports
//! - [`labels`] - Generated-label allocation

pub mod command;
pub mod error;
pub mod labels;
