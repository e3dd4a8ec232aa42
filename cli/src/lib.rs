// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! todoapi CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Argument parsing, logging setup, server bootstrap and admin commands

pub mod cli;
pub mod commands;
pub mod logging;
pub mod server;
