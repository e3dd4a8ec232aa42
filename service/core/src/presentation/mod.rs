// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`todoapi-core`)
//!
//! HTTP surface that translates external requests into application
//! service calls. **No business logic lives here**: all real work is
//! delegated to application services in `crate::application`.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | REST endpoints for users and the health probe |

pub mod api;

pub use api::{app, AppState};
