// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain Layer
//!
//! Aggregates, value objects and the decision rules of the service.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** User aggregate, access policy, health contracts, configuration schema

pub mod access;
pub mod health;
pub mod repository;
pub mod service_config;
pub mod user;
