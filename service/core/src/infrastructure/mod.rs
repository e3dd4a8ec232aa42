// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod db;
pub mod password;
pub mod repositories;

pub use db::Database;
pub use repositories::{InMemoryUserRepository, PostgresUserRepository};
