// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod auth;
pub mod health;
pub mod repository_factory;
pub mod users;

// Re-export use cases for convenience
pub use auth::{AuthError, Authenticator, Credentials};
pub use health::{HealthProbe, UserStoreProbe, DB_COMPONENT};
pub use repository_factory::create_user_repository;
pub use users::{CreateUser, MalformedBody, RequestBody, StandardUserService, UserService, UserServiceError};
