// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Authentication
//!
//! Resolves HTTP Basic credentials to an [`Identity`]. A request without
//! credentials is anonymous; a request with bad credentials is rejected
//! outright rather than downgraded to anonymous.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::debug;

use crate::domain::access::Identity;
use crate::domain::repository::{RepositoryError, UserRepository};
use crate::infrastructure::password::verify_password;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid basic header. {0}")]
    MalformedHeader(&'static str),

    /// Also returned for inactive accounts, whatever the password.
    #[error("Invalid username/password.")]
    InvalidCredentials,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Parse an `Authorization` header value.
///
/// Returns `Ok(None)` when the scheme is not `Basic`, so other schemes fall
/// through to the anonymous identity.
pub fn parse_basic_authorization(header: &str) -> Result<Option<Credentials>, AuthError> {
    let mut parts = header.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case("basic") => {}
        _ => return Ok(None),
    }

    let encoded = parts
        .next()
        .ok_or(AuthError::MalformedHeader("No credentials provided."))?;
    if parts.next().is_some() {
        return Err(AuthError::MalformedHeader(
            "Credentials string should not contain spaces.",
        ));
    }

    let decoded = STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or(AuthError::MalformedHeader(
            "Credentials not correctly base64 encoded.",
        ))?;

    let (username, password) = decoded.split_once(':').ok_or(AuthError::MalformedHeader(
        "Credentials not correctly base64 encoded.",
    ))?;

    Ok(Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }))
}

pub struct Authenticator {
    users: Arc<dyn UserRepository>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn authenticate(&self, credentials: Option<Credentials>) -> Result<Identity, AuthError> {
        let Some(credentials) = credentials else {
            return Ok(Identity::anonymous());
        };

        let user = self
            .users
            .find_by_username(&credentials.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let verified = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(hash, &credentials.password));
        if !verified || !user.is_active {
            debug!(username = %credentials.username, active = user.is_active, "rejected credentials");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Identity::authenticated(user.id, user.is_superuser))
    }

    /// Resolve an optional `Authorization` header value.
    pub async fn identify(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let credentials = match authorization {
            Some(header) => parse_basic_authorization(header)?,
            None => None,
        };
        self.authenticate(credentials).await
    }
}

/// `Authorization` header value for the given credentials.
pub fn basic_authorization(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}
