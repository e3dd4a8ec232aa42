// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # User Application Service
//!
//! Use cases behind the `/users` routes. Each use case runs the same
//! pipeline:
//!
//! ```text
//! permit_collection(identity, action)      403 on deny
//!   └─ load target (object use cases)      404 when absent
//!        └─ permit_object(identity, target) 403 on deny
//!             └─ unwrap request body        400 when it did not parse
//!                  └─ validate input        400 with per-field messages
//!                       └─ persist
//! ```
//!
//! The policy is injected, so the service never decides access itself.
//! Bodies arrive as [`RequestBody`] so a denied caller never learns whether
//! its payload was well formed.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::access::{AccessDenied, AccessPolicy, Action, ActionRequest, Identity, Resource};
use crate::domain::repository::{RepositoryError, UserRepository};
use crate::domain::user::{NewUser, User, UserChanges, UserId, ValidationErrors};
use crate::infrastructure::password::hash_password;

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const FIELD_REQUIRED: &str = "This field is required.";

/// Body of a create request. `username` is required; `password` is optional
/// and stored hashed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_staff: Option<bool>,
    pub password: Option<String>,
}

/// A request body the HTTP layer could not decode, with the rejection text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MalformedBody(pub String);

/// A request body as received: decoded, or the reason it was not.
pub type RequestBody<T> = Result<T, MalformedBody>;

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error(transparent)]
    Access(#[from] AccessDenied),

    #[error("Not found.")]
    NotFound,

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    MalformedBody(#[from] MalformedBody),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for UserServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => {
                UserServiceError::Validation(ValidationErrors::single("username", USERNAME_TAKEN))
            }
            RepositoryError::NotFound(_) => UserServiceError::NotFound,
            other => UserServiceError::Repository(other),
        }
    }
}

impl From<ValidationErrors> for UserServiceError {
    fn from(errors: ValidationErrors) -> Self {
        UserServiceError::Validation(errors)
    }
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn list(&self, identity: &Identity) -> Result<Vec<User>, UserServiceError>;
    async fn create(&self, identity: &Identity, request: RequestBody<CreateUser>) -> Result<User, UserServiceError>;
    async fn retrieve(&self, identity: &Identity, id: UserId) -> Result<User, UserServiceError>;
    /// Full update: `username` must be present.
    async fn update(&self, identity: &Identity, id: UserId, changes: RequestBody<UserChanges>) -> Result<User, UserServiceError>;
    async fn partial_update(&self, identity: &Identity, id: UserId, changes: RequestBody<UserChanges>) -> Result<User, UserServiceError>;
    async fn destroy(&self, identity: &Identity, id: UserId) -> Result<(), UserServiceError>;
}

pub struct StandardUserService {
    users: Arc<dyn UserRepository>,
    policy: Arc<dyn AccessPolicy>,
}

impl StandardUserService {
    pub fn new(users: Arc<dyn UserRepository>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self { users, policy }
    }

    /// Create a superuser outside the request path (CLI bootstrap).
    pub async fn create_superuser(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        let mut draft = NewUser::new(username);
        draft.email = email.to_string();
        draft.is_staff = true;
        draft.is_superuser = true;
        draft.validate()?;
        draft.password_hash = Some(
            hash_password(password).map_err(|e| UserServiceError::PasswordHash(e.to_string()))?,
        );

        let user = self.users.create(&draft).await?;
        info!(user_id = %user.id, username = %user.username, "Superuser created");
        Ok(user)
    }

    fn authorize_collection(&self, identity: &Identity, action: Action) -> Result<(), UserServiceError> {
        self.authorize(identity, ActionRequest::collection(action))
    }

    fn authorize(&self, identity: &Identity, request: ActionRequest) -> Result<(), UserServiceError> {
        self.policy.authorize(identity, &request).map_err(|denied| {
            debug!(action = %request.action, caller = ?identity.id, reason = %denied, "access denied");
            UserServiceError::Access(denied)
        })
    }

    /// Collection check, load, then object check.
    async fn load_authorized(
        &self,
        identity: &Identity,
        action: Action,
        id: UserId,
    ) -> Result<User, UserServiceError> {
        self.authorize_collection(identity, action.clone())?;
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound)?;
        self.authorize(identity, ActionRequest::object(action, Resource { id: user.id }))?;
        Ok(user)
    }

    async fn apply_changes(&self, mut user: User, changes: UserChanges) -> Result<User, UserServiceError> {
        changes.validate()?;
        user.apply(changes);
        self.users.update(&user).await?;
        info!(user_id = %user.id, "User updated");
        Ok(user)
    }
}

#[async_trait]
impl UserService for StandardUserService {
    async fn list(&self, identity: &Identity) -> Result<Vec<User>, UserServiceError> {
        self.authorize_collection(identity, Action::List)?;
        Ok(self.users.list_all().await?)
    }

    async fn create(&self, identity: &Identity, request: RequestBody<CreateUser>) -> Result<User, UserServiceError> {
        self.authorize_collection(identity, Action::Create)?;
        let request = request?;

        let username = request
            .username
            .ok_or_else(|| ValidationErrors::single("username", FIELD_REQUIRED))?;
        let mut draft = NewUser::new(username);
        draft.email = request.email.unwrap_or_default();
        draft.first_name = request.first_name.unwrap_or_default();
        draft.last_name = request.last_name.unwrap_or_default();
        draft.is_staff = request.is_staff.unwrap_or(false);
        draft.validate()?;

        if let Some(password) = request.password.as_deref().filter(|p| !p.is_empty()) {
            draft.password_hash = Some(
                hash_password(password).map_err(|e| UserServiceError::PasswordHash(e.to_string()))?,
            );
        }

        let user = self.users.create(&draft).await?;
        info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    async fn retrieve(&self, identity: &Identity, id: UserId) -> Result<User, UserServiceError> {
        self.load_authorized(identity, Action::Retrieve, id).await
    }

    async fn update(&self, identity: &Identity, id: UserId, changes: RequestBody<UserChanges>) -> Result<User, UserServiceError> {
        let user = self.load_authorized(identity, Action::Update, id).await?;
        let changes = changes?;
        if changes.username.is_none() {
            return Err(ValidationErrors::single("username", FIELD_REQUIRED).into());
        }
        self.apply_changes(user, changes).await
    }

    async fn partial_update(&self, identity: &Identity, id: UserId, changes: RequestBody<UserChanges>) -> Result<User, UserServiceError> {
        let user = self.load_authorized(identity, Action::PartialUpdate, id).await?;
        self.apply_changes(user, changes?).await
    }

    async fn destroy(&self, identity: &Identity, id: UserId) -> Result<(), UserServiceError> {
        let user = self.load_authorized(identity, Action::Destroy, id).await?;
        self.users.delete(user.id).await?;
        info!(user_id = %user.id, "User deleted");
        Ok(())
    }
}
