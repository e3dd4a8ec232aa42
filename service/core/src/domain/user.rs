// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # User Aggregate
//!
//! The single aggregate root of the service: one row of the `users` table.
//! Draft (`NewUser`) and change-set (`UserChanges`) value objects carry
//! validated input from the application layer to the repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USERNAME_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    /// Argon2 PHC string. `None` is an unusable password.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Apply a change set in place. Fields left as `None` keep their value.
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(username) = changes.username {
            self.username = username;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(first_name) = changes.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            self.last_name = last_name;
        }
        if let Some(is_staff) = changes.is_staff {
            self.is_staff = is_staff;
        }
    }

    pub fn has_usable_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// A user that has not been persisted yet; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub password_hash: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_staff: false,
            is_superuser: false,
            password_hash: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        validate_username(&self.username, &mut errors);
        validate_email(&self.email, &mut errors);
        validate_name("first_name", &self.first_name, &mut errors);
        validate_name("last_name", &self.last_name, &mut errors);
        errors.into_result()
    }
}

/// Writable fields of a user. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_staff: Option<bool>,
}

impl UserChanges {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(username) = &self.username {
            validate_username(username, &mut errors);
        }
        if let Some(email) = &self.email {
            validate_email(email, &mut errors);
        }
        if let Some(first_name) = &self.first_name {
            validate_name("first_name", first_name, &mut errors);
        }
        if let Some(last_name) = &self.last_name {
            validate_name("last_name", last_name, &mut errors);
        }
        errors.into_result()
    }
}

/// Field name → messages, rendered as the 400 response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

fn validate_username(username: &str, errors: &mut ValidationErrors) {
    if username.trim().is_empty() {
        errors.add("username", "This field may not be blank.");
        return;
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        errors.add(
            "username",
            format!("Ensure this field has no more than {USERNAME_MAX_LEN} characters."),
        );
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !username.chars().all(allowed) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

fn validate_email(email: &str, errors: &mut ValidationErrors) {
    if email.is_empty() {
        return;
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid {
        errors.add("email", "Enter a valid email address.");
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        errors.add(
            "email",
            format!("Ensure this field has no more than {EMAIL_MAX_LEN} characters."),
        );
    }
}

fn validate_name(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.chars().count() > NAME_MAX_LEN {
        errors.add(
            field,
            format!("Ensure this field has no more than {NAME_MAX_LEN} characters."),
        );
    }
}
