// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Access Policy
//!
//! Allow/deny decisions for the user API. A decision is a pure function of
//! the caller's [`Identity`] and the requested [`ActionRequest`]; nothing is
//! read from or written to any store.
//!
//! ## Evaluation order ([`SelfOrSuperuser`])
//!
//! ```text
//! collection check                      object check
//!   anonymous          -> deny            superuser        -> allow
//!   superuser          -> allow           resource == self -> allow
//!   create | delete    -> deny            otherwise        -> deny
//!   anything else      -> allow
//! ```
//!
//! `destroy` is not part of the collection deny set; a non-superuser who
//! passes the collection check is then bounded by the object check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::UserId;

/// The caller of a request, resolved once at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub is_authenticated: bool,
    pub is_superuser: bool,
    /// `None` for the anonymous identity.
    pub id: Option<UserId>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            is_superuser: false,
            id: None,
        }
    }

    pub fn authenticated(id: UserId, is_superuser: bool) -> Self {
        Self {
            is_authenticated: true,
            is_superuser,
            id: Some(id),
        }
    }

    pub fn owns(&self, resource: &Resource) -> bool {
        self.id == Some(resource.id)
    }
}

/// The action a request performs, named the way routes dispatch them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Delete,
    List,
    Detail,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
    Metadata,
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::Create => "create",
            Action::Delete => "delete",
            Action::List => "list",
            Action::Detail => "detail",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Destroy => "destroy",
            Action::Metadata => "metadata",
            Action::Other(name) => name,
        }
    }
}

impl FromStr for Action {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "create" => Action::Create,
            "delete" => Action::Delete,
            "list" => Action::List,
            "detail" => Action::Detail,
            "retrieve" => Action::Retrieve,
            "update" => Action::Update,
            "partial_update" => Action::PartialUpdate,
            "destroy" => Action::Destroy,
            "metadata" => Action::Metadata,
            other => Action::Other(other.to_string()),
        })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The object an object-level check is about. A resource is a user record,
/// so ownership means the caller *is* the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: Action,
    pub target: Option<Resource>,
}

impl ActionRequest {
    pub fn collection(action: Action) -> Self {
        Self { action, target: None }
    }

    pub fn object(action: Action, target: Resource) -> Self {
        Self {
            action,
            target: Some(target),
        }
    }
}

/// Why a request was refused. Both variants surface as HTTP 403.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessDenied {
    #[error("Authentication credentials were not provided.")]
    AuthenticationMissing,

    #[error("You do not have permission to perform this action.")]
    AuthorizationDenied,
}

pub trait AccessPolicy: Send + Sync {
    /// Collection-level check, evaluated before any object is loaded.
    fn permit_collection(&self, identity: &Identity, action: &Action) -> bool;

    /// Object-level check, evaluated once the target has been loaded.
    fn permit_object(&self, identity: &Identity, resource: &Resource) -> bool;

    /// Evaluate a full request: the collection check, then the object check
    /// when a target is present.
    fn authorize(&self, identity: &Identity, request: &ActionRequest) -> Result<(), AccessDenied> {
        if !self.permit_collection(identity, &request.action) {
            return Err(denial_for(identity));
        }
        if let Some(target) = &request.target {
            if !self.permit_object(identity, target) {
                return Err(denial_for(identity));
            }
        }
        Ok(())
    }
}

fn denial_for(identity: &Identity) -> AccessDenied {
    if identity.is_authenticated {
        AccessDenied::AuthorizationDenied
    } else {
        AccessDenied::AuthenticationMissing
    }
}

/// Users may read and edit only their own record; superusers may do anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfOrSuperuser;

impl SelfOrSuperuser {
    pub fn new() -> Self {
        Self
    }
}

impl AccessPolicy for SelfOrSuperuser {
    fn permit_collection(&self, identity: &Identity, action: &Action) -> bool {
        if !identity.is_authenticated {
            return false;
        }
        if identity.is_superuser {
            return true;
        }
        !matches!(action, Action::Create | Action::Delete)
    }

    fn permit_object(&self, identity: &Identity, resource: &Resource) -> bool {
        if identity.is_superuser {
            return true;
        }
        identity.owns(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ACTIONS: &[&str] = &[
        "list",
        "detail",
        "create",
        "retrieve",
        "destroy",
        "delete",
        "update",
        "partial_update",
        "metadata",
        "custom_action",
    ];

    fn joe() -> Identity {
        Identity::authenticated(UserId(1), false)
    }

    fn clark() -> Identity {
        Identity::authenticated(UserId(2), true)
    }

    fn action(name: &str) -> Action {
        name.parse().unwrap()
    }

    #[test]
    fn test_anonymous_cannot_access_anything() {
        let policy = SelfOrSuperuser::new();
        for name in ALL_ACTIONS {
            assert!(
                !policy.permit_collection(&Identity::anonymous(), &action(name)),
                "anonymous allowed {name}"
            );
        }
    }

    #[test]
    fn test_anonymous_owns_nothing() {
        let policy = SelfOrSuperuser::new();
        assert!(!policy.permit_object(&Identity::anonymous(), &Resource { id: UserId(1) }));
    }

    #[test]
    fn test_superuser_can_do_anything() {
        let policy = SelfOrSuperuser::new();
        for name in ALL_ACTIONS {
            assert!(policy.permit_collection(&clark(), &action(name)), "superuser denied {name}");
        }
        assert!(policy.permit_object(&clark(), &Resource { id: UserId(1) }));
        assert!(policy.permit_object(&clark(), &Resource { id: UserId(2) }));
        assert!(policy.permit_object(&clark(), &Resource { id: UserId(999) }));
    }

    #[test]
    fn test_normal_user_cant_create_or_delete() {
        let policy = SelfOrSuperuser::new();
        assert!(!policy.permit_collection(&joe(), &Action::Create));
        assert!(!policy.permit_collection(&joe(), &Action::Delete));
    }

    #[test]
    fn test_normal_user_can_view_and_update() {
        let policy = SelfOrSuperuser::new();
        for name in ["list", "detail", "retrieve", "update", "partial_update"] {
            assert!(policy.permit_collection(&joe(), &action(name)), "normal user denied {name}");
        }
    }

    #[test]
    fn test_destroy_passes_collection_check_for_normal_user() {
        let policy = SelfOrSuperuser::new();
        assert!(policy.permit_collection(&joe(), &Action::Destroy));
    }

    #[test]
    fn test_object_permission_is_self_only() {
        let policy = SelfOrSuperuser::new();
        assert!(policy.permit_object(&joe(), &Resource { id: UserId(1) }));
        assert!(!policy.permit_object(&joe(), &Resource { id: UserId(2) }));
    }

    #[test]
    fn test_authorize_reports_the_right_denial() {
        let policy = SelfOrSuperuser::new();

        assert_eq!(
            policy.authorize(&Identity::anonymous(), &ActionRequest::collection(Action::List)),
            Err(AccessDenied::AuthenticationMissing)
        );
        assert_eq!(
            policy.authorize(&joe(), &ActionRequest::collection(Action::Create)),
            Err(AccessDenied::AuthorizationDenied)
        );
        assert_eq!(
            policy.authorize(
                &joe(),
                &ActionRequest::object(Action::Retrieve, Resource { id: UserId(2) })
            ),
            Err(AccessDenied::AuthorizationDenied)
        );
        assert!(policy
            .authorize(
                &joe(),
                &ActionRequest::object(Action::Update, Resource { id: UserId(1) })
            )
            .is_ok());
    }

    #[test]
    fn test_action_names_round_trip() {
        for name in ALL_ACTIONS {
            assert_eq!(action(name).as_str(), *name);
        }
        assert_eq!(action("custom_action"), Action::Other("custom_action".to_string()));
    }
}
