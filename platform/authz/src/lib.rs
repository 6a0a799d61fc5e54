//! Role-based authorization for the analytics API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("action {action} denied for resource {resource}")]
    Denied { action: String, resource: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Auditor,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Auditor => "Auditor",
            Role::User => "User",
        }
    }

    /// Case-insensitive; unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "auditor" => Some(Role::Auditor),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

/// Resources with their own access rules.
pub const AUDIT_RESOURCE: &str = "audit";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PolicyContext {
    pub subject: String,
    pub roles: Vec<Role>,
    pub action: String,
    pub resource: String,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct PolicyEngine;

impl PolicyEngine {
    /// Audit data needs Admin or Auditor; everything else needs any known role.
    pub fn check(&self, ctx: &PolicyContext) -> Result<(), AuthzError> {
        let allowed = if ctx.resource == AUDIT_RESOURCE {
            ctx.roles
                .iter()
                .any(|role| matches!(role, Role::Admin | Role::Auditor))
        } else {
            !ctx.roles.is_empty()
        };
        if allowed {
            Ok(())
        } else {
            Err(AuthzError::Denied {
                action: ctx.action.clone(),
                resource: ctx.resource.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(roles: Vec<Role>, resource: &str) -> PolicyContext {
        PolicyContext {
            subject: "7".into(),
            roles,
            action: "read".into(),
            resource: resource.into(),
        }
    }

    #[test]
    fn audit_requires_admin_or_auditor() {
        let engine = PolicyEngine;
        assert!(engine.check(&ctx(vec![Role::Admin], AUDIT_RESOURCE)).is_ok());
        assert!(engine.check(&ctx(vec![Role::Auditor], AUDIT_RESOURCE)).is_ok());
        assert_eq!(
            engine.check(&ctx(vec![Role::User], AUDIT_RESOURCE)),
            Err(AuthzError::Denied {
                action: "read".into(),
                resource: AUDIT_RESOURCE.into(),
            })
        );
    }

    #[test]
    fn other_resources_need_any_role() {
        let engine = PolicyEngine;
        assert!(engine.check(&ctx(vec![Role::User], "analytics")).is_ok());
        assert!(engine.check(&ctx(vec![], "analytics")).is_err());
    }

    #[test]
    fn role_names_parse_loosely() {
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse(" auditor "), Some(Role::Auditor));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::User.as_str(), "User");
    }
}
