// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the identity bound to authenticated requests.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::roles::Role;

/// Issuer written into, and required from, every token.
pub const TOKEN_ISSUER: &str = "user-service";

/// Identity payload embedded in every issued token.
///
/// Built once at login from the stored user. After verification the same
/// value is bound to the request and read by handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    /// Stable user identifier
    pub uuid: Uuid,
    /// Display name
    pub name: String,
    /// Login name
    pub username: String,
    pub email: String,
    pub phone_number: String,
    /// Role code, e.g. `ADMIN` or `CUSTOMER`
    pub role: String,
}

impl IdentityClaims {
    /// Parsed role. Unknown codes resolve to no role at all.
    pub fn role(&self) -> Option<Role> {
        Role::from_code(&self.role)
    }

    /// Check if this identity is an admin.
    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    /// Whether this identity may modify the account `target`.
    pub fn can_manage(&self, target: Uuid) -> bool {
        self.uuid == target || self.is_admin()
    }
}

/// Full token payload: registered claims plus the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer, always [`TOKEN_ISSUER`]
    pub iss: String,
    /// Expiration (seconds since the Unix epoch)
    pub exp: i64,
    /// Identity of the logged-in user
    pub user: IdentityClaims,
}

impl TokenClaims {
    pub fn new(user: IdentityClaims, expires_at: i64) -> Self {
        Self {
            iss: TOKEN_ISSUER.to_string(),
            exp: expires_at,
            user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_identity(role: &str) -> IdentityClaims {
        IdentityClaims {
            uuid: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
            phone_number: "081234567890".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let identity = sample_identity("CUSTOMER");
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(value["phoneNumber"], "081234567890");
        assert_eq!(value["role"], "CUSTOMER");
        assert!(value.get("phone_number").is_none());
    }

    #[test]
    fn token_claims_carry_fixed_issuer() {
        let claims = TokenClaims::new(sample_identity("CUSTOMER"), 1_700_003_600);
        assert_eq!(claims.iss, "user-service");
        assert_eq!(claims.exp, 1_700_003_600);
    }

    #[test]
    fn customer_can_only_manage_self() {
        let identity = sample_identity("CUSTOMER");
        assert!(identity.can_manage(identity.uuid));
        assert!(!identity.can_manage(Uuid::new_v4()));
    }

    #[test]
    fn admin_can_manage_anyone() {
        let identity = sample_identity("ADMIN");
        assert!(identity.is_admin());
        assert!(identity.can_manage(Uuid::new_v4()));
    }

    #[test]
    fn unknown_role_grants_nothing() {
        let identity = sample_identity("SUPERUSER");
        assert_eq!(identity.role(), None);
        assert!(!identity.is_admin());
        assert!(!identity.can_manage(Uuid::new_v4()));
    }
}
