// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// Roles travel inside tokens as their string code (`ADMIN`, `CUSTOMER`).
///
/// ## Role Hierarchy
///
/// - `Admin` - May read and update every account
/// - `Customer` - May update only their own account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Self-registered user
    Customer,
}

impl Role {
    /// Every role, in seeding order.
    pub const ALL: [Role; 2] = [Role::Admin, Role::Customer];

    /// The code stored on users and embedded in token claims.
    pub fn code(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Human-readable role name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Customer => "Customer",
        }
    }

    /// Parse a role code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Role> {
        match code.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "CUSTOMER" => Some(Role::Customer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
