// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded user database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: uuid → serialized StoredUser
//! - `username_index`: normalized username → uuid
//! - `email_index`: normalized email → uuid
//! - `roles`: role code → serialized StoredRole

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{
    backends::InMemoryBackend, Database, ReadableDatabase, ReadableTable, ReadableTableMetadata,
    TableDefinition,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use super::{StorageError, StorageResult};
use crate::auth::{IdentityClaims, Role};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: uuid → serialized StoredUser (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Unique index: normalized username → uuid.
const USERNAME_INDEX: TableDefinition<&str, &str> = TableDefinition::new("username_index");

/// Unique index: normalized email → uuid.
const EMAIL_INDEX: TableDefinition<&str, &str> = TableDefinition::new("email_index");

/// Role catalogue: code → serialized StoredRole (JSON bytes).
const ROLES: TableDefinition<&str, &[u8]> = TableDefinition::new("roles");

// =============================================================================
// Records
// =============================================================================

/// A user account as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    pub uuid: Uuid,
    pub name: String,
    pub username: String,
    /// Argon2 PHC string, never the plaintext
    pub password_hash: String,
    pub phone_number: String,
    pub email: String,
    /// References a row in `roles`
    pub role_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredUser {
    /// The identity embedded in tokens and returned by the API.
    pub fn identity(&self) -> IdentityClaims {
        IdentityClaims {
            uuid: self.uuid,
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            role: self.role_code.clone(),
        }
    }
}

/// A role as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredRole {
    pub code: String,
    pub name: String,
}

impl From<Role> for StoredRole {
    fn from(role: Role) -> Self {
        Self {
            code: role.code().to_string(),
            name: role.display_name().to_string(),
        }
    }
}

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Index key for usernames and emails: NFKC-normalized, lowercase, trimmed.
///
/// `Jane@Example.com` and `jane@example.com` collide on purpose.
pub fn normalize_key(value: &str) -> String {
    value.trim().nfkc().collect::<String>().to_lowercase()
}

// =============================================================================
// UserDatabase
// =============================================================================

/// Embedded ACID user database.
pub struct UserDatabase {
    db: Database,
}

impl UserDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Database::create(path)?)
    }

    /// Open a database that lives only in memory.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Database::builder().create_with_backend(InMemoryBackend::new())?)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAME_INDEX)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(ROLES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Insert every known role that is not present yet. Idempotent.
    pub fn seed_roles(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ROLES)?;
            for role in Role::ALL {
                if table.get(role.code())?.is_some() {
                    continue;
                }
                let json = serde_json::to_vec(&StoredRole::from(role))?;
                table.insert(role.code(), json.as_slice())?;
                tracing::info!(role = role.code(), "role seeded");
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a role by code.
    pub fn get_role(&self, code: &str) -> StorageResult<Option<StoredRole>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ROLES)?;
        match table.get(code)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user. Username and email must be unused and the role
    /// must exist; otherwise nothing is written.
    pub fn insert_user(&self, user: &StoredUser) -> StorageResult<()> {
        let uuid = user.uuid.to_string();
        let username_key = normalize_key(&user.username);
        let email_key = normalize_key(&user.email);
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        let outcome = (|| -> StorageResult<()> {
            if write_txn.open_table(ROLES)?.get(user.role_code.as_str())?.is_none() {
                return Err(StorageError::NotFound(format!("Role {}", user.role_code)));
            }

            let mut users = write_txn.open_table(USERS)?;
            if users.get(uuid.as_str())?.is_some() {
                return Err(StorageError::AlreadyExists(format!("User {uuid}")));
            }

            let mut usernames = write_txn.open_table(USERNAME_INDEX)?;
            if usernames.get(username_key.as_str())?.is_some() {
                return Err(StorageError::UsernameTaken(user.username.clone()));
            }

            let mut emails = write_txn.open_table(EMAIL_INDEX)?;
            if emails.get(email_key.as_str())?.is_some() {
                return Err(StorageError::EmailTaken(user.email.clone()));
            }

            users.insert(uuid.as_str(), json.as_slice())?;
            usernames.insert(username_key.as_str(), uuid.as_str())?;
            emails.insert(email_key.as_str(), uuid.as_str())?;
            Ok(())
        })();

        finish(write_txn, outcome)
    }

    /// Replace an existing user, moving its index entries if the username
    /// or email changed. Fails without writing if the new values are taken
    /// by another user.
    pub fn update_user(&self, user: &StoredUser) -> StorageResult<()> {
        let uuid = user.uuid.to_string();
        let json = serde_json::to_vec(user)?;

        let write_txn = self.db.begin_write()?;
        let outcome = (|| -> StorageResult<()> {
            let mut users = write_txn.open_table(USERS)?;
            let existing: StoredUser = {
                let value = users
                    .get(uuid.as_str())?
                    .ok_or_else(|| StorageError::NotFound(format!("User {uuid}")))?;
                serde_json::from_slice(value.value())?
            };

            let mut usernames = write_txn.open_table(USERNAME_INDEX)?;
            reindex(
                &mut usernames,
                &normalize_key(&existing.username),
                &normalize_key(&user.username),
                &uuid,
                || StorageError::UsernameTaken(user.username.clone()),
            )?;

            let mut emails = write_txn.open_table(EMAIL_INDEX)?;
            reindex(
                &mut emails,
                &normalize_key(&existing.email),
                &normalize_key(&user.email),
                &uuid,
                || StorageError::EmailTaken(user.email.clone()),
            )?;

            users.insert(uuid.as_str(), json.as_slice())?;
            Ok(())
        })();

        finish(write_txn, outcome)
    }

    /// Look up a user by uuid.
    pub fn find_by_uuid(&self, uuid: Uuid) -> StorageResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        read_json(&table, uuid.to_string().as_str())
    }

    /// Look up a user by username (case-insensitive).
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<StoredUser>> {
        self.find_via_index(USERNAME_INDEX, username)
    }

    /// Look up a user by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        self.find_via_index(EMAIL_INDEX, email)
    }

    fn find_via_index(
        &self,
        index: TableDefinition<'static, &'static str, &'static str>,
        value: &str,
    ) -> StorageResult<Option<StoredUser>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(index)?;
        let Some(uuid) = index.get(normalize_key(value).as_str())? else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        read_json(&users, uuid.value())
    }

    /// Number of stored users. Also serves as a cheap readiness probe.
    pub fn count_users(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        Ok(table.len()?)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Commit on success, abort on failure, returning the original outcome.
fn finish(write_txn: redb::WriteTransaction, outcome: StorageResult<()>) -> StorageResult<()> {
    match outcome {
        Ok(()) => {
            write_txn.commit()?;
            Ok(())
        }
        Err(err) => {
            write_txn.abort()?;
            Err(err)
        }
    }
}

/// Move `uuid` from `old_key` to `new_key` in a unique index.
fn reindex(
    index: &mut redb::Table<'_, &'static str, &'static str>,
    old_key: &str,
    new_key: &str,
    uuid: &str,
    taken: impl FnOnce() -> StorageError,
) -> StorageResult<()> {
    if old_key == new_key {
        return Ok(());
    }

    let owner = index.get(new_key)?.map(|v| v.value().to_string());
    if owner.is_some_and(|owner| owner != uuid) {
        return Err(taken());
    }

    index.remove(old_key)?;
    index.insert(new_key, uuid)?;
    Ok(())
}

fn read_json<T, R>(table: &R, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(key)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}
