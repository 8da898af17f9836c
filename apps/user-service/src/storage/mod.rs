// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # User Storage Module
//!
//! Persistent account storage in a single redb file under `DATA_DIR`.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   users.redb      # users, username/email indexes, roles
//! ```
//!
//! Usernames and emails are unique case-insensitively. Every multi-table
//! change happens in one write transaction, so an index never points at a
//! missing user.

pub mod users;

pub use users::{normalize_key, StoredRole, StoredUser, UserDatabase};

/// File name of the user database inside `DATA_DIR`.
pub const USER_DB_FILE: &str = "users.redb";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("username already taken: {0}")]
    UsernameTaken(String),

    #[error("email already taken: {0}")]
    EmailTaken(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
