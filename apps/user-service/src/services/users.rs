// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account operations: registration, login, lookup and profile updates.
//!
//! Login is the only place tokens are issued. The identity embedded in a
//! token is a snapshot; profile changes show up in new tokens only.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{
    password::{hash_password, verify_password},
    IdentityClaims, Role, TokenCodec,
};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, UpdateRequest, UserResponse};
use crate::storage::{StorageError, StoredUser, UserDatabase};

/// Username of the account created by [`UserService::seed_admin`].
pub const ADMIN_USERNAME: &str = "admin";

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("user not found")]
    UserNotFound,

    #[error("username or password is incorrect")]
    InvalidCredentials,

    #[error("username already exists")]
    UsernameExists,

    #[error("email already exists")]
    EmailExists,

    #[error("password does not match")]
    PasswordDoesNotMatch,

    #[error("forbidden")]
    Forbidden,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("token issuance failed: {0}")]
    TokenIssue(#[from] jsonwebtoken::errors::Error),
}

pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// Identity provider backed by the user database.
#[derive(Clone)]
pub struct UserService {
    db: Arc<UserDatabase>,
    tokens: TokenCodec,
}

impl UserService {
    pub fn new(db: Arc<UserDatabase>, tokens: TokenCodec) -> Self {
        Self { db, tokens }
    }

    /// Create a customer account.
    pub fn register(&self, request: RegisterRequest) -> UserServiceResult<UserResponse> {
        if self.db.find_by_username(&request.username)?.is_some() {
            return Err(UserServiceError::UsernameExists);
        }
        if self.db.find_by_email(&request.email)?.is_some() {
            return Err(UserServiceError::EmailExists);
        }
        if request.password != request.confirm_password {
            return Err(UserServiceError::PasswordDoesNotMatch);
        }

        let now = Utc::now();
        let user = StoredUser {
            uuid: Uuid::new_v4(),
            name: request.name,
            username: request.username,
            password_hash: hash(&request.password)?,
            phone_number: request.phone_number,
            email: request.email,
            role_code: Role::Customer.code().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_user(&user).map_err(conflict_or_storage)?;

        tracing::info!(user_id = %user.uuid, username = %user.username, "user registered");
        Ok(user.identity())
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown usernames and wrong passwords fail the same way.
    pub fn login(&self, request: LoginRequest) -> UserServiceResult<LoginResponse> {
        let Some(user) = self.db.find_by_username(&request.username)? else {
            tracing::info!("login failed: unknown username");
            return Err(UserServiceError::InvalidCredentials);
        };

        let matches = verify_password(&request.password, &user.password_hash)
            .map_err(|e| UserServiceError::PasswordHash(e.to_string()))?;
        if !matches {
            tracing::info!(user_id = %user.uuid, "login failed: wrong password");
            return Err(UserServiceError::InvalidCredentials);
        }

        let identity = user.identity();
        let token = self.tokens.issue(identity.clone())?;

        tracing::info!(user_id = %user.uuid, "user logged in");
        Ok(LoginResponse {
            user: identity,
            token,
        })
    }

    /// Public view of any account.
    pub fn get_by_uuid(&self, uuid: Uuid) -> UserServiceResult<UserResponse> {
        self.db
            .find_by_uuid(uuid)?
            .map(|user| user.identity())
            .ok_or(UserServiceError::UserNotFound)
    }

    /// The identity the caller authenticated with, as embedded in the token.
    pub fn current_user(&self, identity: &IdentityClaims) -> UserResponse {
        identity.clone()
    }

    /// Update an account. Callers may change their own account; admins may
    /// change any. The role is never changed here.
    pub fn update(
        &self,
        caller: &IdentityClaims,
        uuid: Uuid,
        request: UpdateRequest,
    ) -> UserServiceResult<UserResponse> {
        if !caller.can_manage(uuid) {
            tracing::warn!(caller = %caller.uuid, target = %uuid, "update denied");
            return Err(UserServiceError::Forbidden);
        }

        let mut user = self
            .db
            .find_by_uuid(uuid)?
            .ok_or(UserServiceError::UserNotFound)?;

        if self
            .db
            .find_by_username(&request.username)?
            .is_some_and(|other| other.uuid != uuid)
        {
            return Err(UserServiceError::UsernameExists);
        }
        if self
            .db
            .find_by_email(&request.email)?
            .is_some_and(|other| other.uuid != uuid)
        {
            return Err(UserServiceError::EmailExists);
        }

        if let Some(password) = &request.password {
            if request.confirm_password.as_deref() != Some(password.as_str()) {
                return Err(UserServiceError::PasswordDoesNotMatch);
            }
            user.password_hash = hash(password)?;
        }

        user.name = request.name;
        user.username = request.username;
        user.email = request.email;
        user.phone_number = request.phone_number;
        user.updated_at = Utc::now();
        self.db.update_user(&user).map_err(conflict_or_storage)?;

        tracing::info!(user_id = %user.uuid, caller = %caller.uuid, "user updated");
        Ok(user.identity())
    }

    /// Create the `admin` account unless it already exists.
    pub fn seed_admin(&self, password: &str) -> UserServiceResult<()> {
        if self.db.find_by_username(ADMIN_USERNAME)?.is_some() {
            tracing::info!("admin user already present, skipping seed");
            return Ok(());
        }

        let now = Utc::now();
        let admin = StoredUser {
            uuid: Uuid::new_v4(),
            name: "Administrator".to_string(),
            username: ADMIN_USERNAME.to_string(),
            password_hash: hash(password)?,
            phone_number: "0000000000".to_string(),
            email: "admin@user-service.local".to_string(),
            role_code: Role::Admin.code().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.db.insert_user(&admin).map_err(conflict_or_storage)?;

        tracing::info!(user_id = %admin.uuid, "admin user seeded");
        Ok(())
    }
}

fn hash(password: &str) -> UserServiceResult<String> {
    hash_password(password).map_err(|e| UserServiceError::PasswordHash(e.to_string()))
}

/// A uniqueness violation that slipped past the pre-checks (concurrent
/// writers) still maps to the matching conflict.
fn conflict_or_storage(err: StorageError) -> UserServiceError {
    match err {
        StorageError::UsernameTaken(_) => UserServiceError::UsernameExists,
        StorageError::EmailTaken(_) => UserServiceError::EmailExists,
        other => UserServiceError::Storage(other),
    }
}
