// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::api::rate_limit::{ip_rate_limiter, IpRateLimiter};
use crate::auth::{AuthConfig, SignatureValidator, TokenCodec};
use crate::config::AppConfig;
use crate::services::UserService;
use crate::storage::{StorageResult, UserDatabase};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<UserDatabase>,
    pub auth: Arc<AuthConfig>,
    pub users: UserService,
    pub rate_limiter: Arc<IpRateLimiter>,
}

impl AppState {
    /// Wire the auth core and user service around an opened database.
    pub fn new(storage: UserDatabase, config: &AppConfig) -> Self {
        let storage = Arc::new(storage);
        let tokens = TokenCodec::new(config.jwt_secret.as_bytes(), config.jwt_ttl);
        let auth = AuthConfig::new(
            tokens.clone(),
            SignatureValidator::new(config.signature_key.clone()),
        );

        Self {
            users: UserService::new(storage.clone(), tokens),
            auth: Arc::new(auth),
            rate_limiter: Arc::new(ip_rate_limiter(config.rate_limit)),
            storage,
        }
    }

    /// In-memory state with seeded roles, for tests.
    pub fn in_memory(config: &AppConfig) -> StorageResult<Self> {
        let storage = UserDatabase::open_in_memory()?;
        storage.seed_roles()?;
        Ok(Self::new(storage, config))
    }
}
