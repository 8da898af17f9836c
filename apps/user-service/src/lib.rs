// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User Service - accounts, login and request authentication
//!
//! Issues HS256 identity tokens at login and guards protected routes with a
//! two-factor check: a valid bearer token AND a service signature
//! (`X-Api-Key`) derived from a shared secret.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, signature validator and auth middleware
//! - `services` - Account operations
//! - `storage` - User database (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
