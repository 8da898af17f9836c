// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Business logic between the HTTP handlers and storage.

pub mod users;

pub use users::{UserService, UserServiceError, UserServiceResult};
