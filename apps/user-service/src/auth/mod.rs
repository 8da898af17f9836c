// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token issuance and request authentication for the user service.
//!
//! ## Auth Flow
//!
//! 1. `POST /api/v1/auth/login` checks the password and issues an HS256
//!    token whose payload is `{iss: "user-service", exp, user}`
//! 2. Callers send `Authorization: Bearer <token>` together with the
//!    service signature headers `X-Service-Name`, `X-Request-At` and
//!    `X-Api-Key`
//! 3. The middleware verifies the token, then the API key, and binds the
//!    identity to the request
//!
//! ## Security
//!
//! - Only HS256 is accepted; any other `alg` is rejected
//! - Expiry is checked with zero leeway
//! - Signature and API-key comparisons are constant-time
//! - Every failure is reported to the caller as the same `unauthorized`
//!   message; the precise reason is logged

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod signature;
pub mod token;

pub use claims::{IdentityClaims, TokenClaims, TOKEN_ISSUER};
pub use error::AuthError;
pub use extractor::Auth;
pub use middleware::{authenticate, AuthConfig};
pub use roles::Role;
pub use signature::SignatureValidator;
pub use token::TokenCodec;
