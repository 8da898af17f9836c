// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service-to-service API-key signatures.
//!
//! A calling service proves it knows the shared secret by sending
//!
//! ```text
//! X-Api-Key = hex(sha256("{X-Service-Name}:{secret}:{X-Request-At}"))
//! ```
//!
//! ## Known limitation
//!
//! `X-Request-At` is part of the signed material but its freshness is not
//! checked, so a captured key can be replayed for as long as the secret
//! stays the same. Callers must not treat it as replay protection.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::AuthError;

/// Header carrying the caller-computed signature.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the timestamp mixed into the signature.
pub const REQUEST_AT_HEADER: &str = "x-request-at";
/// Header naming the calling service.
pub const SERVICE_NAME_HEADER: &str = "x-service-name";

/// Validates `X-Api-Key` signatures against the shared secret.
#[derive(Clone)]
pub struct SignatureValidator {
    shared_secret: String,
}

impl std::fmt::Debug for SignatureValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureValidator").finish_non_exhaustive()
    }
}

impl SignatureValidator {
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            shared_secret: shared_secret.into(),
        }
    }

    /// Lowercase hex SHA-256 of `service:secret:request_at`.
    pub fn expected_signature(&self, service_name: &str, request_at: &str) -> String {
        sign(service_name, &self.shared_secret, request_at)
    }

    /// Compare `presented` with the expected signature in constant time.
    pub fn validate(
        &self,
        service_name: &str,
        request_at: &str,
        presented: &str,
    ) -> Result<(), AuthError> {
        let expected = self.expected_signature(service_name, request_at);
        if bool::from(expected.as_bytes().ct_eq(presented.as_bytes())) {
            Ok(())
        } else {
            Err(AuthError::SignatureMismatch)
        }
    }
}

/// Compute the signature a caller holding `secret` would send.
pub fn sign(service_name: &str, secret: &str, request_at: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(service_name.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    hasher.update(b":");
    hasher.update(request_at.as_bytes());
    hex::encode(hasher.finalize())
}
