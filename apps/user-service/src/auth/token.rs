// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Issuing and verifying HS256 identity tokens.
//!
//! Tokens are `header.payload.signature` in base64url. The payload holds the
//! registered `iss` and `exp` claims plus the [`IdentityClaims`] under
//! `user`. Nothing is stored server-side: a token is valid until `exp`
//! passes or its signature stops matching.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::claims::{IdentityClaims, TokenClaims, TOKEN_ISSUER};
use super::AuthError;

/// The only algorithm tokens are signed and accepted with.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Symmetric token codec.
///
/// Holds the signing secret and the default TTL. Cheap to clone and safe to
/// share across requests; it carries no mutable state.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: TimeDelta,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: TimeDelta) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issue a token for `user` that expires after the configured TTL.
    pub fn issue(&self, user: IdentityClaims) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_with_ttl(user, self.ttl)
    }

    /// Issue a token with an explicit TTL. A negative TTL yields a token that
    /// is already expired.
    pub fn issue_with_ttl(
        &self,
        user: IdentityClaims,
        ttl: TimeDelta,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let expires_at = Utc::now().timestamp() + ttl.num_seconds();
        let claims = TokenClaims::new(user, expires_at);
        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
    }

    /// Verify a token and return the identity it carries.
    ///
    /// Checks run in order: structure, algorithm, signature, expiry, issuer.
    /// The HMAC comparison is constant-time (done by `jsonwebtoken` through
    /// the `hmac` crate's `verify_slice`).
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::MalformedToken);
        };

        let header = decode_json_segment(header)?;
        match header.get("alg").and_then(serde_json::Value::as_str) {
            Some(alg) if alg == "HS256" => {}
            Some(_) => return Err(AuthError::UnsupportedAlgorithm),
            None => return Err(AuthError::MalformedToken),
        }

        if !decode_json_segment(payload)?.is_object() {
            return Err(AuthError::MalformedToken);
        }
        if signature.is_empty() {
            return Err(AuthError::InvalidSignature);
        }

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm,
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                // Header and payload decoded above, so this is the signature.
                ErrorKind::Base64(_) => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })?;

        Ok(token_data.claims.user)
    }
}

fn decode_json_segment(segment: &str) -> Result<serde_json::Value, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::MalformedToken)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedToken)
}
