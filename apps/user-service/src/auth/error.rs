// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Message returned to callers for every rejected credential.
///
/// The specific failure kind is only ever written to the logs.
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";

/// Message returned when an authenticated caller lacks the required role.
pub const FORBIDDEN_MESSAGE: &str = "forbidden";

/// Authentication error type.
///
/// Every variant except `InsufficientPermissions` is rendered as the same
/// generic 401 body; use [`AuthError::error_code`] to tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header, wrong scheme, or empty token segment
    MissingCredential,
    /// Token is not three decodable base64url segments of JSON
    MalformedToken,
    /// Token header names an algorithm other than HS256
    UnsupportedAlgorithm,
    /// Token signature does not match its header and payload
    InvalidSignature,
    /// Token expiration timestamp has passed
    Expired,
    /// Token was not issued by this service
    InvalidIssuer,
    /// `X-Api-Key` does not match the expected service signature
    SignatureMismatch,
    /// Authenticated, but not allowed to perform the operation
    InsufficientPermissions,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedToken => "malformed_token",
            AuthError::UnsupportedAlgorithm => "unsupported_algorithm",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Expired => "token_expired",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::SignatureMismatch => "signature_mismatch",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// The caller-visible message. Never names the failed check.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::InsufficientPermissions => FORBIDDEN_MESSAGE,
            _ => UNAUTHORIZED_MESSAGE,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredential => {
                write!(f, "Bearer credential is missing (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::UnsupportedAlgorithm => {
                write!(f, "Token signing algorithm is not supported")
            }
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::Expired => write!(f, "Token has expired"),
            AuthError::InvalidIssuer => write!(f, "Token issuer is invalid"),
            AuthError::SignatureMismatch => write!(f, "API key signature does not match"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(err.status_code(), err.public_message())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
