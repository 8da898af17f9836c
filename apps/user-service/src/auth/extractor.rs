// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated identity.
//!
//! Handlers behind [`super::middleware::authenticate`] take `Auth` to read
//! the identity the middleware bound to the request:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is IdentityClaims
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, IdentityClaims};

/// Extractor for the identity bound by the auth middleware.
///
/// It never verifies credentials itself. A handler reached without the
/// middleware gets a 401, not an unverified identity.
#[derive(Debug, Clone)]
pub struct Auth(pub IdentityClaims);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityClaims>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::MissingCredential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn reads_identity_from_extensions() {
        let mut parts = parts();
        let identity = IdentityClaims {
            uuid: Uuid::new_v4(),
            name: "From Middleware".to_string(),
            username: "middleware".to_string(),
            email: "mw@example.com".to_string(),
            phone_number: "0800".to_string(),
            role: "ADMIN".to_string(),
        };
        parts.extensions.insert(identity.clone());

        let Auth(user) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user, identity);
    }

    #[tokio::test]
    async fn rejects_when_nothing_was_bound() {
        let mut parts = parts();
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[tokio::test]
    async fn ignores_bearer_header_without_middleware() {
        let mut parts = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer forged.token.value")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }
}
