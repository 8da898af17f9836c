// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Every request passing through [`authenticate`] goes through these
//! steps, and any failing step ends the request with a 401:
//!
//! 1. `Authorization` header present and non-empty
//! 2. header contains `Bearer` and splits into exactly scheme + token
//! 3. token verifies (algorithm, signature, expiry, issuer)
//! 4. `X-Api-Key` matches the signature for `X-Service-Name`/`X-Request-At`
//! 5. the verified [`IdentityClaims`] are inserted into the request
//!    extensions, once, for handlers to read through [`super::Auth`]
//!
//! Both the token and the API key must pass. There is no partial trust.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::claims::IdentityClaims;
use super::signature::{
    SignatureValidator, API_KEY_HEADER, REQUEST_AT_HEADER, SERVICE_NAME_HEADER,
};
use super::token::TokenCodec;
use super::AuthError;

/// Scheme marker expected in the `Authorization` header.
const BEARER_SCHEME: &str = "Bearer";

/// Authentication configuration.
///
/// Built once at startup from the loaded config and shared read-only by
/// every request.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Issues and verifies identity tokens
    pub tokens: TokenCodec,
    /// Checks the service-to-service API key
    pub signatures: SignatureValidator,
}

impl AuthConfig {
    pub fn new(tokens: TokenCodec, signatures: SignatureValidator) -> Self {
        Self { tokens, signatures }
    }

    /// Run the full credential check against a set of request headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<IdentityClaims, AuthError> {
        let authorization = header_str(headers, AUTHORIZATION.as_str());
        if authorization.is_empty() {
            return Err(AuthError::MissingCredential);
        }

        let token = extract_bearer_token(authorization).ok_or(AuthError::MissingCredential)?;
        let identity = self.tokens.verify(token)?;

        self.signatures.validate(
            header_str(headers, SERVICE_NAME_HEADER),
            header_str(headers, REQUEST_AT_HEADER),
            header_str(headers, API_KEY_HEADER),
        )?;

        Ok(identity)
    }
}

/// Pull the token out of `Bearer <token>`.
///
/// Returns `None` when the scheme marker is absent or the value does not
/// split into exactly two whitespace-separated parts.
pub fn extract_bearer_token(value: &str) -> Option<&str> {
    if !value.contains(BEARER_SCHEME) {
        return None;
    }

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(token), None) => Some(token),
        _ => None,
    }
}

/// Header value as a string; absent or non-UTF-8 headers read as empty.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Authentication middleware function.
///
/// # Usage
///
/// ```rust,ignore
/// let protected = Router::new()
///     .route("/user", get(current_user))
///     .route_layer(axum::middleware::from_fn_with_state(
///         state.auth.clone(),
///         authenticate,
///     ));
/// ```
pub async fn authenticate(
    State(config): State<Arc<AuthConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    match config.authenticate(request.headers()) {
        Ok(identity) => {
            tracing::debug!(user_id = %identity.uuid, "request authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(
                reason = err.error_code(),
                method = %request.method(),
                path = %request.uri().path(),
                "rejected request: {err}"
            );
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature::sign;
    use axum::http::HeaderValue;
    use chrono::TimeDelta;
    use uuid::Uuid;

    const SHARED: &str = "shared-secret";

    fn config() -> AuthConfig {
        AuthConfig::new(
            TokenCodec::new(b"jwt-secret", TimeDelta::minutes(5)),
            SignatureValidator::new(SHARED),
        )
    }

    fn identity() -> IdentityClaims {
        IdentityClaims {
            uuid: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
            phone_number: "0812".to_string(),
            role: "CUSTOMER".to_string(),
        }
    }

    fn signed_headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers.insert(SERVICE_NAME_HEADER, HeaderValue::from_static("orders"));
        headers.insert(REQUEST_AT_HEADER, HeaderValue::from_static("1700000000"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&sign("orders", SHARED, "1700000000")).unwrap(),
        );
        headers
    }

    #[test]
    fn extract_bearer_token_requires_scheme_and_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("Bearer   abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Bearer"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(extract_bearer_token("Bearer a b"), None);
    }

    #[test]
    fn valid_token_and_api_key_yield_identity() {
        let config = config();
        let identity = identity();
        let token = config.tokens.issue(identity.clone()).unwrap();

        let result = config.authenticate(&signed_headers(&format!("Bearer {token}")));
        assert_eq!(result, Ok(identity));
    }

    #[test]
    fn missing_authorization_is_missing_credential() {
        let config = config();
        let mut headers = signed_headers("Bearer x");
        headers.remove(AUTHORIZATION);
        assert_eq!(config.authenticate(&headers), Err(AuthError::MissingCredential));
    }

    #[test]
    fn wrong_scheme_is_missing_credential() {
        let config = config();
        let token = config.tokens.issue(identity()).unwrap();
        let headers = signed_headers(&format!("Token {token}"));
        assert_eq!(config.authenticate(&headers), Err(AuthError::MissingCredential));
    }

    #[test]
    fn valid_token_without_api_key_is_rejected() {
        let config = config();
        let token = config.tokens.issue(identity()).unwrap();
        let mut headers = signed_headers(&format!("Bearer {token}"));
        headers.remove(API_KEY_HEADER);
        assert_eq!(config.authenticate(&headers), Err(AuthError::SignatureMismatch));
    }

    #[test]
    fn token_failure_is_reported_before_api_key() {
        let config = config();
        let token = config
            .tokens
            .issue_with_ttl(identity(), TimeDelta::seconds(-1))
            .unwrap();
        let mut headers = signed_headers(&format!("Bearer {token}"));
        headers.remove(API_KEY_HEADER);
        assert_eq!(config.authenticate(&headers), Err(AuthError::Expired));
    }
}
