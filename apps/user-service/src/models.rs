// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API, plus the response envelope
//! every endpoint answers with:
//!
//! ```json
//! {"status": "success", "message": "OK", "data": {...}, "token": "..."}
//! {"status": "error", "message": "unauthorized"}
//! ```
//!
//! Request types implement [`Validate`]; handlers turn a failed validation
//! into a 422 listing each offending field.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::IdentityClaims;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Column widths of the account schema.
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_USERNAME_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 15;
pub const MIN_PASSWORD_LEN: usize = 8;

// =============================================================================
// Envelope
// =============================================================================

/// Successful response envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Always `success`
    pub status: String,
    /// Always `OK`
    pub message: String,
    pub data: T,
    /// Issued token, only present on login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: "OK".to_string(),
            data,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Credentials for `POST /api/v1/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// New account for `POST /api/v1/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone_number: String,
}

/// Account changes for `PUT /api/v1/auth/{uuid}`.
///
/// The password only changes when `password` is present.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
    pub phone_number: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Public view of an account. Same shape as the token identity.
pub type UserResponse = IdentityClaims;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

// =============================================================================
// Validation
// =============================================================================

pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        required(&mut errors, "username", &self.username);
        required(&mut errors, "password", &self.password);
        finish(errors)
    }
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        profile_fields(
            &mut errors,
            &self.name,
            &self.username,
            &self.email,
            &self.phone_number,
        );
        if required(&mut errors, "password", &self.password) {
            min_len(&mut errors, "password", &self.password, MIN_PASSWORD_LEN);
        }
        required(&mut errors, "confirmPassword", &self.confirm_password);
        finish(errors)
    }
}

impl Validate for UpdateRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        profile_fields(
            &mut errors,
            &self.name,
            &self.username,
            &self.email,
            &self.phone_number,
        );
        if let Some(password) = &self.password {
            min_len(&mut errors, "password", password, MIN_PASSWORD_LEN);
            if self.confirm_password.is_none() {
                errors.push(FieldError::new(
                    "confirmPassword",
                    "confirmPassword is required",
                ));
            }
        }
        finish(errors)
    }
}

fn profile_fields(
    errors: &mut Vec<FieldError>,
    name: &str,
    username: &str,
    email: &str,
    phone_number: &str,
) {
    if required(errors, "name", name) {
        max_len(errors, "name", name, MAX_NAME_LEN);
    }
    if required(errors, "username", username) {
        max_len(errors, "username", username, MAX_USERNAME_LEN);
    }
    if required(errors, "email", email) {
        if is_email(email) {
            max_len(errors, "email", email, MAX_EMAIL_LEN);
        } else {
            errors.push(FieldError::new(
                "email",
                "email is not a valid email address",
            ));
        }
    }
    if required(errors, "phoneNumber", phone_number) {
        max_len(errors, "phoneNumber", phone_number, MAX_PHONE_LEN);
    }
}

/// Records an error and returns `false` when `value` is blank.
fn required(errors: &mut Vec<FieldError>, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{field} is required")));
        false
    } else {
        true
    }
}

fn max_len(errors: &mut Vec<FieldError>, field: &str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(FieldError::new(
            field,
            format!("{field} must be at most {max} characters"),
        ));
    }
}

fn min_len(errors: &mut Vec<FieldError>, field: &str, value: &str, min: usize) {
    if value.chars().count() < min {
        errors.push(FieldError::new(
            field,
            format!("{field} must be at least {min} characters"),
        ));
    }
}

/// Loose shape check: `local@domain.tld`, no whitespace.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
