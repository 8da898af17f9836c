// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authenticate, IdentityClaims},
    error::ApiError,
    models::{FieldError, LoginRequest, RegisterRequest, UpdateRequest},
    state::AppState,
};

pub mod health;
pub mod rate_limit;
pub mod users;

pub fn router(state: AppState) -> Router {
    // Routes above the route_layer require a verified identity.
    let auth_routes = Router::new()
        .route("/user", get(users::get_user_login))
        .route(
            "/{uuid}",
            get(users::get_user_by_uuid).put(users::update_user),
        )
        .route_layer(from_fn_with_state(state.auth.clone(), authenticate))
        .route("/login", post(users::login))
        .route("/register", post(users::register))
        .layer(from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit::limit_by_ip,
        ));

    let app_routes = Router::new()
        .nest("/api/v1/auth", auth_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(app_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::internal(format!("handler panicked: {detail}")).into_response()
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Api-Key"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::register,
        users::login,
        users::get_user_login,
        users::get_user_by_uuid,
        users::update_user,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            IdentityClaims,
            FieldError,
            LoginRequest,
            RegisterRequest,
            UpdateRequest,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Registration, login and account management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
