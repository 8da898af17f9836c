// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-client-IP request throttling for the account endpoints.
//!
//! Over-quota requests get 429 `{"status":"error","message":"too many requests"}`.
//! The client is the TCP peer address; requests without connection info
//! (in-process tests) share one bucket.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use tokio_util::sync::CancellationToken;

use crate::{config::RateLimitConfig, error::ApiError};

/// How often idle client buckets are dropped.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

pub type IpRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

pub fn ip_rate_limiter(config: RateLimitConfig) -> IpRateLimiter {
    RateLimiter::keyed(Quota::per_second(config.per_second).allow_burst(config.burst))
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware rejecting requests once the caller's quota is spent.
pub async fn limit_by_ip(
    State(limiter): State<Arc<IpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);
    if limiter.check_key(&ip).is_err() {
        tracing::warn!(
            client_ip = %ip,
            method = %request.method(),
            path = %request.uri().path(),
            "rate limit exceeded"
        );
        return ApiError::too_many_requests().into_response();
    }
    next.run(request).await
}

/// Periodically forget clients whose buckets have refilled, until shutdown.
pub async fn prune_idle_clients(limiter: Arc<IpRateLimiter>, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(PRUNE_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                limiter.retain_recent();
            }
        }
    }
}
