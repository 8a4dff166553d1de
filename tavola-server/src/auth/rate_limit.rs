//! Application-layer rate limiting for login and registration routes

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::security_log;
use crate::state::AppState;

/// Login: 5 requests/minute per IP
pub const LOGIN_LIMIT: u32 = 5;
/// Registration: 3 requests/minute per IP
pub const REGISTER_LIMIT: u32 = 3;
const WINDOW: Duration = Duration::from_secs(60);
/// Entries idle longer than this are dropped by [`RateLimiter::cleanup`]
const IDLE_CUTOFF: Duration = Duration::from_secs(300);

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window: Duration,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove idle entries
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < IDLE_CUTOFF);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Client IP used as the rate-limit key.
///
/// `X-Forwarded-For` is only honoured when the peer is a trusted proxy; the
/// client is then the right-most hop that is not itself a trusted proxy.
pub fn extract_ip(request: &Request, trusted_proxies: &[IpAddr]) -> String {
    let Some(peer) = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
    else {
        return "unknown".to_owned();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let forwarded = request
        .headers()
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
        .collect::<Vec<_>>();
    forwarded
        .into_iter()
        .rev()
        .find(|hop| !trusted_proxies.contains(hop))
        .unwrap_or(peer)
        .to_string()
}

async fn limit(
    state: &AppState,
    route: &'static str,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = extract_ip(&request, &state.config.trusted_proxies);
    if !state.rate_limiter.check(route, &ip, max_requests, WINDOW).await {
        security_log!("WARN", "rate_limited", route = route, ip = ip);
        return Err(AppError::with_message(
            ErrorCode::TooManyRequests,
            "Too many requests, try again later",
        ));
    }
    Ok(next.run(request).await)
}

pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "login", LOGIN_LIMIT, request, next).await
}

pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limit(&state, "register", REGISTER_LIMIT, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_per_ip_and_route() {
        let limiter = RateLimiter::new();
        for _ in 0..LOGIN_LIMIT {
            assert!(limiter.check("login", "10.0.0.1", LOGIN_LIMIT, WINDOW).await);
        }
        assert!(!limiter.check("login", "10.0.0.1", LOGIN_LIMIT, WINDOW).await);

        // other IPs and routes have their own budget
        assert!(limiter.check("login", "10.0.0.2", LOGIN_LIMIT, WINDOW).await);
        assert!(limiter.check("register", "10.0.0.1", REGISTER_LIMIT, WINDOW).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new();
        for _ in 0..=REGISTER_LIMIT {
            limiter.check("register", "ip", REGISTER_LIMIT, WINDOW).await;
        }
        assert!(!limiter.check("register", "ip", REGISTER_LIMIT, WINDOW).await);

        tokio::time::advance(WINDOW).await;
        assert!(limiter.check("register", "ip", REGISTER_LIMIT, WINDOW).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_drops_idle_entries() {
        let limiter = RateLimiter::new();
        limiter.check("login", "ip", LOGIN_LIMIT, WINDOW).await;
        tokio::time::advance(IDLE_CUTOFF).await;
        limiter.cleanup().await;
        assert!(limiter.inner.lock().await.is_empty());
    }

    fn from_peer(peer: &str, forwarded_for: Option<&str>) -> Request {
        let mut builder = Request::builder();
        if let Some(value) = forwarded_for {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut req = builder.body(axum::body::Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_extract_ip_ignores_forwarded_for_from_clients() {
        let req = from_peer("198.51.100.7:50000", Some("203.0.113.9"));
        assert_eq!(extract_ip(&req, &[]), "198.51.100.7");

        let proxy: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(extract_ip(&req, &[proxy]), "198.51.100.7");
    }

    #[test]
    fn test_extract_ip_behind_trusted_proxy() {
        let proxy: IpAddr = "10.0.0.1".parse().unwrap();
        // Spoofed left-most entry is skipped; the proxy appended the real client
        let req = from_peer("10.0.0.1:443", Some("1.2.3.4, 203.0.113.9"));
        assert_eq!(extract_ip(&req, &[proxy]), "203.0.113.9");

        let req = from_peer("10.0.0.1:443", None);
        assert_eq!(extract_ip(&req, &[proxy]), "10.0.0.1");
    }

    #[test]
    fn test_extract_ip_without_peer() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_ip(&req, &[]), "unknown");
    }
}
