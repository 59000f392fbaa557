use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::state::AppState;

pub const USER_HEADER: &str = "x-user-id";
pub const ANONYMOUS: &str = "anonymous";

// Key a request is rate limited under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserKey(pub String);

impl UserKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

// Client-supplied headers only count when a trusted proxy sets them,
// otherwise the peer address is the key
pub fn resolve_user_key(parts: &Parts, trust_proxy_headers: bool) -> UserKey {
    if trust_proxy_headers {
        if let Some(user) = header_str(&parts.headers, USER_HEADER) {
            return UserKey(user.to_string());
        }

        let forwarded = header_str(&parts.headers, "x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return UserKey(ip.to_string());
        }
    }

    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        return UserKey(addr.ip().to_string());
    }

    UserKey(ANONYMOUS.to_string())
}

impl FromRequestParts<Arc<AppState>> for UserKey {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(resolve_user_key(parts, state.trust_proxy_headers))
    }
}
