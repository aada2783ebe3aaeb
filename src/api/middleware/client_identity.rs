//! Client identity resolution
//!
//! The socket peer address identifies the caller. Behind a reverse proxy the
//! first `X-Forwarded-For` entry (or `X-Real-IP`) is used instead, but only
//! when `server.trust_proxy` is enabled; otherwise those headers are ignored
//! so a client cannot pick its own identity.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::domain::ClientIdentity;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Identity of the calling client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub ClientIdentity);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Self(resolve_client_identity(
            &parts.headers,
            peer,
            state.trust_proxy,
        )))
    }
}

/// Pick the client address from proxy headers (when trusted) or the peer
pub fn resolve_client_identity(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trust_proxy: bool,
) -> ClientIdentity {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            return ClientIdentity::from(ip);
        }
    }

    match peer {
        Some(ip) => ClientIdentity::from(ip),
        None => {
            debug!("No client address available, using placeholder identity");
            ClientIdentity::unknown()
        }
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        headers
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    })
}
