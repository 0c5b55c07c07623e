use std::convert::Infallible;
use std::net::SocketAddr;

use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{header, request::Parts, HeaderMap};

use tiergate_core::{classify, Caller, Identity, Tier};

use crate::app_state::AppState;

/// Who is calling, resolved from `Authorization: Bearer <token>`.
///
/// Never rejects: a missing, malformed or unknown token is an anonymous caller.
#[derive(Debug, Clone)]
pub struct CurrentCaller {
    pub caller: Option<Caller>,
    /// Rate-limit bucket key: the user id when known, else the peer address.
    pub key: String,
}

impl CurrentCaller {
    pub fn identity(&self) -> Option<&dyn Identity> {
        self.caller.as_ref().map(|c| c as &dyn Identity)
    }

    pub fn tier(&self) -> Tier {
        classify(self.identity())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentCaller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(resolve(&parts.headers, peer, state))
    }
}

pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>, state: &AppState) -> CurrentCaller {
    let caller = bearer_token(headers).and_then(|token| {
        let found = state.resolve_caller(token);
        if found.is_none() {
            tracing::debug!("unknown bearer token; treating caller as anonymous");
        }
        found
    });

    let key = match (&caller, peer) {
        (Some(Caller { user_id: Some(id), .. }), _) => format!("user:{id}"),
        (Some(_), _) => "user:unidentified".to_string(),
        (None, Some(addr)) => format!("ip:{}", addr.ip()),
        (None, None) => "ip:unknown".to_string(),
    };

    CurrentCaller { caller, key }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
