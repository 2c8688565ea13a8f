use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::state::AppState;

/// Scheme and host the client addressed, e.g. `http://localhost`.
///
/// Honors `X-Forwarded-Proto` and `X-Forwarded-Host` only when
/// `server.trust_forwarded_headers` is set. Empty when the request carries
/// no host, in which case generated URLs stay relative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin(String);

impl RequestOrigin {
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_parts(parts: &Parts, trust_forwarded: bool) -> Self {
        let header_value = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };
        let forwarded = |name: &str| header_value(name).filter(|_| trust_forwarded);

        let host = forwarded("x-forwarded-host")
            .or_else(|| header_value(header::HOST.as_str()))
            .or_else(|| parts.uri.authority().map(|a| a.as_str()));
        let Some(host) = host else {
            return Self::default();
        };

        let scheme = forwarded("x-forwarded-proto")
            .or_else(|| parts.uri.scheme_str())
            .unwrap_or("http");
        Self(format!("{scheme}://{host}"))
    }
}

impl FromRequestParts<AppState> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(
            parts,
            state.config.server.trust_forwarded_headers,
        ))
    }
}
