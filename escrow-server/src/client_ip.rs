//! Origin address of a request, recorded alongside identities and escrow records.

use std::{convert::Infallible, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::request::Parts,
};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Best-effort client address.
///
/// Uses the peer address when the server was started with connect info,
/// then the first `X-Forwarded-For` entry, and `"unknown"` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(Self(addr.ip().to_string()));
        }

        let forwarded = parts
            .headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        Ok(Self(forwarded.unwrap_or("unknown").to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> ClientIp {
        let (mut parts, _) = request.into_parts();
        ClientIp::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn prefers_connect_info() {
        let mut request = Request::builder()
            .header(FORWARDED_FOR, "198.51.100.1")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 5555))));

        assert_eq!(extract(request).await, ClientIp("10.1.2.3".into()));
    }

    #[tokio::test]
    async fn falls_back_to_first_forwarded_entry() {
        let request = Request::builder()
            .header(FORWARDED_FOR, " 198.51.100.1 , 10.0.0.1")
            .body(())
            .unwrap();

        assert_eq!(extract(request).await, ClientIp("198.51.100.1".into()));
    }

    #[tokio::test]
    async fn unknown_without_any_source() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await, ClientIp("unknown".into()));
    }
}
