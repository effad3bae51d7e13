//! Security headers middleware
//!
//! Adds OWASP-recommended headers to every response:
//!
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options: DENY`
//! - `Referrer-Policy: strict-origin-when-cross-origin`
//! - `Permissions-Policy`
//! - `Content-Security-Policy`
//! - `Strict-Transport-Security` (production only)
//!
//! The bundled front end wires its admin table buttons through inline
//! `onclick` attributes, which `script-src 'self'` blocks. When the server
//! also hosts that front end the layer is built with
//! [`SecurityHeadersLayer::with_inline_scripts`], adding `'unsafe-inline'`
//! to `script-src`. API-only deployments keep the strict policy.
//!
//! # Example
//!
//! ```
//! use axum::Router;
//! use noticehub_api::middleware::security::SecurityHeadersLayer;
//!
//! let app: Router = Router::new().layer(SecurityHeadersLayer::new(true));
//! ```

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    response::Response,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

// The bundled front end loads Font Awesome and Google Fonts from CDNs.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self'; \
     style-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com https://fonts.googleapis.com; \
     font-src 'self' https://cdnjs.cloudflare.com https://fonts.gstatic.com; \
     img-src 'self' data:; \
     connect-src 'self'; \
     frame-ancestors 'none'";

const FRONT_END_CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline'; \
     style-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com https://fonts.googleapis.com; \
     font-src 'self' https://cdnjs.cloudflare.com https://fonts.gstatic.com; \
     img-src 'self' data:; \
     connect-src 'self'; \
     frame-ancestors 'none'";

/// Security headers middleware layer
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeadersLayer {
    enable_hsts: bool,
    inline_scripts: bool,
}

impl SecurityHeadersLayer {
    /// `enable_hsts` should only be set when served over HTTPS
    pub fn new(enable_hsts: bool) -> Self {
        Self {
            enable_hsts,
            inline_scripts: false,
        }
    }

    /// Allows inline scripts and event handlers in served pages
    pub fn with_inline_scripts(mut self, allow: bool) -> Self {
        self.inline_scripts = allow;
        self
    }

    fn content_security_policy(&self) -> &'static str {
        if self.inline_scripts {
            FRONT_END_CONTENT_SECURITY_POLICY
        } else {
            CONTENT_SECURITY_POLICY
        }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersMiddleware {
            inner,
            enable_hsts: self.enable_hsts,
            csp: self.content_security_policy(),
        }
    }
}

/// Security headers middleware service
#[derive(Debug, Clone)]
pub struct SecurityHeadersMiddleware<S> {
    inner: S,
    enable_hsts: bool,
    csp: &'static str,
}

impl<S> Service<Request> for SecurityHeadersMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let future = self.inner.call(request);
        let enable_hsts = self.enable_hsts;
        let csp = self.csp;

        Box::pin(async move {
            let mut response = future.await?;
            let headers = response.headers_mut();

            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            );
            headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
            headers.insert(
                header::REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            );
            headers.insert(
                PERMISSIONS_POLICY,
                HeaderValue::from_static("geolocation=(), microphone=(), camera=(), payment=()"),
            );
            headers.insert(
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static(csp),
            );

            if enable_hsts {
                headers.insert(
                    header::STRICT_TRANSPORT_SECURITY,
                    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
                );
            }

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse, routing::get, Router};
    use tower::Service as _;

    async fn handler() -> impl IntoResponse {
        (StatusCode::OK, "test")
    }

    async fn call(enable_hsts: bool) -> Response {
        call_with(SecurityHeadersLayer::new(enable_hsts)).await
    }

    async fn call_with(layer: SecurityHeadersLayer) -> Response {
        let mut app = Router::new().route("/test", get(handler)).layer(layer);

        app.call(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let response = call(false).await;
        let headers = response.headers();

        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
        assert_eq!(
            headers.get("Referrer-Policy").unwrap(),
            "strict-origin-when-cross-origin"
        );
        assert!(headers.get("Content-Security-Policy").is_some());
        assert!(headers.get("Permissions-Policy").is_some());
        assert!(headers.get("Strict-Transport-Security").is_none());
    }

    #[tokio::test]
    async fn test_hsts_enabled_in_production() {
        let response = call(true).await;
        assert!(response.headers().get("Strict-Transport-Security").is_some());
    }

    #[tokio::test]
    async fn test_script_policy() {
        let strict = call(false).await;
        let csp = strict.headers().get("Content-Security-Policy").unwrap();
        assert!(csp.to_str().unwrap().contains("script-src 'self';"));

        let front_end = call_with(SecurityHeadersLayer::new(false).with_inline_scripts(true)).await;
        let csp = front_end.headers().get("Content-Security-Policy").unwrap();
        assert!(csp
            .to_str()
            .unwrap()
            .contains("script-src 'self' 'unsafe-inline';"));
    }
}
