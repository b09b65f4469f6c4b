// src/client/csrf.rs
//! Django CSRF request signing.
//!
//! Unsafe methods sent to the job service's own origin carry the token from
//! the `csrftoken` cookie in an `X-CSRFToken` header.

use reqwest::{Method, RequestBuilder};

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

/// Methods that never need a CSRF token.
pub fn csrf_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

#[derive(Debug, Clone, Default)]
pub struct CsrfSigner {
    token: Option<String>,
}

impl CsrfSigner {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    /// Reads the token named `cookie_name` out of a `Cookie` header value.
    pub fn from_cookie_header(cookie_name: &str, header: &str) -> Self {
        let token = header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == cookie_name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty());
        Self { token }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The header to attach, if any, for a request with `method`.
    pub fn header_for(&self, method: &Method, same_origin: bool) -> Option<(&'static str, &str)> {
        if csrf_safe_method(method) || !same_origin {
            return None;
        }
        self.token().map(|token| (CSRF_HEADER, token))
    }

    pub fn sign(&self, builder: RequestBuilder, method: &Method, same_origin: bool) -> RequestBuilder {
        match self.header_for(method, same_origin) {
            Some((name, token)) => builder.header(name, token),
            None => builder,
        }
    }
}
