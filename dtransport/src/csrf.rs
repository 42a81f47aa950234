//! CSRF token capture from the page security context.
//!
//! ```rust
//! use dtransport::{HttpRequest, SecurityContext};
//!
//! let context = SecurityContext::from_cookie_header("theme=dark; csrf_token=tok-1");
//! let request = context.apply(HttpRequest::post("/chat/new"));
//! assert_eq!(request.header("X-CSRFToken"), Some("tok-1"));
//! ```

use regex::Regex;

use crate::{HttpRequest, TransportError};

pub const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";
pub const DEFAULT_CSRF_COOKIE: &str = "csrf_token";

#[derive(PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// Page-level security context that stamps the CSRF header onto outgoing requests.
#[derive(Debug)]
pub struct SecurityContext {
    token: Option<SecretString>,
    header_name: String,
}

impl Default for SecurityContext {
    fn default() -> Self {
        Self {
            token: None,
            header_name: DEFAULT_CSRF_HEADER.to_string(),
        }
    }
}

impl SecurityContext {
    pub fn new(token: impl Into<String>) -> Self {
        let token = SecretString::new(token);
        Self {
            token: (!token.is_empty()).then_some(token),
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Reads the token from a `<meta name="csrf-token" content="...">` tag.
    pub fn from_meta_html(html: &str) -> Result<Self, TransportError> {
        let name_first = Regex::new(
            r#"<meta\s+[^>]*name\s*=\s*["']csrf-token["'][^>]*content\s*=\s*["']([^"']*)["']"#,
        )
        .map_err(|err| TransportError::other(err.to_string()))?;
        let content_first = Regex::new(
            r#"<meta\s+[^>]*content\s*=\s*["']([^"']*)["'][^>]*name\s*=\s*["']csrf-token["']"#,
        )
        .map_err(|err| TransportError::other(err.to_string()))?;

        let token = name_first
            .captures(html)
            .or_else(|| content_first.captures(html))
            .and_then(|captures| captures.get(1))
            .map(|value| value.as_str().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| TransportError::invalid_request("no csrf-token meta tag in page"))?;

        Ok(Self::new(token))
    }

    /// Reads the token from a `Cookie` header value; a missing cookie yields an anonymous context.
    pub fn from_cookie_header(cookie_header: &str) -> Self {
        Self::from_named_cookie(cookie_header, DEFAULT_CSRF_COOKIE)
    }

    pub fn from_named_cookie(cookie_header: &str, cookie_name: &str) -> Self {
        cookie_header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| name.trim() == cookie_name)
            .map(|(_, value)| Self::new(value.trim()))
            .unwrap_or_default()
    }

    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = header_name.into();
        self
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn apply(&self, request: HttpRequest) -> HttpRequest {
        match &self.token {
            Some(token) => request.with_header(self.header_name.clone(), token.expose()),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_tag_token_is_found_in_either_attribute_order() {
        let page = r#"<html><head><meta charset="utf-8"><meta name="csrf-token" content="abc123"></head></html>"#;
        let context = SecurityContext::from_meta_html(page).expect("token should parse");
        let request = context.apply(HttpRequest::post("/chat/rename"));
        assert_eq!(request.header("X-CSRFToken"), Some("abc123"));

        let reversed = r#"<meta content='xyz' name='csrf-token'/>"#;
        let context = SecurityContext::from_meta_html(reversed).expect("token should parse");
        assert!(context.has_token());
    }

    #[test]
    fn missing_meta_tag_is_an_error() {
        let error = SecurityContext::from_meta_html("<html></html>").expect_err("no token");
        assert!(!error.retryable);
    }

    #[test]
    fn anonymous_context_leaves_requests_untouched() {
        let context = SecurityContext::from_cookie_header("session=1; theme=dark");
        assert!(!context.has_token());

        let request = context.apply(HttpRequest::get("/chat/sessions"));
        assert!(request.headers.is_empty());
    }

    #[test]
    fn custom_header_name_is_used() {
        let context = SecurityContext::new("t").with_header_name("X-CSRF-Token");
        let request = context.apply(HttpRequest::post("/chat/delete"));
        assert_eq!(request.header("X-CSRF-Token"), Some("t"));
        assert_eq!(format!("{:?}", SecretString::new("t")), "[REDACTED]");
    }
}
