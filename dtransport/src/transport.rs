//! HTTP request/response values, the transport trait, and a reqwest-based implementation.

use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use dcommon::BoxFuture;

use crate::TransportError;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Path template such as `/chat/session/{id}`, used for diagnostics labels.
    pub route: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            route: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn with_route(mut self, template: impl Into<String>) -> Self {
        self.route = Some(template.into());
        self
    }

    pub fn with_json<T>(mut self, body: &T) -> Result<Self, TransportError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(body)
            .map_err(|err| TransportError::invalid_request(err.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concrete method and path without the query, e.g. `GET /chat/session/s-1`.
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Bounded label for metrics and logs, e.g. `GET /chat/session/{id}`.
    ///
    /// Falls back to [`endpoint`](Self::endpoint) for requests without a template.
    pub fn route(&self) -> String {
        match &self.route {
            Some(template) => format!("{} {}", self.method, template),
            None => self.endpoint(),
        }
    }
}

/// Percent-encodes one path segment, leaving only RFC 3986 unreserved characters as-is.
pub fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte));
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T>(&self) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(&self.body).map_err(|err| {
            TransportError::decode(format!(
                "failed to decode {} response body: {err}",
                self.status
            ))
        })
    }
}

/// A single, un-retried HTTP exchange.
///
/// Implementations report connection-level problems as [`TransportError`] and return every
/// received status line, 2xx or not, as an [`HttpResponse`].
pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    fn send<'a>(&'a self, request: HttpRequest)
    -> BoxFuture<'a, Result<HttpResponse, TransportError>>;
}

#[cfg(feature = "reqwest-transport")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest-transport")]
mod reqwest_transport {
    use reqwest::Client;

    use dcommon::BoxFuture;

    use super::{HttpRequest, HttpResponse, HttpTransport};
    use crate::TransportError;

    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: Client,
        base_url: String,
    }

    impl ReqwestTransport {
        pub fn new(client: Client, base_url: impl Into<String>) -> Self {
            Self {
                client,
                base_url: base_url.into(),
            }
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        fn url(&self, path: &str) -> String {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    }

    fn map_send_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::timeout(err.to_string())
        } else if err.is_builder() {
            TransportError::invalid_request(err.to_string())
        } else {
            TransportError::connection(err.to_string())
        }
    }

    impl HttpTransport for ReqwestTransport {
        fn send<'a>(
            &'a self,
            request: HttpRequest,
        ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
            Box::pin(async move {
                let mut builder = self
                    .client
                    .request(request.method, self.url(&request.path));

                if !request.query.is_empty() {
                    builder = builder.query(&request.query);
                }

                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }

                if let Some(body) = &request.body {
                    builder = builder.json(body);
                }

                let response = builder.send().await.map_err(map_send_error)?;
                let status = response.status();
                let body = response.text().await.map_err(map_send_error)?;

                Ok(HttpResponse::new(status, body))
            })
        }
    }

}
