//! Fluent request builder.

use super::client::HttpClient;
use super::{NetError, NetResult};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use url::Url;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl Display for RequestMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable request description; every builder call returns a new value.
///
/// Header names are case-insensitive and stored lowercased. Later calls for
/// the same query key or header replace earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    url: String,
    method: RequestMethod,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    body: Option<JsonValue>,
}

impl Request {
    pub fn new(url: impl Into<String>, method: RequestMethod) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), DEFAULT_CONTENT_TYPE.to_string());
        Self {
            url: url.into(),
            method,
            query: BTreeMap::new(),
            headers,
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url, RequestMethod::Get)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url, RequestMethod::Post)
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Adds `key` only when `value` is present.
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn json_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Validates the URL and produces the final request description.
    ///
    /// Query pairs are appended after any query already present in the URL,
    /// in key order.
    pub fn build(self) -> NetResult<RequestDescriptor> {
        let mut url =
            Url::parse(&self.url).map_err(|_| NetError::InvalidUrl(self.url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(NetError::InvalidUrl(self.url));
        }
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(RequestDescriptor {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body,
        })
    }

    /// Builds and executes the request, decoding the body as `T`.
    pub async fn send<T: DeserializeOwned>(self, client: &HttpClient) -> NetResult<T> {
        let descriptor = self.build()?;
        client.execute(descriptor).await
    }
}

/// Fully resolved request, ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: RequestMethod,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: Option<JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::{Request, RequestMethod};
    use crate::net::NetError;
    use serde_json::json;

    #[test]
    fn build_appends_query_pairs_in_key_order() {
        let descriptor = Request::get("https://api.example.com/games")
            .query("search", "zelda")
            .query("page", 2)
            .build()
            .expect("valid request");
        assert_eq!(
            descriptor.url.as_str(),
            "https://api.example.com/games?page=2&search=zelda"
        );
        assert_eq!(descriptor.method, RequestMethod::Get);
        assert_eq!(
            descriptor.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn build_keeps_existing_query_and_encodes_values() {
        let descriptor = Request::get("https://api.example.com/games?ordering=-rating")
            .query("search", "half life 2")
            .build()
            .expect("valid request");
        assert_eq!(
            descriptor.url.query(),
            Some("ordering=-rating&search=half+life+2")
        );
    }

    #[test]
    fn later_values_replace_earlier_ones() {
        let descriptor = Request::post("http://localhost:8080/things")
            .header("Content-Type", "text/plain")
            .header("X-Trace", "a")
            .header("x-trace", "b")
            .query("k", "1")
            .query("k", "2")
            .json_body(json!({"name": "x"}))
            .build()
            .expect("valid request");
        assert_eq!(descriptor.headers.len(), 2);
        assert_eq!(descriptor.headers["content-type"], "text/plain");
        assert_eq!(descriptor.headers["x-trace"], "b");
        assert_eq!(descriptor.url.query(), Some("k=2"));
        assert_eq!(descriptor.body, Some(json!({"name": "x"})));
    }

    #[test]
    fn builder_calls_do_not_mutate_the_original() {
        let base = Request::get("https://api.example.com/games");
        let paged = base.clone().query("page", 3);
        assert_ne!(base, paged);
        assert_eq!(
            base.build().expect("valid").url.as_str(),
            "https://api.example.com/games"
        );
    }

    #[test]
    fn invalid_urls_fail_before_sending() {
        for url in ["not a url", "ftp://example.com/file", "mailto:someone@example.com", ""] {
            let err = Request::get(url).build().expect_err("invalid url");
            assert_eq!(err, NetError::InvalidUrl(url.to_string()));
        }
    }

    #[test]
    fn query_opt_skips_missing_values() {
        let descriptor = Request::get("https://api.example.com/games")
            .query_opt("search", None::<&str>)
            .query_opt("page", Some(1))
            .build()
            .expect("valid");
        assert_eq!(descriptor.url.query(), Some("page=1"));
    }
}
