//! reqwest-backed executor for `RequestDescriptor`s.

use super::request::{RequestDescriptor, RequestMethod};
use super::{NetError, NetResult};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// Shared HTTP client. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> NetResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gamecat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| NetError::ServerError {
                code: 0,
                message: format!("failed to build http client: {err}"),
            })?;
        Ok(Self { inner })
    }

    /// Sends `request` and decodes a 2xx JSON body as `T`.
    pub async fn execute<T: DeserializeOwned>(&self, request: RequestDescriptor) -> NetResult<T> {
        let started_at = Instant::now();
        let method = request.method;
        // Query strings may carry credentials; log the path only.
        let path = request.url.path().to_string();

        let mut builder = match method {
            RequestMethod::Get => self.inner.get(request.url),
            RequestMethod::Post => self.inner.post(request.url),
        };
        builder = builder.headers(header_map(&request.headers)?);
        if let Some(body) = request.body {
            let bytes = serde_json::to_vec(&body)
                .map_err(|err| NetError::InvalidJson(err.to_string()))?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(|err| {
            warn!(
                "event=http_request module=net status=error method={method} path={path} error_code=transport error={err}"
            );
            NetError::ServerError {
                code: 0,
                message: err.to_string(),
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| NetError::ServerError {
            code: status.as_u16(),
            message: err.to_string(),
        })?;

        if !status.is_success() {
            warn!(
                "event=http_request module=net status=error method={method} path={path} http_status={} duration_ms={}",
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(NetError::ServerError {
                code: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        debug!(
            "event=http_request module=net status=ok method={method} path={path} http_status={} bytes={} duration_ms={}",
            status.as_u16(),
            bytes.len(),
            started_at.elapsed().as_millis()
        );
        serde_json::from_slice(&bytes).map_err(|err| NetError::InvalidJson(err.to_string()))
    }
}

fn header_map(headers: &std::collections::BTreeMap<String, String>) -> NetResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| NetError::InvalidHeader(format!("name `{name}`")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| NetError::InvalidHeader(format!("value for `{name}`")))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::header_map;
    use crate::net::NetError;
    use std::collections::BTreeMap;

    #[test]
    fn header_map_rejects_invalid_values() {
        let mut headers = BTreeMap::new();
        headers.insert("x-ok".to_string(), "fine".to_string());
        assert_eq!(header_map(&headers).expect("valid").len(), 1);

        headers.insert("x-bad".to_string(), "line\nbreak".to_string());
        assert!(matches!(header_map(&headers), Err(NetError::InvalidHeader(_))));
    }
}
