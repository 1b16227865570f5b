// SPDX-License-Identifier: AGPL-3.0-or-later

//! Single-attempt HTTP transport against the Wise API.
//!
//! The transport issues exactly one request per call and does not interpret
//! status codes: a non-2xx response is an ordinary [`ApiResponse`], because
//! the SCA executor has to inspect response headers to tell an application
//! failure from a step-up challenge. Only connection-level failures (DNS,
//! refused, TLS) become [`WiseError::Transport`].

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};

use crate::config::WiseConfig;
use crate::error::WiseError;

/// One exchange's worth of response data.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Raw header value by name, if present.
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Response body as text, for error reporting.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Thin stateless wrapper over `reqwest` carrying the bearer credential.
#[derive(Debug, Clone)]
pub struct ApiTransport {
    http: Client,
    base_url: String,
    api_token: String,
}

impl ApiTransport {
    pub fn new(config: &WiseConfig, api_token: impl Into<String>) -> Result<Self, WiseError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WiseError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: api_token.into(),
        })
    }

    /// Issue one GET request. `extra_headers` are merged in after the common
    /// headers; the SCA executor uses them for the signed retry.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        extra_headers: &[(&str, String)],
    ) -> Result<ApiResponse, WiseError> {
        let url = format!("{}{}", self.base_url, path);

        let mut bearer = HeaderValue::try_from(format!("Bearer {}", self.api_token))
            .map_err(|_| WiseError::Config("API token is not a valid header value".to_string()))?;
        // Keep the credential out of anything that debug-prints the request.
        bearer.set_sensitive(true);

        let mut request = self
            .http
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, bearer)
            .query(query);

        for (name, value) in extra_headers {
            request = request.header(*name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WiseError::Transport(format!("GET {path} failed: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| WiseError::Transport(format!("GET {path} body read failed: {e}")))?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transport_for(server: &MockServer) -> ApiTransport {
        let config = WiseConfig::with_base_url(server.uri());
        ApiTransport::new(&config, "test-token").unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/profiles"))
            .and(header("Authorization", "Bearer test-token"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"[]".to_vec(), "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport_for(&server)
            .get("/v1/profiles", &[], &[])
            .await
            .unwrap();
        assert!(response.is_success());
        assert_eq!(&response.body[..], b"[]");
    }

    #[tokio::test]
    async fn query_params_and_extra_headers_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/profiles/1/balances"))
            .and(query_param("types", "STANDARD"))
            .and(header("x-2fa-approval", "ott-123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let response = transport_for(&server)
            .get(
                "/v3/profiles/1/balances",
                &[("types", "STANDARD".to_string())],
                &[("x-2fa-approval", "ott-123".to_string())],
            )
            .await
            .unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn non_2xx_is_a_response_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-2fa-approval", "ott-456")
                    .set_body_string("forbidden"),
            )
            .mount(&server)
            .await;

        let response = transport_for(&server)
            .get("/v1/profiles/1/balance-statements/2/statement.pdf", &[], &[])
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(
            response.header("x-2fa-approval").unwrap().to_str().unwrap(),
            "ott-456"
        );
        assert_eq!(response.body_text(), "forbidden");
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        // Nothing listens on this port; the connection is refused outright.
        let config = WiseConfig::with_base_url("http://127.0.0.1:9");
        let transport = ApiTransport::new(&config, "test-token").unwrap();
        let err = transport.get("/v1/profiles", &[], &[]).await.unwrap_err();
        assert!(matches!(err, WiseError::Transport(_)));
    }
}
