//! Thin client for the Tushare Pro HTTP API.
//!
//! Every remote operation is a POST of `{api_name, token, params}` against a
//! single endpoint; the response envelope is validated by [`decode`].

use std::collections::HashMap;
use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::constants::{HTTP_TIMEOUT_SECS, TUSHARE_API_URL};
use crate::error::{AppError, Result};
use crate::services::decode::{self, Payload};

pub struct TushareClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    timeout: Duration,
}

impl TushareClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(TUSHARE_API_URL, token)
    }

    /// Point the client at a non-default endpoint (mirrors, tests).
    pub fn with_endpoint(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        })
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// POST one `api_name` call and return the raw response body.
    ///
    /// Connection failure and timeout expiry are distinct errors; an empty
    /// body is never handed back for a failed call.
    pub async fn call(&self, api_name: &str, params: &HashMap<String, String>) -> Result<Vec<u8>> {
        let body = json!({
            "api_name": api_name,
            "token": self.token,
            "params": params,
        });

        debug!(api_name, param_count = params.len(), "Calling Tushare API");

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_send_error(api_name, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "{} returned HTTP {}",
                api_name, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_send_error(api_name, &e))?;
        debug!(api_name, bytes = bytes.len(), "Tushare response received");
        Ok(bytes.to_vec())
    }

    /// Fetch the listed-instrument universe via `stock_basic`.
    ///
    /// Field 0 of each row is the exchange-qualified code; response order is
    /// preserved.
    pub async fn list_instruments(&self) -> Result<Vec<String>> {
        let params = HashMap::from([
            ("list_status".to_string(), "L".to_string()),
            ("fields".to_string(), "ts_code".to_string()),
        ]);

        let raw = self.call("stock_basic", &params).await?;
        let rows = match decode::decode(&raw)? {
            Payload::Empty => return Ok(Vec::new()),
            Payload::Rows(rows) => rows,
        };

        let mut codes = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            match row.first().and_then(|cell| cell.as_str()) {
                Some(code) => codes.push(code.to_string()),
                None => {
                    return Err(AppError::SchemaMismatch {
                        row: idx,
                        reason: "stock_basic row has no ts_code string at position 0".to_string(),
                    })
                }
            }
        }
        Ok(codes)
    }
}

fn classify_send_error(api_name: &str, err: &reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout(format!("{} timed out: {}", api_name, err))
    } else {
        AppError::Transport(format!("{} failed: {}", api_name, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_call_posts_request_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "api_name": "daily",
                "token": "secret",
                "params": {"ts_code": "000001.SZ"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"code": 0}"#))
            .expect(1)
            .mount(&server)
            .await;

        let client = TushareClient::with_endpoint(server.uri(), "secret").unwrap();
        let params = HashMap::from([("ts_code".to_string(), "000001.SZ".to_string())]);
        let raw = client.call("daily", &params).await.unwrap();
        assert_eq!(raw, br#"{"code": 0}"#);
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        // Nothing listens on this port.
        let client = TushareClient::with_endpoint("http://127.0.0.1:1", "secret").unwrap();
        let err = client.call("daily", &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_distinct_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"code": 0}"#)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = TushareClient::with_endpoint(server.uri(), "secret")
            .unwrap()
            .with_timeout(Duration::from_millis(50));
        let err = client.call("daily", &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_http_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = TushareClient::with_endpoint(server.uri(), "secret").unwrap();
        let err = client.call("daily", &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Transport(_)));
    }

    #[tokio::test]
    async fn test_list_instruments_decodes_codes_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"api_name": "stock_basic"})))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"code": 0, "data": {"items": [["000001.SZ"], ["600519.SH"], ["000002.SZ"]]}}"#,
            ))
            .mount(&server)
            .await;

        let client = TushareClient::with_endpoint(server.uri(), "secret").unwrap();
        let codes = client.list_instruments().await.unwrap();
        assert_eq!(codes, vec!["000001.SZ", "600519.SH", "000002.SZ"]);
    }

    #[tokio::test]
    async fn test_list_instruments_propagates_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"code": 30001, "msg": "token invalid"}"#),
            )
            .mount(&server)
            .await;

        let client = TushareClient::with_endpoint(server.uri(), "bad-token").unwrap();
        let err = client.list_instruments().await.unwrap_err();
        assert!(matches!(err, AppError::Api { code: 30001, .. }));
    }
}
