// crates/token-sale-harness/src/rpc.rs
// ============================================================================
// Module: Raw JSON-RPC Probe
// Description: Direct JSON-RPC 2.0 calls over HTTP.
// Purpose: Check endpoint liveness and response shape without a chain client.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`RpcProbe`] posts hand-built JSON-RPC requests so scenarios can assert on
//! the HTTP status and the body shape exactly as the endpoint returns them.
//! Non-200 answers, bodies without `result`, and JSON-RPC error objects map to
//! distinct [`HarnessError`] variants; client timeouts map to
//! [`HarnessError::DeadlineExceeded`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;
use tracing::debug;

use crate::containers::NetworkEndpoint;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Raw HTTP answer to a JSON-RPC request.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcReply {
    /// HTTP status.
    pub status: u16,
    /// Parsed JSON body.
    pub body: Value,
}

impl RpcReply {
    /// Returns the `result` member of a successful reply.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::RpcStatus`] for non-200 replies,
    /// [`HarnessError::RpcError`] when the body carries an `error` object, and
    /// [`HarnessError::RpcShape`] when `result` is missing.
    pub fn into_result(self) -> Result<Value, HarnessError> {
        if self.status != StatusCode::OK.as_u16() {
            return Err(HarnessError::RpcStatus {
                status: self.status,
                body: self.body.to_string(),
            });
        }
        let mut body = match self.body {
            Value::Object(body) => body,
            other => {
                return Err(HarnessError::RpcShape(format!("expected object, got {other}")));
            }
        };
        if let Some(error) = body.remove("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
            let message =
                error.get("message").and_then(Value::as_str).unwrap_or_default().to_string();
            return Err(HarnessError::RpcError {
                code,
                message,
            });
        }
        body.remove("result")
            .ok_or_else(|| HarnessError::RpcShape("response has no result".to_string()))
    }
}

/// JSON-RPC client for one endpoint.
#[derive(Debug)]
pub struct RpcProbe {
    /// HTTP client with the per-request timeout applied.
    client: Client,
    /// Endpoint URL.
    url: String,
    /// Per-request timeout.
    timeout: Duration,
    /// Next request id.
    next_id: AtomicU64,
}

impl RpcProbe {
    /// Builds a probe for `endpoint` with a per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Rpc`] when the HTTP client cannot be built.
    pub fn new(endpoint: &NetworkEndpoint, timeout: Duration) -> Result<Self, HarnessError> {
        Self::with_url(endpoint.http_url(), timeout)
    }

    /// Builds a probe for an explicit URL.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Rpc`] when the HTTP client cannot be built.
    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self, HarnessError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| HarnessError::Rpc(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts one request and returns the raw reply.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::DeadlineExceeded`] on timeout,
    /// [`HarnessError::Rpc`] on transport failure, and
    /// [`HarnessError::RpcShape`] when the body is not JSON.
    pub async fn send(&self, method: &str, params: Value) -> Result<RpcReply, HarnessError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|err| self.transport_error(method, &err))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|err| self.transport_error(method, &err))?;
        debug!(method, status, body = %text, "rpc reply");
        let body = serde_json::from_str(&text).map_err(|err| {
            if status == StatusCode::OK.as_u16() {
                HarnessError::RpcShape(format!("{method} returned non-json body: {err}"))
            } else {
                HarnessError::RpcStatus {
                    status,
                    body: text.clone(),
                }
            }
        })?;
        Ok(RpcReply {
            status,
            body,
        })
    }

    /// Posts one request and returns its `result`.
    ///
    /// # Errors
    ///
    /// See [`Self::send`] and [`RpcReply::into_result`].
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, HarnessError> {
        self.send(method, params).await?.into_result()
    }

    /// Current block height via `eth_blockNumber`.
    ///
    /// # Errors
    ///
    /// See [`Self::call`]; a result that is not a hex quantity is
    /// [`HarnessError::RpcShape`].
    pub async fn block_number(&self) -> Result<u64, HarnessError> {
        let result = self.call("eth_blockNumber", json!([])).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| HarnessError::RpcShape(format!("block number is not a string: {result}")))?;
        parse_quantity(raw)
    }

    /// Chain id via `eth_chainId`.
    ///
    /// # Errors
    ///
    /// See [`Self::block_number`].
    pub async fn chain_id(&self) -> Result<u64, HarnessError> {
        let result = self.call("eth_chainId", json!([])).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| HarnessError::RpcShape(format!("chain id is not a string: {result}")))?;
        parse_quantity(raw)
    }

    /// Maps a reqwest failure, separating timeouts.
    fn transport_error(&self, method: &str, err: &reqwest::Error) -> HarnessError {
        if err.is_timeout() {
            HarnessError::DeadlineExceeded {
                operation: method.to_string(),
                budget: self.timeout,
            }
        } else {
            HarnessError::Rpc(format!("{method} to {} failed: {err}", self.url))
        }
    }
}

/// Parses a JSON-RPC hex quantity (`0x` followed by 1-16 hex digits).
///
/// # Errors
///
/// Returns [`HarnessError::RpcShape`] for anything else.
pub fn parse_quantity(raw: &str) -> Result<u64, HarnessError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| HarnessError::RpcShape(format!("quantity '{raw}' lacks 0x prefix")))?;
    if digits.is_empty() || digits.len() > 16 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HarnessError::RpcShape(format!("quantity '{raw}' is not 1-16 hex digits")));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|err| HarnessError::RpcShape(format!("quantity '{raw}': {err}")))
}
