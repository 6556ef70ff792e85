//! JSON-RPC 2.0 over stdio.
//!
//! One request per line on stdin, one response per line on stdout. Logs
//! go to stderr. A request may carry a `headers` object next to `params`;
//! `X-Request-ID` and `X-Validation-Policy` are read from it
//! case-insensitively, and the request id is echoed back in the
//! response's `headers`.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{handle_method, SharedState, VALIDATED_METHODS};
use crate::error::{AppError, AppResult, ProtocolError};
use crate::service::RequestContext;
use crate::validation::Policy;

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod rpc_tests;

/// Header carrying the caller's correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
/// Header selecting the validation policy for a request.
pub const POLICY_HEADER: &str = "X-Validation-Policy";

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (must be "2.0").
    pub jsonrpc: String,
    /// Request identifier (None for notifications).
    #[serde(default)]
    pub id: Option<Value>,
    /// The method name to invoke.
    pub method: String,
    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
    /// Transport headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0").
    pub jsonrpc: String,
    /// Request identifier (null when the request could not be read).
    pub id: Value,
    /// The result on success (mutually exclusive with error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure (mutually exclusive with result).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Response headers.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code (negative for predefined errors).
    pub code: i32,
    /// Human-readable error message.
    pub message: String,
    /// Structured `{ code, message, details? }` body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
            headers: BTreeMap::new(),
        }
    }

    /// Create an error response
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            headers: BTreeMap::new(),
        }
    }

    /// Create an error response from an application error.
    pub fn from_app_error(id: Option<Value>, err: &AppError) -> Self {
        let code = match err {
            AppError::Protocol(ProtocolError::InvalidRequest { .. }) => -32600,
            AppError::Protocol(ProtocolError::UnknownMethod { .. }) => -32601,
            AppError::Protocol(ProtocolError::InvalidParameters { .. }) => -32602,
            other => other.code().rpc_code(),
        };
        let mut response = Self::error(id, code, err.to_string());
        if let Some(error) = response.error.as_mut() {
            error.data = serde_json::to_value(err.to_response()).ok();
        }
        response
    }

    /// Attach a response header
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }
}

/// Case-insensitive header lookup.
pub fn header<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// JSON-RPC server over stdio.
pub struct RpcServer {
    state: SharedState,
}

impl RpcServer {
    /// Create a new server
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Run the server using async stdio
    pub async fn run(&self) -> std::io::Result<()> {
        info!("Story hierarchy server starting...");
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests from `reader` until EOF, writing responses to `writer`.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            // EOF reached
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let Some(response) = self.handle_line(&line) else {
                continue;
            };

            let response_json = serde_json::to_string(&response)?;
            debug!(response = %response_json, "Sending response");

            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }

        Ok(())
    }

    /// Handle one line of input. Blank lines and notifications produce no
    /// response.
    pub fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        debug!(request = %trimmed, "Received request");

        match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                error!(error = %e, "Failed to parse request");
                Some(JsonRpcResponse::error(
                    None,
                    -32700,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Handle a single request, logging its start and end.
    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let started = Instant::now();
        let request_id = header(&request.headers, REQUEST_ID_HEADER)
            .map(str::to_string)
            .unwrap_or_else(|| format!("req-{}", Uuid::new_v4()));
        let method = request.method.clone();
        let is_notification = request.id.is_none();

        info!(request_id = %request_id, method = %method, "request.start");

        let outcome = self.dispatch(
            &request_id,
            &request.jsonrpc,
            &method,
            request.params,
            &request.headers,
        );
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = match outcome {
            Ok(result) => {
                info!(request_id = %request_id, method = %method, outcome = "ok", elapsed_ms, "request.end");
                JsonRpcResponse::success(request.id, result)
            }
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    method = %method,
                    outcome = e.code().as_str(),
                    error = %e,
                    elapsed_ms,
                    "request.end"
                );
                JsonRpcResponse::from_app_error(request.id, &e)
            }
        };

        if is_notification {
            return None;
        }
        Some(response.with_header(REQUEST_ID_HEADER, request_id))
    }

    fn dispatch(
        &self,
        request_id: &str,
        version: &str,
        method: &str,
        params: Option<Value>,
        headers: &BTreeMap<String, String>,
    ) -> AppResult<Value> {
        if version != "2.0" {
            return Err(ProtocolError::InvalidRequest {
                message: format!("unsupported jsonrpc version '{}'", version),
            }
            .into());
        }

        let default_policy = self.state.config.validation.default_policy;
        let policy = if VALIDATED_METHODS.contains(&method) {
            let parameter = params
                .as_ref()
                .and_then(|p| p.get("policy"))
                .and_then(Value::as_str);
            Policy::resolve(parameter, header(headers, POLICY_HEADER), default_policy)?
        } else {
            default_policy
        };
        let ctx = RequestContext {
            request_id: request_id.to_string(),
            policy,
        };

        handle_method(&self.state, &ctx, method, params)
    }
}
