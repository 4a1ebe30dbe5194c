use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The two terminal states of a normalized call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Success,
    Failed,
}

/// The uniform envelope every operation returns, success or failure.
///
/// Callers branch on `status` instead of catching errors; the raw remote
/// envelope is never handed back uninterpreted. `api_status` and
/// `status_code` echo the remote's own fields and are populated only on
/// failure, for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: CallStatus,
    pub data: Option<Value>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_status: Option<String>,
    #[serde(rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
}

impl ApiResponse {
    /// Shapes a local transport failure (timeout, refused connection, ...)
    /// into the same envelope a remote rejection produces. There is no remote
    /// diagnostic to echo, so `api_status` and `status_code` stay empty.
    pub(crate) fn transport_failure(message: String) -> Self {
        ApiResponse {
            status: CallStatus::Failed,
            data: None,
            message,
            api_status: None,
            status_code: None,
        }
    }
}

/// The raw JSON body the remote API sends back.
///
/// Every field is optional because error bodies are not guaranteed to carry
/// all of them; a body that is not JSON at all is treated as this envelope
/// with nothing in it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: Option<i64>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub data: Option<Value>,
}

/// Collapses the transport status and the remote envelope into the normalized
/// response.
///
/// Success requires BOTH an HTTP 200/201 AND a body-level `statusCode` of
/// 200; this remote is known to send HTTP 200 around business failures, so
/// transport success alone proves nothing.
pub(crate) fn classify_outcome(http_status: u16, body: RemoteEnvelope) -> ApiResponse {
    let transport_ok = matches!(http_status, 200 | 201);
    let remote_ok = body.status_code == Some(200);

    if transport_ok && remote_ok {
        return ApiResponse {
            status: CallStatus::Success,
            data: body.data,
            message: body.message.unwrap_or_else(|| "Success".to_string()),
            api_status: None,
            status_code: None,
        };
    }

    // Bodies on the failure path may be arbitrarily sparse. Fall back to the
    // HTTP status so the message always names a cause.
    let reason = body
        .message
        .unwrap_or_else(|| format!("HTTP {http_status}"));

    ApiResponse {
        status: CallStatus::Failed,
        data: body.data,
        message: format!("API returned error: {reason}"),
        api_status: body.status,
        status_code: body.status_code,
    }
}
