//! JSON bodies exchanged with the payment gateway and with service callers.
//!
//! Envelopes always travel as base64 strings inside a JSON field; nothing here
//! knows how they are built.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Gateway wire format
// ---------------------------------------------------------------------------

/// Outbound body posted to the gateway: `{"mid", "req", "terminalId"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Merchant id assigned by the gateway.
    pub mid: String,
    /// Base64 envelope carrying the encrypted payload.
    pub req: String,
    /// Terminal the envelope was sealed for.
    #[serde(rename = "terminalId")]
    pub terminal_id: String,
}

/// Inbound body returned by the gateway: `{"response": "<envelope>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// Base64 envelope carrying the encrypted response.
    pub response: String,
}

// ---------------------------------------------------------------------------
// Service endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /terminals/:terminal_id/seal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealRequest {
    /// JSON payload to encrypt for the gateway.
    pub payload: serde_json::Value,
}

/// Response body for `POST /terminals/:terminal_id/open`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenResponse {
    /// Decrypted gateway payload.
    pub payload: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"malformed_envelope"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Number of merchant terminals currently configured.
    pub terminals_loaded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gateway_request_uses_camel_case_terminal_id() {
        let req = GatewayRequest {
            mid: "108".into(),
            req: "AAEC".into(),
            terminal_id: "T-0001".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"mid": "108", "req": "AAEC", "terminalId": "T-0001"}));
    }

    #[test]
    fn gateway_response_parses() {
        let resp: GatewayResponse = serde_json::from_str(r#"{"response":"AAEC"}"#).unwrap();
        assert_eq!(resp.response, "AAEC");
    }

    #[test]
    fn gateway_response_requires_field() {
        assert!(serde_json::from_str::<GatewayResponse>(r#"{"resp":"AAEC"}"#).is_err());
    }

    #[test]
    fn seal_request_keeps_payload() {
        let req: SealRequest =
            serde_json::from_str(r#"{"payload":{"mid":"108","amount":"100.00"}}"#).unwrap();
        assert_eq!(req.payload["amount"], "100.00");
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("malformed_envelope", "envelope too short");
        assert_eq!(e.code, "malformed_envelope");
        assert!(e.message.contains("too short"));
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            terminals_loaded: 2,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.terminals_loaded, 2);
    }
}
