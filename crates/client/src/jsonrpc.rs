//! Odoo's external JSON-RPC envelope (`POST /jsonrpc`, method `call`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OdooError;

#[derive(Debug, Serialize)]
pub(crate) struct RpcCall<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RpcParams<'a>,
    id: u64,
}

#[derive(Debug, Serialize)]
struct RpcParams<'a> {
    service: &'a str,
    method: &'a str,
    args: Vec<Value>,
}

impl<'a> RpcCall<'a> {
    pub(crate) fn new(id: u64, service: &'a str, method: &'a str, args: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: "call",
            params: RpcParams {
                service,
                method,
                args,
            },
            id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcFault {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<RpcFaultData>,
}

#[derive(Debug, Deserialize)]
struct RpcFaultData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Unwrap an Odoo reply, turning a fault into [`OdooError::Fault`].
///
/// The user-facing message lives in `error.data.message`; the top-level
/// `error.message` is a generic "Odoo Server Error". A `null` result is a
/// valid answer (methods returning `None`).
pub(crate) fn parse_reply(body: Value) -> Result<Value, OdooError> {
    let Value::Object(mut envelope) = body else {
        return Err(OdooError::Parse("response is not a JSON object".to_string()));
    };

    if let Some(raw) = envelope.remove("error").filter(|e| !e.is_null()) {
        let fault: RpcFault =
            serde_json::from_value(raw).map_err(|e| OdooError::Parse(e.to_string()))?;
        let (name, detail) = match fault.data {
            Some(data) => (data.name, data.message),
            None => (None, None),
        };
        let message = detail
            .filter(|m| !m.is_empty())
            .or(fault.message)
            .unwrap_or_else(|| "Unknown Odoo error".to_string());
        return Err(OdooError::Fault { message, name });
    }

    envelope
        .remove("result")
        .ok_or_else(|| OdooError::Parse("response has neither result nor error".to_string()))
}
