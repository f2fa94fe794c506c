//! In-memory [`ErpClient`] for tests of the layers above the client.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{ErpClient, OdooError};

/// One recorded `execute_method` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub model: String,
    pub method: String,
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

/// Answers `(model, method)` pairs from a fixed table and records every call.
/// Unknown pairs fail with an [`OdooError::Fault`].
#[derive(Default)]
pub struct StubErpClient {
    responses: HashMap<(String, String), Result<Value, String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubErpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `model.method` with `value`.
    pub fn returning(mut self, model: &str, method: &str, value: Value) -> Self {
        self.responses
            .insert((model.to_string(), method.to_string()), Ok(value));
        self
    }

    /// Make `model.method` fail with `message`.
    pub fn failing(mut self, model: &str, method: &str, message: &str) -> Self {
        self.responses
            .insert((model.to_string(), method.to_string()), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ErpClient for StubErpClient {
    async fn execute_method(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, OdooError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                model: model.to_string(),
                method: method.to_string(),
                args,
                kwargs,
            });
        }
        match self.responses.get(&(model.to_string(), method.to_string())) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(OdooError::Fault {
                message: message.clone(),
                name: None,
            }),
            None => Err(OdooError::Fault {
                message: format!("no stubbed response for {model}.{method}"),
                name: None,
            }),
        }
    }
}
