//! `OdooClient`: an [`ErpClient`] backed by Odoo's external JSON-RPC API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use odoo_mcp_core::OdooConfig;

use crate::error::OdooError;
use crate::jsonrpc::{parse_reply, RpcCall};
use crate::ErpClient;

/// Authenticated connection to one Odoo database.
///
/// The uid is resolved once in [`OdooClient::connect`] and reused for every
/// call; the password is resent with each `execute_kw`, as Odoo's external
/// API requires.
pub struct OdooClient {
    http: reqwest::Client,
    endpoint: String,
    db: String,
    username: String,
    password: String,
    uid: i64,
    next_id: AtomicU64,
}

impl OdooClient {
    /// Build the HTTP client and authenticate against `common.login`.
    pub async fn connect(config: &OdooConfig) -> Result<Self, OdooError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        let mut client = Self {
            http,
            endpoint: format!("{}/jsonrpc", config.url),
            db: config.db.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            uid: 0,
            next_id: AtomicU64::new(1),
        };

        info!(url = %config.url, db = %config.db, user = %config.username, "Connecting to Odoo");
        let login = client
            .call(
                "common",
                "login",
                vec![
                    json!(client.db),
                    json!(client.username),
                    json!(client.password),
                ],
            )
            .await?;

        client.uid = login.as_i64().filter(|uid| *uid > 0).ok_or_else(|| {
            OdooError::Authentication {
                username: client.username.clone(),
                db: client.db.clone(),
            }
        })?;
        info!(uid = client.uid, "Authenticated with Odoo");

        Ok(client)
    }

    /// User id resolved at login.
    pub fn uid(&self) -> i64 {
        self.uid
    }

    async fn call(
        &self,
        service: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, OdooError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = RpcCall::new(id, service, method, args);

        let response = self.http.post(&self.endpoint).json(&body).send().await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OdooError::Status { status, body });
        }

        let reply: Value = response
            .json()
            .await
            .map_err(|e| OdooError::Parse(e.to_string()))?;
        parse_reply(reply)
    }
}

#[async_trait]
impl ErpClient for OdooClient {
    async fn execute_method(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, OdooError> {
        debug!(model, method, args = args.len(), kwargs = kwargs.len(), "execute_kw");
        self.call(
            "object",
            "execute_kw",
            vec![
                json!(self.db),
                json!(self.uid),
                json!(self.password),
                json!(model),
                json!(method),
                Value::Array(args),
                Value::Object(kwargs),
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};

    /// Minimal stand-in for Odoo's `/jsonrpc` endpoint.
    async fn fake_odoo(Json(body): Json<Value>) -> Json<Value> {
        let id = body["id"].clone();
        let params = &body["params"];
        let args = params["args"].as_array().cloned().unwrap_or_default();

        let reply = match (params["service"].as_str(), params["method"].as_str()) {
            (Some("common"), Some("login")) => {
                if args.get(2) == Some(&json!("secret")) {
                    json!({"jsonrpc": "2.0", "id": id, "result": 7})
                } else {
                    json!({"jsonrpc": "2.0", "id": id, "result": false})
                }
            }
            (Some("object"), Some("execute_kw")) => {
                let model = args.get(3).and_then(Value::as_str).unwrap_or_default();
                let method = args.get(4).and_then(Value::as_str).unwrap_or_default();
                match (model, method) {
                    ("res.partner", "search_count") => {
                        json!({"jsonrpc": "2.0", "id": id, "result": 42})
                    }
                    ("res.partner", "echo") => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "result": {"uid": args[1], "args": args[5], "kwargs": args[6]}
                    }),
                    _ => json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": {
                            "code": 200,
                            "message": "Odoo Server Error",
                            "data": {
                                "name": "builtins.KeyError",
                                "message": format!("Object {model} doesn't exist")
                            }
                        }
                    }),
                }
            }
            _ => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": 404, "message": "unknown service"}
            }),
        };
        Json(reply)
    }

    async fn spawn_fake_odoo() -> String {
        let app = Router::new().route("/jsonrpc", post(fake_odoo));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config(url: String, password: &str) -> OdooConfig {
        OdooConfig {
            url,
            db: "test".to_string(),
            username: "admin".to_string(),
            password: password.to_string(),
            timeout_secs: 5,
            verify_ssl: true,
        }
    }

    #[tokio::test]
    async fn connect_resolves_uid() {
        let url = spawn_fake_odoo().await;
        let client = OdooClient::connect(&config(url, "secret")).await.unwrap();
        assert_eq!(client.uid(), 7);
    }

    #[tokio::test]
    async fn connect_rejects_bad_credentials() {
        let url = spawn_fake_odoo().await;
        let err = OdooClient::connect(&config(url, "wrong")).await.err().unwrap();
        assert!(matches!(err, OdooError::Authentication { .. }));
    }

    #[tokio::test]
    async fn execute_method_returns_result() {
        let url = spawn_fake_odoo().await;
        let client = OdooClient::connect(&config(url, "secret")).await.unwrap();
        let result = client
            .execute_method("res.partner", "search_count", vec![json!([])], Map::new())
            .await
            .unwrap();
        assert_eq!(result, json!(42));
    }

    #[tokio::test]
    async fn execute_method_forwards_args_and_kwargs() {
        let url = spawn_fake_odoo().await;
        let client = OdooClient::connect(&config(url, "secret")).await.unwrap();
        let mut kwargs = Map::new();
        kwargs.insert("limit".to_string(), json!(5));
        let result = client
            .execute_method("res.partner", "echo", vec![json!([["is_company", "=", true]])], kwargs)
            .await
            .unwrap();
        assert_eq!(result["uid"], json!(7));
        assert_eq!(result["args"], json!([[["is_company", "=", true]]]));
        assert_eq!(result["kwargs"], json!({"limit": 5}));
    }

    #[tokio::test]
    async fn execute_method_surfaces_odoo_message() {
        let url = spawn_fake_odoo().await;
        let client = OdooClient::connect(&config(url, "secret")).await.unwrap();
        let err = client
            .execute_method("no.such.model", "read", vec![], Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Object no.such.model doesn't exist");
    }

    #[tokio::test]
    async fn connect_fails_on_http_error_status() {
        let app = Router::new();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let err = OdooClient::connect(&config(format!("http://{addr}"), "secret"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, OdooError::Status { status: 404, .. }));
    }
}
