//! Transport selection.
//!
//! The process serves its tools over exactly one transport, picked once at
//! startup from `TRANSPORT` / `DEPLOYMENT_MODE`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three ways the tool surface can be exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    Stdio,
    /// MCP over HTTP: JSON-RPC POST endpoint plus an SSE stream.
    Http,
    /// Plain synchronous JSON API (`/tools`, `/tools/execute`, `/health`).
    Sync,
}

impl TransportKind {
    /// Parse a transport name as accepted in `TRANSPORT` or `--transport`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdio" => Some(Self::Stdio),
            "http" | "sse" | "streamable-http" | "streamable_http" => Some(Self::Http),
            "sync" | "rest" => Some(Self::Sync),
            _ => None,
        }
    }

    /// Decide the transport from the raw `TRANSPORT` and `DEPLOYMENT_MODE` values.
    ///
    /// `TRANSPORT` wins when present; an unrecognized value falls back to stdio.
    /// Otherwise `DEPLOYMENT_MODE=http` selects HTTP streaming, and everything
    /// else runs over stdio.
    pub fn resolve(transport: Option<&str>, deployment_mode: Option<&str>) -> TransportSelection {
        if let Some(raw) = transport.filter(|s| !s.trim().is_empty()) {
            return match Self::parse(raw) {
                Some(kind) => TransportSelection {
                    kind,
                    from_deployment_mode: false,
                    unrecognized: None,
                },
                None => TransportSelection {
                    kind: Self::Stdio,
                    from_deployment_mode: false,
                    unrecognized: Some(raw.to_string()),
                },
            };
        }

        let http_deployment = deployment_mode
            .map(|m| m.trim().eq_ignore_ascii_case("http"))
            .unwrap_or(false);
        TransportSelection {
            kind: if http_deployment { Self::Http } else { Self::Stdio },
            from_deployment_mode: http_deployment,
            unrecognized: None,
        }
    }

    /// Port used when `PORT` is not set.
    pub fn default_port(self) -> u16 {
        match self {
            Self::Sync => 8081,
            Self::Stdio | Self::Http => 8080,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
            Self::Sync => "sync",
        }
    }

    /// Whether this transport binds a network listener.
    pub fn is_network(self) -> bool {
        !matches!(self, Self::Stdio)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| format!("unknown transport '{s}' (expected stdio, http, sse or sync)"))
    }
}

/// Outcome of [`TransportKind::resolve`], kept so startup can log how the
/// decision was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSelection {
    pub kind: TransportKind,
    /// Selected through `DEPLOYMENT_MODE=http` rather than `TRANSPORT`.
    pub from_deployment_mode: bool,
    /// The `TRANSPORT` value that could not be parsed, if any.
    pub unrecognized: Option<String>,
}
