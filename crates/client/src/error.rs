//! Error types for the ERP client.

/// Errors raised while talking to the Odoo backend.
#[derive(Debug, thiserror::Error)]
pub enum OdooError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Odoo answered with a non-success HTTP status.
    #[error("Odoo returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Odoo raised a server-side exception. Displays the Odoo message verbatim.
    #[error("{message}")]
    Fault {
        message: String,
        /// Exception class reported by Odoo, e.g. `odoo.exceptions.AccessError`.
        name: Option<String>,
    },

    /// `common.login` returned no uid.
    #[error("Authentication failed for user '{username}' on database '{db}'")]
    Authentication { username: String, db: String },

    /// The response was not a well-formed JSON-RPC envelope.
    #[error("failed to parse Odoo response: {0}")]
    Parse(String),
}
