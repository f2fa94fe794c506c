use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::transport::{TransportKind, TransportSelection};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Read-only view over a key/value source. `env_opt` in production, a map in tests.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Process environment lookup; empty values count as unset.
pub fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn lookup_opt(lookup: Lookup<'_>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|s| !s.is_empty())
}

fn lookup_parse<T: FromStr>(
    lookup: Lookup<'_>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup_opt(lookup, key) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(None),
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        }),
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Process-level settings: which transport to run and where logs go.
///
/// The Odoo connection settings live in [`OdooConfig`] and are loaded
/// separately, because failing to build them is a startup failure of the
/// ERP client rather than of the launcher.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub log: LogConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_opt)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_lookup(lookup)?,
            log: LogConfig::from_lookup(lookup),
        })
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  transport:   {}", self.server.transport());
        if self.server.transport().is_network() {
            tracing::info!("  listen:      {}", self.server.bind_addr());
        }
        tracing::info!("  log_dir:     {}", self.log.dir.display());
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ServerConfig {
    selection: TransportSelection,
    host: Option<String>,
    port: Option<u16>,
}

impl ServerConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let transport = lookup_opt(lookup, "TRANSPORT");
        let deployment_mode = lookup_opt(lookup, "DEPLOYMENT_MODE");
        Ok(Self {
            selection: TransportKind::resolve(transport.as_deref(), deployment_mode.as_deref()),
            host: lookup_opt(lookup, "HOST"),
            port: lookup_parse(lookup, "PORT")?,
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        transport: Option<TransportKind>,
        host: Option<String>,
        port: Option<u16>,
    ) -> Self {
        if let Some(kind) = transport {
            self.selection = TransportSelection {
                kind,
                from_deployment_mode: false,
                unrecognized: None,
            };
        }
        if host.is_some() {
            self.host = host;
        }
        if port.is_some() {
            self.port = port;
        }
        self
    }

    pub fn transport(&self) -> TransportKind {
        self.selection.kind
    }

    pub fn selection(&self) -> &TransportSelection {
        &self.selection
    }

    /// `HOST`, or `0.0.0.0` for hosted HTTP deployments, or loopback.
    pub fn host(&self) -> &str {
        match &self.host {
            Some(h) => h,
            None if self.selection.from_deployment_mode => "0.0.0.0",
            None => "127.0.0.1",
        }
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.selection.kind.default_port())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }
}

// ── Logging ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory receiving one timestamped log file per process start.
    pub dir: PathBuf,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env_opt)
    }

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            dir: PathBuf::from(lookup_opt(lookup, "LOG_DIR").unwrap_or_else(|| "logs".to_string())),
        }
    }
}

// ── Odoo connection ───────────────────────────────────────────

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the Odoo backend.
#[derive(Clone)]
pub struct OdooConfig {
    /// Base URL without trailing slash, e.g. `https://erp.example.com`.
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
    pub verify_ssl: bool,
}

/// Shape of `odoo_config.json`.
#[derive(Debug, Default, Deserialize)]
struct OdooConfigFile {
    url: Option<String>,
    db: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<u64>,
    verify_ssl: Option<bool>,
}

impl OdooConfigFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl OdooConfig {
    /// Load from `ODOO_*` variables, filling gaps from the first config file found.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(&env_opt, &Self::default_config_paths())
    }

    /// Candidate config files, in lookup order.
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("odoo_config.json")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("odoo").join("config.json"));
            paths.push(home.join(".odoo_config.json"));
        }
        paths
    }

    pub fn resolve(lookup: Lookup<'_>, candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        let url = lookup_opt(lookup, "ODOO_URL");
        let db = lookup_opt(lookup, "ODOO_DB");
        let username = lookup_opt(lookup, "ODOO_USERNAME");
        let password = lookup_opt(lookup, "ODOO_PASSWORD");

        let file = if url.is_none() || db.is_none() || username.is_none() || password.is_none() {
            match candidates.iter().find(|p| p.is_file()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "Reading Odoo config file");
                    OdooConfigFile::read(path)?
                }
                None => OdooConfigFile::default(),
            }
        } else {
            OdooConfigFile::default()
        };

        let url = url.or(file.url).ok_or(ConfigError::Missing("ODOO_URL"))?;
        let timeout_secs = match lookup_parse(lookup, "ODOO_TIMEOUT")? {
            Some(t) => t,
            None => file.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "ODOO_TIMEOUT",
                value: timeout_secs.to_string(),
            });
        }
        let verify_ssl = match lookup_opt(lookup, "ODOO_VERIFY_SSL") {
            Some(raw) => parse_bool("ODOO_VERIFY_SSL", &raw)?,
            None => file.verify_ssl.unwrap_or(true),
        };

        Ok(Self {
            url: normalize_url(&url)?,
            db: db.or(file.db).ok_or(ConfigError::Missing("ODOO_DB"))?,
            username: username
                .or(file.username)
                .ok_or(ConfigError::Missing("ODOO_USERNAME"))?,
            password: password
                .or(file.password)
                .ok_or(ConfigError::Missing("ODOO_PASSWORD"))?,
            timeout_secs,
            verify_ssl,
        })
    }
}

impl fmt::Debug for OdooConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooConfig")
            .field("url", &self.url)
            .field("db", &self.db)
            .field("username", &self.username)
            .field("password", &REDACTED)
            .field("timeout_secs", &self.timeout_secs)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

/// Accept bare hosts (`erp.local:8069`) by assuming plain http.
fn normalize_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    url::Url::parse(&candidate).map_err(|_| ConfigError::Invalid {
        key: "ODOO_URL",
        value: raw.to_string(),
    })?;
    Ok(candidate)
}

// ── Environment summary ───────────────────────────────────────

pub const REDACTED: &str = "***hidden***";

/// `ODOO_*` variables sorted by name, with the password masked.
pub fn odoo_env_summary<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut out: Vec<(String, String)> = vars
        .into_iter()
        .filter(|(k, _)| k.starts_with("ODOO_"))
        .map(|(k, v)| {
            if k == "ODOO_PASSWORD" {
                (k, REDACTED.to_string())
            } else {
                (k, v)
            }
        })
        .collect();
    out.sort();
    out
}

/// Like [`odoo_env_summary`] over raw OS strings. Keys that are not UTF-8
/// cannot be `ODOO_*` and are skipped; values are rendered lossily.
pub fn odoo_env_summary_os<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    odoo_env_summary(vars.into_iter().filter_map(|(k, v)| {
        let key = k.into_string().ok()?;
        Some((key, v.to_string_lossy().into_owned()))
    }))
}

/// Log every `ODOO_*` variable of the current process.
pub fn log_odoo_environment() {
    tracing::info!("Environment variables:");
    for (key, value) in odoo_env_summary_os(env::vars_os()) {
        tracing::info!("  {}: {}", key, value);
    }
}
