//! Connection settings: CLI flags > environment > config file > defaults.
//!
//! The config file is YAML (`.yaml` / `.yml`) or JSON (anything else) with
//! the same keys as [`Settings`]. `url` is a shorthand for scheme, host and
//! port; inside one layer the discrete `host` / `port` / `https` keys win
//! over it.
//!
use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::qdrant::{ConnectionConfig, DEFAULT_PORT};

pub const ENV_URL: &str = "QDRANT_URL";
pub const ENV_HOST: &str = "QDRANT_HOST";
pub const ENV_PORT: &str = "QDRANT_PORT";
pub const ENV_API_KEY: &str = "QDRANT_API_KEY";

/// Connection flags, flattened into the top-level CLI.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionFlags {
    /// Qdrant host [default: localhost]
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Qdrant port [default: 6333]
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Use HTTPS
    #[arg(long)]
    pub https: bool,

    /// Qdrant API key (falls back to QDRANT_API_KEY)
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// Endpoint URL, e.g. https://xyz.cloud.qdrant.io:6333 (overrides scheme/host/port)
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Connection settings file (YAML or JSON)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds (none by default)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// One layer of connection settings. Also the config file schema.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub https: Option<bool>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    fn apply(self, cfg: &mut ConnectionConfig) -> Result<()> {
        if let Some(raw) = self.url {
            let endpoint = parse_endpoint(&raw)?;
            cfg.host = endpoint.host;
            cfg.port = endpoint.port;
            cfg.use_https = endpoint.https;
        }
        if let Some(host) = self.host {
            cfg.host = host;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(https) = self.https {
            cfg.use_https = https;
        }
        if let Some(key) = self.api_key {
            cfg.api_key = Some(key);
        }
        if let Some(secs) = self.timeout_secs {
            cfg.timeout = Some(Duration::from_secs(secs));
        }
        Ok(())
    }

    fn from_flags(flags: &ConnectionFlags) -> Self {
        Settings {
            url: flags.url.clone(),
            host: flags.host.clone(),
            port: flags.port,
            // A bare flag can only turn HTTPS on.
            https: flags.https.then_some(true),
            api_key: flags.api_key.clone(),
            timeout_secs: flags.timeout,
        }
    }

    fn from_env(env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let port = match get(ENV_PORT) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u16>()
                    .with_context(|| format!("{ENV_PORT}='{raw}' is not a valid port"))?,
            ),
            None => None,
        };
        Ok(Settings {
            url: get(ENV_URL),
            host: get(ENV_HOST),
            port,
            https: None,
            api_key: get(ENV_API_KEY),
            timeout_secs: None,
        })
    }
}

/// Load a settings file, picking the format from its extension.
pub fn load_file(path: &Path) -> Result<Settings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&raw).context("failed to parse YAML config file")
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON config file")
    }
}

/// Build the process-wide connection config from every layer.
pub fn resolve(
    flags: &ConnectionFlags,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ConnectionConfig> {
    let mut cfg = ConnectionConfig::default();

    if let Some(path) = &flags.config {
        load_file(path)?.apply(&mut cfg)?;
    }
    Settings::from_env(env)?.apply(&mut cfg)?;
    Settings::from_flags(flags).apply(&mut cfg)?;

    tracing::debug!(config = ?cfg, "resolved connection");
    Ok(cfg)
}

/// Scheme, host and port parsed from an endpoint URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub https: bool,
}

/// Parse `http(s)://host[:port]`. A missing port means Qdrant's 6333,
/// not the scheme default; an explicit `:80` / `:443` is kept.
pub fn parse_endpoint(raw: &str) -> Result<Endpoint> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).with_context(|| format!("invalid URL '{trimmed}'"))?;

    let https = match url.scheme() {
        "http" => false,
        "https" => true,
        other => bail!("unsupported URL scheme '{other}' (expected http or https)"),
    };
    let Some(host) = url.host_str() else {
        bail!("URL '{trimmed}' has no host");
    };
    if !matches!(url.path(), "" | "/") {
        bail!("URL '{trimmed}' must not contain a path");
    }

    Ok(Endpoint {
        host: host.to_string(),
        port: url
            .port()
            .or_else(|| has_explicit_port(trimmed).then(|| url.port_or_known_default())?)
            .unwrap_or(DEFAULT_PORT),
        https,
    })
}

// `Url` drops ports equal to the scheme default, so look at the raw authority.
fn has_explicit_port(raw: &str) -> bool {
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let after_ipv6 = host_port.rsplit_once(']').map_or(host_port, |(_, tail)| tail);
    after_ipv6.contains(':')
}
