//! Service config loader (strict parsing).

pub mod schema;

use std::fs;

use tally_core::error::{Result, TallyError};

pub use schema::{CounterSection, Persistence, ServerSection, ServiceConfig};

/// Default config file path; overridable with the `TALLY_CONFIG` env var.
pub const DEFAULT_CONFIG_PATH: &str = "tally.yaml";

pub fn load_from_file(path: &str) -> Result<ServiceConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TallyError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ServiceConfig> {
    let cfg: ServiceConfig = serde_yaml::from_str(s)
        .map_err(|e| TallyError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` when it exists, otherwise fall back to built-in defaults.
/// The service runs fine with no config file at all.
pub fn load_or_default(path: &str) -> Result<ServiceConfig> {
    if fs::metadata(path).is_ok() {
        load_from_file(path)
    } else {
        let cfg = ServiceConfig::default();
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Apply a `PORT`-style override on top of a loaded config. `None` or an
/// empty string keeps the configured listen address untouched.
pub fn apply_port_override(cfg: &mut ServiceConfig, port: Option<&str>) -> Result<()> {
    let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    let port: u16 = port
        .parse()
        .map_err(|_| TallyError::Config(format!("PORT must be a port number, got {port:?}")))?;

    let host = cfg
        .server
        .listen
        .rsplit_once(':')
        .map(|(host, _)| host.to_string())
        .unwrap_or_else(|| cfg.server.listen.clone());
    cfg.server.listen = format!("{host}:{port}");
    cfg.validate()
}
