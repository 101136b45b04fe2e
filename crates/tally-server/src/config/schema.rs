use std::net::SocketAddr;

use serde::Deserialize;
use tally_core::error::{Result, TallyError};
use tally_core::store::Durability;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub counter: CounterSection,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerSection::default(),
            counter: CounterSection::default(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TallyError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.server.validate()?;
        self.counter.validate()?;
        Ok(())
    }

    /// The validated listen address.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server
            .listen
            .parse()
            .map_err(|_| TallyError::Config(format!("invalid listen address {:?}", self.server.listen)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Permissive CORS headers plus OPTIONS preflight short-circuit.
    #[serde(default = "default_cors")]
    pub cors: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            cors: default_cors(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        let _: SocketAddr = self.listen.parse().map_err(|_| {
            TallyError::Config(format!(
                "server.listen must be a host:port address, got {:?}",
                self.listen
            ))
        })?;
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_cors() -> bool {
    true
}
fn default_version() -> u32 {
    1
}

/// Which `CounterStore` implementation backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persistence {
    /// Durable, single JSON state file.
    #[default]
    File,
    /// Counter resets on process restart.
    Memory,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CounterSection {
    #[serde(default)]
    pub persistence: Persistence,

    #[serde(default = "default_state_path")]
    pub path: String,

    #[serde(default)]
    pub durability: Durability,
}

impl Default for CounterSection {
    fn default() -> Self {
        Self {
            persistence: Persistence::default(),
            path: default_state_path(),
            durability: Durability::default(),
        }
    }
}

impl CounterSection {
    pub fn validate(&self) -> Result<()> {
        if self.persistence == Persistence::File && self.path.trim().is_empty() {
            return Err(TallyError::Config(
                "counter.path must not be empty with file persistence".into(),
            ));
        }
        Ok(())
    }
}

fn default_state_path() -> String {
    "counter.json".into()
}
