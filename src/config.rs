//! TOML configuration for the host server and asset root.
//!
//! ```toml
//! address     = "0.0.0.0:3000"
//! static_root = "./pub"
//! ```
//!
//! Every key is optional. A file that exists but does not parse is an
//! error: startup should stop rather than run on silently-defaulted values.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Listen address for [`Server::from_config`](crate::Server::from_config).
    pub address: SocketAddr,
    /// Directory asset requests are resolved against.
    pub static_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            static_root: PathBuf::from("./pub"),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
