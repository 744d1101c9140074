use std::{fs::File, io::Read, time::Duration};

use camino::Utf8PathBuf;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Deserialize, Debug)]
pub struct Config {
    pub system: System,
    #[serde(default)]
    pub listing: Listing,
}

#[derive(Deserialize, Debug)]
pub struct System {
    /// directory holding `gigbook.sqlite`
    pub data_path: Utf8PathBuf,
    pub bind_addr: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// log every SQL statement at info level
    #[serde(default)]
    pub dev: bool,
}

impl System {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Listing {
    /// venues and artists shown on the landing page
    pub recent_limit: u64,
}

impl Default for Listing {
    fn default() -> Self {
        Listing { recent_limit: 10 }
    }
}

fn default_timeout() -> u64 {
    10
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

const DEFAULT_CFG: &str = "gigbook.toml";

impl Config {
    pub fn new(path: Option<String>) -> Result<Self, Error> {
        let path = path.unwrap_or_else(|| {
            info!("no config file path provided, using default ({DEFAULT_CFG})");
            DEFAULT_CFG.to_string()
        });

        let mut fh = File::open(path)?;
        let mut data = String::new();
        fh.read_to_string(&mut data)?;

        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, Error> {
        Ok(toml::from_str(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_sections() {
        let config = Config::parse(
            r#"
            [system]
            data_path = "/var/lib/gigbook"
            bind_addr = "localhost:3000"
            "#,
        )
        .unwrap();
        assert_eq!(config.system.data_path, "/var/lib/gigbook");
        assert_eq!(config.system.request_timeout(), Duration::from_secs(10));
        assert!(!config.system.dev);
        assert_eq!(config.listing.recent_limit, 10);
    }

    #[test]
    fn explicit_values_win() {
        let config = Config::parse(
            r#"
            [system]
            data_path = "/srv/gigbook"
            bind_addr = "0.0.0.0:8080"
            request_timeout_secs = 3
            dev = true

            [listing]
            recent_limit = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.system.request_timeout_secs, 3);
        assert!(config.system.dev);
        assert_eq!(config.listing.recent_limit, 4);
    }

    #[test]
    fn missing_system_section_is_an_error() {
        assert!(matches!(
            Config::parse("[listing]\nrecent_limit = 4\n"),
            Err(Error::Toml(_))
        ));
    }
}
