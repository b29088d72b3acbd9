use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use dotenvy::dotenv;

use crate::error::SettingsError;

pub const DEFAULT_BASE_URL: &str = "https://www.quandl.com";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2000;

/// Where and how the provider is reached.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub temporary_directory: PathBuf,
    pub source: SourceSettings,
}

impl Settings {
    /// Loads settings from the environment, reading `.env` first if present.
    ///
    /// # Variables
    /// - `STOCKPRICE_BIND_ADDR`: address the host surface listens on.
    /// - `STOCKPRICE_BASE_URL`: provider base URL.
    /// - `STOCKPRICE_CONNECT_TIMEOUT_MS`: connection timeout for the provider.
    /// - `STOCKPRICE_TEMP_DIR`: directory output files are created in.
    ///
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenv().ok();

        let bind_addr = parse_var("STOCKPRICE_BIND_ADDR", DEFAULT_BIND_ADDR)?;
        let timeout_ms: u64 = parse_var(
            "STOCKPRICE_CONNECT_TIMEOUT_MS",
            &DEFAULT_CONNECT_TIMEOUT_MS.to_string(),
        )?;
        let base_url = env::var("STOCKPRICE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let temporary_directory = env::var_os("STOCKPRICE_TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Settings {
            bind_addr,
            temporary_directory,
            source: SourceSettings {
                base_url,
                connect_timeout: Duration::from_millis(timeout_ms),
            },
        })
    }
}

fn parse_var<T: FromStr>(var: &'static str, default: &str) -> Result<T, SettingsError> {
    let value = env::var(var).unwrap_or_else(|_| default.to_string());
    value
        .parse()
        .map_err(|_| SettingsError::Invalid { var, value })
}
