use crate::artifacts::ArtifactPaths;
use crate::error::{Result, ServiceError};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_MODEL_PATH: &str = "dozy_model.json";
pub const DEFAULT_SCALER_PATH: &str = "dozy_scaler.json";
pub const DEFAULT_FEATURE_COLUMNS_PATH: &str = "feature_columns.json";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub artifacts: ArtifactPaths,
    pub addr: SocketAddr,
    /// `LOG_PRED=1`
    pub log_predictions: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactPaths {
                model: PathBuf::from(DEFAULT_MODEL_PATH),
                scaler: PathBuf::from(DEFAULT_SCALER_PATH),
                feature_order: PathBuf::from(DEFAULT_FEATURE_COLUMNS_PATH),
            },
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            log_predictions: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key -> value source; unset keys keep their
    /// defaults, set-but-unparseable ones are errors.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(p) = get("MODEL_PATH") {
            cfg.artifacts.model = PathBuf::from(p);
        }
        if let Some(p) = get("SCALER_PATH") {
            cfg.artifacts.scaler = PathBuf::from(p);
        }
        if let Some(p) = get("FEATURE_COLUMNS_PATH") {
            cfg.artifacts.feature_order = PathBuf::from(p);
        }
        if let Some(host) = get("HOST") {
            let ip: IpAddr = host.trim().parse().map_err(|e| ServiceError::Config {
                key: "HOST",
                reason: format!("{host:?}: {e}"),
            })?;
            cfg.addr.set_ip(ip);
        }
        if let Some(port) = get("PORT") {
            let port: u16 = port.trim().parse().map_err(|e| ServiceError::Config {
                key: "PORT",
                reason: format!("{port:?}: {e}"),
            })?;
            cfg.addr.set_port(port);
        }
        cfg.log_predictions = get("LOG_PRED").as_deref() == Some("1");

        Ok(cfg)
    }
}
