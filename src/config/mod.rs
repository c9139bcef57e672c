use std::fs;
use std::net::SocketAddr;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::controller::ControllerConf;
use crate::core::{ErrorContext, HttpResult};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Config {
    #[validate(length(min = 1))]
    pub listeners: Vec<Listener>,

    /// What to do with an error no controller absorbed: keep serving
    /// (`resilient`, the default) or stop the process after answering the
    /// request (`fail_fast`, useful during development).
    #[serde(default)]
    pub run_mode: RunMode,

    #[serde(default)]
    pub log: Log,

    /// Root of the controller tree, handed to the controller registry.
    pub controller: ControllerConf,
}

// Config file load and validation
impl Config {
    pub fn load_from_yaml<P>(path: P) -> HttpResult<Self>
    where
        P: AsRef<std::path::Path> + std::fmt::Display,
    {
        let conf_str = fs::read_to_string(&path)
            .or_server_error(&format!("Unable to read conf file from {path}"))?;
        debug!("Conf file read from {path}");
        Self::from_yaml(&conf_str)
    }

    pub fn from_yaml(conf_str: &str) -> HttpResult<Self> {
        trace!("Read conf file: {conf_str}");
        let conf: Config =
            serde_yaml::from_str(conf_str).or_server_error("Unable to parse yaml conf")?;

        trace!("Loaded conf: {conf:?}");

        // use validator to validate conf file
        conf.validate().or_server_error("Conf file validation failed")?;

        Ok(conf)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Listener {
    pub address: SocketAddr,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    FailFast,
    #[default]
    Resilient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default = "Log::default_level")]
    pub level: String,
}

impl Log {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
listeners:
  - address: 127.0.0.1:8080
run_mode: fail_fast
log:
  level: debug
controller:
  type: static_content
  config:
    body: hi
"#;

    #[test]
    fn test_parses_full_config() {
        let conf = Config::from_yaml(VALID).unwrap();
        assert_eq!(conf.listeners.len(), 1);
        assert_eq!(conf.run_mode, RunMode::FailFast);
        assert_eq!(conf.log.level, "debug");
        assert_eq!(conf.controller.r#type, "static_content");
    }

    #[test]
    fn test_defaults() {
        let conf = Config::from_yaml(
            r#"
listeners:
  - address: 127.0.0.1:8080
controller:
  type: static_content
  config: {body: hi}
"#,
        )
        .unwrap();
        assert_eq!(conf.run_mode, RunMode::Resilient);
        assert_eq!(conf.log.level, "info");
    }

    #[test]
    fn test_rejects_empty_listener_list() {
        let err = Config::from_yaml(
            r#"
listeners: []
controller:
  type: static_content
  config: {body: hi}
"#,
        )
        .unwrap_err();
        assert!(err.message().unwrap().contains("validation"));
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        assert!(Config::from_yaml("listeners: [").is_err());
    }
}
