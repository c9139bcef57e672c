use env_logger::{Builder, Env};

use crate::config;

/// Initialize env_logger with the configured default level.
///
/// `RUST_LOG` still wins when set, so operators can raise verbosity without
/// touching the config file. Repeated calls (tests) are harmless.
pub fn init(config: &config::Log) {
    let env = Env::default().default_filter_or(config.level.as_str());
    let _ = Builder::from_env(env).try_init();
}
