use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use crate::core::{Context, Controller, ControllerRef, ErrorContext, HttpError, HttpResult};

use super::{build_from_conf, ControllerConf};

pub const CONTROLLER_NAME: &str = "fallback";

/// Creates a Fallback controller from configuration.
pub fn create_fallback_controller(cfg: YamlValue) -> HttpResult<ControllerRef> {
    let config: FallbackConfig =
        serde_yaml::from_value(cfg).or_server_error("Invalid fallback controller config")?;

    let mut subs = Vec::with_capacity(config.subs.len());
    for conf in config.subs {
        subs.push(build_from_conf(conf)?);
    }

    Ok(Arc::new(Fallback::new(
        config.valid_codes.map(HashSet::from_iter),
        subs,
    )))
}

#[derive(Debug, Deserialize)]
struct FallbackConfig {
    /// Status codes that allow advancing to the next sub-controller.
    /// Absent means every error is recoverable.
    valid_codes: Option<Vec<u16>>,
    subs: Vec<ControllerConf>,
}

/// Tries sub-controllers in order until one succeeds.
///
/// A recoverable error advances to the next sub-controller with the same
/// context; mutations and `pattern_groups` from failed attempts are kept,
/// there is no rollback. An error outside `valid_codes` escalates
/// immediately. Exhausting the list surfaces the last error seen, not the
/// first. The advance is a plain loop, so arbitrarily long chains cost no
/// stack depth.
pub struct Fallback {
    valid_codes: Option<HashSet<u16>>,
    subs: Vec<ControllerRef>,
}

impl Fallback {
    pub fn new(valid_codes: Option<HashSet<u16>>, subs: Vec<ControllerRef>) -> Self {
        Self { valid_codes, subs }
    }
}

#[async_trait]
impl Controller for Fallback {
    async fn handle(&self, ctx: &mut Context) -> HttpResult<()> {
        let mut last_err = None;

        for sub in &self.subs {
            match sub.handle(ctx).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    if let Some(valid) = &self.valid_codes {
                        if !valid.contains(&err.status()) {
                            return Err(err);
                        }
                    }
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(HttpError::not_found))
    }
}
