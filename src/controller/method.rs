use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use crate::core::{Context, Controller, ControllerRef, ErrorContext, HttpError, HttpResult};

use super::{build_from_conf, ControllerConf};

pub const CONTROLLER_NAME: &str = "method_map";

/// Creates a MethodMap controller from configuration.
pub fn create_method_map_controller(cfg: YamlValue) -> HttpResult<ControllerRef> {
    let config: MethodMapConfig =
        serde_yaml::from_value(cfg).or_server_error("Invalid method_map controller config")?;

    let mut map = HashMap::with_capacity(config.methods.len());
    for (name, conf) in config.methods {
        let method = Method::from_bytes(name.to_uppercase().as_bytes())
            .or_server_error(&format!("Invalid HTTP method {name:?}"))?;
        map.insert(method, build_from_conf(conf)?);
    }

    let default = match config.default {
        Some(conf) => Some(build_from_conf(conf)?),
        None => None,
    };

    Ok(Arc::new(MethodMap::new(map, default)))
}

#[derive(Debug, Deserialize)]
struct MethodMapConfig {
    /// Method name (case-insensitive) to controller.
    methods: HashMap<String, ControllerConf>,

    /// Controller for methods not present in `methods`.
    default: Option<ControllerConf>,
}

/// Dispatch by request method, with an optional default.
///
/// This component never mutates the context itself; path consumption and
/// capture groups are purely the Router's business.
pub struct MethodMap {
    map: HashMap<Method, ControllerRef>,
    default: Option<ControllerRef>,
}

impl MethodMap {
    pub fn new(map: HashMap<Method, ControllerRef>, default: Option<ControllerRef>) -> Self {
        Self { map, default }
    }
}

#[async_trait]
impl Controller for MethodMap {
    async fn handle(&self, ctx: &mut Context) -> HttpResult<()> {
        let controller = self
            .map
            .get(ctx.request.method())
            .or(self.default.as_ref())
            .ok_or_else(HttpError::method_not_allowed)?;
        controller.handle(ctx).await
    }
}
