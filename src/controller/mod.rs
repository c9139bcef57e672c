//! Composition primitives
//!
//! Each controller type lives in its own file with a factory function and a
//! serde config struct; this module ties them together in a global registry
//! so a whole controller tree can be built from configuration.

pub mod error_handler;
pub mod fallback;
pub mod method;
pub mod redirect;
pub mod router;
pub mod scoped_data;
pub mod static_content;

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;

use crate::core::{ControllerCreateFn, ControllerRef, HttpError, HttpResult};

/// Global registry mapping controller type names to their factory functions.
static CONTROLLER_BUILDER_REGISTRY: Lazy<HashMap<&'static str, ControllerCreateFn>> =
    Lazy::new(|| {
        let arr: Vec<(&str, ControllerCreateFn)> = vec![
            (router::CONTROLLER_NAME, router::create_router_controller),
            (method::CONTROLLER_NAME, method::create_method_map_controller),
            (
                error_handler::CONTROLLER_NAME,
                error_handler::create_error_handler_controller,
            ),
            (fallback::CONTROLLER_NAME, fallback::create_fallback_controller),
            (
                scoped_data::CONTROLLER_NAME,
                scoped_data::create_scoped_data_controller,
            ),
            (
                static_content::CONTROLLER_NAME,
                static_content::create_static_content_controller,
            ),
            (redirect::CONTROLLER_NAME, redirect::create_redirect_controller),
        ];
        arr.into_iter().collect()
    });

/// Declarative shape of one node in a configured controller tree.
///
/// Factories whose controllers hold sub-controllers embed this shape in
/// their own config structs and recurse through [`build_from_conf`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ControllerConf {
    pub r#type: String,

    #[serde(default)]
    pub config: YamlValue,
}

/// Creates a controller instance from configuration using the factory
/// registry. Fails fast for unknown controller types.
pub fn build_controller(name: &str, cfg: YamlValue) -> HttpResult<ControllerRef> {
    let builder = CONTROLLER_BUILDER_REGISTRY.get(name).ok_or_else(|| {
        HttpError::server_error().with_message(format!("Unknown controller type {name:?}"))
    })?;
    builder(cfg)
}

/// Builds a controller (and, recursively, its subtree) from its declarative
/// configuration node.
pub fn build_from_conf(conf: ControllerConf) -> HttpResult<ControllerRef> {
    build_controller(&conf.r#type, conf.config)
}
