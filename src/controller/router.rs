use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use crate::core::{Context, Controller, ControllerRef, ErrorContext, HttpError, HttpResult};

use super::{build_from_conf, ControllerConf};

pub const CONTROLLER_NAME: &str = "router";

/// Creates a Router controller from configuration.
pub fn create_router_controller(cfg: YamlValue) -> HttpResult<ControllerRef> {
    let config: RouterConfig =
        serde_yaml::from_value(cfg).or_server_error("Invalid router controller config")?;

    let mut routes = Vec::with_capacity(config.routes.len());
    for route in config.routes {
        let pattern = Regex::new(&route.pattern)
            .or_server_error(&format!("Invalid route pattern {:?}", route.pattern))?;
        routes.push(Route {
            pattern,
            controller: build_from_conf(route.controller)?,
        });
    }

    Ok(Arc::new(Router::new(routes)))
}

#[derive(Debug, Deserialize)]
struct RouterConfig {
    /// Ordered route list; declaration order is the only tie-break.
    routes: Vec<RouteConfig>,
}

#[derive(Debug, Deserialize)]
struct RouteConfig {
    pattern: String,
    controller: ControllerConf,
}

pub struct Route {
    pub pattern: Regex,
    pub controller: ControllerRef,
}

/// Ordered first-match-wins dispatch on the remaining path suffix.
///
/// Patterns are tested against `ctx.remaining_path` anchored at the start
/// of the suffix; a prefix match is enough. On a match the captured groups
/// are appended to `ctx.pattern_groups` and the matched prefix is consumed
/// before delegating, so nested routers each see only their own suffix.
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }
}

#[async_trait]
impl Controller for Router {
    async fn handle(&self, ctx: &mut Context) -> HttpResult<()> {
        for route in &self.routes {
            let (end, groups) = match route.pattern.captures(&ctx.remaining_path) {
                Some(caps) => {
                    let whole = match caps.get(0) {
                        Some(m) if m.start() == 0 => m,
                        // Leftmost match starts past the suffix start, so no
                        // anchored match exists for this pattern.
                        _ => continue,
                    };
                    let groups: Vec<String> = caps
                        .iter()
                        .skip(1)
                        .map(|g| g.map(|m| m.as_str().to_string()).unwrap_or_default())
                        .collect();
                    (whole.end(), groups)
                }
                None => continue,
            };

            ctx.pattern_groups.extend(groups);
            ctx.remaining_path.drain(..end);
            return route.controller.handle(ctx).await;
        }

        Err(HttpError::not_found())
    }
}
