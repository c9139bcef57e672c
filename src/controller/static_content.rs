use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use crate::core::{Context, Controller, ControllerRef, ErrorContext, HttpResult};

pub const CONTROLLER_NAME: &str = "static_content";

/// Creates a StaticContent controller from configuration.
pub fn create_static_content_controller(cfg: YamlValue) -> HttpResult<ControllerRef> {
    let config: StaticContentConfig =
        serde_yaml::from_value(cfg).or_server_error("Invalid static_content controller config")?;

    Ok(Arc::new(StaticContent {
        status: config.status,
        headers: config.headers,
        body: config.body,
    }))
}

#[derive(Debug, Deserialize)]
struct StaticContentConfig {
    /// The response body to serve.
    body: String,

    #[serde(default = "StaticContentConfig::default_status")]
    status: u16,

    /// Additional response headers.
    #[serde(default)]
    headers: HashMap<String, String>,
}

impl StaticContentConfig {
    fn default_status() -> u16 {
        200
    }
}

/// Leaf controller serving a fixed body with fixed status and headers.
pub struct StaticContent {
    status: u16,
    headers: HashMap<String, String>,
    body: String,
}

impl StaticContent {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl Controller for StaticContent {
    async fn handle(&self, ctx: &mut Context) -> HttpResult<()> {
        ctx.response.set_status(self.status)?;
        for (name, value) in &self.headers {
            ctx.response.insert_header(name, value)?;
        }
        ctx.response.write(self.body.as_bytes());
        ctx.response.end();
        Ok(())
    }
}
