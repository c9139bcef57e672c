use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::core::{Context, Controller, ControllerRef, DataScope, ErrorContext, HttpResult};

use super::{build_from_conf, ControllerConf};

pub const CONTROLLER_NAME: &str = "scoped_data";

/// Creates a ScopedData controller from configuration.
pub fn create_scoped_data_controller(cfg: YamlValue) -> HttpResult<ControllerRef> {
    let config: ScopedDataConfig =
        serde_yaml::from_value(cfg).or_server_error("Invalid scoped_data controller config")?;

    let mut overlay = HashMap::with_capacity(config.data.len());
    for (key, value) in config.data {
        let value = serde_json::to_value(value)
            .or_server_error(&format!("Invalid scoped_data value for key {key:?}"))?;
        overlay.insert(key, value);
    }

    let sub = build_from_conf(config.sub)?;
    Ok(Arc::new(ScopedData::new(overlay, sub)))
}

#[derive(Debug, Deserialize)]
struct ScopedDataConfig {
    data: HashMap<String, YamlValue>,
    sub: ControllerConf,
}

/// Grants a subtree additional or overriding context data, restoring the
/// prior view on exit no matter how the subtree completes.
///
/// Entry installs a child scope whose keys shadow the parent chain; exit
/// reassigns the saved `Arc`, so the view after completion is pointer-equal
/// to the view before entry.
pub struct ScopedData {
    overlay: HashMap<String, JsonValue>,
    sub: ControllerRef,
}

impl ScopedData {
    pub fn new(overlay: HashMap<String, JsonValue>, sub: ControllerRef) -> Self {
        Self { overlay, sub }
    }
}

#[async_trait]
impl Controller for ScopedData {
    async fn handle(&self, ctx: &mut Context) -> HttpResult<()> {
        let saved = Arc::clone(&ctx.data);
        ctx.data = Arc::new(DataScope::child(Arc::clone(&saved), self.overlay.clone()));

        let result = self.sub.handle(ctx).await;

        ctx.data = saved;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, Method, Version};
    use serde_json::json;

    use crate::core::{FnController, HttpError, Request};

    fn ctx_with(values: HashMap<String, JsonValue>) -> Context {
        Context::with_data(
            Request::new(
                Method::GET,
                "/x",
                Version::HTTP_11,
                HeaderMap::new(),
                Bytes::new(),
            ),
            values,
        )
    }

    fn overlay(key: &str, value: JsonValue) -> HashMap<String, JsonValue> {
        HashMap::from([(key.to_string(), value)])
    }

    #[tokio::test]
    async fn test_overlay_visible_inside_subtree() {
        let scoped = ScopedData::new(
            overlay("user", json!("alice")),
            FnController::new(|ctx: &mut Context| {
                assert_eq!(ctx.data_get("user"), Some(&json!("alice")));
                // Parent data still reachable through the chain.
                assert_eq!(ctx.data_get("site"), Some(&json!("weft")));
                ctx.response.end();
                Ok(())
            }),
        );

        let mut c = ctx_with(overlay("site", json!("weft")));
        scoped.handle(&mut c).await.unwrap();
    }

    #[tokio::test]
    async fn test_restores_on_success() {
        let scoped = ScopedData::new(
            overlay("user", json!("alice")),
            FnController::new(|ctx: &mut Context| {
                ctx.response.end();
                Ok(())
            }),
        );

        let mut c = ctx_with(HashMap::new());
        let before = Arc::clone(&c.data);
        scoped.handle(&mut c).await.unwrap();

        assert!(Arc::ptr_eq(&before, &c.data));
        assert_eq!(c.data_get("user"), None);
    }

    #[tokio::test]
    async fn test_restores_on_error() {
        let scoped = ScopedData::new(
            overlay("user", json!("alice")),
            FnController::new(|_: &mut Context| Err(HttpError::forbidden())),
        );

        let mut c = ctx_with(HashMap::new());
        let before = Arc::clone(&c.data);
        let err = scoped.handle(&mut c).await.unwrap_err();

        assert_eq!(err.status(), 403);
        assert!(Arc::ptr_eq(&before, &c.data));
        assert_eq!(c.data_get("user"), None);
    }

    #[tokio::test]
    async fn test_restores_after_delayed_completion() {
        struct DelayedReader;

        #[async_trait]
        impl Controller for DelayedReader {
            async fn handle(&self, ctx: &mut Context) -> HttpResult<()> {
                tokio::time::sleep(std::time::Duration::from_millis(2)).await;
                assert_eq!(ctx.data_get("user"), Some(&json!("alice")));
                ctx.response.end();
                Ok(())
            }
        }

        let scoped = ScopedData::new(overlay("user", json!("alice")), Arc::new(DelayedReader));
        let mut c = ctx_with(HashMap::new());
        let before = Arc::clone(&c.data);

        scoped.handle(&mut c).await.unwrap();
        assert!(Arc::ptr_eq(&before, &c.data));
    }

    #[tokio::test]
    async fn test_nested_scopes_shadow_and_unwind_in_order() {
        let inner = ScopedData::new(
            overlay("who", json!("inner")),
            FnController::new(|ctx: &mut Context| {
                assert_eq!(ctx.data_get("who"), Some(&json!("inner")));
                ctx.response.end();
                Ok(())
            }),
        );
        let outer = ScopedData::new(overlay("who", json!("outer")), Arc::new(inner));

        let mut c = ctx_with(overlay("who", json!("root")));
        outer.handle(&mut c).await.unwrap();
        assert_eq!(c.data_get("who"), Some(&json!("root")));
    }
}
