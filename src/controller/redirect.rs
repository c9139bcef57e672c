use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use validator::{Validate, ValidationError};

use crate::core::{canonical_description, Context, Controller, ControllerRef, ErrorContext, HttpResult};

pub const CONTROLLER_NAME: &str = "redirect";

/// Creates a Redirect controller from configuration.
pub fn create_redirect_controller(cfg: YamlValue) -> HttpResult<ControllerRef> {
    let config: RedirectConfig =
        serde_yaml::from_value(cfg).or_server_error("Invalid redirect controller config")?;

    config
        .validate()
        .or_server_error("Invalid redirect controller config")?;

    Ok(Arc::new(Redirect {
        location: config.location,
        ret_code: config.ret_code,
    }))
}

#[derive(Debug, Deserialize, Validate)]
struct RedirectConfig {
    /// Target of the `Location` header.
    location: String,

    /// HTTP status code for the redirect (e.g. 301, 302, 307, 308).
    /// Defaults to 302 (temporary redirect).
    #[serde(default = "RedirectConfig::default_ret_code")]
    #[validate(custom(function = "RedirectConfig::validate_ret_code"))]
    ret_code: u16,
}

impl RedirectConfig {
    fn default_ret_code() -> u16 {
        302
    }

    fn validate_ret_code(ret_code: u16) -> Result<(), ValidationError> {
        if !(300..400).contains(&ret_code) {
            return Err(ValidationError::new("ret_code_not_redirect"));
        }
        Ok(())
    }
}

/// Leaf controller answering with a 3xx redirect.
pub struct Redirect {
    location: String,
    ret_code: u16,
}

impl Redirect {
    pub fn new(location: impl Into<String>, ret_code: u16) -> Self {
        Self {
            location: location.into(),
            ret_code,
        }
    }
}

#[async_trait]
impl Controller for Redirect {
    async fn handle(&self, ctx: &mut Context) -> HttpResult<()> {
        ctx.response.set_status(self.ret_code)?;
        ctx.response.insert_header("location", &self.location)?;
        ctx.response.insert_header("content-type", "text/html; charset=utf-8")?;

        let reason = canonical_description(self.ret_code);
        let body = format!(
            "<!DOCTYPE html>\n<html><head><title>{} {reason}</title></head>\n\
             <body><h1>{} {reason}</h1><p><a href=\"{}\">{}</a></p></body></html>\n",
            self.ret_code, self.ret_code, self.location, self.location
        );
        ctx.response.write(body.as_bytes());
        ctx.response.end();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, Method, Version};

    use crate::core::Request;

    #[tokio::test]
    async fn test_sets_location_and_status() {
        let leaf = Redirect::new("/new-home", 301);
        let mut ctx = Context::new(Request::new(
            Method::GET,
            "/old",
            Version::HTTP_11,
            HeaderMap::new(),
            Bytes::new(),
        ));

        leaf.handle(&mut ctx).await.unwrap();
        assert_eq!(ctx.response.status().as_u16(), 301);
        assert_eq!(ctx.response.headers().get("location").unwrap(), "/new-home");
    }

    #[test]
    fn test_factory_rejects_non_redirect_code() {
        let cfg = serde_yaml::from_str("{location: /x, ret_code: 200}").unwrap();
        assert!(create_redirect_controller(cfg).is_err());
    }
}
