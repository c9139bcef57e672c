use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;

use crate::core::{Context, Controller, ControllerRef, ErrorContext, HttpError, HttpResult, Response};

use super::{build_from_conf, ControllerConf};

pub const CONTROLLER_NAME: &str = "error_handler";

/// Creates an ErrorHandler controller from configuration.
pub fn create_error_handler_controller(cfg: YamlValue) -> HttpResult<ControllerRef> {
    let config: ErrorHandlerConfig =
        serde_yaml::from_value(cfg).or_server_error("Invalid error_handler controller config")?;

    let sub = build_from_conf(config.sub)?;
    Ok(Arc::new(ErrorHandler::new(
        config.unhandled_codes.map(HashSet::from_iter),
        sub,
    )))
}

#[derive(Debug, Deserialize)]
struct ErrorHandlerConfig {
    /// Status codes to re-raise instead of absorbing. Absent means
    /// "absorb everything".
    unhandled_codes: Option<Vec<u16>>,
    sub: ControllerConf,
}

/// Render a minimal error page into `response`.
///
/// Writes the error's status and extra headers, a text/html content type
/// and a short body naming the code and description, then finishes the
/// response. Internal error messages are never included in the body.
pub fn render_error_page(response: &mut Response, err: &HttpError) -> HttpResult<()> {
    response.set_status(err.status())?;
    for (name, value) in err.headers() {
        response.insert_header(name, value)?;
    }
    response.insert_header("content-type", "text/html; charset=utf-8")?;

    let status = err.status();
    let description = err.description();
    let body = format!(
        "<!DOCTYPE html>\n<html><head><title>{status} {description}</title></head>\n\
         <body><h1>{status} {description}</h1></body></html>\n"
    );
    response.write(body.as_bytes());
    response.end();
    Ok(())
}

/// Wraps a controller and absorbs selected errors into an in-band error
/// response.
///
/// Errors whose status is listed in `unhandled_codes` are re-raised to the
/// parent untouched; everything else is rendered as an error page and
/// reported as success. An error arriving after the response head was
/// flushed cannot be absorbed and is re-raised.
pub struct ErrorHandler {
    unhandled_codes: Option<HashSet<u16>>,
    sub: ControllerRef,
}

impl ErrorHandler {
    pub fn new(unhandled_codes: Option<HashSet<u16>>, sub: ControllerRef) -> Self {
        Self {
            unhandled_codes,
            sub,
        }
    }
}

#[async_trait]
impl Controller for ErrorHandler {
    async fn handle(&self, ctx: &mut Context) -> HttpResult<()> {
        let err = match self.sub.handle(ctx).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        if let Some(unhandled) = &self.unhandled_codes {
            if unhandled.contains(&err.status()) {
                return Err(err);
            }
        }
        if ctx.response.head_sent() {
            return Err(err);
        }

        log::debug!("absorbing error: {err}");
        render_error_page(&mut ctx.response, &err)?;
        Ok(())
    }
}
