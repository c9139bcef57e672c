//! Core traits for weft components
//!
//! The single capability shape everything composes over: a controller takes
//! the request context and completes exactly once, by returning. `Ok(())`
//! means the controller fully wrote the response or delegated to something
//! that did; `Err` carries a status-tagged error for a parent to absorb or
//! re-raise. Immediate and arbitrarily-delayed completion are uniform: the
//! caller just awaits.

use std::sync::Arc;

use async_trait::async_trait;
use serde_yaml::Value as YamlValue;

use super::context::Context;
use super::error::HttpResult;

/// The unit of composition. Trees of controllers are built from the
/// primitives in `crate::controller`; there is no inheritance, only
/// composition over this one shape.
#[async_trait]
pub trait Controller: Send + Sync {
    async fn handle(&self, ctx: &mut Context) -> HttpResult<()>;
}

/// Shared handle to a controller, as stored by every composing component.
pub type ControllerRef = Arc<dyn Controller>;

/// Factory signature used by the controller registry.
pub type ControllerCreateFn = fn(YamlValue) -> HttpResult<ControllerRef>;

/// Adapter turning a plain function into a leaf controller.
///
/// Handy for tests and for simple synchronous leaves; anything that needs
/// to await should implement [`Controller`] directly.
pub struct FnController<F> {
    f: F,
}

impl<F> FnController<F>
where
    F: Fn(&mut Context) -> HttpResult<()> + Send + Sync + 'static,
{
    pub fn new(f: F) -> ControllerRef {
        Arc::new(Self { f })
    }
}

#[async_trait]
impl<F> Controller for FnController<F>
where
    F: Fn(&mut Context) -> HttpResult<()> + Send + Sync,
{
    async fn handle(&self, ctx: &mut Context) -> HttpResult<()> {
        (self.f)(ctx)
    }
}
