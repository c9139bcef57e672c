//! weft — a microframework for building HTTP servers out of composable
//! controllers.
//!
//! A controller is a unit of request handling that receives the per-request
//! [`core::Context`] and completes exactly once with success or a
//! status-tagged error. Servers are trees of controllers built from the
//! composition primitives in [`controller`]: router, method dispatcher,
//! error handler, fallback chain, scoped-data overlay and a few leaves.
//! The [`service`] module drives the tree from a hyper HTTP/1 transport.

pub mod config;
pub mod controller;
pub mod core;
pub mod logging;
pub mod service;

pub use config::Config;
pub use core::{Context, Controller, ControllerRef, HttpError, HttpResult};
pub use service::HttpService;
