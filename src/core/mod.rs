//! Core abstractions for weft
//!
//! This module provides the foundational types that the composition
//! primitives and the transport driver are built on: the controller
//! contract, the per-request context, and the error taxonomy.

pub mod context;
pub mod error;
pub mod request;
pub mod response;
pub mod traits;


// Re-export commonly used types
pub use context::{Context, DataScope};
pub use error::{canonical_description, ErrorContext, HttpError, HttpResult};
pub use request::Request;
pub use response::Response;
pub use traits::{Controller, ControllerCreateFn, ControllerRef, FnController};
