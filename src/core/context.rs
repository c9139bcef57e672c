//! Per-request context
//!
//! One `Context` is created per inbound request and threaded `&mut` through
//! exactly one traversal of the controller tree. Exclusive ownership by the
//! traversal means no locking is ever needed inside the core.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::request::Request;
use super::response::Response;

/// One link in the scoped-data overlay chain.
///
/// Each scope owns its overlay map and holds an `Arc` link to its parent;
/// a lookup checks the local map first and then walks the parent chain.
/// Installing or restoring a scope is an `Arc` assignment, so entering and
/// leaving a subtree costs O(overlay size), never O(total depth).
#[derive(Debug, Default)]
pub struct DataScope {
    values: HashMap<String, JsonValue>,
    parent: Option<Arc<DataScope>>,
}

impl DataScope {
    pub fn root(values: HashMap<String, JsonValue>) -> Self {
        Self {
            values,
            parent: None,
        }
    }

    pub fn child(parent: Arc<DataScope>, overlay: HashMap<String, JsonValue>) -> Self {
        Self {
            values: overlay,
            parent: Some(parent),
        }
    }

    /// Look up a key, newest overlay first.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.values.get(key) {
                return Some(value);
            }
            match &scope.parent {
                Some(parent) => scope = parent,
                None => return None,
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Mutable per-request state passed down the controller tree.
pub struct Context {
    pub request: Request,
    pub response: Response,

    /// The path suffix not yet consumed by routing. Starts as the request
    /// path without its leading separator; each router match truncates it
    /// past the matched prefix.
    pub remaining_path: String,

    /// Capture groups accumulated across all routing levels on the way to
    /// the current controller, in match order. Append-only.
    pub pattern_groups: Vec<String>,

    /// Scoped key-value data visible to the current subtree.
    pub data: Arc<DataScope>,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self::with_data(request, HashMap::new())
    }

    /// Create a context whose root data scope is pre-seeded with `values`.
    pub fn with_data(request: Request, values: HashMap<String, JsonValue>) -> Self {
        let remaining_path = request
            .path()
            .strip_prefix('/')
            .unwrap_or(request.path())
            .to_string();
        Self {
            request,
            response: Response::new(),
            remaining_path,
            pattern_groups: Vec::new(),
            data: Arc::new(DataScope::root(values)),
        }
    }

    /// Convenience lookup into the scoped-data chain.
    pub fn data_get(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }
}
