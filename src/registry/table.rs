//! Registry table
//!
//! Immutable method → builder mapping.

use std::collections::HashMap;
use std::fmt;

use super::builders::{Echo, ResponseBuilder, Time};
use crate::error::{Result, SocketzError};
use crate::protocol::{Request, Response};

/// Read-only method registry
pub struct Registry {
    builders: HashMap<&'static str, Box<dyn ResponseBuilder>>,
}

impl Registry {
    /// Start an empty registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry with the standard methods (`echo`, `time`)
    pub fn with_defaults() -> Self {
        Self::builder().register(Echo).register(Time).build()
    }

    /// Look up the builder for `method`
    ///
    /// Exact, case-sensitive match. Fails with `MethodNotFound`.
    pub fn resolve(&self, method: &str) -> Result<&dyn ResponseBuilder> {
        self.builders
            .get(method)
            .map(|builder| &**builder)
            .ok_or_else(|| SocketzError::MethodNotFound {
                requested_method: method.to_string(),
            })
    }

    /// Resolve and run the builder for `request`
    ///
    /// A lookup miss becomes `Response::NotFound` so the connection can
    /// answer it and keep going.
    pub fn dispatch(&self, request: &Request) -> Response {
        match self.resolve(&request.method) {
            Ok(builder) => builder.build(request),
            Err(_) => Response::not_found(request.method.as_str()),
        }
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<&'static str> {
        let mut methods: Vec<_> = self.builders.keys().copied().collect();
        methods.sort_unstable();
        methods
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("methods", &self.methods())
            .finish()
    }
}

/// Collects builders before the registry is frozen
#[derive(Default)]
pub struct RegistryBuilder {
    builders: HashMap<&'static str, Box<dyn ResponseBuilder>>,
}

impl RegistryBuilder {
    /// Register `builder` under its own method name
    ///
    /// A later registration for the same name replaces the earlier one.
    pub fn register(mut self, builder: impl ResponseBuilder + 'static) -> Self {
        self.builders.insert(builder.method(), Box::new(builder));
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            builders: self.builders,
        }
    }
}
