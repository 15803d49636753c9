//! Turns declared controller metadata into route descriptors.
//!
//! Resolution is a pure read of a [`Blueprint`]: nothing here mutates the
//! registry, so the same blueprint can be resolved from any number of
//! threads and instances at once.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::RoutesConfig;
use crate::controller::{Blueprint, Controller};
use crate::handler::{HandlerRequest, HandlerResponse};
use crate::options::{AuthStrategy, PayloadOptions, RouteOptions};
use crate::verb::RouteVerb;

/// Controller method bound to its instance
pub type Handler = Arc<dyn Fn(HandlerRequest) -> HandlerResponse + Send + Sync>;

/// One route as handed to the host: method, full path, bound handler and
/// merged options
#[derive(Clone, Serialize)]
pub struct RouteDescriptor {
    /// Uppercase verb, or `*` for the wildcard
    pub method: String,
    /// Base path and relative path, concatenated as-is
    pub path: String,
    #[serde(skip)]
    pub handler: Handler,
    pub options: RouteOptions,
}

impl RouteDescriptor {
    pub fn call(&self, request: HandlerRequest) -> HandlerResponse {
        (self.handler)(request)
    }

    /// Parsed form of [`method`](Self::method)
    #[must_use]
    pub fn verb(&self) -> Option<RouteVerb> {
        RouteVerb::parse(&self.method)
    }

    /// `{method, path, options}` without the handler
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Resolves a controller instance against its blueprint
#[derive(Debug, Clone, Copy)]
pub struct RouteResolver {
    trace_routes: bool,
}

impl Default for RouteResolver {
    fn default() -> Self {
        Self { trace_routes: true }
    }
}

impl RouteResolver {
    #[must_use]
    pub fn new(config: &RoutesConfig) -> Self {
        Self {
            trace_routes: config.trace_routes,
        }
    }

    /// Produce one descriptor per recorded binding.
    ///
    /// Methods come in blueprint order (own, then inherited); bindings
    /// within a method in the order they were added. Methods without
    /// metadata are skipped.
    pub fn resolve<C: Controller>(
        &self,
        instance: &Arc<C>,
        blueprint: &Blueprint<C>,
    ) -> Vec<RouteDescriptor> {
        let registry = blueprint.registry();
        let class = blueprint.class();
        let base_path = registry.resolved_base_path(class);
        let default_auth = registry.resolved_default_auth(class);

        let mut routes = Vec::new();
        for entry in blueprint.methods() {
            let Some(meta) = registry.method_metadata(entry.owner(), entry.name()) else {
                continue;
            };
            for binding in meta.bindings() {
                let path = format!("{base_path}{}", binding.relative_path());
                let options = route_options(binding.config(), default_auth);

                if self.trace_routes {
                    debug!(
                        class = %class,
                        handler = %entry.name(),
                        method = %binding.verb(),
                        path = %path,
                        multipart = options.is_multipart(),
                        "Route resolved"
                    );
                }

                let instance = Arc::clone(instance);
                let func = Arc::clone(entry.func());
                let handler: Handler =
                    Arc::new(move |request: HandlerRequest| func(&*instance, request));

                routes.push(RouteDescriptor {
                    method: binding.verb().as_str().to_string(),
                    path,
                    handler,
                    options,
                });
            }
        }
        routes
    }
}

/// Defaults (multipart payload, class auth) with the binding's snapshot on top
fn route_options(config: &RouteOptions, default_auth: Option<&AuthStrategy>) -> RouteOptions {
    let mut defaults = RouteOptions::new();
    if config.is_multipart() {
        defaults.payload = Some(PayloadOptions::multipart());
    }
    if let Some(auth) = default_auth {
        defaults.auth = Some(auth.clone());
    }
    defaults.merged(config.clone())
}
