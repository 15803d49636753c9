//! # controller_routes
//!
//! **controller_routes** lets you declare HTTP routes on controller types and resolves those
//! declarations into an ordered table of route descriptors that a hosting server can register
//! verbatim.
//!
//! ## Overview
//!
//! Routes are declared once per controller type, either with the `#[controller]` attribute
//! macro or by implementing [`Controller::declare`] by hand. Declarations accumulate per method:
//! auth, payload and validation settings build up, and every route binding captures a snapshot
//! of what has been declared so far. At run time a [`ControllerHandle`] turns the accumulated
//! metadata into [`RouteDescriptor`]s, each carrying a handler bound to the controller instance.
//!
//! ## Architecture
//!
//! - **[`metadata`]** - Registry, class metadata and the per-method accumulator
//! - **[`options`]** - Route options record (`auth`, `payload`, `validate`, passthrough fields)
//! - **[`controller`]** - The [`Controller`] trait, declaration builder and shared blueprints
//! - **[`resolver`]** - Turns a blueprint plus an instance into route descriptors
//! - **[`config`]** - Base-path policy and route tracing settings
//! - **[`logging`]** - Structured logging setup on `tracing-subscriber`
//!
//! ### Declaration and Resolution Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App
//!     participant Handle as ControllerHandle
//!     participant Catalog as Blueprint catalog
//!     participant Def as ControllerDef
//!     participant Registry
//!     participant Resolver as RouteResolver
//!     participant Host
//!
//!     App->>Handle: controller.mount()
//!     Handle->>Catalog: Blueprint::shared()
//!     alt first use of this type
//!         Catalog->>Def: C::declare(def)
//!         Def->>Registry: base path, default auth, parent
//!         Def->>Registry: per method: auth / payload / validate / add_route
//!         Registry-->>Catalog: class + method metadata
//!     end
//!     Catalog-->>Handle: Arc<Blueprint>
//!
//!     App->>Handle: routes()
//!     Handle->>Resolver: resolve(instance, blueprint)
//!     Resolver->>Resolver: base path + relative path
//!     Resolver->>Resolver: defaults merged under binding snapshot
//!     Resolver-->>App: Vec<RouteDescriptor>
//!     App->>Host: register descriptors
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use controller_routes::{controller, Controller, HandlerRequest, HandlerResponse};
//! use serde_json::json;
//!
//! struct Uploads;
//!
//! #[controller("/basePath")]
//! impl Uploads {
//!     #[get("/test")]
//!     fn show(&self, _req: HandlerRequest) -> HandlerResponse {
//!         HandlerResponse::ok_json(json!({}))
//!     }
//!
//!     #[post("/test2")]
//!     #[payload(multipart)]
//!     fn upload(&self, _req: HandlerRequest) -> HandlerResponse {
//!         HandlerResponse::ok_json(json!({ "stored": true }))
//!     }
//! }
//!
//! let routes = Uploads.mount().unwrap().routes();
//! assert_eq!(routes[0].to_value(), json!({"method": "GET", "path": "/basePath/test", "options": {}}));
//! assert_eq!(
//!     routes[1].to_value(),
//!     json!({"method": "POST", "path": "/basePath/test2", "options": {"payload": {"multipart": true}}})
//! );
//! ```
//!
//! ## Paths
//!
//! The base path and a binding's relative path are concatenated as-is: `"/a"` and `"/b"`
//! resolve to `"/ab"`. Nothing is inserted or normalized; a malformed result is for the host
//! to reject.
//!
//! ## Configuration
//!
//! See [`config`] for `CONTROLLER_ROUTES_TRACE` and `CONTROLLER_ROUTES_BASE_PATH_POLICY`, and
//! [`logging`] for the `CONTROLLER_ROUTES_LOG_*` variables.

extern crate self as controller_routes;

pub mod config;
pub mod controller;
mod error;
pub mod handler;
pub mod logging;
pub mod metadata;
pub mod options;
pub mod resolver;
mod verb;

pub use config::{BasePathPolicy, RoutesConfig};
pub use controller::{
    Blueprint, Controller, ControllerDef, ControllerHandle, MethodDef, MethodEntry, MethodFn,
    RouteProvider,
};
pub use error::{MetadataError, ParseVerbError};
pub use handler::{HandlerRequest, HandlerResponse};
pub use metadata::{
    ClassId, ClassMetadata, MethodMetadata, PayloadSpec, Registry, RouteBinding,
};
pub use options::{
    AuthMode, AuthSettings, AuthStrategy, PayloadOptions, RouteOptions, ValidateOptions,
};
pub use resolver::{Handler, RouteDescriptor, RouteResolver};
pub use verb::RouteVerb;

pub use controller_routes_macros::controller;

#[doc(hidden)]
pub mod __private {
    pub use http;
    pub use serde_json;
}
