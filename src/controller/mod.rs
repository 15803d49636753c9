//! # Controller Module
//!
//! Ties controller types to their metadata and exposes their routes.
//!
//! ## Overview
//!
//! A controller is any `Send + Sync + 'static` type implementing
//! [`Controller`]. Its [`declare`](Controller::declare) function is the
//! static registration table for the type: base path, class-level auth,
//! parent controller, and for each route-bearing method the function
//! pointer plus the declarations that apply to it.
//!
//! ## Lifecycle
//!
//! 1. The first [`ControllerHandle::new`] for a type runs `declare` once and
//!    caches the resulting [`Blueprint`] process-wide.
//! 2. Every later handle for the same type shares that blueprint.
//! 3. [`ControllerHandle::routes`] resolves descriptors against the shared
//!    blueprint; it never mutates it.
//!
//! ## Inheritance
//!
//! Rust has no class inheritance, so a controller that wants a parent's
//! routes embeds the parent and calls [`ControllerDef::extends`] with a
//! projection to it. Inherited methods are re-bound through the
//! projection; a method declared on the child with the same name hides the
//! parent's.
//!
//! ```rust
//! use controller_routes::{Controller, ControllerDef, HandlerRequest, HandlerResponse, MetadataError};
//! use serde_json::json;
//!
//! struct Health;
//!
//! impl Health {
//!     fn ping(&self, _req: HandlerRequest) -> HandlerResponse {
//!         HandlerResponse::ok_json(json!("pong"))
//!     }
//! }
//!
//! impl Controller for Health {
//!     fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError> {
//!         def.method("ping", Self::ping).get("/ping");
//!         Ok(())
//!     }
//! }
//!
//! struct Billing {
//!     health: Health,
//! }
//!
//! impl Controller for Billing {
//!     fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError> {
//!         def.base_path("/billing")?;
//!         def.extends(|billing: &Billing| &billing.health)?;
//!         Ok(())
//!     }
//! }
//!
//! let routes = Billing { health: Health }.mount().unwrap().routes();
//! assert_eq!(routes[0].path, "/billing/ping");
//! ```

mod blueprint;
mod def;
mod handle;

pub use blueprint::Blueprint;
pub use def::{ControllerDef, MethodDef, MethodEntry, MethodFn};
pub use handle::ControllerHandle;

use crate::error::MetadataError;
use crate::resolver::RouteDescriptor;

/// A type whose methods serve routes
pub trait Controller: Send + Sync + Sized + 'static {
    /// Declare base path, parent and route-bearing methods.
    ///
    /// Runs once per type for the shared blueprint.
    fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError>;

    /// Wrap this instance so it can produce its routes.
    fn mount(self) -> Result<ControllerHandle<Self>, MetadataError> {
        ControllerHandle::new(self)
    }
}

/// Anything that can hand a host its route table
pub trait RouteProvider {
    fn routes(&self) -> Vec<RouteDescriptor>;
}
