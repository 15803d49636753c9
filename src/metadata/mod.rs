//! # Metadata Module
//!
//! Definition-time state for controllers: one [`ClassMetadata`] per
//! controller type, one [`MethodMetadata`] per (type, method name), both
//! owned by a [`Registry`] keyed on [`ClassId`].
//!
//! Method metadata is an accumulator. Auth, payload and validation
//! declarations update it; each route binding copies it at the moment the
//! binding is added:
//!
//! ```rust
//! use controller_routes::{MethodMetadata, PayloadOptions, PayloadSpec, RouteVerb};
//!
//! let mut meta = MethodMetadata::new();
//! meta.set_payload(PayloadOptions::new().max_bytes(500))
//!     .add_route(RouteVerb::PATCH, "/upload", None)
//!     .set_payload(PayloadSpec::Multipart)
//!     .add_route(RouteVerb::OPTIONS, "/upload", None);
//!
//! let bindings = meta.bindings();
//! assert_eq!(bindings[0].config().payload.as_ref().unwrap().get_max_bytes(), Some(500));
//! assert!(bindings[1].config().is_multipart());
//! ```

mod class;
mod method;
mod registry;

pub use class::{ClassId, ClassMetadata};
pub use method::{MethodMetadata, PayloadSpec, RouteBinding};
pub use registry::Registry;
