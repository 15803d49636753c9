use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::Controller;
use crate::error::MetadataError;
use crate::handler::{HandlerRequest, HandlerResponse};
use crate::metadata::{ClassId, ClassMetadata, MethodMetadata, PayloadSpec, Registry};
use crate::options::{AuthStrategy, RouteOptions, ValidateOptions};
use crate::verb::RouteVerb;

/// Controller method erased to a callable taking the instance explicitly
pub type MethodFn<C> = Arc<dyn Fn(&C, HandlerRequest) -> HandlerResponse + Send + Sync>;

/// One row of a controller's static method table
pub struct MethodEntry<C> {
    name: String,
    owner: ClassId,
    func: MethodFn<C>,
}

impl<C> MethodEntry<C> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class whose metadata holds this method's bindings
    #[must_use]
    pub fn owner(&self) -> ClassId {
        self.owner
    }

    pub fn call(&self, controller: &C, request: HandlerRequest) -> HandlerResponse {
        (self.func)(controller, request)
    }

    pub(crate) fn func(&self) -> &MethodFn<C> {
        &self.func
    }
}

impl<C> Clone for MethodEntry<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            owner: self.owner,
            func: Arc::clone(&self.func),
        }
    }
}

impl<C> fmt::Debug for MethodEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Run `C::declare` against `registry` and return its method table: own
/// methods in declaration order, then inherited methods it does not shadow.
pub(crate) fn declare_into<C: Controller>(
    registry: &mut Registry,
) -> Result<Vec<MethodEntry<C>>, MetadataError> {
    let mut def = ControllerDef::<C>::new(registry);
    C::declare(&mut def)?;
    Ok(def.finish())
}

/// Declaration context handed to [`Controller::declare`]
///
/// Each call is one declaration evaluated in call order, so a method's
/// configuration calls apply to the route calls that follow them.
///
/// ```rust
/// use controller_routes::{
///     Controller, ControllerDef, HandlerRequest, HandlerResponse, MetadataError, PayloadSpec,
/// };
/// use serde_json::json;
///
/// struct Uploads;
///
/// impl Uploads {
///     fn upload(&self, _req: HandlerRequest) -> HandlerResponse {
///         HandlerResponse::ok_json(json!({"stored": true}))
///     }
/// }
///
/// impl Controller for Uploads {
///     fn declare(def: &mut ControllerDef<'_, Self>) -> Result<(), MetadataError> {
///         def.base_path("/files")?;
///         def.method("upload", Self::upload)
///             .auth("session")
///             .payload(PayloadSpec::Multipart)
///             .post("/upload");
///         Ok(())
///     }
/// }
///
/// let routes = Uploads.mount().unwrap().routes();
/// assert_eq!(routes[0].method, "POST");
/// assert_eq!(routes[0].path, "/files/upload");
/// assert!(routes[0].options.is_multipart());
/// ```
pub struct ControllerDef<'r, C> {
    registry: &'r mut Registry,
    class: ClassId,
    own: Vec<MethodEntry<C>>,
    inherited: Vec<MethodEntry<C>>,
}

impl<'r, C: Controller> ControllerDef<'r, C> {
    pub(crate) fn new(registry: &'r mut Registry) -> Self {
        let class = ClassId::of::<C>();
        registry.get_or_create_class_metadata(class);
        Self {
            registry,
            class,
            own: Vec::new(),
            inherited: Vec::new(),
        }
    }

    #[must_use]
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Class metadata being declared
    pub fn metadata(&mut self) -> &mut ClassMetadata {
        self.registry.get_or_create_class_metadata(self.class)
    }

    /// Prefix prepended verbatim to every relative path of this controller.
    pub fn base_path(&mut self, path: impl Into<String>) -> Result<&mut Self, MetadataError> {
        self.metadata().set_base_path(path)?;
        Ok(self)
    }

    /// Auth applied to every route that does not declare its own.
    pub fn default_auth(&mut self, auth: impl Into<AuthStrategy>) -> &mut Self {
        self.metadata().set_default_auth(auth);
        self
    }

    /// Inherit the route-bearing methods of `P`, reached through `project`.
    ///
    /// `P` is declared into the same registry. Methods declared on `C` with
    /// the same name shadow the inherited ones.
    pub fn extends<P, F>(&mut self, project: F) -> Result<&mut Self, MetadataError>
    where
        P: Controller,
        F: Fn(&C) -> &P + Send + Sync + 'static,
    {
        let parent = ClassId::of::<P>();
        if let Some(existing) = self.metadata().parent() {
            return Err(MetadataError::MultipleParents {
                class: self.class.name(),
                existing: existing.name(),
                attempted: parent.name(),
            });
        }
        if self.registry.contains(parent) {
            return Err(MetadataError::InheritanceCycle {
                class: parent.name(),
            });
        }
        self.metadata().set_parent(parent)?;

        let parent_methods = declare_into::<P>(self.registry)?;
        let project = Arc::new(project);
        self.inherited
            .extend(parent_methods.into_iter().map(|entry| {
                let project = Arc::clone(&project);
                let func = Arc::clone(&entry.func);
                MethodEntry {
                    name: entry.name,
                    owner: entry.owner,
                    func: Arc::new(move |controller: &C, request: HandlerRequest| {
                        func((*project)(controller), request)
                    }) as MethodFn<C>,
                }
            }));
        Ok(self)
    }

    /// Register `func` under `name` and start declaring its routes.
    ///
    /// Registering the same name again rebinds the function; the metadata
    /// keeps accumulating.
    pub fn method<F>(&mut self, name: &str, func: F) -> MethodDef<'_>
    where
        F: Fn(&C, HandlerRequest) -> HandlerResponse + Send + Sync + 'static,
    {
        let func: MethodFn<C> = Arc::new(func);
        match self.own.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.func = func,
            None => self.own.push(MethodEntry {
                name: name.to_string(),
                owner: self.class,
                func,
            }),
        }
        MethodDef {
            meta: self
                .registry
                .get_or_create_method_metadata(self.class, name),
        }
    }

    fn finish(self) -> Vec<MethodEntry<C>> {
        let ControllerDef { own, inherited, .. } = self;
        let shadowed = |name: &str| own.iter().any(|entry| entry.name == name);
        let inherited: Vec<_> = inherited
            .into_iter()
            .filter(|entry| !shadowed(&entry.name))
            .collect();
        own.into_iter().chain(inherited).collect()
    }
}

/// Declarations for a single controller method
pub struct MethodDef<'a> {
    meta: &'a mut MethodMetadata,
}

impl MethodDef<'_> {
    pub fn route(&mut self, verb: RouteVerb, path: impl Into<String>) -> &mut Self {
        self.meta.add_route(verb, path, None);
        self
    }

    /// Bind a route with inline overrides merged over the snapshot
    pub fn route_with(
        &mut self,
        verb: RouteVerb,
        path: impl Into<String>,
        overrides: RouteOptions,
    ) -> &mut Self {
        self.meta.add_route(verb, path, Some(overrides));
        self
    }

    pub fn get(&mut self, path: impl Into<String>) -> &mut Self {
        self.route(RouteVerb::GET, path)
    }

    pub fn post(&mut self, path: impl Into<String>) -> &mut Self {
        self.route(RouteVerb::POST, path)
    }

    pub fn put(&mut self, path: impl Into<String>) -> &mut Self {
        self.route(RouteVerb::PUT, path)
    }

    pub fn patch(&mut self, path: impl Into<String>) -> &mut Self {
        self.route(RouteVerb::PATCH, path)
    }

    pub fn delete(&mut self, path: impl Into<String>) -> &mut Self {
        self.route(RouteVerb::DELETE, path)
    }

    pub fn options(&mut self, path: impl Into<String>) -> &mut Self {
        self.route(RouteVerb::OPTIONS, path)
    }

    /// Wildcard route answering every method
    pub fn all(&mut self, path: impl Into<String>) -> &mut Self {
        self.route(RouteVerb::Any, path)
    }

    pub fn auth(&mut self, auth: impl Into<AuthStrategy>) -> &mut Self {
        self.meta.set_auth_strategy(auth);
        self
    }

    pub fn payload(&mut self, payload: impl Into<PayloadSpec>) -> &mut Self {
        self.meta.set_payload(payload);
        self
    }

    pub fn payload_value(&mut self, payload: &Value) -> &mut Self {
        self.meta.set_payload_value(payload);
        self
    }

    pub fn validate(&mut self, fragment: ValidateOptions) -> &mut Self {
        self.meta.set_validate_fragment(fragment);
        self
    }

    /// Host passthrough option (`description`, `tags`, ..)
    pub fn option(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.meta.set_option(key, value);
        self
    }

    #[must_use]
    pub fn metadata(&self) -> &MethodMetadata {
        &*self.meta
    }
}
