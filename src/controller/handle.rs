use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::blueprint::Blueprint;
use super::{Controller, RouteProvider};
use crate::config::RoutesConfig;
use crate::error::MetadataError;
use crate::metadata::ClassMetadata;
use crate::resolver::{RouteDescriptor, RouteResolver};

/// A controller instance together with its declared metadata
///
/// Cloning is cheap: the instance and the blueprint are both shared.
pub struct ControllerHandle<C> {
    instance: Arc<C>,
    blueprint: Arc<Blueprint<C>>,
    resolver: RouteResolver,
}

impl<C: Controller> ControllerHandle<C> {
    /// Wrap `controller` using the process-wide blueprint for `C`.
    pub fn new(controller: C) -> Result<Self, MetadataError> {
        Self::from_arc(Arc::new(controller))
    }

    pub fn from_arc(instance: Arc<C>) -> Result<Self, MetadataError> {
        Ok(Self {
            instance,
            blueprint: Blueprint::shared()?,
            resolver: RouteResolver::new(RoutesConfig::global()),
        })
    }

    /// Wrap `controller` with a private blueprint declared under `config`
    /// instead of the shared one.
    pub fn with_config(controller: C, config: &RoutesConfig) -> Result<Self, MetadataError> {
        Ok(Self {
            instance: Arc::new(controller),
            blueprint: Arc::new(Blueprint::build(config)?),
            resolver: RouteResolver::new(config),
        })
    }

    #[must_use]
    pub fn instance(&self) -> &Arc<C> {
        &self.instance
    }

    #[must_use]
    pub fn blueprint(&self) -> &Arc<Blueprint<C>> {
        &self.blueprint
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&ClassMetadata> {
        self.blueprint.class_metadata()
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        self.blueprint.base_path()
    }

    /// Resolve the route table for this instance.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteDescriptor> {
        self.resolver.resolve(&self.instance, &self.blueprint)
    }
}

impl<C: Controller> RouteProvider for ControllerHandle<C> {
    fn routes(&self) -> Vec<RouteDescriptor> {
        self.resolver.resolve(&self.instance, &self.blueprint)
    }
}

impl<C> Clone for ControllerHandle<C> {
    fn clone(&self) -> Self {
        Self {
            instance: Arc::clone(&self.instance),
            blueprint: Arc::clone(&self.blueprint),
            resolver: self.resolver,
        }
    }
}

impl<C> Deref for ControllerHandle<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.instance
    }
}

impl<C> fmt::Debug for ControllerHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("class", &self.blueprint.class())
            .field("base_path", &self.blueprint.base_path())
            .finish_non_exhaustive()
    }
}
