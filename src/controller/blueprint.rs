use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::def::{declare_into, MethodEntry};
use super::Controller;
use crate::config::RoutesConfig;
use crate::error::MetadataError;
use crate::metadata::{ClassId, ClassMetadata, Registry};

/// Declared state of one controller type: the registry holding its (and
/// its ancestors') metadata, and its static method table.
pub struct Blueprint<C> {
    class: ClassId,
    registry: Registry,
    methods: Vec<MethodEntry<C>>,
}

/// One `OnceCell<Arc<Blueprint<C>>>` per controller type
static CATALOG: Lazy<DashMap<TypeId, Arc<dyn Any + Send + Sync>>> = Lazy::new(DashMap::new);

impl<C: Controller> Blueprint<C> {
    /// Declare `C` into a fresh registry configured by `config`.
    pub fn build(config: &RoutesConfig) -> Result<Self, MetadataError> {
        let class = ClassId::of::<C>();
        let mut registry = Registry::with_config(config);
        let methods = declare_into::<C>(&mut registry)?;
        debug!(
            class = %class,
            methods = methods.len(),
            classes = registry.len(),
            "Controller declared"
        );
        Ok(Self {
            class,
            registry,
            methods,
        })
    }

    /// Process-wide blueprint for `C`, declared once with
    /// [`RoutesConfig::global`].
    ///
    /// A failed declaration is not cached; the next call retries it.
    pub fn shared() -> Result<Arc<Self>, MetadataError> {
        let class = ClassId::of::<C>();
        // The map guard is released before declaring so that declarations
        // may touch the catalog for other types.
        let slot = CATALOG
            .entry(class.type_id())
            .or_insert_with(|| {
                let slot: Arc<dyn Any + Send + Sync> = Arc::new(OnceCell::<Arc<Self>>::new());
                slot
            })
            .value()
            .clone();
        let slot = slot
            .downcast::<OnceCell<Arc<Self>>>()
            .map_err(|_| MetadataError::CatalogMismatch {
                class: class.name(),
            })?;
        slot.get_or_try_init(|| Self::build(RoutesConfig::global()).map(Arc::new))
            .map(Arc::clone)
    }
}

impl<C> Blueprint<C> {
    #[must_use]
    pub fn class(&self) -> ClassId {
        self.class
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Own and inherited methods in resolution order
    pub fn methods(&self) -> impl Iterator<Item = &MethodEntry<C>> {
        self.methods.iter()
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodEntry<C>> {
        self.methods.iter().find(|entry| entry.name() == name)
    }

    #[must_use]
    pub fn class_metadata(&self) -> Option<&ClassMetadata> {
        self.registry.class_metadata(self.class)
    }

    /// Base path in force for `C`, inherited if `C` declares none
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.registry.resolved_base_path(self.class)
    }
}

impl<C> fmt::Debug for Blueprint<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("class", &self.class)
            .field("registry", &self.registry)
            .field("methods", &self.methods)
            .finish()
    }
}
