use std::collections::HashMap;
use tracing::trace;

use super::class::{ClassId, ClassMetadata};
use super::method::MethodMetadata;
use crate::config::{BasePathPolicy, RoutesConfig};
use crate::options::AuthStrategy;

/// Side table mapping controller identity to its metadata
///
/// Records are created on first access and never removed. Lookups of
/// missing state never fail: `get_or_create_*` materializes it, the
/// read accessors return `None` or an inert default.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    classes: HashMap<ClassId, ClassMetadata>,
    policy: BasePathPolicy,
}

impl Registry {
    #[must_use]
    pub fn new(policy: BasePathPolicy) -> Self {
        Self {
            classes: HashMap::new(),
            policy,
        }
    }

    #[must_use]
    pub fn with_config(config: &RoutesConfig) -> Self {
        Self::new(config.base_path_policy)
    }

    pub fn get_or_create_class_metadata(&mut self, class: ClassId) -> &mut ClassMetadata {
        let policy = self.policy;
        self.classes.entry(class).or_insert_with(|| {
            trace!(class = %class, "Creating class metadata");
            ClassMetadata::new(class, policy)
        })
    }

    pub fn get_or_create_method_metadata(
        &mut self,
        class: ClassId,
        method: &str,
    ) -> &mut MethodMetadata {
        self.get_or_create_class_metadata(class).method_entry(method)
    }

    #[must_use]
    pub fn class_metadata(&self, class: ClassId) -> Option<&ClassMetadata> {
        self.classes.get(&class)
    }

    #[must_use]
    pub fn method_metadata(&self, class: ClassId, method: &str) -> Option<&MethodMetadata> {
        self.classes.get(&class).and_then(|c| c.method(method))
    }

    #[must_use]
    pub fn contains(&self, class: ClassId) -> bool {
        self.classes.contains_key(&class)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    #[must_use]
    pub fn policy(&self) -> BasePathPolicy {
        self.policy
    }

    /// `class` followed by its ancestors, nearest first
    pub fn lineage(&self, class: ClassId) -> impl Iterator<Item = &ClassMetadata> {
        // Bounded by the table size so a malformed parent link cannot loop.
        let limit = self.classes.len();
        std::iter::successors(self.classes.get(&class), move |meta| {
            meta.parent().and_then(|parent| self.classes.get(&parent))
        })
        .take(limit)
    }

    /// Base path of the nearest class in the lineage that declares one
    #[must_use]
    pub fn resolved_base_path(&self, class: ClassId) -> &str {
        self.lineage(class)
            .find(|meta| meta.declares_base_path())
            .map(ClassMetadata::base_path)
            .unwrap_or_default()
    }

    /// Default auth of the nearest class in the lineage that declares one
    #[must_use]
    pub fn resolved_default_auth(&self, class: ClassId) -> Option<&AuthStrategy> {
        self.lineage(class).find_map(ClassMetadata::default_auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verb::RouteVerb;

    struct Base;
    struct Child;

    #[test]
    fn test_class_metadata_is_idempotent() {
        let mut registry = Registry::default();
        let class = ClassId::of::<Base>();
        registry.get_or_create_class_metadata(class).set_base_path("/base").unwrap();
        assert_eq!(registry.get_or_create_class_metadata(class).base_path(), "/base");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_method_metadata_is_idempotent() {
        let mut registry = Registry::default();
        let class = ClassId::of::<Base>();
        registry
            .get_or_create_method_metadata(class, "list")
            .add_route(RouteVerb::GET, "/", None);
        registry
            .get_or_create_method_metadata(class, "list")
            .add_route(RouteVerb::POST, "/", None);
        let meta = registry.method_metadata(class, "list").unwrap();
        assert_eq!(meta.bindings().len(), 2);
        assert!(registry.method_metadata(class, "missing").is_none());
    }

    #[test]
    fn test_lookups_on_unknown_class_are_inert() {
        let registry = Registry::default();
        let class = ClassId::of::<Base>();
        assert!(registry.class_metadata(class).is_none());
        assert_eq!(registry.resolved_base_path(class), "");
        assert!(registry.resolved_default_auth(class).is_none());
    }

    #[test]
    fn test_lineage_inherits_base_path_and_auth() {
        let mut registry = Registry::default();
        let base = ClassId::of::<Base>();
        let child = ClassId::of::<Child>();
        {
            let meta = registry.get_or_create_class_metadata(base);
            meta.set_base_path("/base").unwrap();
            meta.set_default_auth("session");
        }
        registry.get_or_create_class_metadata(child).set_parent(base).unwrap();

        assert_eq!(registry.resolved_base_path(child), "/base");
        assert_eq!(
            registry.resolved_default_auth(child),
            Some(&AuthStrategy::Named("session".into()))
        );

        registry.get_or_create_class_metadata(child).set_base_path("/child").unwrap();
        assert_eq!(registry.resolved_base_path(child), "/child");
        assert_eq!(registry.lineage(child).count(), 2);
    }
}
