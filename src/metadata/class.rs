use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use super::method::MethodMetadata;
use crate::config::BasePathPolicy;
use crate::error::MetadataError;
use crate::options::AuthStrategy;

/// Stable identity of a controller type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId {
    type_id: TypeId,
    name: &'static str,
}

impl ClassId {
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Metadata shared by every instance of one controller type
#[derive(Debug, Clone)]
pub struct ClassMetadata {
    class: ClassId,
    base_path: Option<String>,
    default_auth: Option<AuthStrategy>,
    parent: Option<ClassId>,
    policy: BasePathPolicy,
    methods: HashMap<String, MethodMetadata>,
}

impl ClassMetadata {
    #[must_use]
    pub fn new(class: ClassId, policy: BasePathPolicy) -> Self {
        Self {
            class,
            base_path: None,
            default_auth: None,
            parent: None,
            policy,
            methods: HashMap::new(),
        }
    }

    #[must_use]
    pub fn class(&self) -> ClassId {
        self.class
    }

    /// Declared base path, or `""`
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn declares_base_path(&self) -> bool {
        self.base_path.is_some()
    }

    /// Assign the base path. A repeat assignment overwrites under
    /// [`BasePathPolicy::Overwrite`] and fails under [`BasePathPolicy::Reject`].
    pub fn set_base_path(&mut self, path: impl Into<String>) -> Result<(), MetadataError> {
        let path = path.into();
        if let Some(previous) = &self.base_path {
            match self.policy {
                BasePathPolicy::Reject => {
                    return Err(MetadataError::BasePathRedefined {
                        class: self.class.name(),
                        previous: previous.clone(),
                        attempted: path,
                    });
                }
                BasePathPolicy::Overwrite => {
                    warn!(
                        class = %self.class,
                        previous = %previous,
                        base_path = %path,
                        "Controller base path assigned twice, keeping the last one"
                    );
                }
            }
        }
        self.base_path = Some(path);
        Ok(())
    }

    /// Class-level auth applied to routes that do not declare their own
    #[must_use]
    pub fn default_auth(&self) -> Option<&AuthStrategy> {
        self.default_auth.as_ref()
    }

    pub fn set_default_auth(&mut self, auth: impl Into<AuthStrategy>) {
        self.default_auth = Some(auth.into());
    }

    #[must_use]
    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: ClassId) -> Result<(), MetadataError> {
        match self.parent {
            Some(existing) if existing != parent => Err(MetadataError::MultipleParents {
                class: self.class.name(),
                existing: existing.name(),
                attempted: parent.name(),
            }),
            _ => {
                self.parent = Some(parent);
                Ok(())
            }
        }
    }

    /// Register `metadata` under `name`, returning whatever it replaced.
    pub fn add_method(
        &mut self,
        name: impl Into<String>,
        metadata: MethodMetadata,
    ) -> Option<MethodMetadata> {
        let name = name.into();
        let previous = self.methods.insert(name.clone(), metadata);
        if previous.is_some() {
            warn!(class = %self.class, method = %name, "Method metadata registered twice");
        }
        previous
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodMetadata> {
        self.methods.get(name)
    }

    pub(crate) fn method_entry(&mut self, name: &str) -> &mut MethodMetadata {
        self.methods.entry(name.to_string()).or_default()
    }

    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}
