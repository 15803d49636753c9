use std::fmt;

/// Error raised while declaring controller metadata
///
/// Declaration is the only phase that can fail; resolving an already
/// declared controller into route descriptors is total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A second base path was assigned under [`BasePathPolicy::Reject`](crate::BasePathPolicy::Reject)
    BasePathRedefined {
        /// Controller type name
        class: &'static str,
        /// Base path already in force
        previous: String,
        /// Base path that was rejected
        attempted: String,
    },
    /// A controller appeared twice in its own inheritance chain
    InheritanceCycle {
        /// Controller type that was reached a second time
        class: &'static str,
    },
    /// `extends` was called more than once for the same controller
    MultipleParents {
        /// Controller type being declared
        class: &'static str,
        /// Parent already registered
        existing: &'static str,
        /// Parent that was rejected
        attempted: &'static str,
    },
    /// The shared catalog held an entry of the wrong type for a controller
    CatalogMismatch {
        /// Controller type name
        class: &'static str,
    },
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::BasePathRedefined {
                class,
                previous,
                attempted,
            } => write!(
                f,
                "controller {class} already has base path '{previous}', refusing to replace it with '{attempted}'"
            ),
            MetadataError::InheritanceCycle { class } => {
                write!(f, "controller {class} appears twice in its inheritance chain")
            }
            MetadataError::MultipleParents {
                class,
                existing,
                attempted,
            } => write!(
                f,
                "controller {class} already extends {existing}, cannot also extend {attempted}"
            ),
            MetadataError::CatalogMismatch { class } => {
                write!(f, "controller catalog entry for {class} has an unexpected type")
            }
        }
    }
}

impl std::error::Error for MetadataError {}

/// A verb string that is neither `*` nor a valid HTTP method token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVerbError {
    /// Offending input
    pub verb: String,
}

impl fmt::Display for ParseVerbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid HTTP method", self.verb)
    }
}

impl std::error::Error for ParseVerbError {}
