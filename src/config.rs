//! # Configuration Module
//!
//! Runtime knobs for metadata declaration and route resolution.
//!
//! ## Environment Variables
//!
//! ### `CONTROLLER_ROUTES_TRACE`
//!
//! Emit one `DEBUG` line per resolved route (method, path, multipart flag).
//! Accepts `true`/`false`/`1`/`0`. Default: `true`.
//!
//! ### `CONTROLLER_ROUTES_BASE_PATH_POLICY`
//!
//! What happens when a controller assigns its base path twice:
//! - `overwrite`: last write wins, a warning is logged (default)
//! - `reject`: declaration fails with [`MetadataError::BasePathRedefined`](crate::MetadataError::BasePathRedefined)
//!
//! ## Files
//!
//! [`RoutesConfig::load`] reads the same settings from YAML or JSON:
//!
//! ```yaml
//! trace_routes: false
//! base_path_policy: reject
//! ```

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// How a repeated base-path assignment on one controller is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasePathPolicy {
    /// Last write wins; the overwrite is logged at `WARN`.
    #[default]
    Overwrite,
    /// The second assignment fails.
    Reject,
}

impl BasePathPolicy {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "reject" | "strict" => BasePathPolicy::Reject,
            _ => BasePathPolicy::Overwrite,
        }
    }
}

/// Settings shared by the registry and the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Emit a diagnostic line for every resolved route
    pub trace_routes: bool,
    /// Handling of repeated base-path assignments
    pub base_path_policy: BasePathPolicy,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            trace_routes: true,
            base_path_policy: BasePathPolicy::Overwrite,
        }
    }
}

static GLOBAL: Lazy<RoutesConfig> = Lazy::new(RoutesConfig::from_env);

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl RoutesConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            trace_routes: env::var("CONTROLLER_ROUTES_TRACE")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.trace_routes),
            base_path_policy: env::var("CONTROLLER_ROUTES_BASE_PATH_POLICY")
                .map(|v| BasePathPolicy::parse(&v))
                .unwrap_or(defaults.base_path_policy),
        }
    }

    /// Process-wide configuration, read from the environment on first use.
    ///
    /// Controllers mounted through [`ControllerHandle::new`](crate::ControllerHandle::new)
    /// are declared with these settings.
    pub fn global() -> &'static RoutesConfig {
        &GLOBAL
    }

    /// Load configuration from a YAML (`.yaml`/`.yml`) or JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read routes config {}", path.display()))?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml_str(&content)
                .with_context(|| format!("invalid routes config {}", path.display()))
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("invalid routes config {}", path.display()))
        }
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parse() {
        assert_eq!(BasePathPolicy::parse("reject"), BasePathPolicy::Reject);
        assert_eq!(BasePathPolicy::parse(" Strict "), BasePathPolicy::Reject);
        assert_eq!(BasePathPolicy::parse("overwrite"), BasePathPolicy::Overwrite);
        assert_eq!(BasePathPolicy::parse("bogus"), BasePathPolicy::Overwrite);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_yaml_defaults_missing_fields() {
        let config = RoutesConfig::from_yaml_str("base_path_policy: reject\n").unwrap();
        assert!(config.trace_routes);
        assert_eq!(config.base_path_policy, BasePathPolicy::Reject);
    }
}
