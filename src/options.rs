//! Route configuration record.
//!
//! [`RouteOptions`] is the value type accumulated per method and snapshotted
//! into every route binding. The three slots the declaration surface knows
//! about (`auth`, `payload`, `validate`) are typed; everything else the host
//! understands rides along in the flattened `extra` map and is forwarded
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

/// Authentication requirement for a route
///
/// Mirrors the host's accepted shapes: `false` to disable auth, a strategy
/// name, or a full settings object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthStrategy {
    Enabled(bool),
    Named(String),
    Settings(AuthSettings),
}

impl AuthStrategy {
    #[must_use]
    pub fn disabled() -> Self {
        AuthStrategy::Enabled(false)
    }
}

impl From<bool> for AuthStrategy {
    fn from(enabled: bool) -> Self {
        AuthStrategy::Enabled(enabled)
    }
}

impl From<&str> for AuthStrategy {
    fn from(name: &str) -> Self {
        AuthStrategy::Named(name.to_string())
    }
}

impl From<String> for AuthStrategy {
    fn from(name: String) -> Self {
        AuthStrategy::Named(name)
    }
}

impl From<AuthSettings> for AuthStrategy {
    fn from(settings: AuthSettings) -> Self {
        AuthStrategy::Settings(settings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Required,
    Optional,
    Try,
}

/// Structured auth settings (`{strategies, mode, scope, ..}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strategies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AuthMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<String>>,
    /// Host-specific fields forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthSettings {
    #[must_use]
    pub fn strategies<I, S>(strategies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strategies: strategies.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn mode(mut self, mode: AuthMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = Some(scope.into_iter().map(Into::into).collect());
        self
    }
}

/// Payload handling options (`multipart`, `maxBytes`, `output`, ..)
///
/// Keys are forwarded to the host as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PayloadOptions(Map<String, Value>);

impl PayloadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `{multipart: true}`
    #[must_use]
    pub fn multipart() -> Self {
        Self::new().with("multipart", true)
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Shorthand for `maxBytes`
    #[must_use]
    pub fn max_bytes(self, limit: u64) -> Self {
        self.with("maxBytes", limit)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn get_max_bytes(&self) -> Option<u64> {
        self.0.get("maxBytes").and_then(Value::as_u64)
    }

    /// `multipart` is either `true` or a settings object
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        match self.0.get("multipart") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Object(_)) => true,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Top-level keys of `other` replace ours.
    pub fn merge(&mut self, other: PayloadOptions) {
        self.0.extend(other.0);
    }

    pub(crate) fn merge_deep(&mut self, other: PayloadOptions) {
        merge_maps(&mut self.0, other.0);
    }
}

impl From<Map<String, Value>> for PayloadOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Request validation rules (`headers`, `params`, `query`, `payload`, ..)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidateOptions(Map<String, Value>);

impl ValidateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Top-level keys of `fragment` replace ours.
    pub fn merge(&mut self, fragment: ValidateOptions) {
        self.0.extend(fragment.0);
    }

    pub(crate) fn merge_deep(&mut self, other: ValidateOptions) {
        merge_maps(&mut self.0, other.0);
    }
}

impl From<Map<String, Value>> for ValidateOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Route configuration handed to the host alongside method, path and handler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PayloadOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<ValidateOptions>,
    /// Host passthrough fields (`description`, `tags`, `cors`, ..)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_auth(mut self, auth: impl Into<AuthStrategy>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: PayloadOptions) -> Self {
        self.payload = Some(payload);
        self
    }

    #[must_use]
    pub fn with_validate(mut self, validate: ValidateOptions) -> Self {
        self.validate = Some(validate);
        self
    }

    /// Passthrough field; `auth`, `payload` and `validate` land in their
    /// typed slot instead.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let (key, value) = (key.into(), value.into());
        if is_typed_key(&key) {
            self.merge_field(key, value);
        } else {
            self.extra.insert(key, value);
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auth.is_none()
            && self.payload.is_none()
            && self.validate.is_none()
            && self.extra.is_empty()
    }

    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.payload.as_ref().is_some_and(PayloadOptions::is_multipart)
    }

    /// Deep-merge `overrides` on top of `self`; `overrides` wins on conflicts.
    ///
    /// `auth` is replaced wholesale; `payload`, `validate` and `extra` merge
    /// key by key, recursing into nested objects.
    pub fn merge(&mut self, overrides: RouteOptions) {
        if let Some(auth) = overrides.auth {
            self.auth = Some(auth);
        }
        if let Some(payload) = overrides.payload {
            self.merge_payload(payload);
        }
        if let Some(validate) = overrides.validate {
            self.merge_validate(validate);
        }
        for (key, value) in overrides.extra {
            self.merge_field(key, value);
        }
    }

    /// Deep-merge one untyped field. Keys naming a typed slot are parsed
    /// into it; values of the wrong shape for that slot are dropped.
    pub fn merge_field(&mut self, key: String, value: Value) {
        match key.as_str() {
            "auth" => match serde_json::from_value::<AuthStrategy>(value) {
                Ok(auth) => self.auth = Some(auth),
                Err(err) => trace!(error = %err, "Ignoring malformed auth option"),
            },
            "payload" => match value {
                Value::String(s) if s == "multipart" => {
                    self.payload = Some(PayloadOptions::multipart());
                }
                Value::Object(map) => self.merge_payload(map.into()),
                other => trace!(payload = %other, "Ignoring malformed payload option"),
            },
            "validate" => match value {
                Value::Object(map) => self.merge_validate(map.into()),
                other => trace!(validate = %other, "Ignoring malformed validate option"),
            },
            _ => match self.extra.get_mut(&key) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    self.extra.insert(key, value);
                }
            },
        }
    }

    fn merge_payload(&mut self, payload: PayloadOptions) {
        match self.payload.as_mut() {
            Some(current) => current.merge_deep(payload),
            None => self.payload = Some(payload),
        }
    }

    fn merge_validate(&mut self, validate: ValidateOptions) {
        match self.validate.as_mut() {
            Some(current) => current.merge_deep(validate),
            None => self.validate = Some(validate),
        }
    }

    #[must_use]
    pub fn merged(mut self, overrides: RouteOptions) -> Self {
        self.merge(overrides);
        self
    }

    /// JSON shape the host receives
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Whether `key` names one of the typed slots of [`RouteOptions`]
pub(crate) fn is_typed_key(key: &str) -> bool {
    matches!(key, "auth" | "payload" | "validate")
}

fn merge_maps(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            Some(existing) => deep_merge(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

/// Objects merge recursively; any other value replaces the target.
pub(crate) fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => merge_maps(target, source),
        (target, source) => *target = source,
    }
}
