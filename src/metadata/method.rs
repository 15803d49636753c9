use serde_json::Value;
use tracing::trace;

use crate::options::{AuthStrategy, PayloadOptions, RouteOptions, ValidateOptions};
use crate::verb::RouteVerb;

/// Payload declaration accepted by [`MethodMetadata::set_payload`]
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadSpec {
    /// The `multipart` marker: the slot becomes `{multipart: true}`
    Multipart,
    /// Options merged key by key into the slot
    Options(PayloadOptions),
}

impl PayloadSpec {
    /// Interpret a loosely-typed value: the string `"multipart"` or an
    /// object. Anything else is `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s == "multipart" => Some(PayloadSpec::Multipart),
            Value::Object(map) => Some(PayloadSpec::Options(map.clone().into())),
            _ => None,
        }
    }
}

impl From<PayloadOptions> for PayloadSpec {
    fn from(options: PayloadOptions) -> Self {
        PayloadSpec::Options(options)
    }
}

/// One recorded `(verb, relative path, configuration snapshot)` triple
#[derive(Debug, Clone, PartialEq)]
pub struct RouteBinding {
    verb: RouteVerb,
    relative_path: String,
    config: RouteOptions,
}

impl RouteBinding {
    #[must_use]
    pub fn verb(&self) -> &RouteVerb {
        &self.verb
    }

    #[must_use]
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Configuration captured when the binding was added
    #[must_use]
    pub fn config(&self) -> &RouteOptions {
        &self.config
    }
}

/// Per-method accumulator plus the bindings recorded against it
///
/// Declarations mutate the accumulator; every [`add_route`](Self::add_route)
/// copies the accumulator as it stands at that moment. The accumulator is
/// never reset, so later bindings see everything declared before them.
#[derive(Debug, Clone, Default)]
pub struct MethodMetadata {
    bindings: Vec<RouteBinding>,
    accumulator: RouteOptions,
}

impl MethodMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the auth slot.
    pub fn set_auth_strategy(&mut self, auth: impl Into<AuthStrategy>) -> &mut Self {
        self.accumulator.auth = Some(auth.into());
        self
    }

    /// Merge `fragment`'s keys into the validate slot; its keys win.
    pub fn set_validate_fragment(&mut self, fragment: ValidateOptions) -> &mut Self {
        match self.accumulator.validate.as_mut() {
            Some(validate) => validate.merge(fragment),
            None => self.accumulator.validate = Some(fragment),
        }
        self
    }

    /// `Multipart` replaces the payload slot; `Options` merge into it.
    pub fn set_payload(&mut self, payload: impl Into<PayloadSpec>) -> &mut Self {
        match payload.into() {
            PayloadSpec::Multipart => {
                self.accumulator.payload = Some(PayloadOptions::multipart());
            }
            PayloadSpec::Options(options) => match self.accumulator.payload.as_mut() {
                Some(payload) => payload.merge(options),
                None => self.accumulator.payload = Some(options),
            },
        }
        self
    }

    /// Like [`set_payload`](Self::set_payload) for untyped input; values
    /// that are neither `"multipart"` nor an object are ignored.
    pub fn set_payload_value(&mut self, value: &Value) -> &mut Self {
        match PayloadSpec::from_value(value) {
            Some(spec) => self.set_payload(spec),
            None => {
                trace!(payload = %value, "Ignoring malformed payload declaration");
                self
            }
        }
    }

    /// Set a host passthrough field on the accumulator.
    ///
    /// `auth`, `payload` and `validate` are routed to the matching setter so
    /// the typed slots stay the single source for those keys.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let (key, value) = (key.into(), value.into());
        match key.as_str() {
            "auth" => match serde_json::from_value::<AuthStrategy>(value) {
                Ok(auth) => self.set_auth_strategy(auth),
                Err(err) => {
                    trace!(error = %err, "Ignoring malformed auth option");
                    self
                }
            },
            "payload" => self.set_payload_value(&value),
            "validate" => match value {
                Value::Object(map) => self.set_validate_fragment(map.into()),
                other => {
                    trace!(validate = %other, "Ignoring malformed validate option");
                    self
                }
            },
            _ => {
                self.accumulator.extra.insert(key, value);
                self
            }
        }
    }

    /// Record a binding from a snapshot of the accumulator with `extra`
    /// deep-merged on top.
    pub fn add_route(
        &mut self,
        verb: RouteVerb,
        relative_path: impl Into<String>,
        extra: Option<RouteOptions>,
    ) -> &mut Self {
        let mut config = self.accumulator.clone();
        if let Some(extra) = extra {
            config.merge(extra);
        }
        self.bindings.push(RouteBinding {
            verb: verb.normalized(),
            relative_path: relative_path.into(),
            config,
        });
        self
    }

    /// Bindings in the order they were added
    #[must_use]
    pub fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }

    #[must_use]
    pub fn accumulated(&self) -> &RouteOptions {
        &self.accumulator
    }
}
