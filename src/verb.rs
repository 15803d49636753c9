use http::Method;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseVerbError;

/// HTTP verb a route binding answers to
///
/// `Any` is the wildcard `*` and matches every request method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteVerb {
    Method(Method),
    Any,
}

impl RouteVerb {
    pub const GET: RouteVerb = RouteVerb::Method(Method::GET);
    pub const POST: RouteVerb = RouteVerb::Method(Method::POST);
    pub const PUT: RouteVerb = RouteVerb::Method(Method::PUT);
    pub const PATCH: RouteVerb = RouteVerb::Method(Method::PATCH);
    pub const DELETE: RouteVerb = RouteVerb::Method(Method::DELETE);
    pub const OPTIONS: RouteVerb = RouteVerb::Method(Method::OPTIONS);

    /// Parse a verb case-insensitively; `*` yields [`RouteVerb::Any`].
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == "*" {
            return Some(RouteVerb::Any);
        }
        Method::from_bytes(s.to_ascii_uppercase().as_bytes())
            .ok()
            .map(RouteVerb::Method)
    }

    /// Uppercase form of the verb; `http::Method` keeps extension tokens
    /// in the case they were written.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            RouteVerb::Method(m) if m.as_str().bytes().any(|b| b.is_ascii_lowercase()) => {
                match Method::from_bytes(m.as_str().to_ascii_uppercase().as_bytes()) {
                    Ok(upper) => RouteVerb::Method(upper),
                    Err(_) => RouteVerb::Method(m),
                }
            }
            verb => verb,
        }
    }

    /// Verb as written, or `*` for the wildcard
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RouteVerb::Method(m) => m.as_str(),
            RouteVerb::Any => "*",
        }
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, RouteVerb::Any)
    }
}

impl From<Method> for RouteVerb {
    fn from(method: Method) -> Self {
        RouteVerb::Method(method).normalized()
    }
}

impl fmt::Display for RouteVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteVerb {
    type Err = ParseVerbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouteVerb::parse(s).ok_or_else(|| ParseVerbError {
            verb: s.to_string(),
        })
    }
}

impl Serialize for RouteVerb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RouteVerb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RouteVerb::parse(&s).ok_or_else(|| serde::de::Error::custom("invalid route verb"))
    }
}
