//! Store module namespaces.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default namespace the route-data module registers under.
pub const DEFAULT_NAMESPACE: &str = "fetch-route";

/// Path of a module inside the application store.
///
/// Accepts either a slash-joined string (`"app/fetch-route"`) or a list of
/// segments (`["app", "fetch-route"]`). Empty segments are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "NamespaceRepr", into = "String")]
pub struct Namespace(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum NamespaceRepr {
    Path(String),
    Segments(Vec<String>),
}

impl From<NamespaceRepr> for Namespace {
    fn from(repr: NamespaceRepr) -> Self {
        match repr {
            NamespaceRepr::Path(path) => Self::parse(&path),
            NamespaceRepr::Segments(segments) => Self::from_segments(segments),
        }
    }
}

impl Namespace {
    /// Parse a slash-joined namespace path.
    pub fn parse(path: &str) -> Self {
        Self::from_segments(path.split('/'))
    }

    /// Build a namespace from individual segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            segments
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        )
    }

    /// The namespace segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Slash-joined path.
    pub fn as_path(&self) -> String {
        self.0.join("/")
    }

    /// Qualify an action name with this namespace (`"ns/action"`).
    pub fn qualify(&self, action: &str) -> String {
        if self.0.is_empty() {
            action.to_string()
        } else {
            format!("{}/{}", self.as_path(), action)
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::parse(DEFAULT_NAMESPACE)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.as_path()
    }
}

impl From<&str> for Namespace {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}
