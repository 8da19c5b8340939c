//! Literal-or-predicate expectations.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// A shareable check evaluated against an observed value.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// An expected value: either a literal compared for equality, or a predicate
/// invoked with the observed value.
#[derive(Clone)]
pub enum Expect<T> {
    /// Exact value.
    Literal(T),
    /// Function-valued expectation.
    Predicate {
        /// Human-readable description shown in reports.
        label: Option<String>,
        /// The check itself.
        check: Predicate<T>,
    },
}

impl<T> Expect<T> {
    /// Creates an unlabelled predicate expectation.
    pub fn predicate(check: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate {
            label: None,
            check: Arc::new(check),
        }
    }

    /// Creates a predicate expectation with a label for reports.
    pub fn labelled(
        label: impl Into<String>,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Predicate {
            label: Some(label.into()),
            check: Arc::new(check),
        }
    }

    /// Checks `actual`, comparing literals with `eq`.
    pub fn matches_with(&self, actual: &T, eq: impl FnOnce(&T, &T) -> bool) -> bool {
        match self {
            Self::Literal(expected) => eq(expected, actual),
            Self::Predicate { check, .. } => check(actual),
        }
    }
}

impl<T: PartialEq> Expect<T> {
    /// Checks `actual` against this expectation.
    pub fn matches(&self, actual: &T) -> bool {
        self.matches_with(actual, |expected, actual| expected == actual)
    }
}

impl<T: fmt::Debug> fmt::Debug for Expect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Predicate { label, .. } => f
                .debug_struct("Predicate")
                .field("label", label)
                .finish_non_exhaustive(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Expect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Predicate { label: Some(label), .. } => write!(f, "<predicate: {label}>"),
            Self::Predicate { label: None, .. } => f.write_str("<predicate>"),
        }
    }
}

impl<T: Serialize> Serialize for Expect<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(value) => value.serialize(serializer),
            Self::Predicate { label: Some(label), .. } => {
                serializer.serialize_str(&format!("<predicate: {label}>"))
            }
            Self::Predicate { label: None, .. } => serializer.serialize_str("<predicate>"),
        }
    }
}

impl From<u16> for Expect<u16> {
    fn from(value: u16) -> Self {
        Self::Literal(value)
    }
}

impl From<String> for Expect<String> {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<&str> for Expect<String> {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}
