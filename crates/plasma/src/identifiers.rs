//! Newtype domain identifiers.
//!
//! Every named concept in the property graph is represented as a distinct
//! newtype wrapping a primitive. A [`PropertyName`] is the only coupling between
//! nodes: a node declares the names it reads, and the context resolves them.
//!
//! [`PlasmaRunId`] correlates all spans and events emitted by one update pass.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Borrow<str>, Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        // Lets maps keyed by the identifier be queried with a plain `&str`.
        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Identifies a plasma property by the name it is published under in the
    /// context (e.g. `"levels"`, `"beta_rad"`, `"partition_function"`).
    ///
    /// Names are unique per graph. Externally supplied inputs (`"t_rad"`,
    /// `"w"`) share the same namespace as computed properties.
    PropertyName
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single update pass over the property graph.
///
/// Generated fresh for every call to the driver's `update`; recorded on the
/// pass span so that all node events from one pass can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlasmaRunId(Uuid);

impl PlasmaRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PlasmaRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
