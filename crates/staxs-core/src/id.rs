//! Stable identifiers for scene entities.
//!
//! Every store has its own namespace. Identifiers are plain strings on the
//! wire so snapshots written by older builds (`card-1`, `layer-1`, ...) keep
//! loading.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used for freshly generated ids.
            pub const PREFIX: &'static str = $prefix;

            /// Wrap an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh, unique identifier.
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

define_id!(
    /// Identifier of a note card.
    CardId,
    "card"
);
define_id!(
    /// Identifier of a card-to-card connection.
    ConnectionId,
    "conn"
);
define_id!(
    /// Identifier of a drawing layer.
    LayerId,
    "layer"
);
define_id!(
    /// Identifier of a drawn path.
    PathId,
    "path"
);
define_id!(
    /// Identifier of a text annotation.
    TextId,
    "text"
);
