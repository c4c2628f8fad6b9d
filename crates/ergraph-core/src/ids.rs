//! Stable identities assigned to model entities at creation.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Identity of a [`Domain`](crate::Domain).
    DomainId
);
entity_id!(
    /// Identity of a [`DefaultValue`](crate::DefaultValue).
    DefaultValueId
);
entity_id!(
    /// Identity of a [`Table`](crate::Table).
    TableId
);
entity_id!(
    /// Identity of an [`Attribute`](crate::Attribute).
    AttributeId
);
entity_id!(
    /// Identity of an [`Index`](crate::Index).
    IndexId
);
entity_id!(
    /// Identity of a [`Relation`](crate::Relation).
    RelationId
);
