use serde::{Deserialize, Serialize};

use ergraph_core::SchemaEntry;

/// Options that control which scopes are reverse engineered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseEngineeringOptions {
    /// Scopes to enumerate, in order. Empty means every scope the connection
    /// reports.
    #[serde(default, rename = "schemas")]
    pub schema_entries: Vec<SchemaEntry>,
}

impl ReverseEngineeringOptions {
    pub fn with_schemas<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = SchemaEntry>,
    {
        Self {
            schema_entries: entries.into_iter().collect(),
        }
    }
}
