use serde::{Deserialize, Serialize};

use crate::collection::{EntityKind, Named};
use crate::ids::{AttributeId, IndexId, RelationId, TableId};

/// JDBC-style foreign key rule codes, as reported by most drivers.
pub mod rule_codes {
    pub const CASCADE: i32 = 0;
    pub const RESTRICT: i32 = 1;
    pub const SET_NULL: i32 = 2;
    pub const NO_ACTION: i32 = 3;
    pub const SET_DEFAULT: i32 = 4;
}

/// Kind of index on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    PrimaryKey,
    Unique,
    NonUnique,
}

impl IndexType {
    /// Map the driver's `non_unique` flag to an index type.
    pub fn from_non_unique(non_unique: bool) -> Self {
        if non_unique {
            IndexType::NonUnique
        } else {
            IndexType::Unique
        }
    }
}

/// Index definition preserving column order.
#[derive(Debug, Clone)]
pub struct Index {
    id: IndexId,
    name: String,
    index_type: IndexType,
    attributes: Vec<AttributeId>,
}

impl Index {
    pub fn new(name: impl Into<String>, index_type: IndexType) -> Self {
        Self {
            id: IndexId::new(),
            name: name.into(),
            index_type,
            attributes: Vec::new(),
        }
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn attributes(&self) -> &[AttributeId] {
        &self.attributes
    }

    pub fn add_attribute(&mut self, attribute: AttributeId) {
        self.attributes.push(attribute);
    }
}

impl Named for Index {
    type Id = IndexId;

    const KIND: EntityKind = EntityKind::Index;

    fn id(&self) -> IndexId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Propagation policy applied on update/delete of a referenced row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeType {
    #[default]
    Nothing,
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
}

impl CascadeType {
    /// Convert a JDBC-style rule code. Unknown codes and `NO ACTION` map to
    /// [`CascadeType::Nothing`].
    pub fn from_rule_code(code: i32) -> Self {
        match code {
            rule_codes::CASCADE => CascadeType::Cascade,
            rule_codes::RESTRICT => CascadeType::Restrict,
            rule_codes::SET_NULL => CascadeType::SetNull,
            rule_codes::SET_DEFAULT => CascadeType::SetDefault,
            _ => CascadeType::Nothing,
        }
    }
}

/// Foreign key relation between an exporting and an importing table.
#[derive(Debug, Clone)]
pub struct Relation {
    id: RelationId,
    name: String,
    exporting_table: TableId,
    importing_table: TableId,
    mapping: Vec<(AttributeId, AttributeId)>,
    on_update: CascadeType,
    on_delete: CascadeType,
}

impl Relation {
    pub fn new(
        name: impl Into<String>,
        exporting_table: TableId,
        importing_table: TableId,
    ) -> Self {
        Self {
            id: RelationId::new(),
            name: name.into(),
            exporting_table,
            importing_table,
            mapping: Vec::new(),
            on_update: CascadeType::Nothing,
            on_delete: CascadeType::Nothing,
        }
    }

    pub fn with_cascades(mut self, on_update: CascadeType, on_delete: CascadeType) -> Self {
        self.on_update = on_update;
        self.on_delete = on_delete;
        self
    }

    /// Table providing the referenced key.
    pub fn exporting_table(&self) -> TableId {
        self.exporting_table
    }

    /// Table holding the foreign key.
    pub fn importing_table(&self) -> TableId {
        self.importing_table
    }

    /// Ordered pairs of exporting attribute to importing attribute.
    pub fn mapping(&self) -> &[(AttributeId, AttributeId)] {
        &self.mapping
    }

    pub fn on_update(&self) -> CascadeType {
        self.on_update
    }

    pub fn on_delete(&self) -> CascadeType {
        self.on_delete
    }

    pub(crate) fn push_mapping(&mut self, exporting: AttributeId, importing: AttributeId) {
        self.mapping.push((exporting, importing));
    }
}

impl Named for Relation {
    type Id = RelationId;

    const KIND: EntityKind = EntityKind::Relation;

    fn id(&self) -> RelationId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_rule_codes() {
        assert_eq!(CascadeType::from_rule_code(0), CascadeType::Cascade);
        assert_eq!(CascadeType::from_rule_code(1), CascadeType::Restrict);
        assert_eq!(CascadeType::from_rule_code(2), CascadeType::SetNull);
        assert_eq!(CascadeType::from_rule_code(3), CascadeType::Nothing);
        assert_eq!(CascadeType::from_rule_code(4), CascadeType::SetDefault);
        assert_eq!(CascadeType::from_rule_code(42), CascadeType::Nothing);
    }

    #[test]
    fn non_unique_flag_is_inverted() {
        assert_eq!(IndexType::from_non_unique(false), IndexType::Unique);
        assert_eq!(IndexType::from_non_unique(true), IndexType::NonUnique);
    }
}
