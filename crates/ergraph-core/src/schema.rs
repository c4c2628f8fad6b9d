use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collection::{CaseRule, EntityKind, Named, NamedCollection};
use crate::constraints::{Index, IndexType};
use crate::error::{Error, Result};
use crate::ids::{AttributeId, DefaultValueId, DomainId, IndexId, TableId};

/// Property key holding the database remarks of a table or column.
pub const PROPERTY_REMARKS: &str = "remarks";

/// Free-form properties attached to tables and attributes.
pub type Properties = BTreeMap<String, String>;

/// Catalog/schema pair bounding one metadata enumeration pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaEntry {
    #[serde(default)]
    pub catalog: Option<String>,
    pub schema: String,
}

impl SchemaEntry {
    pub fn new(catalog: Option<String>, schema: impl Into<String>) -> Self {
        Self {
            catalog,
            schema: schema.into(),
        }
    }

    /// Parse `catalog.schema` or a bare `schema`.
    pub fn parse(value: &str) -> Self {
        match value.split_once('.') {
            Some((catalog, schema)) => Self::new(Some(catalog.to_string()), schema),
            None => Self::new(None, value),
        }
    }
}

impl fmt::Display for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.catalog {
            Some(catalog) => write!(f, "{catalog}.{}", self.schema),
            None => f.write_str(&self.schema),
        }
    }
}

/// Where a table was read from. Metadata queries use the raw source name,
/// which may differ from the dialect-cased model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    pub scope: Option<SchemaEntry>,
    pub name: String,
}

/// A table of the reconstructed model.
#[derive(Debug, Clone)]
pub struct Table {
    id: TableId,
    name: String,
    source: Option<TableSource>,
    attributes: NamedCollection<Attribute>,
    indexes: NamedCollection<Index>,
    properties: Properties,
}

impl Table {
    pub fn new(name: impl Into<String>, rule: CaseRule) -> Self {
        Self {
            id: TableId::new(),
            name: name.into(),
            source: None,
            attributes: NamedCollection::new(rule),
            indexes: NamedCollection::new(rule),
            properties: Properties::new(),
        }
    }

    pub fn with_source(mut self, source: TableSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn source(&self) -> Option<&TableSource> {
        self.source.as_ref()
    }

    /// Scope the table was loaded from, if any.
    pub fn scope(&self) -> Option<&SchemaEntry> {
        self.source.as_ref().and_then(|source| source.scope.as_ref())
    }

    /// Name to use when querying the metadata source for this table.
    pub fn source_name(&self) -> &str {
        self.source
            .as_ref()
            .map(|source| source.name.as_str())
            .unwrap_or(&self.name)
    }

    pub fn attributes(&self) -> &NamedCollection<Attribute> {
        &self.attributes
    }

    pub fn indexes(&self) -> &NamedCollection<Index> {
        &self.indexes
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    pub fn remarks(&self) -> Option<&str> {
        self.properties.get(PROPERTY_REMARKS).map(String::as_str)
    }

    /// Store remarks unless they are empty.
    pub fn set_remarks(&mut self, remarks: Option<&str>) {
        set_remarks(&mut self.properties, remarks);
    }

    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.attributes.find_by_id(id)
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.find_by_name(name)
    }

    pub fn add_attribute(&mut self, attribute: Attribute) -> Result<AttributeId> {
        self.attributes.add(attribute)
    }

    pub fn set_primary_key(&mut self, id: AttributeId, primary_key: bool) -> Result<()> {
        let table = self.name.clone();
        let attribute = self.attributes.find_by_id_mut(id).ok_or_else(|| {
            Error::integrity(format!("attribute {id} does not belong to table {table}"))
        })?;
        attribute.primary_key = primary_key;
        Ok(())
    }

    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes
            .iter()
            .find(|index| index.index_type() == IndexType::PrimaryKey)
    }

    /// Attach an index. Its attributes must belong to this table, and only one
    /// primary key index is allowed.
    pub fn add_index(&mut self, index: Index) -> Result<IndexId> {
        if index.index_type() == IndexType::PrimaryKey && self.primary_key().is_some() {
            return Err(Error::PrimaryKeyExists(self.name.clone()));
        }
        for attribute in index.attributes() {
            self.ensure_attribute(*attribute)?;
        }
        self.indexes.add(index)
    }

    pub fn add_index_attribute(&mut self, index: IndexId, attribute: AttributeId) -> Result<()> {
        self.ensure_attribute(attribute)?;
        let table = self.name.clone();
        let target = self.indexes.find_by_id_mut(index).ok_or_else(|| {
            Error::integrity(format!("index {index} does not belong to table {table}"))
        })?;
        target.add_attribute(attribute);
        Ok(())
    }

    fn ensure_attribute(&self, id: AttributeId) -> Result<()> {
        if self.attributes.contains_id(id) {
            Ok(())
        } else {
            Err(Error::integrity(format!(
                "attribute {id} does not belong to table {}",
                self.name
            )))
        }
    }
}

impl Named for Table {
    type Id = TableId;

    const KIND: EntityKind = EntityKind::Table;

    fn id(&self) -> TableId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A column of a table, typed by a domain.
#[derive(Debug, Clone)]
pub struct Attribute {
    id: AttributeId,
    name: String,
    domain: DomainId,
    nullable: bool,
    primary_key: bool,
    default_value: Option<DefaultValueId>,
    properties: Properties,
}

impl Attribute {
    pub fn new(name: impl Into<String>, domain: DomainId) -> Self {
        Self {
            id: AttributeId::new(),
            name: name.into(),
            domain,
            nullable: true,
            primary_key: false,
            default_value: None,
            properties: Properties::new(),
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default_value(mut self, default_value: Option<DefaultValueId>) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn with_remarks(mut self, remarks: Option<&str>) -> Self {
        set_remarks(&mut self.properties, remarks);
        self
    }

    pub fn domain(&self) -> DomainId {
        self.domain
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default_value(&self) -> Option<DefaultValueId> {
        self.default_value
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn remarks(&self) -> Option<&str> {
        self.properties.get(PROPERTY_REMARKS).map(String::as_str)
    }
}

impl Named for Attribute {
    type Id = AttributeId;

    const KIND: EntityKind = EntityKind::Attribute;

    fn id(&self) -> AttributeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn set_remarks(properties: &mut Properties, remarks: Option<&str>) {
    match remarks.filter(|value| !value.is_empty()) {
        Some(value) => {
            properties.insert(PROPERTY_REMARKS.to_string(), value.to_string());
        }
        None => {
            properties.remove(PROPERTY_REMARKS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_columns(names: &[&str]) -> (Table, Vec<AttributeId>) {
        let mut table = Table::new("ORDERS", CaseRule::Sensitive);
        let domain = DomainId::new();
        let ids = names
            .iter()
            .map(|name| table.add_attribute(Attribute::new(*name, domain)).unwrap())
            .collect();
        (table, ids)
    }

    #[test]
    fn parses_schema_entries() {
        assert_eq!(
            SchemaEntry::parse("shop.public"),
            SchemaEntry::new(Some("shop".to_string()), "public")
        );
        assert_eq!(SchemaEntry::parse("public").to_string(), "public");
    }

    #[test]
    fn empty_remarks_are_not_stored() {
        let mut table = Table::new("T", CaseRule::Sensitive);
        table.set_remarks(Some(""));
        assert!(table.remarks().is_none());
        table.set_remarks(Some("order header"));
        assert_eq!(table.remarks(), Some("order header"));
    }

    #[test]
    fn allows_a_single_primary_key_index() {
        let (mut table, ids) = table_with_columns(&["ID"]);
        let mut pk = Index::new("PK_ORDERS", IndexType::PrimaryKey);
        pk.add_attribute(ids[0]);
        table.add_index(pk).unwrap();

        let err = table
            .add_index(Index::new("PK_OTHER", IndexType::PrimaryKey))
            .unwrap_err();
        assert!(matches!(err, Error::PrimaryKeyExists(_)));
    }

    #[test]
    fn index_attributes_must_belong_to_the_table() {
        let (mut table, _) = table_with_columns(&["ID"]);
        let mut index = Index::new("IDX", IndexType::NonUnique);
        index.add_attribute(AttributeId::new());

        let err = table.add_index(index).unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity(_)));
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let (mut table, _) = table_with_columns(&["ID"]);
        let err = table
            .add_attribute(Attribute::new("ID", DomainId::new()))
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }
}
