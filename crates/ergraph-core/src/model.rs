use std::fmt;
use std::sync::Arc;

use crate::collection::{CaseRule, Named, NamedCollection};
use crate::constraints::Relation;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::ids::{AttributeId, DefaultValueId, DomainId, RelationId, TableId};
use crate::schema::Table;
use crate::types::{DefaultValue, Domain};

/// Root aggregate of a reconstructed entity-relationship model.
///
/// Every insertion goes through the model so that names are checked by the
/// dialect and cross references (by id) always resolve.
pub struct Model {
    dialect: Arc<dyn Dialect>,
    domains: NamedCollection<Domain>,
    default_values: NamedCollection<DefaultValue>,
    tables: NamedCollection<Table>,
    relations: NamedCollection<Relation>,
}

impl Model {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        let rule = dialect.case_rule();
        Self {
            dialect,
            domains: NamedCollection::new(rule),
            default_values: NamedCollection::new(rule),
            tables: NamedCollection::new(rule),
            relations: NamedCollection::new(rule),
        }
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    pub fn case_rule(&self) -> CaseRule {
        self.dialect.case_rule()
    }

    /// Create an empty table using the model's case rule.
    pub fn new_table(&self, name: impl Into<String>) -> Table {
        Table::new(name, self.case_rule())
    }

    pub fn domains(&self) -> &NamedCollection<Domain> {
        &self.domains
    }

    pub fn default_values(&self) -> &NamedCollection<DefaultValue> {
        &self.default_values
    }

    pub fn tables(&self) -> &NamedCollection<Table> {
        &self.tables
    }

    pub fn relations(&self) -> &NamedCollection<Relation> {
        &self.relations
    }

    pub fn domain(&self, id: DomainId) -> Option<&Domain> {
        self.domains.find_by_id(id)
    }

    /// First domain (in insertion order) rendering to `data_type`.
    pub fn domain_by_data_type(&self, data_type: &str) -> Option<&Domain> {
        self.domains
            .iter()
            .find(|domain| domain.data_type() == data_type)
    }

    pub fn default_value(&self, id: DefaultValueId) -> Option<&DefaultValue> {
        self.default_values.find_by_id(id)
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.find_by_id(id)
    }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables.find_by_name(name)
    }

    pub fn relation(&self, id: RelationId) -> Option<&Relation> {
        self.relations.find_by_id(id)
    }

    pub fn add_domain(&mut self, domain: Domain) -> Result<DomainId> {
        self.dialect.check_name(domain.name())?;
        self.domains.add(domain)
    }

    /// Remove a domain no attribute refers to.
    pub fn remove_domain(&mut self, id: DomainId) -> Result<Domain> {
        let in_use = self
            .tables
            .iter()
            .flat_map(|table| table.attributes().iter())
            .any(|attribute| attribute.domain() == id);
        if in_use {
            return Err(Error::integrity(format!("domain {id} is still in use")));
        }
        self.domains
            .remove(id)
            .ok_or_else(|| Error::integrity(format!("domain {id} not found in model")))
    }

    pub fn add_default_value(&mut self, default_value: DefaultValue) -> Result<DefaultValueId> {
        self.dialect.check_name(default_value.name())?;
        self.default_values.add(default_value)
    }

    /// Insert a completed table. Domains and default values of its attributes
    /// must already be part of the model.
    pub fn add_table(&mut self, table: Table) -> Result<TableId> {
        self.dialect.check_name(table.name())?;
        for attribute in table.attributes() {
            self.dialect.check_name(attribute.name())?;
            if !self.domains.contains_id(attribute.domain()) {
                return Err(Error::integrity(format!(
                    "domain of attribute {}.{} not found in model",
                    table.name(),
                    attribute.name()
                )));
            }
            if let Some(default_value) = attribute.default_value() {
                if !self.default_values.contains_id(default_value) {
                    return Err(Error::integrity(format!(
                        "default value of attribute {}.{} not found in model",
                        table.name(),
                        attribute.name()
                    )));
                }
            }
        }
        self.tables.add(table)
    }

    /// Insert a relation between two tables already in the model.
    pub fn add_relation(&mut self, relation: Relation) -> Result<RelationId> {
        self.dialect.check_name(relation.name())?;
        let exporting = self.require_table(relation.exporting_table())?;
        let importing = self.require_table(relation.importing_table())?;
        for (exported, imported) in relation.mapping() {
            ensure_member(exporting, *exported)?;
            ensure_member(importing, *imported)?;
        }
        self.relations.add(relation)
    }

    /// Append an exporting → importing attribute pair to a relation.
    pub fn add_relation_mapping(
        &mut self,
        relation: RelationId,
        exporting: AttributeId,
        importing: AttributeId,
    ) -> Result<()> {
        let target = self
            .relations
            .find_by_id(relation)
            .ok_or_else(|| Error::integrity(format!("relation {relation} not found in model")))?;
        ensure_member(self.require_table(target.exporting_table())?, exporting)?;
        ensure_member(self.require_table(target.importing_table())?, importing)?;

        if let Some(target) = self.relations.find_by_id_mut(relation) {
            target.push_mapping(exporting, importing);
        }
        Ok(())
    }

    fn require_table(&self, id: TableId) -> Result<&Table> {
        self.tables
            .find_by_id(id)
            .ok_or_else(|| Error::integrity(format!("table {id} not found in model")))
    }
}

fn ensure_member(table: &Table, attribute: AttributeId) -> Result<()> {
    if table.attribute(attribute).is_some() {
        Ok(())
    } else {
        Err(Error::integrity(format!(
            "attribute {attribute} does not belong to table {}",
            table.name()
        )))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("dialect", &self.dialect.name())
            .field("domains", &self.domains.len())
            .field("default_values", &self.default_values.len())
            .field("tables", &self.tables.len())
            .field("relations", &self.relations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::CascadeType;
    use crate::dialect::GenericDialect;
    use crate::schema::Attribute;

    fn model() -> Model {
        Model::new(Arc::new(GenericDialect::standard()))
    }

    fn add_table(model: &mut Model, name: &str, columns: &[&str]) -> TableId {
        let domain = model.add_domain(Domain::new(format!("D_{name}"), "INTEGER")).unwrap();
        let mut table = model.new_table(name);
        for column in columns {
            table.add_attribute(Attribute::new(*column, domain)).unwrap();
        }
        model.add_table(table).unwrap()
    }

    #[test]
    fn table_names_follow_dialect_case_rule() {
        let mut model = model();
        add_table(&mut model, "ORDERS", &["ID"]);
        assert!(model.tables().exists("orders"));

        let err = model.add_table(model.new_table("Orders")).unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn rejects_tables_with_foreign_domains() {
        let mut model = model();
        let mut table = model.new_table("T");
        table.add_attribute(Attribute::new("C", DomainId::new())).unwrap();

        let err = model.add_table(table).unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity(_)));
    }

    #[test]
    fn relation_mapping_must_match_tables() {
        let mut model = model();
        let customers = add_table(&mut model, "CUSTOMERS", &["ID"]);
        let orders = add_table(&mut model, "ORDERS", &["CUSTOMER_ID"]);
        let relation = model
            .add_relation(
                Relation::new("FK_CUST", customers, orders)
                    .with_cascades(CascadeType::Nothing, CascadeType::Cascade),
            )
            .unwrap();

        let customer_id = model.table(customers).unwrap().attribute_by_name("ID").unwrap().id();
        let order_fk = model
            .table(orders)
            .unwrap()
            .attribute_by_name("CUSTOMER_ID")
            .unwrap()
            .id();

        let err = model
            .add_relation_mapping(relation, order_fk, customer_id)
            .unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity(_)));

        model
            .add_relation_mapping(relation, customer_id, order_fk)
            .unwrap();
        assert_eq!(
            model.relation(relation).unwrap().mapping(),
            &[(customer_id, order_fk)]
        );
    }

    #[test]
    fn relations_require_loaded_tables() {
        let mut model = model();
        let orders = add_table(&mut model, "ORDERS", &["ID"]);

        let err = model
            .add_relation(Relation::new("FK", TableId::new(), orders))
            .unwrap_err();
        assert!(matches!(err, Error::ReferentialIntegrity(_)));
    }

    #[test]
    fn domains_in_use_cannot_be_removed() {
        let mut model = model();
        add_table(&mut model, "ORDERS", &["ID"]);
        let used = model.domains().find_by_name("D_ORDERS").unwrap().id();
        assert!(model.remove_domain(used).is_err());

        let unused = model.add_domain(Domain::new("SPARE", "DATE")).unwrap();
        assert_eq!(model.remove_domain(unused).unwrap().name(), "SPARE");
    }

    #[test]
    fn dialect_rejects_empty_names() {
        let mut model = model();
        let err = model.add_domain(Domain::new("  ", "DATE")).unwrap_err();
        assert!(matches!(err, Error::InvalidName { .. }));
    }
}
