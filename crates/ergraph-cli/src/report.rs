//! Read-only JSON view of a reverse engineered model.

use serde::Serialize;

use ergraph_core::{CascadeType, IndexType, Model, Named, Table};
use ergraph_reverse::RunSummary;

#[derive(Debug, Serialize)]
pub struct ModelReport {
    pub dialect: String,
    pub summary: Option<SummaryReport>,
    pub domains: Vec<DomainReport>,
    pub default_values: Vec<DefaultValueReport>,
    pub tables: Vec<TableReport>,
    pub relations: Vec<RelationReport>,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub scopes: usize,
    pub tables_loaded: usize,
    pub tables_skipped: usize,
    pub relations: usize,
    pub indexes_skipped: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DomainReport {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Serialize)]
pub struct DefaultValueReport {
    pub name: String,
    pub expression: String,
}

#[derive(Debug, Serialize)]
pub struct TableReport {
    pub name: String,
    pub scope: Option<String>,
    pub remarks: Option<String>,
    pub attributes: Vec<AttributeReport>,
    pub indexes: Vec<IndexReport>,
}

#[derive(Debug, Serialize)]
pub struct AttributeReport {
    pub name: String,
    pub domain: String,
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub default_value: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexReport {
    pub name: String,
    pub index_type: IndexType,
    pub attributes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RelationReport {
    pub name: String,
    pub exporting_table: String,
    pub importing_table: String,
    pub on_update: CascadeType,
    pub on_delete: CascadeType,
    pub mapping: Vec<(String, String)>,
}

impl ModelReport {
    pub fn new(model: &Model, summary: Option<&RunSummary>) -> Self {
        Self {
            dialect: model.dialect().name().to_string(),
            summary: summary.map(|summary| SummaryReport {
                scopes: summary.scopes,
                tables_loaded: summary.tables_loaded,
                tables_skipped: summary.tables_skipped,
                relations: summary.relations,
                indexes_skipped: summary.indexes_skipped.clone(),
            }),
            domains: model
                .domains()
                .iter()
                .map(|domain| DomainReport {
                    name: domain.name().to_string(),
                    data_type: domain.data_type().to_string(),
                })
                .collect(),
            default_values: model
                .default_values()
                .iter()
                .map(|value| DefaultValueReport {
                    name: value.name().to_string(),
                    expression: value.expression().to_string(),
                })
                .collect(),
            tables: model
                .tables()
                .iter()
                .map(|table| table_report(model, table))
                .collect(),
            relations: model
                .relations()
                .iter()
                .map(|relation| {
                    let exporting = model.table(relation.exporting_table());
                    let importing = model.table(relation.importing_table());
                    RelationReport {
                        name: relation.name().to_string(),
                        exporting_table: table_name(exporting),
                        importing_table: table_name(importing),
                        on_update: relation.on_update(),
                        on_delete: relation.on_delete(),
                        mapping: relation
                            .mapping()
                            .iter()
                            .map(|(exported, imported)| {
                                (
                                    attribute_name(exporting, *exported),
                                    attribute_name(importing, *imported),
                                )
                            })
                            .collect(),
                    }
                })
                .collect(),
        }
    }
}

fn table_report(model: &Model, table: &Table) -> TableReport {
    TableReport {
        name: table.name().to_string(),
        scope: table.scope().map(ToString::to_string),
        remarks: table.remarks().map(str::to_string),
        attributes: table
            .attributes()
            .iter()
            .map(|attribute| {
                let domain = model.domain(attribute.domain());
                AttributeReport {
                    name: attribute.name().to_string(),
                    domain: domain.map(|d| d.name().to_string()).unwrap_or_default(),
                    data_type: domain.map(|d| d.data_type().to_string()).unwrap_or_default(),
                    nullable: attribute.is_nullable(),
                    primary_key: attribute.is_primary_key(),
                    default_value: attribute
                        .default_value()
                        .and_then(|id| model.default_value(id))
                        .map(|value| value.expression().to_string()),
                    remarks: attribute.remarks().map(str::to_string),
                }
            })
            .collect(),
        indexes: table
            .indexes()
            .iter()
            .map(|index| IndexReport {
                name: index.name().to_string(),
                index_type: index.index_type(),
                attributes: index
                    .attributes()
                    .iter()
                    .map(|id| attribute_name(Some(table), *id))
                    .collect(),
            })
            .collect(),
    }
}

fn table_name(table: Option<&Table>) -> String {
    table.map(|table| table.name().to_string()).unwrap_or_default()
}

fn attribute_name(table: Option<&Table>, id: ergraph_core::AttributeId) -> String {
    table
        .and_then(|table| table.attribute(id))
        .map(|attribute| attribute.name().to_string())
        .unwrap_or_default()
}
