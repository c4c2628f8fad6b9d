//! Relation pass: turns imported foreign keys into model relations.

use ergraph_core::{
    AttributeId, CascadeType, Error, Model, Named, Relation, RelationId, Result, SchemaEntry,
    TableId,
};

use crate::context::Context;
use crate::notifier::ProgressEvent;
use crate::source::RawImportedKey;

struct TableRef {
    id: TableId,
    name: String,
    scope: Option<SchemaEntry>,
    source_name: String,
}

/// Build relations for every table of the model, in insertion order.
///
/// Every exporting table must already be part of the model. Returns the
/// number of relations created.
pub async fn build_relations(ctx: &Context<'_>, model: &mut Model) -> Result<usize> {
    let tables: Vec<TableRef> = model
        .tables()
        .iter()
        .map(|table| TableRef {
            id: table.id(),
            name: table.name().to_string(),
            scope: table.scope().cloned(),
            source_name: table.source_name().to_string(),
        })
        .collect();

    let mut created = 0;
    for table in &tables {
        ctx.notifier.notify(ProgressEvent::EngineeringRelation, &table.name);
        let rows = ctx
            .source
            .imported_keys(table.scope.as_ref(), &table.source_name)
            .await?;
        created += apply_imported_keys(model, table.id, &rows)?;
    }

    tracing::debug!(event = "relations_finished", relations = created);
    Ok(created)
}

/// Apply the imported-key rows of one table. Rows of the same key are
/// consecutive.
pub(crate) fn apply_imported_keys(
    model: &mut Model,
    importing: TableId,
    rows: &[RawImportedKey],
) -> Result<usize> {
    let dialect = model.dialect().clone();
    let mut current: Option<(String, RelationId, TableId)> = None;
    let mut created = 0;

    for row in rows {
        let fk_name = dialect.cast(&row.fk_name);
        let same_key = current
            .as_ref()
            .is_some_and(|(name, _, _)| *name == fk_name);

        if !same_key {
            let pk_table = dialect.cast(&row.pk_table);
            let exporting = model
                .table_by_name(&pk_table)
                .map(|table| table.id())
                .ok_or_else(|| {
                    Error::integrity(format!(
                        "cannot find exporting table {pk_table} of relation {fk_name}"
                    ))
                })?;

            let on_update = row
                .update_rule
                .map_or(CascadeType::Nothing, |code| dialect.cascade_type(code));
            let on_delete = row
                .delete_rule
                .map_or(CascadeType::Nothing, |code| dialect.cascade_type(code));

            let relation = Relation::new(fk_name.clone(), exporting, importing)
                .with_cascades(on_update, on_delete);
            let relation_id = model.add_relation(relation)?;
            created += 1;
            current = Some((fk_name, relation_id, exporting));
        }

        if let Some((_, relation_id, exporting)) = current.as_ref() {
            let exported = column(model, *exporting, &row.pk_column)?;
            let imported = column(model, importing, &row.fk_column)?;
            model.add_relation_mapping(*relation_id, exported, imported)?;
        }
    }

    Ok(created)
}

fn column(model: &Model, table: TableId, column: &str) -> Result<AttributeId> {
    let table = model
        .table(table)
        .ok_or_else(|| Error::integrity(format!("table {table} not found in model")))?;
    let name = model.dialect().cast(column);
    table
        .attribute_by_name(&name)
        .map(|attribute| attribute.id())
        .ok_or_else(|| {
            Error::integrity(format!(
                "cannot find attribute {column} in table {}",
                table.name()
            ))
        })
}
