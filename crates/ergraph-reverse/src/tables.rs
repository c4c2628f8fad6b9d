//! Per-table pass: columns, primary key, then secondary indexes.

use ergraph_core::{
    Attribute, AttributeId, DefaultValue, DefaultValueId, Error, Index, IndexType, Model, Named,
    Result, SchemaEntry, Table, TableId, TableSource,
};

use crate::context::Context;
use crate::domains::{MAX_NAME_PROBES, candidate_names, resolve_domain};
use crate::notifier::ProgressEvent;
use crate::source::{RawColumn, RawIndexColumn, RawPrimaryKeyColumn};

/// Result of the secondary index step of a table pass.
#[derive(Debug)]
pub enum IndexOutcome {
    /// All index metadata was applied; holds the number of indexes created.
    Complete(usize),
    /// Index metadata could not be applied; the table carries no secondary
    /// indexes.
    Skipped(Error),
}

/// Result of a table pass.
#[derive(Debug)]
pub enum TableOutcome {
    /// The model already holds a table of that name; nothing was queried.
    AlreadyPresent,
    /// The source reported no table of that name.
    Missing,
    Loaded { table: TableId, indexes: IndexOutcome },
}

/// Reverse engineer one table of `scope` into `model`.
///
/// Running it again for the same name is a no-op.
pub async fn reverse_engineer_table(
    ctx: &Context<'_>,
    model: &mut Model,
    scope: Option<&SchemaEntry>,
    table_name: &str,
) -> Result<TableOutcome> {
    let dialect = model.dialect().clone();
    let model_name = dialect.cast(table_name);
    if model.tables().exists(&model_name) {
        return Ok(TableOutcome::AlreadyPresent);
    }

    ctx.notifier.notify(ProgressEvent::EngineeringTable, table_name);

    let rows = ctx
        .source
        .tables(scope, Some(table_name), &dialect.table_types())
        .await?;
    let Some(raw_table) = rows.into_iter().next() else {
        return Ok(TableOutcome::Missing);
    };

    let mut table = model.new_table(model_name).with_source(TableSource {
        scope: scope.cloned(),
        name: table_name.to_string(),
    });
    table.set_remarks(raw_table.remarks.as_deref());

    let columns = ctx.source.columns(scope, table_name).await?;
    for column in &columns {
        add_column(model, &mut table, column)?;
    }

    let primary_key = ctx.source.primary_keys(scope, table_name).await?;
    apply_primary_key(model, &mut table, &primary_key)?;

    let indexes = match load_indexes(ctx, model, &mut table, scope, table_name).await {
        Ok(count) => IndexOutcome::Complete(count),
        Err(err) => {
            tracing::warn!(
                event = "indexes_skipped",
                table = %table.name(),
                error = %err
            );
            IndexOutcome::Skipped(err)
        }
    };

    let table_id = model.add_table(table)?;
    tracing::debug!(event = "table_loaded", table = %table_name, columns = columns.len());

    Ok(TableOutcome::Loaded {
        table: table_id,
        indexes,
    })
}

fn add_column(model: &mut Model, table: &mut Table, column: &RawColumn) -> Result<()> {
    let dialect = model.dialect().clone();
    let name = dialect.cast(&column.name);

    let domain = resolve_domain(
        model,
        &name,
        &column.type_name,
        column.size.as_deref(),
        column.decimal_digits.as_deref(),
    )?;

    let default_value = match dialect.create_default_value(&name, column.default.as_deref()) {
        Some(expression) => Some(default_value_for(model, &name, expression)?),
        None => None,
    };

    let attribute = Attribute::new(name, domain)
        .with_nullable(column.nullable)
        .with_default_value(default_value)
        .with_remarks(column.remarks.as_deref());
    table.add_attribute(attribute)?;
    Ok(())
}

/// Share default values by expression; name new ones after the column.
fn default_value_for(
    model: &mut Model,
    column: &str,
    expression: String,
) -> Result<DefaultValueId> {
    if let Some(existing) = model
        .default_values()
        .iter()
        .find(|value| value.expression() == expression)
    {
        return Ok(existing.id());
    }

    let name = candidate_names(column, MAX_NAME_PROBES)
        .find(|candidate| !model.default_values().exists(candidate))
        .ok_or_else(|| Error::DefaultValueNamesExhausted {
            name: column.to_string(),
            probes: MAX_NAME_PROBES,
        })?;
    model.add_default_value(DefaultValue::new(name, expression))
}

pub(crate) fn apply_primary_key(
    model: &Model,
    table: &mut Table,
    rows: &[RawPrimaryKeyColumn],
) -> Result<()> {
    let mut primary_key = None;
    for row in rows {
        if primary_key.is_none() {
            let name = row
                .key_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| format!("PK_{}", table.name()));
            primary_key = Some(table.add_index(Index::new(name, IndexType::PrimaryKey))?);
        }

        let attribute = find_attribute(model, table, &row.column_name)?;
        table.set_primary_key(attribute, true)?;
        if let Some(index) = primary_key {
            table.add_index_attribute(index, attribute)?;
        }
    }
    Ok(())
}

async fn load_indexes(
    ctx: &Context<'_>,
    model: &Model,
    table: &mut Table,
    scope: Option<&SchemaEntry>,
    table_name: &str,
) -> Result<usize> {
    let rows = ctx.source.index_info(scope, table_name).await?;
    let staged = stage_indexes(model, table, &rows)?;
    let count = staged.len();

    // Commit into a copy so a failing index leaves the table untouched.
    let mut candidate = table.clone();
    for index in staged {
        candidate.add_index(index)?;
    }
    *table = candidate;
    Ok(count)
}

/// Group consecutive index rows by name. Indexes already on the table, such
/// as the primary key's backing index, and names already staged are skipped.
/// Names are compared with the model's case rule.
pub(crate) fn stage_indexes(
    model: &Model,
    table: &Table,
    rows: &[RawIndexColumn],
) -> Result<Vec<Index>> {
    let case_rule = model.case_rule();
    let mut staged: Vec<Index> = Vec::new();
    let mut current: Option<(String, Option<usize>)> = None;

    for row in rows {
        let Some(index_name) = row.index_name.as_deref() else {
            continue;
        };

        let is_new_group = current
            .as_ref()
            .is_none_or(|(name, _)| name.as_str() != index_name);
        if is_new_group {
            let known = table.indexes().exists(index_name)
                || staged
                    .iter()
                    .any(|index| case_rule.same(index.name(), index_name));
            let slot = if known {
                None
            } else {
                staged.push(Index::new(
                    index_name,
                    IndexType::from_non_unique(row.non_unique),
                ));
                Some(staged.len() - 1)
            };
            current = Some((index_name.to_string(), slot));
        }

        let Some((_, Some(slot))) = current else {
            continue;
        };
        let column = row.column_name.as_deref().ok_or_else(|| {
            Error::integrity(format!(
                "index {index_name} of table {} has no column name",
                table.name()
            ))
        })?;
        let attribute = find_attribute(model, table, column)?;
        staged[slot].add_attribute(attribute);
    }

    Ok(staged)
}

fn find_attribute(model: &Model, table: &Table, column: &str) -> Result<AttributeId> {
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
