use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result, anyhow};
use ergraph_core::{
    CascadeType, DataType, Error, GenericDialect, IndexType, Model, Named, SchemaEntry, Table,
    rule_codes,
};
use ergraph_reverse::{
    Context, IndexOutcome, MockSource, MockTable, NoopNotifier, Phase, ProgressEvent, Query,
    RawColumn, RawImportedKey, ReverseEngineer, ReverseEngineeringOptions, Stage, TableOutcome,
    build_relations, reverse_engineer_table,
};

fn dialect() -> GenericDialect {
    GenericDialect::new("test")
        .with_type(DataType::new("INTEGER"))
        .with_type(DataType::sized("VARCHAR"))
}

fn customers() -> MockTable {
    MockTable::new("CUSTOMERS")
        .remarks("people who order things")
        .column(RawColumn::new("ID", "INTEGER").not_null())
        .column(RawColumn::new("NAME", "VARCHAR").with_size("40"))
        .primary_key(Some("PK_CUSTOMERS"), &["ID"])
}

fn orders() -> MockTable {
    MockTable::new("ORDERS")
        .column(RawColumn::new("ID", "INTEGER").not_null())
        .column(RawColumn::new("CUSTOMER_ID", "INTEGER"))
        .primary_key(Some("PK_ORDERS"), &["ID"])
        .imported_key(fk_cust())
}

fn fk_cust() -> RawImportedKey {
    RawImportedKey {
        fk_name: "FK_CUST".to_string(),
        pk_table: "CUSTOMERS".to_string(),
        pk_column: "ID".to_string(),
        fk_column: "CUSTOMER_ID".to_string(),
        position: 1,
        update_rule: None,
        delete_rule: Some(rule_codes::CASCADE),
    }
}

fn table<'a>(model: &'a Model, name: &str) -> Result<&'a Table> {
    model
        .table_by_name(name)
        .ok_or_else(|| anyhow!("expected table {name}"))
}

fn index_columns(table: &Table, index: &str) -> Result<Vec<String>> {
    let index = table
        .indexes()
        .find_by_name(index)
        .ok_or_else(|| anyhow!("expected index {index}"))?;
    index
        .attributes()
        .iter()
        .map(|id| {
            table
                .attribute(*id)
                .map(|attribute| attribute.name().to_string())
                .ok_or_else(|| anyhow!("dangling attribute {id}"))
        })
        .collect()
}

#[tokio::test]
async fn builds_fk_cust_relation_end_to_end() -> Result<()> {
    // Importing table is listed first; relations still resolve.
    let source = Arc::new(MockSource::new().with_table(orders()).with_table(customers()));
    let mut engine = ReverseEngineer::new(Arc::new(dialect()), source.clone());

    let mut model = Model::new(engine.dialect().clone());
    let summary = engine
        .reverse_engineer_into(&mut model, &ReverseEngineeringOptions::default())
        .await?;

    assert_eq!(engine.phase(), Phase::Done);
    assert_eq!(summary.scopes, 1);
    assert_eq!(summary.tables_loaded, 2);
    assert_eq!(summary.relations, 1);
    assert!(summary.indexes_skipped.is_empty());

    assert_eq!(model.relations().len(), 1);
    let relation = model
        .relations()
        .find_by_name("FK_CUST")
        .context("FK_CUST missing")?;
    let customers = table(&model, "CUSTOMERS")?;
    let orders = table(&model, "ORDERS")?;
    assert_eq!(relation.exporting_table(), customers.id());
    assert_eq!(relation.importing_table(), orders.id());
    assert_eq!(relation.on_update(), CascadeType::Nothing);
    assert_eq!(relation.on_delete(), CascadeType::Cascade);

    let mapping: Vec<(&str, &str)> = relation
        .mapping()
        .iter()
        .filter_map(|(exported, imported)| {
            Some((
                customers.attribute(*exported)?.name(),
                orders.attribute(*imported)?.name(),
            ))
        })
        .collect();
    assert_eq!(mapping, vec![("ID", "CUSTOMER_ID")]);

    assert_eq!(customers.remarks(), Some("people who order things"));
    let names: Vec<&str> = customers
        .attributes()
        .iter()
        .map(|attribute| attribute.name())
        .collect();
    assert_eq!(names, vec!["ID", "NAME"]);

    let queries = source.queries();
    let last_column_query = queries
        .iter()
        .rposition(|record| record.query == Query::Columns)
        .context("no column queries")?;
    let first_key_query = queries
        .iter()
        .position(|record| record.query == Query::ImportedKeys)
        .context("no imported key queries")?;
    assert!(last_column_query < first_key_query);

    Ok(())
}

#[tokio::test]
async fn reports_progress_in_order() -> Result<()> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let notifier = move |event: ProgressEvent, parameter: &str| {
        if let Ok(mut events) = sink.lock() {
            events.push((event, parameter.to_string()));
        }
    };

    let source = Arc::new(MockSource::new().with_table(customers()).with_table(orders()));
    let mut engine =
        ReverseEngineer::new(Arc::new(dialect()), source).with_notifier(Arc::new(notifier));
    engine
        .create_model(&ReverseEngineeringOptions::default())
        .await?;

    let events = events.lock().map_err(|_| anyhow!("poisoned"))?.clone();
    let expected = vec![
        (ProgressEvent::EngineeringSchema, String::new()),
        (ProgressEvent::EngineeringTable, "CUSTOMERS".to_string()),
        (ProgressEvent::EngineeringTable, "ORDERS".to_string()),
        (ProgressEvent::EngineeringRelation, "CUSTOMERS".to_string()),
        (ProgressEvent::EngineeringRelation, "ORDERS".to_string()),
        (ProgressEvent::EngineeringFinished, String::new()),
    ];
    assert_eq!(events, expected);
    Ok(())
}

#[tokio::test]
async fn groups_index_rows_by_name() -> Result<()> {
    let source = Arc::new(
        MockSource::new().with_table(
            MockTable::new("T")
                .column(RawColumn::new("COL1", "INTEGER"))
                .column(RawColumn::new("COL2", "INTEGER"))
                .column(RawColumn::new("COL3", "INTEGER"))
                .index("IDX_A", true, &["COL1", "COL2"])
                .index("IDX_B", false, &["COL3"]),
        ),
    );
    let model = ReverseEngineer::new(Arc::new(dialect()), source)
        .create_model(&ReverseEngineeringOptions::default())
        .await?;

    let table = table(&model, "T")?;
    assert_eq!(table.indexes().len(), 2);
    assert_eq!(index_columns(table, "IDX_A")?, vec!["COL1", "COL2"]);
    assert_eq!(index_columns(table, "IDX_B")?, vec!["COL3"]);

    let idx_b = table.indexes().find_by_name("IDX_B").context("IDX_B")?;
    assert_eq!(idx_b.index_type(), IndexType::Unique);
    Ok(())
}

#[tokio::test]
async fn primary_key_backing_index_is_not_duplicated() -> Result<()> {
    let source = Arc::new(MockSource::new().with_table(
        customers().index("PK_CUSTOMERS", false, &["ID"]),
    ));
    let model = ReverseEngineer::new(Arc::new(dialect()), source)
        .create_model(&ReverseEngineeringOptions::default())
        .await?;

    let customers = table(&model, "CUSTOMERS")?;
    assert_eq!(customers.indexes().len(), 1);
    let primary_key = customers.primary_key().context("primary key")?;
    assert_eq!(primary_key.name(), "PK_CUSTOMERS");
    assert!(
        customers
            .attribute_by_name("ID")
            .is_some_and(|attribute| attribute.is_primary_key())
    );
    Ok(())
}

#[tokio::test]
async fn table_pass_is_idempotent() -> Result<()> {
    let source = MockSource::new().with_table(customers());
    let notifier = NoopNotifier;
    let ctx = Context::new(&source, &notifier);
    let mut model = Model::new(Arc::new(dialect()));

    let first = reverse_engineer_table(&ctx, &mut model, None, "CUSTOMERS").await?;
    assert!(matches!(first, TableOutcome::Loaded { .. }));
    let domains = model.domains().len();
    let queries = source.queries().len();

    let second = reverse_engineer_table(&ctx, &mut model, None, "CUSTOMERS").await?;
    assert!(matches!(second, TableOutcome::AlreadyPresent));
    assert_eq!(model.tables().len(), 1);
    assert_eq!(model.domains().len(), domains);
    assert_eq!(source.queries().len(), queries);
    Ok(())
}

#[tokio::test]
async fn missing_table_is_reported() -> Result<()> {
    let source = MockSource::new();
    let notifier = NoopNotifier;
    let ctx = Context::new(&source, &notifier);
    let mut model = Model::new(Arc::new(dialect()));

    let outcome = reverse_engineer_table(&ctx, &mut model, None, "GHOST").await?;
    assert!(matches!(outcome, TableOutcome::Missing));
    assert!(model.tables().is_empty());
    Ok(())
}

#[tokio::test]
async fn relation_pass_before_exporting_table_fails() -> Result<()> {
    let source = MockSource::new().with_table(customers()).with_table(orders());
    let notifier = NoopNotifier;
    let ctx = Context::new(&source, &notifier);
    let mut model = Model::new(Arc::new(dialect()));

    reverse_engineer_table(&ctx, &mut model, None, "ORDERS").await?;
    let err = build_relations(&ctx, &mut model)
        .await
        .err()
        .context("relation pass should fail")?;

    assert!(matches!(err, Error::ReferentialIntegrity(_)));
    assert!(model.relations().is_empty());
    Ok(())
}

#[tokio::test]
async fn index_failure_keeps_the_table() -> Result<()> {
    let source = Arc::new(
        MockSource::new()
            .with_table(customers().failing(Query::IndexInfo))
            .with_table(orders()),
    );
    let mut engine = ReverseEngineer::new(Arc::new(dialect()), source);
    let mut model = Model::new(engine.dialect().clone());
    let summary = engine
        .reverse_engineer_into(&mut model, &ReverseEngineeringOptions::default())
        .await?;

    assert_eq!(summary.tables_loaded, 2);
    assert_eq!(summary.indexes_skipped, vec!["CUSTOMERS".to_string()]);
    assert_eq!(summary.relations, 1);

    let customers = table(&model, "CUSTOMERS")?;
    assert_eq!(customers.attributes().len(), 2);
    assert!(customers.primary_key().is_some());
    assert_eq!(customers.indexes().len(), 1);
    Ok(())
}

#[tokio::test]
async fn broken_index_metadata_commits_no_index() -> Result<()> {
    let source = MockSource::new().with_table(
        MockTable::new("T")
            .column(RawColumn::new("A", "INTEGER"))
            .index("IDX_OK", true, &["A"])
            .index("IDX_BROKEN", true, &["A", "GONE"]),
    );
    let notifier = NoopNotifier;
    let ctx = Context::new(&source, &notifier);
    let mut model = Model::new(Arc::new(dialect()));

    let outcome = reverse_engineer_table(&ctx, &mut model, None, "T").await?;
    let TableOutcome::Loaded { table: id, indexes } = outcome else {
        return Err(anyhow!("table should load"));
    };
    assert!(matches!(
        indexes,
        IndexOutcome::Skipped(Error::ReferentialIntegrity(_))
    ));
    let table = model.table(id).context("table")?;
    assert!(table.indexes().is_empty());
    Ok(())
}

#[tokio::test]
async fn index_names_differing_in_case_commit_once() -> Result<()> {
    let source = MockSource::new().with_table(
        MockTable::new("T")
            .column(RawColumn::new("A", "INTEGER"))
            .column(RawColumn::new("B", "INTEGER"))
            .index("IDX_A", true, &["A"])
            .index("idx_a", true, &["B"]),
    );
    let notifier = NoopNotifier;
    let ctx = Context::new(&source, &notifier);
    let mut model = Model::new(Arc::new(GenericDialect::standard()));

    let outcome = reverse_engineer_table(&ctx, &mut model, None, "T").await?;
    let TableOutcome::Loaded { table: id, indexes } = outcome else {
        return Err(anyhow!("table should load"));
    };
    assert!(matches!(indexes, IndexOutcome::Complete(1)));
    let table = model.table(id).context("table")?;
    assert_eq!(table.indexes().len(), 1);
    assert_eq!(index_columns(table, "IDX_A")?, vec!["A"]);
    Ok(())
}

#[tokio::test]
async fn unknown_type_fails_the_run_and_keeps_earlier_tables() -> Result<()> {
    let source = Arc::new(
        MockSource::new()
            .with_table(customers())
            .with_table(MockTable::new("SHAPES").column(RawColumn::new("AREA", "GEOMETRY"))),
    );
    let mut engine = ReverseEngineer::new(Arc::new(dialect()), source);
    let mut model = Model::new(engine.dialect().clone());

    let err = engine
        .reverse_engineer_into(&mut model, &ReverseEngineeringOptions::default())
        .await
        .err()
        .context("run should fail")?;

    assert!(matches!(err, Error::UnknownDataType(ref name) if name == "GEOMETRY"));
    assert_eq!(engine.phase(), Phase::Failed(Stage::Tables));
    assert!(model.table_by_name("CUSTOMERS").is_some());
    assert!(model.table_by_name("SHAPES").is_none());
    Ok(())
}

#[tokio::test]
async fn duplicate_columns_are_fatal() -> Result<()> {
    let source = MockSource::new().with_table(
        MockTable::new("T")
            .column(RawColumn::new("A", "INTEGER"))
            .column(RawColumn::new("A", "INTEGER")),
    );
    let notifier = NoopNotifier;
    let ctx = Context::new(&source, &notifier);
    let mut model = Model::new(Arc::new(dialect()));

    let err = reverse_engineer_table(&ctx, &mut model, None, "T")
        .await
        .err()
        .context("duplicate column should fail")?;
    assert!(err.is_constraint_violation());
    assert!(model.tables().is_empty());
    Ok(())
}

#[tokio::test]
async fn columns_share_domains_and_default_values() -> Result<()> {
    let dialect = dialect().with_column_defaults();
    let source = Arc::new(
        MockSource::new()
            .with_table(
                MockTable::new("STOCK")
                    .column(RawColumn::new("QTY", "INTEGER").with_default("0"))
                    .column(RawColumn::new("RESERVED", "INTEGER").with_default("0")),
            )
            .with_table(MockTable::new("SHELF").column(RawColumn::new("QTY", "INTEGER"))),
    );
    let model = ReverseEngineer::new(Arc::new(dialect), source)
        .create_model(&ReverseEngineeringOptions::default())
        .await?;

    assert_eq!(model.default_values().len(), 1);
    let stock = table(&model, "STOCK")?;
    let shelf = table(&model, "SHELF")?;
    let qty = stock.attribute_by_name("QTY").context("QTY")?;
    let reserved = stock.attribute_by_name("RESERVED").context("RESERVED")?;
    assert_eq!(qty.default_value(), reserved.default_value());

    let shelf_qty = shelf.attribute_by_name("QTY").context("shelf QTY")?;
    assert_eq!(qty.domain(), shelf_qty.domain());
    assert_ne!(qty.domain(), reserved.domain());
    Ok(())
}

#[tokio::test]
async fn enumerates_every_reported_scope() -> Result<()> {
    let sales = SchemaEntry::new(None, "sales");
    let archive = SchemaEntry::new(None, "archive");
    let source = Arc::new(
        MockSource::new()
            .with_schema(sales.clone())
            .with_schema(archive.clone())
            .with_table(customers().in_scope(sales.clone()))
            .with_table(orders().in_scope(sales.clone()))
            .with_table(customers().in_scope(archive.clone()))
            .with_table(MockTable::new("AUDIT").in_scope(archive.clone()).table_type("VIEW")),
    );
    let mut engine =
        ReverseEngineer::new(Arc::new(dialect().with_schema_information()), source.clone());
    let mut model = Model::new(engine.dialect().clone());

    let summary = engine
        .reverse_engineer_into(&mut model, &ReverseEngineeringOptions::default())
        .await?;

    assert_eq!(summary.scopes, 2);
    assert_eq!(summary.tables_loaded, 2);
    assert_eq!(summary.tables_skipped, 1);
    assert!(model.table_by_name("AUDIT").is_none());
    let customers = table(&model, "CUSTOMERS")?;
    assert_eq!(customers.scope(), Some(&sales));
    Ok(())
}

#[tokio::test]
async fn explicit_scopes_restrict_the_run() -> Result<()> {
    let sales = SchemaEntry::new(None, "sales");
    let archive = SchemaEntry::new(None, "archive");
    let source = Arc::new(
        MockSource::new()
            .with_schema(sales.clone())
            .with_schema(archive.clone())
            .with_table(customers().in_scope(sales))
            .with_table(MockTable::new("OLD").in_scope(archive.clone())),
    );
    let mut engine =
        ReverseEngineer::new(Arc::new(dialect().with_schema_information()), source.clone());
    let options = ReverseEngineeringOptions::with_schemas([archive]);

    let model = engine.create_model(&options).await?;

    assert_eq!(model.tables().len(), 1);
    assert!(model.table_by_name("OLD").is_some());
    assert!(
        !source
            .queries()
            .iter()
            .any(|record| record.query == Query::Schemas)
    );
    Ok(())
}

#[tokio::test]
async fn excluded_tables_are_skipped_without_queries() -> Result<()> {
    let source = Arc::new(
        MockSource::new()
            .with_table(customers())
            .with_table(MockTable::new("AUDIT_LOG").column(RawColumn::new("ID", "INTEGER"))),
    );
    let mut engine = ReverseEngineer::new(
        Arc::new(dialect().case_insensitive().with_excluded_tables(["audit_log"])),
        source.clone(),
    );
    let mut model = Model::new(engine.dialect().clone());

    let summary = engine
        .reverse_engineer_into(&mut model, &ReverseEngineeringOptions::default())
        .await?;

    assert_eq!(summary.tables_loaded, 1);
    assert_eq!(summary.tables_skipped, 1);
    assert!(model.table_by_name("AUDIT_LOG").is_none());
    assert!(
        !source
            .queries()
            .iter()
            .any(|record| record.table.as_deref() == Some("AUDIT_LOG"))
    );
    Ok(())
}

#[tokio::test]
async fn model_of_another_dialect_is_rejected() -> Result<()> {
    let source = Arc::new(MockSource::new().with_table(customers()));
    let mut engine = ReverseEngineer::new(Arc::new(dialect()), source.clone());
    let mut model = Model::new(Arc::new(GenericDialect::standard()));

    let err = engine
        .reverse_engineer_into(&mut model, &ReverseEngineeringOptions::default())
        .await
        .err()
        .context("run should fail")?;

    assert!(matches!(err, Error::DialectMismatch { .. }));
    assert_eq!(engine.phase(), Phase::Failed(Stage::Scopes));
    assert!(model.tables().is_empty());
    assert!(source.queries().is_empty());
    Ok(())
}
