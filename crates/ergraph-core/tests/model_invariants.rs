use std::sync::Arc;

use ergraph_core::{
    Attribute, CastType, DataType, DefaultValue, Dialect, Domain, Error, GenericDialect, Index,
    IndexType, Model, Named, PostgresDialect, SchemaEntry,
};

#[test]
fn postgres_models_keep_distinct_spellings() {
    let mut model = Model::new(Arc::new(PostgresDialect::new()));
    let domain = model.add_domain(Domain::new("id", "int4")).unwrap();

    for name in ["orders", "Orders"] {
        let mut table = model.new_table(name);
        table.add_attribute(Attribute::new("id", domain)).unwrap();
        model.add_table(table).unwrap();
    }

    assert_eq!(model.tables().len(), 2);
    assert!(model.table_by_name("ORDERS").is_none());
}

#[test]
fn attributes_keep_column_order_and_definition() {
    let dialect = GenericDialect::new("test")
        .with_cast_type(CastType::UpperCase)
        .with_type(DataType::sized("VARCHAR"));
    let mut model = Model::new(Arc::new(dialect));
    let name_domain = model.add_domain(Domain::new("NAME", "VARCHAR(40)")).unwrap();
    let default_value = model
        .add_default_value(DefaultValue::new("NAME", "'unknown'"))
        .unwrap();

    let mut table = model.new_table("CUSTOMERS");
    let first = table
        .add_attribute(Attribute::new("NAME", name_domain).with_nullable(false))
        .unwrap();
    table
        .add_attribute(
            Attribute::new("NICKNAME", name_domain)
                .with_default_value(Some(default_value))
                .with_remarks(Some("shown in greetings")),
        )
        .unwrap();
    let mut unique = Index::new("UQ_NAME", IndexType::Unique);
    unique.add_attribute(first);
    table.add_index(unique).unwrap();
    let table_id = model.add_table(table).unwrap();

    let table = model.table(table_id).unwrap();
    let names: Vec<&str> = table.attributes().iter().map(|attr| attr.name()).collect();
    assert_eq!(names, vec!["NAME", "NICKNAME"]);

    let nickname = table.attribute_by_name("NICKNAME").unwrap();
    assert!(nickname.is_nullable());
    assert_eq!(nickname.remarks(), Some("shown in greetings"));
    assert_eq!(
        model
            .default_value(nickname.default_value().unwrap())
            .map(|value| value.expression()),
        Some("'unknown'")
    );
    assert_eq!(table.indexes().find_by_name("UQ_NAME").unwrap().attributes(), &[first]);
    assert_eq!(model.dialect().cast("customers"), "CUSTOMERS");
}

#[test]
fn unknown_default_values_are_rejected() {
    let mut model = Model::new(Arc::new(GenericDialect::standard()));
    let domain = model.add_domain(Domain::new("D", "INTEGER")).unwrap();
    let mut table = model.new_table("T");
    table
        .add_attribute(
            Attribute::new("C", domain)
                .with_default_value(Some(DefaultValue::new("X", "0").id())),
        )
        .unwrap();

    assert!(matches!(
        model.add_table(table),
        Err(Error::ReferentialIntegrity(_))
    ));
}

#[test]
fn schema_entries_deserialize_without_catalog() {
    let entry: SchemaEntry = serde_json::from_str(r#"{"schema":"public"}"#).unwrap();
    assert_eq!(entry, SchemaEntry::new(None, "public"));

    let qualified: SchemaEntry =
        serde_json::from_str(r#"{"catalog":"shop","schema":"sales"}"#).unwrap();
    assert_eq!(qualified.to_string(), "shop.sales");
}
