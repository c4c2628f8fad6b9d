//! In-memory [`MetadataSource`] for tests and demos.
//!
//! Tables are listed in the order they were added. Each query is recorded in
//! a log so callers can assert on the order in which metadata was fetched.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;

use ergraph_core::{Error, Result, SchemaEntry};

use crate::source::{
    MetadataSource, RawColumn, RawImportedKey, RawIndexColumn, RawPrimaryKeyColumn, RawTable,
    RawTypeInfo,
};

/// Metadata query kinds, as recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Query {
    Schemas,
    Tables,
    Columns,
    PrimaryKeys,
    IndexInfo,
    ImportedKeys,
    TypeInfo,
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Query::Schemas => "schemas",
            Query::Tables => "tables",
            Query::Columns => "columns",
            Query::PrimaryKeys => "primary_keys",
            Query::IndexInfo => "index_info",
            Query::ImportedKeys => "imported_keys",
            Query::TypeInfo => "type_info",
        };
        f.write_str(label)
    }
}

/// One recorded query. `table` is `None` for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub query: Query,
    pub table: Option<String>,
}

/// Metadata of one table served by [`MockSource`].
#[derive(Debug, Clone)]
pub struct MockTable {
    scope: Option<SchemaEntry>,
    table: RawTable,
    columns: Vec<RawColumn>,
    primary_key: Vec<RawPrimaryKeyColumn>,
    indexes: Vec<RawIndexColumn>,
    imported_keys: Vec<RawImportedKey>,
    failures: BTreeSet<Query>,
}

impl MockTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scope: None,
            table: RawTable {
                name: name.into(),
                table_type: "TABLE".to_string(),
                remarks: None,
            },
            columns: Vec::new(),
            primary_key: Vec::new(),
            indexes: Vec::new(),
            imported_keys: Vec::new(),
            failures: BTreeSet::new(),
        }
    }

    pub fn in_scope(mut self, scope: SchemaEntry) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn table_type(mut self, table_type: impl Into<String>) -> Self {
        self.table.table_type = table_type.into();
        self
    }

    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.table.remarks = Some(remarks.into());
        self
    }

    pub fn column(mut self, column: RawColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Primary key over `columns`, in key order.
    pub fn primary_key(mut self, key_name: Option<&str>, columns: &[&str]) -> Self {
        self.primary_key = columns
            .iter()
            .enumerate()
            .map(|(position, column)| RawPrimaryKeyColumn {
                key_name: key_name.map(str::to_string),
                column_name: column.to_string(),
                position: position as i32 + 1,
            })
            .collect();
        self
    }

    /// Secondary index over `columns`, in key order.
    pub fn index(mut self, name: &str, non_unique: bool, columns: &[&str]) -> Self {
        self.indexes
            .extend(columns.iter().enumerate().map(|(position, column)| RawIndexColumn {
                index_name: Some(name.to_string()),
                column_name: Some(column.to_string()),
                position: position as i32 + 1,
                non_unique,
            }));
        self
    }

    pub fn index_row(mut self, row: RawIndexColumn) -> Self {
        self.indexes.push(row);
        self
    }

    pub fn imported_key(mut self, key: RawImportedKey) -> Self {
        self.imported_keys.push(key);
        self
    }

    /// Make the given per-table query fail with a transport error.
    pub fn failing(mut self, query: Query) -> Self {
        self.failures.insert(query);
        self
    }
}

/// In-memory metadata source.
#[derive(Debug, Default)]
pub struct MockSource {
    schemas: Vec<SchemaEntry>,
    tables: Vec<MockTable>,
    type_info: Vec<RawTypeInfo>,
    log: Mutex<Vec<QueryRecord>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, entry: SchemaEntry) -> Self {
        self.schemas.push(entry);
        self
    }

    pub fn with_table(mut self, table: MockTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_type(mut self, name: impl Into<String>, category: Option<&str>) -> Self {
        self.type_info.push(RawTypeInfo {
            name: name.into(),
            category: category.map(str::to_string),
        });
        self
    }

    /// Queries issued so far, oldest first.
    pub fn queries(&self) -> Vec<QueryRecord> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, query: Query, table: Option<&str>) {
        let entry = QueryRecord {
            query,
            table: table.map(str::to_string),
        };
        match self.log.lock() {
            Ok(mut log) => log.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }

    fn table(&self, scope: Option<&SchemaEntry>, name: &str, query: Query) -> Result<&MockTable> {
        self.record(query, Some(name));
        let table = self
            .tables
            .iter()
            .find(|table| table.scope.as_ref() == scope && table.table.name == name)
            .ok_or_else(|| Error::Db(format!("{query}: no table {name}")))?;
        if table.failures.contains(&query) {
            return Err(Error::Db(format!("{query} failed for table {name}")));
        }
        Ok(table)
    }
}

#[async_trait]
impl MetadataSource for MockSource {
    fn engine(&self) -> &'static str {
        "mock"
    }

    async fn schemas(&self) -> Result<Vec<SchemaEntry>> {
        self.record(Query::Schemas, None);
        Ok(self.schemas.clone())
    }

    async fn tables(
        &self,
        scope: Option<&SchemaEntry>,
        table_name: Option<&str>,
        table_types: &[String],
    ) -> Result<Vec<RawTable>> {
        self.record(Query::Tables, table_name);
        Ok(self
            .tables
            .iter()
            .filter(|table| table.scope.as_ref() == scope)
            .filter(|table| table_name.is_none_or(|name| table.table.name == name))
            .filter(|table| table_types.contains(&table.table.table_type))
            .map(|table| table.table.clone())
            .collect())
    }

    async fn columns(&self, scope: Option<&SchemaEntry>, table: &str) -> Result<Vec<RawColumn>> {
        Ok(self.table(scope, table, Query::Columns)?.columns.clone())
    }

    async fn primary_keys(
        &self,
        scope: Option<&SchemaEntry>,
        table: &str,
    ) -> Result<Vec<RawPrimaryKeyColumn>> {
        Ok(self.table(scope, table, Query::PrimaryKeys)?.primary_key.clone())
    }

    async fn index_info(
        &self,
        scope: Option<&SchemaEntry>,
        table: &str,
    ) -> Result<Vec<RawIndexColumn>> {
        Ok(self.table(scope, table, Query::IndexInfo)?.indexes.clone())
    }

    async fn imported_keys(
        &self,
        scope: Option<&SchemaEntry>,
        table: &str,
    ) -> Result<Vec<RawImportedKey>> {
        Ok(self.table(scope, table, Query::ImportedKeys)?.imported_keys.clone())
    }

    async fn type_info(&self) -> Result<Vec<RawTypeInfo>> {
        self.record(Query::TypeInfo, None);
        Ok(self.type_info.clone())
    }
}
