use async_trait::async_trait;

use ergraph_core::{Result, SchemaEntry};

/// Row of a table listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub name: String,
    pub table_type: String,
    pub remarks: Option<String>,
}

/// Row of a column listing, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: String,
    pub type_name: String,
    pub size: Option<String>,
    pub decimal_digits: Option<String>,
    pub nullable: bool,
    pub default: Option<String>,
    pub remarks: Option<String>,
}

impl RawColumn {
    /// Nullable column without size, default or remarks.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            size: None,
            decimal_digits: None,
            nullable: true,
            default: None,
            remarks: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_decimal_digits(mut self, digits: impl Into<String>) -> Self {
        self.decimal_digits = Some(digits.into());
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}

/// One key column of a table's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPrimaryKeyColumn {
    pub key_name: Option<String>,
    pub column_name: String,
    pub position: i32,
}

/// One column of a secondary index. Rows of the same index are consecutive
/// and ordered by position; rows without an index name carry statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIndexColumn {
    pub index_name: Option<String>,
    pub column_name: Option<String>,
    pub position: i32,
    pub non_unique: bool,
}

/// One column pair of a foreign key held by the queried table. Rows of the
/// same key are consecutive and ordered by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImportedKey {
    pub fk_name: String,
    pub pk_table: String,
    pub pk_column: String,
    pub fk_column: String,
    pub position: i32,
    pub update_rule: Option<i32>,
    pub delete_rule: Option<i32>,
}

/// Entry of the connection's type catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTypeInfo {
    pub name: String,
    pub category: Option<String>,
}

/// Capability to query database metadata.
///
/// Each call returns fully drained rows, so callers never hold two result
/// sets of the same connection at once.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Schema scopes visible through the connection.
    async fn schemas(&self) -> Result<Vec<SchemaEntry>>;

    /// Tables of `scope` whose type is in `table_types`, optionally restricted
    /// to one name.
    async fn tables(
        &self,
        scope: Option<&SchemaEntry>,
        table_name: Option<&str>,
        table_types: &[String],
    ) -> Result<Vec<RawTable>>;

    async fn columns(&self, scope: Option<&SchemaEntry>, table: &str) -> Result<Vec<RawColumn>>;

    async fn primary_keys(
        &self,
        scope: Option<&SchemaEntry>,
        table: &str,
    ) -> Result<Vec<RawPrimaryKeyColumn>>;

    async fn index_info(
        &self,
        scope: Option<&SchemaEntry>,
        table: &str,
    ) -> Result<Vec<RawIndexColumn>>;

    async fn imported_keys(
        &self,
        scope: Option<&SchemaEntry>,
        table: &str,
    ) -> Result<Vec<RawImportedKey>>;

    async fn type_info(&self) -> Result<Vec<RawTypeInfo>>;
}
