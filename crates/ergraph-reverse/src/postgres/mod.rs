use async_trait::async_trait;
use sqlx::PgPool;

use ergraph_core::{Result, SchemaEntry};

use crate::source::{
    MetadataSource, RawColumn, RawImportedKey, RawIndexColumn, RawPrimaryKeyColumn, RawTable,
    RawTypeInfo,
};

mod mapper;
mod queries;

/// Metadata source reading the PostgreSQL system catalogs.
///
/// Scopes map to schemas; `None` means the session's current schema.
#[derive(Debug, Clone)]
pub struct PgMetadataSource {
    pool: PgPool,
}

impl PgMetadataSource {
    /// Create a new source using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn schema_of(scope: Option<&SchemaEntry>) -> Option<&str> {
    scope.map(|entry| entry.schema.as_str())
}

#[async_trait]
impl MetadataSource for PgMetadataSource {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn schemas(&self) -> Result<Vec<SchemaEntry>> {
        Ok(mapper::map_schemas(queries::list_schemas(&self.pool).await?))
    }

    async fn tables(
        &self,
        scope: Option<&SchemaEntry>,
        table_name: Option<&str>,
        table_types: &[String],
    ) -> Result<Vec<RawTable>> {
        let rows = queries::list_tables(&self.pool, schema_of(scope), table_name).await?;
        Ok(mapper::map_tables(rows, table_types))
    }

    async fn columns(&self, scope: Option<&SchemaEntry>, table: &str) -> Result<Vec<RawColumn>> {
        let rows = queries::list_columns(&self.pool, schema_of(scope), table).await?;
        Ok(mapper::map_columns(rows))
    }

    async fn primary_keys(
        &self,
        scope: Option<&SchemaEntry>,
        table: &str,
    ) -> Result<Vec<RawPrimaryKeyColumn>> {
        let rows = queries::list_primary_key_columns(&self.pool, schema_of(scope), table).await?;
        Ok(mapper::map_primary_key(rows))
    }

    async fn index_info(
        &self,
        scope: Option<&SchemaEntry>,
        table: &str,
    ) -> Result<Vec<RawIndexColumn>> {
        let rows = queries::list_index_columns(&self.pool, schema_of(scope), table).await?;
        Ok(mapper::map_index_columns(rows))
    }

    async fn imported_keys(
        &self,
        scope: Option<&SchemaEntry>,
        table: &str,
    ) -> Result<Vec<RawImportedKey>> {
        let rows = queries::list_imported_keys(&self.pool, schema_of(scope), table).await?;
        Ok(mapper::map_imported_keys(rows))
    }

    async fn type_info(&self) -> Result<Vec<RawTypeInfo>> {
        Ok(mapper::map_types(queries::list_types(&self.pool).await?))
    }
}
