use sqlx::PgPool;

use ergraph_core::{Error, Result};

fn db(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}

pub async fn list_schemas(pool: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        select nspname::text
        from pg_namespace
        where nspname not like 'pg\_%'
          and nspname <> 'information_schema'
        order by nspname
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(db)
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgTableRow {
    pub name: String,
    pub relkind: i8,
    pub remarks: Option<String>,
}

/// Relations of a schema (the session's current schema when `None`).
pub async fn list_tables(
    pool: &PgPool,
    schema: Option<&str>,
    table: Option<&str>,
) -> Result<Vec<PgTableRow>> {
    sqlx::query_as::<_, PgTableRow>(
        r#"
        select
          c.relname::text as name,
          c.relkind as relkind,
          pg_catalog.obj_description(c.oid, 'pg_class') as remarks
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = coalesce($1, current_schema())
          and ($2::text is null or c.relname = $2)
          and c.relkind in ('r','p','v','m','f')
        order by c.relname
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db)
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgColumnRow {
    pub name: String,
    pub type_name: String,
    pub size: Option<String>,
    pub decimal_digits: Option<String>,
    pub nullable: bool,
    pub default_expr: Option<String>,
    pub remarks: Option<String>,
}

pub async fn list_columns(
    pool: &PgPool,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<PgColumnRow>> {
    sqlx::query_as::<_, PgColumnRow>(
        r#"
        select
          a.attname::text as name,
          t.typname::text as type_name,
          coalesce(ic.character_maximum_length, ic.numeric_precision)::text as size,
          ic.numeric_scale::text as decimal_digits,
          (not a.attnotnull) as nullable,
          pg_get_expr(ad.adbin, ad.adrelid) as default_expr,
          pg_catalog.col_description(a.attrelid, a.attnum) as remarks
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        join pg_type t on t.oid = a.atttypid
        left join pg_attrdef ad on ad.adrelid = a.attrelid and ad.adnum = a.attnum
        left join information_schema.columns ic
          on ic.table_schema = n.nspname and ic.table_name = c.relname and ic.column_name = a.attname
        where n.nspname = coalesce($1, current_schema())
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        order by a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db)
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgPrimaryKeyRow {
    pub key_name: String,
    pub column_name: String,
    pub position: i32,
}

pub async fn list_primary_key_columns(
    pool: &PgPool,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<PgPrimaryKeyRow>> {
    sqlx::query_as::<_, PgPrimaryKeyRow>(
        r#"
        select
          con.conname::text as key_name,
          att.attname::text as column_name,
          ord.ordinality::int4 as position
        from pg_constraint con
        join pg_class rel on rel.oid = con.conrelid
        join pg_namespace nsp on nsp.oid = rel.relnamespace
        join unnest(con.conkey) with ordinality as ord(attnum, ordinality) on true
        join pg_attribute att on att.attrelid = rel.oid and att.attnum = ord.attnum
        where nsp.nspname = coalesce($1, current_schema())
          and rel.relname = $2
          and con.contype = 'p'
        order by ord.ordinality
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db)
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgIndexRow {
    pub index_name: String,
    pub column_name: Option<String>,
    pub position: i32,
    pub is_unique: bool,
}

/// Index columns grouped by index and ordered by key position. Expression
/// columns come back without a column name.
pub async fn list_index_columns(
    pool: &PgPool,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<PgIndexRow>> {
    sqlx::query_as::<_, PgIndexRow>(
        r#"
        select
          idx.relname::text as index_name,
          att.attname::text as column_name,
          ord.ordinality::int4 as position,
          i.indisunique as is_unique
        from pg_index i
        join pg_class tbl on tbl.oid = i.indrelid
        join pg_namespace nsp on nsp.oid = tbl.relnamespace
        join pg_class idx on idx.oid = i.indexrelid
        join unnest(i.indkey::int2[]) with ordinality as ord(attnum, ordinality) on true
        left join pg_attribute att on att.attrelid = tbl.oid and att.attnum = ord.attnum
        where nsp.nspname = coalesce($1, current_schema())
          and tbl.relname = $2
          and ord.ordinality <= i.indnkeyatts
        order by idx.relname, ord.ordinality
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db)
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgImportedKeyRow {
    pub fk_name: String,
    pub pk_table: String,
    pub pk_column: String,
    pub fk_column: String,
    pub position: i32,
    pub on_update_code: i8,
    pub on_delete_code: i8,
}

pub async fn list_imported_keys(
    pool: &PgPool,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<PgImportedKeyRow>> {
    sqlx::query_as::<_, PgImportedKeyRow>(
        r#"
        select
          con.conname::text as fk_name,
          ref_rel.relname::text as pk_table,
          ref_att.attname::text as pk_column,
          src_att.attname::text as fk_column,
          k.ordinality::int4 as position,
          con.confupdtype as on_update_code,
          con.confdeltype as on_delete_code
        from pg_constraint con
        join pg_class src_rel on src_rel.oid = con.conrelid
        join pg_namespace src_nsp on src_nsp.oid = src_rel.relnamespace
        join pg_class ref_rel on ref_rel.oid = con.confrelid
        join unnest(con.conkey, con.confkey) with ordinality as k(src_attnum, ref_attnum, ordinality) on true
        join pg_attribute src_att on src_att.attrelid = src_rel.oid and src_att.attnum = k.src_attnum
        join pg_attribute ref_att on ref_att.attrelid = ref_rel.oid and ref_att.attnum = k.ref_attnum
        where src_nsp.nspname = coalesce($1, current_schema())
          and src_rel.relname = $2
          and con.contype = 'f'
        order by con.conname, k.ordinality
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(db)
}

#[derive(Debug, sqlx::FromRow)]
pub struct PgTypeRow {
    pub name: String,
    pub category: Option<String>,
}

/// Base, domain and enum types; array types are left out.
pub async fn list_types(pool: &PgPool) -> Result<Vec<PgTypeRow>> {
    sqlx::query_as::<_, PgTypeRow>(
        r#"
        select distinct
          t.typname::text as name,
          t.typcategory::text as category
        from pg_type t
        where t.typtype in ('b','d','e')
          and t.typcategory <> 'A'
        order by 1
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(db)
}
