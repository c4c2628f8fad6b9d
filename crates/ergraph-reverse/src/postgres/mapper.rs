use ergraph_core::{SchemaEntry, rule_codes};

use crate::source::{
    RawColumn, RawImportedKey, RawIndexColumn, RawPrimaryKeyColumn, RawTable, RawTypeInfo,
};

use super::queries::{
    PgColumnRow, PgImportedKeyRow, PgIndexRow, PgPrimaryKeyRow, PgTableRow, PgTypeRow,
};

/// Convert a Postgres `relkind` code to a JDBC-style table type.
pub fn relkind_to_table_type(code: i8) -> String {
    match code as u8 as char {
        'r' | 'p' => "TABLE".to_string(),
        'v' => "VIEW".to_string(),
        'm' => "MATERIALIZED VIEW".to_string(),
        'f' => "FOREIGN TABLE".to_string(),
        other => other.to_string(),
    }
}

/// Convert a foreign key action code (`confupdtype`, `confdeltype`) to a
/// JDBC rule code.
pub fn fk_action_to_rule_code(code: i8) -> Option<i32> {
    match code as u8 as char {
        'c' => Some(rule_codes::CASCADE),
        'r' => Some(rule_codes::RESTRICT),
        'n' => Some(rule_codes::SET_NULL),
        'a' => Some(rule_codes::NO_ACTION),
        'd' => Some(rule_codes::SET_DEFAULT),
        _ => None,
    }
}

pub fn map_schemas(raw: Vec<String>) -> Vec<SchemaEntry> {
    raw.into_iter()
        .map(|schema| SchemaEntry::new(None, schema))
        .collect()
}

pub fn map_tables(raw: Vec<PgTableRow>, table_types: &[String]) -> Vec<RawTable> {
    raw.into_iter()
        .map(|row| RawTable {
            name: row.name,
            table_type: relkind_to_table_type(row.relkind),
            remarks: row.remarks,
        })
        .filter(|table| {
            table_types
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(&table.table_type))
        })
        .collect()
}

pub fn map_columns(raw: Vec<PgColumnRow>) -> Vec<RawColumn> {
    raw.into_iter()
        .map(|row| RawColumn {
            name: row.name,
            type_name: row.type_name,
            size: row.size,
            decimal_digits: row.decimal_digits,
            nullable: row.nullable,
            default: row.default_expr,
            remarks: row.remarks,
        })
        .collect()
}

pub fn map_primary_key(raw: Vec<PgPrimaryKeyRow>) -> Vec<RawPrimaryKeyColumn> {
    raw.into_iter()
        .map(|row| RawPrimaryKeyColumn {
            key_name: Some(row.key_name),
            column_name: row.column_name,
            position: row.position,
        })
        .collect()
}

pub fn map_index_columns(raw: Vec<PgIndexRow>) -> Vec<RawIndexColumn> {
    raw.into_iter()
        .map(|row| RawIndexColumn {
            index_name: Some(row.index_name),
            column_name: row.column_name,
            position: row.position,
            non_unique: !row.is_unique,
        })
        .collect()
}

pub fn map_imported_keys(raw: Vec<PgImportedKeyRow>) -> Vec<RawImportedKey> {
    raw.into_iter()
        .map(|row| RawImportedKey {
            fk_name: row.fk_name,
            pk_table: row.pk_table,
            pk_column: row.pk_column,
            fk_column: row.fk_column,
            position: row.position,
            update_rule: fk_action_to_rule_code(row.on_update_code),
            delete_rule: fk_action_to_rule_code(row.on_delete_code),
        })
        .collect()
}

pub fn map_types(raw: Vec<PgTypeRow>) -> Vec<RawTypeInfo> {
    raw.into_iter()
        .map(|row| RawTypeInfo {
            name: row.name,
            category: row.category,
        })
        .collect()
}
