use super::{CastType, DataType, DataTypeCatalog, Dialect};

/// PostgreSQL dialect working on `pg_type` names (`int4`, `varchar`, ...).
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    data_types: DataTypeCatalog,
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self {
            data_types: postgres_types().into_iter().collect(),
        }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn data_types(&self) -> &DataTypeCatalog {
        &self.data_types
    }

    fn cast_type(&self) -> CastType {
        CastType::DontCast
    }

    // Quoted identifiers keep their case.
    fn is_case_sensitive(&self) -> bool {
        true
    }

    fn supports_schema_information(&self) -> bool {
        true
    }

    fn convert_column_type(&self, type_name: &str) -> String {
        let lowered = type_name.trim().to_lowercase();
        let canonical = match lowered.as_str() {
            "smallint" => "int2",
            "integer" | "int" => "int4",
            "bigint" => "int8",
            "real" => "float4",
            "double precision" => "float8",
            "boolean" => "bool",
            "character varying" => "varchar",
            "character" | "char" => "bpchar",
            "decimal" => "numeric",
            "timestamp without time zone" => "timestamp",
            "timestamp with time zone" => "timestamptz",
            "time without time zone" => "time",
            "time with time zone" => "timetz",
            "bit varying" => "varbit",
            other => other,
        };
        canonical.to_string()
    }

    fn create_default_value(
        &self,
        _column_name: &str,
        raw_default: Option<&str>,
    ) -> Option<String> {
        // Sequence defaults belong to serial columns, not to the domain model.
        raw_default
            .map(str::trim)
            .filter(|value| !value.is_empty() && !value.starts_with("nextval("))
            .map(str::to_string)
    }
}

fn postgres_types() -> Vec<DataType> {
    vec![
        DataType::new("bool"),
        DataType::new("bytea"),
        DataType::sized("bpchar"),
        DataType::sized("varchar"),
        DataType::new("text"),
        DataType::new("name"),
        DataType::new("int2"),
        DataType::new("int4"),
        DataType::new("int8"),
        DataType::new("oid"),
        DataType::new("float4"),
        DataType::new("float8"),
        DataType::decimal("numeric"),
        DataType::new("money"),
        DataType::new("date"),
        DataType::new("time"),
        DataType::new("timetz"),
        DataType::new("timestamp"),
        DataType::new("timestamptz"),
        DataType::new("interval"),
        DataType::sized("bit"),
        DataType::sized("varbit"),
        DataType::new("uuid"),
        DataType::new("json"),
        DataType::new("jsonb"),
        DataType::new("xml"),
        DataType::new("inet"),
        DataType::new("cidr"),
        DataType::new("macaddr"),
        DataType::new("tsvector"),
        DataType::new("tsquery"),
        DataType::new("point"),
    ]
}
