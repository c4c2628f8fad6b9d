use super::{CastType, DataType, DataTypeCatalog, Dialect};

/// Configurable dialect for databases without dedicated support.
#[derive(Debug, Clone)]
pub struct GenericDialect {
    name: String,
    cast_type: CastType,
    case_sensitive: bool,
    schema_information: bool,
    column_defaults: bool,
    table_types: Vec<String>,
    excluded_tables: Vec<String>,
    data_types: DataTypeCatalog,
}

impl GenericDialect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cast_type: CastType::DontCast,
            case_sensitive: true,
            schema_information: false,
            column_defaults: false,
            table_types: vec!["TABLE".to_string()],
            excluded_tables: Vec::new(),
            data_types: DataTypeCatalog::new(),
        }
    }

    /// ANSI types, case-insensitive names, no schema support.
    pub fn standard() -> Self {
        Self::new("generic")
            .case_insensitive()
            .with_types(standard_types())
    }

    pub fn with_cast_type(mut self, cast_type: CastType) -> Self {
        self.cast_type = cast_type;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn with_schema_information(mut self) -> Self {
        self.schema_information = true;
        self
    }

    /// Keep column defaults reported by the driver as model default values.
    pub fn with_column_defaults(mut self) -> Self {
        self.column_defaults = true;
        self
    }

    pub fn with_table_types<I, S>(mut self, table_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table_types = table_types.into_iter().map(Into::into).collect();
        self
    }

    /// Tables listed here are left out of a run, compared with the case rule.
    pub fn with_excluded_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_tables = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_types.register(data_type);
        self
    }

    pub fn with_types(mut self, data_types: impl IntoIterator<Item = DataType>) -> Self {
        for data_type in data_types {
            self.data_types.register(data_type);
        }
        self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &str {
        &self.name
    }

    fn data_types(&self) -> &DataTypeCatalog {
        &self.data_types
    }

    fn cast_type(&self) -> CastType {
        self.cast_type
    }

    fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn supports_schema_information(&self) -> bool {
        self.schema_information
    }

    fn table_types(&self) -> Vec<String> {
        self.table_types.clone()
    }

    fn is_valid_table(&self, table_name: &str, _table_type: &str) -> bool {
        let case_rule = self.case_rule();
        !self
            .excluded_tables
            .iter()
            .any(|excluded| case_rule.same(excluded, table_name))
    }

    fn create_default_value(
        &self,
        _column_name: &str,
        raw_default: Option<&str>,
    ) -> Option<String> {
        if !self.column_defaults {
            return None;
        }
        raw_default
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

fn standard_types() -> Vec<DataType> {
    vec![
        DataType::sized("CHAR"),
        DataType::sized("VARCHAR"),
        DataType::new("CLOB"),
        DataType::sized("BINARY"),
        DataType::sized("VARBINARY"),
        DataType::new("BLOB"),
        DataType::new("BOOLEAN"),
        DataType::new("SMALLINT"),
        DataType::new("INTEGER"),
        DataType::new("BIGINT"),
        DataType::decimal("DECIMAL"),
        DataType::decimal("NUMERIC"),
        DataType::new("REAL"),
        DataType::new("DOUBLE"),
        DataType::sized("FLOAT"),
        DataType::new("DATE"),
        DataType::new("TIME"),
        DataType::new("TIMESTAMP"),
    ]
}
