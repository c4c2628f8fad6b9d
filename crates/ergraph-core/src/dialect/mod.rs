//! Vendor capabilities consumed by the reverse engineering engine.

mod datatype;
mod generic;
mod postgres;
mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collection::CaseRule;
use crate::constraints::CascadeType;
use crate::error::{Error, Result};

pub use datatype::{DataType, DataTypeCatalog, TypeParam};
pub use generic::GenericDialect;
pub use postgres::PostgresDialect;
pub use registry::DialectRegistry;

/// Longest identifier accepted by the default name check.
pub const MAX_NAME_LENGTH: usize = 128;

/// How identifiers reported by the database are normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastType {
    LowerCase,
    UpperCase,
    #[default]
    DontCast,
}

impl CastType {
    pub fn cast(self, identifier: &str) -> String {
        match self {
            CastType::LowerCase => identifier.to_lowercase(),
            CastType::UpperCase => identifier.to_uppercase(),
            CastType::DontCast => identifier.to_string(),
        }
    }
}

/// Vendor-specific behavior. Every hook except the type catalog has a
/// default suitable for a plain JDBC-style database.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Unique name used for registry lookup.
    fn name(&self) -> &str;

    fn data_types(&self) -> &DataTypeCatalog;

    fn cast_type(&self) -> CastType {
        CastType::DontCast
    }

    fn is_case_sensitive(&self) -> bool {
        true
    }

    fn supports_schema_information(&self) -> bool {
        false
    }

    fn case_rule(&self) -> CaseRule {
        CaseRule::from_sensitivity(self.is_case_sensitive())
    }

    /// Normalize an identifier reported by the database.
    fn cast(&self, identifier: &str) -> String {
        self.cast_type().cast(identifier)
    }

    /// Rewrite a driver type name before the catalog lookup.
    fn convert_column_type(&self, type_name: &str) -> String {
        type_name.to_string()
    }

    fn data_type(&self, type_name: &str) -> Option<&DataType> {
        self.data_types().find(&self.convert_column_type(type_name))
    }

    /// Table types passed to the table listing.
    fn table_types(&self) -> Vec<String> {
        vec!["TABLE".to_string()]
    }

    fn is_valid_table(&self, _table_name: &str, _table_type: &str) -> bool {
        true
    }

    /// Default expression to attach to a column, if any.
    fn create_default_value(
        &self,
        _column_name: &str,
        _raw_default: Option<&str>,
    ) -> Option<String> {
        None
    }

    fn cascade_type(&self, rule_code: i32) -> CascadeType {
        CascadeType::from_rule_code(rule_code)
    }

    fn check_name(&self, name: &str) -> Result<()> {
        let reason = if name.trim().is_empty() {
            Some("name must not be empty".to_string())
        } else if name.contains('\0') {
            Some("name contains a null byte".to_string())
        } else if name.chars().count() > MAX_NAME_LENGTH {
            Some(format!("name exceeds {MAX_NAME_LENGTH} characters"))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(Error::InvalidName {
                name: name.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casts_identifiers() {
        assert_eq!(CastType::UpperCase.cast("orders"), "ORDERS");
        assert_eq!(CastType::LowerCase.cast("Orders"), "orders");
        assert_eq!(CastType::DontCast.cast("Orders"), "Orders");
    }

    #[test]
    fn default_name_check_rejects_overlong_names() {
        let dialect = GenericDialect::standard();
        assert!(dialect.check_name("ORDERS").is_ok());
        assert!(dialect.check_name(&"X".repeat(MAX_NAME_LENGTH + 1)).is_err());
        assert!(dialect.check_name("a\0b").is_err());
    }
}
