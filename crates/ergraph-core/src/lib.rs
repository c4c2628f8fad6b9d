//! Core model and contracts for ergraph.
//!
//! This crate defines the entity-relationship model rebuilt from database
//! metadata, the name-unique collections holding it, and the dialect
//! capabilities the reverse engineering engine relies on.

pub mod collection;
pub mod constraints;
pub mod dialect;
pub mod error;
pub mod ids;
pub mod model;
pub mod schema;
pub mod types;

pub use collection::{CaseRule, EntityKind, Named, NamedCollection};
pub use constraints::{CascadeType, Index, IndexType, Relation, rule_codes};
pub use dialect::{
    CastType, DataType, DataTypeCatalog, Dialect, DialectRegistry, GenericDialect,
    PostgresDialect, TypeParam,
};
pub use error::{Error, Result};
pub use ids::{AttributeId, DefaultValueId, DomainId, IndexId, RelationId, TableId};
pub use model::Model;
pub use schema::{Attribute, PROPERTY_REMARKS, Properties, SchemaEntry, Table, TableSource};
pub use types::{DefaultValue, Domain};
