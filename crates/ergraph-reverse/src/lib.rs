//! Reverse engineering of database metadata into an ergraph [`Model`].
//!
//! A [`ReverseEngineer`] reads scopes, tables, columns, keys and indexes
//! through a [`MetadataSource`] and fills the model in two passes: every
//! table first, then the relations between them.

pub mod context;
pub mod domains;
pub mod engine;
pub mod mock;
pub mod notifier;
pub mod options;
pub mod postgres;
pub mod relations;
pub mod source;
pub mod tables;

pub use context::Context;
pub use domains::{MAX_NAME_PROBES, candidate_names, resolve_domain};
pub use engine::{Phase, ReverseEngineer, RunSummary, Stage};
pub use mock::{MockSource, MockTable, Query, QueryRecord};
pub use notifier::{NoopNotifier, Notifier, ProgressEvent, TracingNotifier};
pub use options::ReverseEngineeringOptions;
pub use postgres::PgMetadataSource;
pub use relations::build_relations;
pub use source::{
    MetadataSource, RawColumn, RawImportedKey, RawIndexColumn, RawPrimaryKeyColumn, RawTable,
    RawTypeInfo,
};
pub use tables::{IndexOutcome, TableOutcome, reverse_engineer_table};

pub use ergraph_core::Model;
