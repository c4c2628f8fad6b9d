use thiserror::Error;

use crate::collection::EntityKind;

/// Core error type shared across ergraph crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A column type is not part of the dialect's type catalog.
    #[error("unknown data type: {0}")]
    UnknownDataType(String),
    /// An entity expected in the model could not be found.
    #[error("referential integrity error: {0}")]
    ReferentialIntegrity(String),
    /// An entity with the same name already exists in its collection.
    #[error("constraint violation: {kind} `{name}` already exists")]
    DuplicateName { kind: EntityKind, name: String },
    /// A table already carries a primary key index.
    #[error("constraint violation: table `{0}` already has a primary key")]
    PrimaryKeyExists(String),
    /// The dialect rejected a name.
    #[error("constraint violation: invalid name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },
    /// No free domain name was found within the probe bound.
    #[error("constraint violation: no free domain name for `{name}` after {probes} attempts")]
    DomainNamesExhausted { name: String, probes: usize },
    /// No free default value name was found within the probe bound.
    #[error(
        "constraint violation: no free default value name for `{name}` after {probes} attempts"
    )]
    DefaultValueNamesExhausted { name: String, probes: usize },
    /// No dialect is registered under the requested name.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),
    /// The model was built for another dialect than the engine's.
    #[error("dialect mismatch: engine uses `{expected}`, model uses `{found}`")]
    DialectMismatch { expected: String, found: String },
    /// Database error or metadata source failure.
    #[error("database error: {0}")]
    Db(String),
}

impl Error {
    pub fn duplicate(kind: EntityKind, name: impl Into<String>) -> Self {
        Error::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Error::ReferentialIntegrity(message.into())
    }

    /// True for every error raised by a name or key collision in the model.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::DuplicateName { .. }
                | Error::PrimaryKeyExists(_)
                | Error::InvalidName { .. }
                | Error::DomainNamesExhausted { .. }
                | Error::DefaultValueNamesExhausted { .. }
        )
    }
}

/// Convenience alias for results returned by ergraph crates.
pub type Result<T> = std::result::Result<T, Error>;
