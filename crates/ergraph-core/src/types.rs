use crate::collection::{EntityKind, Named};
use crate::ids::{DefaultValueId, DomainId};

/// Named, reusable type definition shared by attributes.
#[derive(Debug, Clone)]
pub struct Domain {
    id: DomainId,
    name: String,
    data_type: String,
}

impl Domain {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            id: DomainId::new(),
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Canonical type definition, e.g. `varchar(20)`.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }
}

impl Named for Domain {
    type Id = DomainId;

    const KIND: EntityKind = EntityKind::Domain;

    fn id(&self) -> DomainId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Named default expression shared by attributes.
#[derive(Debug, Clone)]
pub struct DefaultValue {
    id: DefaultValueId,
    name: String,
    expression: String,
}

impl DefaultValue {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            id: DefaultValueId::new(),
            name: name.into(),
            expression: expression.into(),
        }
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl Named for DefaultValue {
    type Id = DefaultValueId;

    const KIND: EntityKind = EntityKind::DefaultValue;

    fn id(&self) -> DefaultValueId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}
