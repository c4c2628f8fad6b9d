/// Parameter accepted by a data type in its definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeParam {
    /// Length or precision.
    Size,
    /// Decimal digits.
    Fraction,
}

/// Entry of a dialect's type catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    name: String,
    params: Vec<TypeParam>,
}

impl DataType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn sized(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: vec![TypeParam::Size],
        }
    }

    pub fn decimal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: vec![TypeParam::Size, TypeParam::Fraction],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeParam] {
        &self.params
    }

    /// Render the canonical type definition for the given parameters.
    ///
    /// Parameters are rendered in declaration order and stop at the first
    /// missing value, so `numeric` without a size stays `numeric`.
    pub fn create_type_definition_for(&self, size: Option<&str>, fraction: Option<&str>) -> String {
        let mut values = Vec::new();
        for param in &self.params {
            let value = match param {
                TypeParam::Size => size,
                TypeParam::Fraction => fraction,
            };
            match value.map(str::trim).filter(|value| !value.is_empty()) {
                Some(value) => values.push(value),
                None => break,
            }
        }

        if values.is_empty() {
            self.name.clone()
        } else {
            format!("{}({})", self.name, values.join(","))
        }
    }
}

/// Type names known to a dialect, looked up case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct DataTypeCatalog {
    types: Vec<DataType>,
}

impl DataTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing an entry of the same name.
    pub fn register(&mut self, data_type: DataType) {
        match self
            .types
            .iter_mut()
            .find(|known| known.name.eq_ignore_ascii_case(&data_type.name))
        {
            Some(known) => *known = data_type,
            None => self.types.push(data_type),
        }
    }

    pub fn find(&self, name: &str) -> Option<&DataType> {
        self.types
            .iter()
            .find(|known| known.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<DataType> for DataTypeCatalog {
    fn from_iter<I: IntoIterator<Item = DataType>>(iter: I) -> Self {
        let mut catalog = DataTypeCatalog::new();
        for data_type in iter {
            catalog.register(data_type);
        }
        catalog
    }
}
