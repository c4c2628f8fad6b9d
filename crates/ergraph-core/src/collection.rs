use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How names are compared inside a [`NamedCollection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseRule {
    #[default]
    Sensitive,
    Insensitive,
}

impl CaseRule {
    pub fn from_sensitivity(case_sensitive: bool) -> Self {
        if case_sensitive {
            CaseRule::Sensitive
        } else {
            CaseRule::Insensitive
        }
    }

    pub fn same(self, left: &str, right: &str) -> bool {
        match self {
            CaseRule::Sensitive => left == right,
            CaseRule::Insensitive => left.to_lowercase() == right.to_lowercase(),
        }
    }
}

/// Kind of entity held by a collection, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Domain,
    DefaultValue,
    Table,
    Attribute,
    Index,
    Relation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Domain => "domain",
            EntityKind::DefaultValue => "default value",
            EntityKind::Table => "table",
            EntityKind::Attribute => "attribute",
            EntityKind::Index => "index",
            EntityKind::Relation => "relation",
        };
        f.write_str(label)
    }
}

/// Entity with a stable id and a display name.
pub trait Named {
    type Id: Copy + Eq + fmt::Debug;

    const KIND: EntityKind;

    fn id(&self) -> Self::Id;

    fn name(&self) -> &str;
}

/// Ordered container enforcing name uniqueness under a [`CaseRule`].
///
/// Iteration follows insertion order.
#[derive(Debug, Clone)]
pub struct NamedCollection<T> {
    rule: CaseRule,
    items: Vec<T>,
}

impl<T: Named> NamedCollection<T> {
    pub fn new(rule: CaseRule) -> Self {
        Self {
            rule,
            items: Vec::new(),
        }
    }

    pub fn rule(&self) -> CaseRule {
        self.rule
    }

    /// Insert an item, rejecting names that already exist.
    pub fn add(&mut self, item: T) -> Result<T::Id> {
        if self.exists(item.name()) {
            return Err(Error::duplicate(T::KIND, item.name()));
        }
        let id = item.id();
        self.items.push(item);
        Ok(id)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&T> {
        self.items
            .iter()
            .find(|item| self.rule.same(item.name(), name))
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut T> {
        let rule = self.rule;
        self.items
            .iter_mut()
            .find(|item| rule.same(item.name(), name))
    }

    pub fn find_by_id(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn contains_id(&self, id: T::Id) -> bool {
        self.find_by_id(id).is_some()
    }

    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let position = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(position))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a NamedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
