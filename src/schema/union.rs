//! Union schemas

use std::collections::HashMap;

use super::{Schema, SchemaKind};
use crate::error::{SchemaError, SchemaResult};

/// An ordered list of branches with distinct discriminants
#[derive(Debug, Clone)]
pub struct UnionSchema {
    branches: Vec<Schema>,
    index: HashMap<String, usize>,
}

impl UnionSchema {
    pub fn new(branches: Vec<Schema>) -> SchemaResult<Self> {
        let mut index = HashMap::with_capacity(branches.len());
        for (position, branch) in branches.iter().enumerate() {
            if matches!(branch.kind(), SchemaKind::Union(_)) {
                return Err(SchemaError::invalid(format!("Nested union: {}", branch)));
            }
            let discriminant = branch.discriminant();
            if index.insert(discriminant.clone(), position).is_some() {
                return Err(SchemaError::DuplicateUnionBranch(discriminant));
            }
        }
        Ok(Self { branches, index })
    }

    pub fn branches(&self) -> &[Schema] {
        &self.branches
    }

    /// Position of the branch with this discriminant
    pub fn position_of(&self, discriminant: &str) -> Option<usize> {
        self.index.get(discriminant).copied()
    }

    pub fn branch(&self, discriminant: &str) -> Option<&Schema> {
        self.position_of(discriminant).map(|i| &self.branches[i])
    }

    pub fn is_nullable(&self) -> bool {
        self.index.contains_key("null")
    }
}
