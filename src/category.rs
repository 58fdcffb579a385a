// Copyright 2025 Cowboy AI, LLC.

//! Asset categories
//!
//! A category knows only its parent id. Children are computed on demand from
//! a [`CategoryIndex`], an adjacency index keyed by parent id that the caller
//! builds from whatever categories it has loaded.

use crate::entity::{AggregateRoot, CategoryId, OrganizationId, RecordMeta};
use crate::errors::{require_text, DomainError, DomainResult};
use crate::tenant::TenantScoped;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// A classification for assets (e.g. "IT Equipment / Laptops")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCategory {
    id: CategoryId,
    organization_id: OrganizationId,
    /// Short code, e.g. `IT-LAPTOP`
    pub code: String,
    /// Display name
    pub name: String,
    parent_id: Option<CategoryId>,
    version: u64,
    /// Timestamps
    pub meta: RecordMeta,
}

impl AssetCategory {
    /// Validated constructor
    pub fn new(
        organization_id: OrganizationId,
        code: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<CategoryId>,
    ) -> DomainResult<Self> {
        Self::with_id(CategoryId::new(), organization_id, code, name, parent_id)
    }

    /// Validated constructor with a caller-chosen id
    pub fn with_id(
        id: CategoryId,
        organization_id: OrganizationId,
        code: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<CategoryId>,
    ) -> DomainResult<Self> {
        let code = code.into();
        let name = name.into();
        require_text("category code", &code)?;
        require_text("category name", &name)?;
        if parent_id == Some(id) {
            return Err(DomainError::invalid_value("a category cannot be its own parent"));
        }
        Ok(Self {
            id,
            organization_id,
            code,
            name,
            parent_id,
            version: 0,
            meta: RecordMeta::new(),
        })
    }

    /// Parent category, if any
    pub fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }
}

impl AggregateRoot for AssetCategory {
    type Id = CategoryId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn increment_version(&mut self) {
        self.version += 1;
    }
}

impl TenantScoped for AssetCategory {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn entity_type() -> &'static str {
        "AssetCategory"
    }
}

/// Adjacency index from parent id to child ids
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    children: IndexMap<CategoryId, Vec<CategoryId>>,
    parents: IndexMap<CategoryId, Option<CategoryId>>,
}

impl CategoryIndex {
    /// Build the index from a set of categories
    pub fn build<'a>(categories: impl IntoIterator<Item = &'a AssetCategory>) -> Self {
        let mut index = Self::default();
        for category in categories {
            index.insert(category);
        }
        index
    }

    /// Add one category to the index
    pub fn insert(&mut self, category: &AssetCategory) {
        self.parents.insert(category.id(), category.parent_id());
        if let Some(parent) = category.parent_id() {
            self.children.entry(parent).or_default().push(category.id());
        }
    }

    /// Direct children of a category
    pub fn children(&self, id: CategoryId) -> &[CategoryId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All categories below `id`, breadth first
    pub fn descendants(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut seen = HashSet::from([id]);
        let mut queue: VecDeque<CategoryId> = self.children(id).iter().copied().collect();
        let mut out = Vec::new();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            queue.extend(self.children(next).iter().copied());
        }
        out
    }

    /// Whether re-parenting `id` under `new_parent` would create a cycle
    pub fn would_create_cycle(&self, id: CategoryId, new_parent: CategoryId) -> bool {
        if id == new_parent {
            return true;
        }
        let mut seen = HashSet::new();
        let mut cursor = Some(new_parent);
        while let Some(current) = cursor {
            if current == id {
                return true;
            }
            if !seen.insert(current) {
                // pre-existing loop that does not pass through `id`
                return false;
            }
            cursor = self.parents.get(&current).copied().flatten();
        }
        false
    }
}
