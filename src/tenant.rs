// Copyright 2025 Cowboy AI, LLC.

//! Tenant scope guard
//!
//! Every read and write path takes a [`TenantScope`]. A record owned by
//! another organization is treated exactly like a record that does not exist:
//! the caller gets `NotFound`, never a permission error, so the existence of
//! foreign ids is not revealed.

use crate::entity::{OrganizationId, RecordMeta};
use crate::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Records that belong to exactly one organization
pub trait TenantScoped {
    /// Owning organization
    fn organization_id(&self) -> OrganizationId;

    /// Record metadata, used to hide soft-deleted records
    fn meta(&self) -> &RecordMeta;

    /// Entity type name used in errors and logs
    fn entity_type() -> &'static str;
}

/// The organization a command or query runs on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantScope {
    organization_id: OrganizationId,
}

impl TenantScope {
    /// Scope all operations to an organization
    pub fn new(organization_id: OrganizationId) -> Self {
        Self { organization_id }
    }

    /// The scoped organization
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Whether a record is visible in this scope
    pub fn owns<R: TenantScoped>(&self, record: &R) -> bool {
        record.organization_id() == self.organization_id && !record.meta().is_deleted()
    }

    /// The record if it is visible in this scope
    pub fn admit<R: TenantScoped>(&self, record: Option<R>) -> Option<R> {
        record.filter(|r| self.owns(r))
    }

    /// The record if it is visible in this scope, `NotFound` otherwise
    pub fn require<R: TenantScoped>(&self, record: Option<R>, id: impl ToString) -> DomainResult<R> {
        self.admit(record)
            .ok_or_else(|| DomainError::not_found(R::entity_type(), id))
    }

    /// Refuse to write a record owned by another organization
    ///
    /// Reported as `NotFound` for the same reason reads are.
    pub fn check_write<R: TenantScoped>(&self, record: &R, id: impl ToString) -> DomainResult<()> {
        if record.organization_id() != self.organization_id {
            return Err(DomainError::not_found(R::entity_type(), id));
        }
        Ok(())
    }
}

impl fmt::Display for TenantScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "org:{}", self.organization_id)
    }
}
