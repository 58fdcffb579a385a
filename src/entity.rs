// Copyright 2025 Cowboy AI, LLC.

//! Entity identity, record metadata and the aggregate root contract

use chrono::{DateTime, Utc};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// A typed entity ID using phantom types for type safety
///
/// The phantom type parameter keeps ids of different entity kinds apart at
/// compile time, so a transfer id can never be passed where an asset id is
/// expected. Serialized as the bare UUID.
///
/// # Examples
///
/// ```rust
/// use cim_domain_asset::{AssetId, TransferId};
///
/// let asset_id = AssetId::new();
/// let transfer_id = TransferId::new();
///
/// // These are different types - won't compile if mixed up:
/// // let _: AssetId = transfer_id; // ERROR!
/// assert_ne!(asset_id.as_uuid(), transfer_id.as_uuid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId<T> {
    id: Uuid,
    #[serde(skip)]
    _phantom: PhantomData<T>,
}

impl<T> EntityId<T> {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            _phantom: PhantomData,
        }
    }

    /// Create an entity ID from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.id
    }
}

impl<T> fmt::Display for EntityId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> Default for EntityId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<EntityId<T>> for Uuid {
    fn from(id: EntityId<T>) -> Self {
        id.id
    }
}

impl<T> From<&EntityId<T>> for Uuid {
    fn from(id: &EntityId<T>) -> Self {
        id.id
    }
}

impl<T> JsonSchema for EntityId<T> {
    fn schema_name() -> String {
        "EntityId".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        Uuid::json_schema(gen)
    }
}

/// Marker trait for aggregate roots
///
/// Every lifecycle entity is its own aggregate: Asset is the root the
/// workflows reference by id, and each workflow record is persisted
/// separately. The version increments on every committed change.
pub trait AggregateRoot: Sized {
    /// The type of ID for this aggregate
    type Id: Copy + Eq + std::hash::Hash + fmt::Display + Send + Sync;

    /// Get the aggregate's ID
    fn id(&self) -> Self::Id;

    /// Get the aggregate's version for optimistic concurrency
    fn version(&self) -> u64;

    /// Increment the version
    fn increment_version(&mut self);
}

/// Creation, update and soft-delete timestamps carried by every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// When this record was created
    pub created_at: DateTime<Utc>,
    /// When this record was last updated
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; deleted records are invisible to scoped reads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RecordMeta {
    /// Metadata for a record created now
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Update the record's timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether the record carries a soft-delete marker
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

// Marker types for entity IDs
/// Marker for organizations (tenants)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganizationMarker;

/// Marker for departments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepartmentMarker;

/// Marker for users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserMarker;

/// Marker for asset categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryMarker;

/// Marker for assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetMarker;

/// Marker for asset transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferMarker;

/// Marker for asset disposals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisposalMarker;

/// Marker for depreciation ledger rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DepreciationMarker;

/// Marker for maintenance schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaintenanceMarker;

/// Organization (tenant) identifier
pub type OrganizationId = EntityId<OrganizationMarker>;
/// Department identifier
pub type DepartmentId = EntityId<DepartmentMarker>;
/// User identifier
pub type UserId = EntityId<UserMarker>;
/// Asset category identifier
pub type CategoryId = EntityId<CategoryMarker>;
/// Asset identifier
pub type AssetId = EntityId<AssetMarker>;
/// Asset transfer identifier
pub type TransferId = EntityId<TransferMarker>;
/// Asset disposal identifier
pub type DisposalId = EntityId<DisposalMarker>;
/// Depreciation ledger row identifier
pub type DepreciationId = EntityId<DepreciationMarker>;
/// Maintenance schedule identifier
pub type MaintenanceId = EntityId<MaintenanceMarker>;
