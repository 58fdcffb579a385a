// Copyright 2025 Cowboy AI, LLC.

//! Lifecycle events
//!
//! Events are facts about committed state changes. Handlers collect them while
//! the transaction runs; the engine hands them to the [`EventPublisher`] only
//! after the commit succeeded, so a published event always describes
//! persisted state.

use crate::asset::AssetStatus;
use crate::depreciation::DepreciationMethod;
use crate::disposal::{DisposalStatus, DisposalType};
use crate::entity::{
    AssetId, CategoryId, DepreciationId, DisposalId, MaintenanceId, OrganizationId, TransferId,
};
use crate::maintenance::{MaintenanceStatus, MaintenanceType};
use crate::state_machine::StateTransition;
use crate::transfer::{TransferStatus, TransferType};
use crate::value_objects::{Custody, CustodyEndpoint};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

/// Base trait for all domain events
///
/// # Examples
///
/// ```rust
/// use cim_domain_asset::{AssetId, DomainEvent, LifecycleEvent};
///
/// let asset_id = AssetId::new();
/// let event = LifecycleEvent::AssetDisposed { asset_id };
///
/// assert_eq!(event.event_type(), "AssetDisposed");
/// assert_eq!(event.aggregate_id(), *asset_id.as_uuid());
/// ```
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Get the aggregate ID this event relates to
    fn aggregate_id(&self) -> Uuid;

    /// Get the event type name
    fn event_type(&self) -> &'static str;

    /// Get the schema version
    fn version(&self) -> &'static str {
        "v1"
    }
}

/// Everything the lifecycle engine reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LifecycleEvent {
    /// A category was registered
    CategoryRegistered {
        /// New category
        category_id: CategoryId,
        /// Category code
        code: String,
        /// Parent category
        parent_id: Option<CategoryId>,
    },
    /// An asset was registered
    AssetRegistered {
        /// New asset
        asset_id: AssetId,
        /// Owning organization
        organization_id: OrganizationId,
        /// Asset code
        code: String,
        /// Cost basis
        original_cost: Decimal,
    },
    /// Financial values were corrected directly
    AssetFinancialsUpdated {
        /// Corrected asset
        asset_id: AssetId,
        /// Price paid
        purchase_price: Decimal,
        /// Cost basis
        original_cost: Decimal,
        /// Book value
        current_value: Decimal,
    },
    /// Custody of an asset changed
    AssetCustodyChanged {
        /// Moved asset
        asset_id: AssetId,
        /// New custody
        custody: Custody,
        /// Status after the change
        status: AssetStatus,
    },
    /// An asset reached its terminal state
    AssetDisposed {
        /// Retired asset
        asset_id: AssetId,
    },
    /// A transfer was requested
    TransferRequested {
        /// New transfer
        transfer_id: TransferId,
        /// Asset to move
        asset_id: AssetId,
        /// Kind of transfer
        transfer_type: TransferType,
        /// Custody before
        from: CustodyEndpoint,
        /// Custody after
        to: CustodyEndpoint,
    },
    /// A transfer changed status
    TransferTransitioned {
        /// Transfer
        transfer_id: TransferId,
        /// Asset it moves
        asset_id: AssetId,
        /// Previous status
        from: TransferStatus,
        /// New status
        to: TransferStatus,
        /// When
        at: DateTime<Utc>,
    },
    /// A disposal was requested
    DisposalRequested {
        /// New disposal
        disposal_id: DisposalId,
        /// Asset to retire
        asset_id: AssetId,
        /// How the asset leaves
        disposal_type: DisposalType,
        /// Proceeds
        disposal_value: Decimal,
        /// Cost of disposing
        disposal_cost: Decimal,
    },
    /// A disposal changed status
    DisposalTransitioned {
        /// Disposal
        disposal_id: DisposalId,
        /// Asset it retires
        asset_id: AssetId,
        /// Previous status
        from: DisposalStatus,
        /// New status
        to: DisposalStatus,
        /// When
        at: DateTime<Utc>,
    },
    /// A disposal was executed and its figures fixed
    DisposalExecuted {
        /// Disposal
        disposal_id: DisposalId,
        /// Retired asset
        asset_id: AssetId,
        /// Book value at disposal
        book_value: Decimal,
        /// Proceeds minus cost minus book value
        net_gain_loss: Decimal,
    },
    /// A ledger row was appended
    DepreciationRecorded {
        /// New row
        depreciation_id: DepreciationId,
        /// Depreciated asset
        asset_id: AssetId,
        /// How the amount was computed
        method: DepreciationMethod,
        /// Effective date
        depreciation_date: NaiveDate,
        /// Amount charged
        depreciation_value: Decimal,
        /// Total charged so far
        accumulated_depreciation: Decimal,
        /// Book value after the charge
        remaining_value: Decimal,
    },
    /// A maintenance job was scheduled
    MaintenanceScheduled {
        /// New job
        maintenance_id: MaintenanceId,
        /// Asset to maintain
        asset_id: AssetId,
        /// Kind of upkeep
        maintenance_type: MaintenanceType,
        /// Planned date
        scheduled_date: NaiveDate,
    },
    /// A maintenance job changed status
    MaintenanceTransitioned {
        /// Job
        maintenance_id: MaintenanceId,
        /// Asset it concerns
        asset_id: AssetId,
        /// Previous status
        from: MaintenanceStatus,
        /// New status
        to: MaintenanceStatus,
        /// When
        at: DateTime<Utc>,
    },
}

impl LifecycleEvent {
    pub(crate) fn transfer(
        transfer_id: TransferId,
        asset_id: AssetId,
        change: &StateTransition<TransferStatus>,
    ) -> Self {
        LifecycleEvent::TransferTransitioned {
            transfer_id,
            asset_id,
            from: change.from,
            to: change.to,
            at: change.timestamp,
        }
    }

    pub(crate) fn disposal(
        disposal_id: DisposalId,
        asset_id: AssetId,
        change: &StateTransition<DisposalStatus>,
    ) -> Self {
        LifecycleEvent::DisposalTransitioned {
            disposal_id,
            asset_id,
            from: change.from,
            to: change.to,
            at: change.timestamp,
        }
    }

    pub(crate) fn maintenance(
        maintenance_id: MaintenanceId,
        asset_id: AssetId,
        change: &StateTransition<MaintenanceStatus>,
    ) -> Self {
        LifecycleEvent::MaintenanceTransitioned {
            maintenance_id,
            asset_id,
            from: change.from,
            to: change.to,
            at: change.timestamp,
        }
    }

    /// The asset the event concerns, if any
    pub fn asset_id(&self) -> Option<AssetId> {
        match self {
            LifecycleEvent::CategoryRegistered { .. } => None,
            LifecycleEvent::AssetRegistered { asset_id, .. }
            | LifecycleEvent::AssetFinancialsUpdated { asset_id, .. }
            | LifecycleEvent::AssetCustodyChanged { asset_id, .. }
            | LifecycleEvent::AssetDisposed { asset_id }
            | LifecycleEvent::TransferRequested { asset_id, .. }
            | LifecycleEvent::TransferTransitioned { asset_id, .. }
            | LifecycleEvent::DisposalRequested { asset_id, .. }
            | LifecycleEvent::DisposalTransitioned { asset_id, .. }
            | LifecycleEvent::DisposalExecuted { asset_id, .. }
            | LifecycleEvent::DepreciationRecorded { asset_id, .. }
            | LifecycleEvent::MaintenanceScheduled { asset_id, .. }
            | LifecycleEvent::MaintenanceTransitioned { asset_id, .. } => Some(*asset_id),
        }
    }
}

impl DomainEvent for LifecycleEvent {
    fn aggregate_id(&self) -> Uuid {
        match self {
            LifecycleEvent::CategoryRegistered { category_id, .. } => category_id.into(),
            LifecycleEvent::AssetRegistered { asset_id, .. }
            | LifecycleEvent::AssetFinancialsUpdated { asset_id, .. }
            | LifecycleEvent::AssetCustodyChanged { asset_id, .. }
            | LifecycleEvent::AssetDisposed { asset_id } => asset_id.into(),
            LifecycleEvent::TransferRequested { transfer_id, .. }
            | LifecycleEvent::TransferTransitioned { transfer_id, .. } => transfer_id.into(),
            LifecycleEvent::DisposalRequested { disposal_id, .. }
            | LifecycleEvent::DisposalTransitioned { disposal_id, .. }
            | LifecycleEvent::DisposalExecuted { disposal_id, .. } => disposal_id.into(),
            LifecycleEvent::DepreciationRecorded { depreciation_id, .. } => depreciation_id.into(),
            LifecycleEvent::MaintenanceScheduled { maintenance_id, .. }
            | LifecycleEvent::MaintenanceTransitioned { maintenance_id, .. } => maintenance_id.into(),
        }
    }

    fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::CategoryRegistered { .. } => "CategoryRegistered",
            LifecycleEvent::AssetRegistered { .. } => "AssetRegistered",
            LifecycleEvent::AssetFinancialsUpdated { .. } => "AssetFinancialsUpdated",
            LifecycleEvent::AssetCustodyChanged { .. } => "AssetCustodyChanged",
            LifecycleEvent::AssetDisposed { .. } => "AssetDisposed",
            LifecycleEvent::TransferRequested { .. } => "TransferRequested",
            LifecycleEvent::TransferTransitioned { .. } => "TransferTransitioned",
            LifecycleEvent::DisposalRequested { .. } => "DisposalRequested",
            LifecycleEvent::DisposalTransitioned { .. } => "DisposalTransitioned",
            LifecycleEvent::DisposalExecuted { .. } => "DisposalExecuted",
            LifecycleEvent::DepreciationRecorded { .. } => "DepreciationRecorded",
            LifecycleEvent::MaintenanceScheduled { .. } => "MaintenanceScheduled",
            LifecycleEvent::MaintenanceTransitioned { .. } => "MaintenanceTransitioned",
        }
    }
}

/// Event publisher trait for handlers to emit events
///
/// Called after commit. An error is logged by the engine and never undoes
/// the committed change.
pub trait EventPublisher: Send + Sync {
    /// Publish the events of one command
    fn publish_events(&self, events: &[LifecycleEvent], command_id: Uuid) -> Result<(), String>;
}

/// Publisher that only writes events to the trace log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish_events(&self, events: &[LifecycleEvent], command_id: Uuid) -> Result<(), String> {
        for event in events {
            debug!(
                %command_id,
                event_type = event.event_type(),
                aggregate_id = %event.aggregate_id(),
                "lifecycle event"
            );
        }
        Ok(())
    }
}

/// Publisher that keeps every event for later inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingEventPublisher {
    published: Arc<RwLock<Vec<(LifecycleEvent, Uuid)>>>,
}

impl RecordingEventPublisher {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event published so far, with its command id
    pub fn published(&self) -> Vec<(LifecycleEvent, Uuid)> {
        self.published
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Event type names published so far
    pub fn event_types(&self) -> Vec<&'static str> {
        self.published()
            .iter()
            .map(|(event, _)| event.event_type())
            .collect()
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish_events(&self, events: &[LifecycleEvent], command_id: Uuid) -> Result<(), String> {
        let mut published = self
            .published
            .write()
            .map_err(|_| "event recorder lock poisoned".to_string())?;
        published.extend(events.iter().cloned().map(|event| (event, command_id)));
        Ok(())
    }
}
