// Copyright 2025 Cowboy AI, LLC.

//! # CIM Domain Asset
//!
//! Lifecycle orchestration for physical assets owned by one organization.
//!
//! The crate holds the coupled state machines and financial invariants of
//! five aggregates:
//! - **Asset**: identity, custody, book value and lifecycle status (root)
//! - **Transfer**: approval pipeline for moving custody
//! - **Disposal**: approval pipeline for retiring an asset
//! - **Depreciation**: append-only ledger of value reductions
//! - **Maintenance**: scheduled upkeep, independent of custody
//!
//! ## Design Principles
//!
//! 1. **Tenant isolation**: every read and write takes a [`TenantScope`]; a
//!    foreign id is indistinguishable from a missing one
//! 2. **Controlled state**: workflow statuses are enums with explicit
//!    transition tables ([`MooreStateTransitions`])
//! 3. **Atomic commands**: each command is one load, validate, mutate, commit
//!    unit; two-aggregate writes commit together or not at all
//! 4. **One-way downstream**: accounting and budget collaborators receive
//!    data after commit and never influence legality
//!
//! Commands enter through [`LifecycleEngine::dispatch`]; state is read back
//! through [`LifecycleQueries`].

#![warn(missing_docs)]

mod asset;
mod category;
mod commands;
mod config;
mod depreciation;
mod disposal;
mod downstream;
mod engine;
mod entity;
mod errors;
mod events;
mod handlers;
mod maintenance;
pub mod persistence;
mod queries;
pub mod state_machine;
mod tenant;
mod transfer;
mod value_objects;

pub use asset::{Asset, AssetStatus, NewAsset};
pub use category::{AssetCategory, CategoryIndex};
pub use commands::{command_schema, CommandAcknowledgment, LifecycleCommand};
pub use config::{AccountCodes, ExecutionModel, LifecycleConfig};
pub use depreciation::{
    AssetDepreciation, DepreciationCharge, DepreciationMethod, DepreciationParams,
};
pub use disposal::{AssetDisposal, DisposalExecution, DisposalRequest, DisposalStatus, DisposalType};
pub use downstream::{
    AccountingEntry, AccountingSink, BudgetCostEvent, BudgetReport, BudgetTracker, CostKind,
    DownstreamError, InMemoryAccountingSink, InMemoryBudgetTracker, LoggingDownstream,
    ReferenceType,
};
pub use engine::LifecycleEngine;
pub use entity::{
    AggregateRoot, AssetId, CategoryId, DepartmentId, DepreciationId, DisposalId, EntityId,
    MaintenanceId, OrganizationId, RecordMeta, TransferId, UserId,
};
pub use errors::{DomainError, DomainResult};
pub use events::{
    DomainEvent, EventPublisher, LifecycleEvent, RecordingEventPublisher, TracingEventPublisher,
};
pub use maintenance::{
    MaintenanceOutcome, MaintenanceRequest, MaintenanceSchedule, MaintenanceStatus,
    MaintenanceType,
};
pub use persistence::{InMemoryLifecycleStore, LifecycleStore, UnitOfWork};
pub use queries::LifecycleQueries;
pub use state_machine::{MealyStateTransitions, MooreStateTransitions, State, StateTransition};
pub use tenant::{TenantScope, TenantScoped};
pub use transfer::{AssetTransfer, TransferRequest, TransferStatus, TransferType};
pub use value_objects::{AssetCondition, Custody, CustodyEndpoint, Financials};

/// Marker types behind the typed ids
pub mod markers {
    pub use crate::entity::{
        AssetMarker, CategoryMarker, DepartmentMarker, DepreciationMarker, DisposalMarker,
        MaintenanceMarker, OrganizationMarker, TransferMarker, UserMarker,
    };
}
