// Copyright 2025 Cowboy AI, LLC.

//! Maintenance workflow
//!
//! ```text
//! Scheduled --start--> InProgress --complete--> Completed
//!     |                    |
//!   cancel              cancel
//! ```
//!
//! Maintenance is independent of custody. While a job is in progress the
//! asset reports `UnderMaintenance`; finishing or cancelling the job hands the
//! status back to custody.

use crate::asset::Asset;
use crate::entity::{AggregateRoot, AssetId, MaintenanceId, OrganizationId, RecordMeta, UserId};
use crate::errors::{require_amount, require_text, DomainError, DomainResult};
use crate::state_machine::{transition, MooreStateTransitions, State, StateTransition};
use crate::tenant::TenantScoped;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of a maintenance job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    /// Planned
    Scheduled,
    /// Work under way
    InProgress,
    /// Done (terminal)
    Completed,
    /// Called off (terminal)
    Cancelled,
}

impl State for MaintenanceStatus {
    fn name(&self) -> &'static str {
        match self {
            MaintenanceStatus::Scheduled => "Scheduled",
            MaintenanceStatus::InProgress => "InProgress",
            MaintenanceStatus::Completed => "Completed",
            MaintenanceStatus::Cancelled => "Cancelled",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, MaintenanceStatus::Completed | MaintenanceStatus::Cancelled)
    }
}

crate::define_moore_transitions!(MaintenanceStatus,
    MaintenanceStatus::Scheduled => [MaintenanceStatus::InProgress, MaintenanceStatus::Cancelled],
    MaintenanceStatus::InProgress => [MaintenanceStatus::Completed, MaintenanceStatus::Cancelled],
    MaintenanceStatus::Completed => [],
    MaintenanceStatus::Cancelled => [],
);

impl MaintenanceStatus {
    /// Scheduled or in progress: blocks another job on the same asset
    pub fn is_active(&self) -> bool {
        matches!(self, MaintenanceStatus::Scheduled | MaintenanceStatus::InProgress)
    }
}

/// Kind of upkeep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceType {
    /// Planned upkeep
    Preventive,
    /// Repair after a fault
    Corrective,
    /// Check without repair
    Inspection,
    /// Instrument calibration
    Calibration,
}

/// Input for scheduling maintenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MaintenanceRequest {
    /// Kind of upkeep
    pub maintenance_type: MaintenanceType,
    /// What is to be done
    pub description: String,
    /// Planned date
    pub scheduled_date: NaiveDate,
    /// Expected cost
    #[serde(default)]
    pub estimated_cost: Option<Decimal>,
}

/// Outcome reported when a job is finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MaintenanceOutcome {
    /// What was found or done
    pub result: String,
    /// What it cost
    pub actual_cost: Decimal,
    /// When the work was done; defaults to today
    #[serde(default)]
    pub actual_date: Option<NaiveDate>,
}

/// A maintenance job for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    id: MaintenanceId,
    asset_id: AssetId,
    organization_id: OrganizationId,
    maintenance_type: MaintenanceType,
    description: String,
    scheduled_date: NaiveDate,
    actual_date: Option<NaiveDate>,
    status: MaintenanceStatus,
    estimated_cost: Option<Decimal>,
    actual_cost: Option<Decimal>,
    performed_by: Option<UserId>,
    result: Option<String>,
    cancellation_reason: Option<String>,
    started_at: Option<DateTime<Utc>>,
    version: u64,
    /// Timestamps
    pub meta: RecordMeta,
}

impl MaintenanceSchedule {
    const ENTITY: &'static str = "MaintenanceSchedule";

    /// Validated constructor
    pub fn schedule(asset: &Asset, request: MaintenanceRequest) -> DomainResult<Self> {
        asset.ensure_active("schedule maintenance for")?;
        require_text("maintenance description", &request.description)?;
        if let Some(cost) = request.estimated_cost {
            require_amount("estimated cost", cost)?;
        }

        Ok(Self {
            id: MaintenanceId::new(),
            asset_id: asset.id(),
            organization_id: asset.organization_id(),
            maintenance_type: request.maintenance_type,
            description: request.description,
            scheduled_date: request.scheduled_date,
            actual_date: None,
            status: MaintenanceStatus::Scheduled,
            estimated_cost: request.estimated_cost,
            actual_cost: None,
            performed_by: None,
            result: None,
            cancellation_reason: None,
            started_at: None,
            version: 0,
            meta: RecordMeta::new(),
        })
    }

    /// Asset under maintenance
    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    /// Kind of upkeep
    pub fn maintenance_type(&self) -> MaintenanceType {
        self.maintenance_type
    }

    /// What is to be done
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Planned date
    pub fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_date
    }

    /// When the work was done
    pub fn actual_date(&self) -> Option<NaiveDate> {
        self.actual_date
    }

    /// Current status
    pub fn status(&self) -> MaintenanceStatus {
        self.status
    }

    /// Expected cost
    pub fn estimated_cost(&self) -> Option<Decimal> {
        self.estimated_cost
    }

    /// Reported cost
    pub fn actual_cost(&self) -> Option<Decimal> {
        self.actual_cost
    }

    /// Who does the work
    pub fn performed_by(&self) -> Option<UserId> {
        self.performed_by
    }

    /// Reported result
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Why the job was called off
    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    fn ensure_can(&self, target: MaintenanceStatus, action: &str) -> DomainResult<()> {
        if self.status.is_terminal() || !self.status.can_transition_to(&target) {
            return Err(DomainError::invalid_state(Self::ENTITY, self.status.name(), action));
        }
        Ok(())
    }

    fn ensure_owns(&self, asset: &Asset) -> DomainResult<()> {
        if asset.id() != self.asset_id {
            return Err(DomainError::invalid_value(format!(
                "maintenance {} does not belong to asset {}",
                self.id,
                asset.id()
            )));
        }
        Ok(())
    }

    /// Begin work; the asset enters `UnderMaintenance`
    pub fn start(
        &mut self,
        asset: &mut Asset,
        performer: UserId,
    ) -> DomainResult<StateTransition<MaintenanceStatus>> {
        self.ensure_owns(asset)?;
        self.ensure_can(MaintenanceStatus::InProgress, "start")?;
        asset.begin_maintenance()?;

        let record = transition(Self::ENTITY, &mut self.status, MaintenanceStatus::InProgress, "start")?;
        self.performed_by = Some(performer);
        self.started_at = Some(record.timestamp);
        self.meta.touch();
        Ok(record)
    }

    /// Finish work; the asset status follows custody again
    pub fn complete(
        &mut self,
        asset: &mut Asset,
        outcome: MaintenanceOutcome,
    ) -> DomainResult<StateTransition<MaintenanceStatus>> {
        self.ensure_owns(asset)?;
        self.ensure_can(MaintenanceStatus::Completed, "complete")?;
        require_text("maintenance result", &outcome.result)?;
        require_amount("actual cost", outcome.actual_cost)?;
        asset.end_maintenance()?;

        let record = transition(Self::ENTITY, &mut self.status, MaintenanceStatus::Completed, "complete")?;
        self.result = Some(outcome.result);
        self.actual_cost = Some(outcome.actual_cost);
        self.actual_date = Some(outcome.actual_date.unwrap_or_else(|| record.timestamp.date_naive()));
        self.meta.touch();
        Ok(record)
    }

    /// Call off a scheduled or running job
    ///
    /// A running job releases the asset from `UnderMaintenance` unless the
    /// asset has already been retired.
    pub fn cancel(
        &mut self,
        asset: &mut Asset,
        reason: impl Into<String>,
    ) -> DomainResult<StateTransition<MaintenanceStatus>> {
        let reason = reason.into();
        self.ensure_owns(asset)?;
        self.ensure_can(MaintenanceStatus::Cancelled, "cancel")?;
        require_text("cancellation reason", &reason)?;
        if self.status == MaintenanceStatus::InProgress && !asset.is_disposed() {
            asset.end_maintenance()?;
        }

        let record = transition(Self::ENTITY, &mut self.status, MaintenanceStatus::Cancelled, "cancel")?;
        self.cancellation_reason = Some(reason);
        self.meta.touch();
        Ok(record)
    }
}

impl AggregateRoot for MaintenanceSchedule {
    type Id = MaintenanceId;

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

impl TenantScoped for MaintenanceSchedule {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn entity_type() -> &'static str {
        Self::ENTITY
    }
}
