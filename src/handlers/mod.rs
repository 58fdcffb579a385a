// Copyright 2025 Cowboy AI, LLC.

//! Command handlers
//!
//! Each handler runs inside one unit of work: load, validate, mutate, stage.
//! It returns the [`Effects`] of the command, which the engine releases only
//! after the store committed. Handlers never publish anything themselves.

pub(crate) mod asset;
pub(crate) mod depreciation;
pub(crate) mod disposal;
pub(crate) mod maintenance;
pub(crate) mod transfer;

use crate::asset::Asset;
use crate::downstream::{AccountingEntry, BudgetCostEvent};
use crate::entity::AssetId;
use crate::errors::{DomainError, DomainResult};
use crate::events::LifecycleEvent;
use crate::persistence::{Stored, UnitOfWork};
use uuid::Uuid;

/// What a committed command hands downstream
#[derive(Debug, Clone, Default)]
pub(crate) struct Effects {
    pub aggregate_id: Uuid,
    pub events: Vec<LifecycleEvent>,
    pub entries: Vec<AccountingEntry>,
    pub costs: Vec<BudgetCostEvent>,
}

impl Effects {
    pub fn on(aggregate_id: impl Into<Uuid>) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            ..Self::default()
        }
    }

    pub fn event(mut self, event: LifecycleEvent) -> Self {
        self.events.push(event);
        self
    }
}

/// Load the asset a workflow record points at
pub(crate) fn load_asset(uow: &UnitOfWork<'_>, asset_id: AssetId) -> DomainResult<Asset> {
    uow.load::<Asset>(asset_id)
}

/// Refuse when a record of kind `R` is already active for the asset
pub(crate) fn ensure_none_active<R: Stored>(
    uow: &UnitOfWork<'_>,
    asset_id: AssetId,
    is_active_for: impl Fn(&R) -> bool,
) -> DomainResult<()> {
    if let Some(existing) = uow.find::<R>(is_active_for) {
        return Err(DomainError::conflict(format!(
            "asset {asset_id} already has an active {} ({})",
            R::entity_type(),
            existing.id()
        )));
    }
    Ok(())
}
