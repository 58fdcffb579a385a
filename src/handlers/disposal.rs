// Copyright 2025 Cowboy AI, LLC.

//! Disposal workflow handlers
//!
//! Executing a disposal is the widest write in the engine: the disposal, the
//! asset, and every open transfer or maintenance job of the asset change in
//! one commit.

use super::{ensure_none_active, load_asset, Effects};
use crate::config::{ExecutionModel, LifecycleConfig};
use crate::disposal::{AssetDisposal, DisposalRequest};
use crate::downstream::{AccountingEntry, BudgetCostEvent, CostKind};
use crate::entity::{AggregateRoot, AssetId, DisposalId, UserId};
use crate::errors::DomainResult;
use crate::events::LifecycleEvent;
use crate::maintenance::MaintenanceSchedule;
use crate::persistence::UnitOfWork;
use crate::tenant::TenantScoped;
use crate::transfer::AssetTransfer;

const CASCADE_REASON: &str = "asset disposed";

pub(crate) fn create(
    uow: &mut UnitOfWork<'_>,
    asset_id: AssetId,
    request: DisposalRequest,
) -> DomainResult<Effects> {
    let asset = load_asset(uow, asset_id)?;
    asset.ensure_active("dispose")?;
    ensure_none_active::<AssetDisposal>(uow, asset_id, |d| {
        d.asset_id() == asset_id && d.status().is_active()
    })?;

    let disposal = AssetDisposal::request(&asset, request)?;
    let effects = Effects::on(disposal.id()).event(LifecycleEvent::DisposalRequested {
        disposal_id: disposal.id(),
        asset_id,
        disposal_type: disposal.disposal_type(),
        disposal_value: disposal.disposal_value(),
        disposal_cost: disposal.disposal_cost(),
    });
    uow.save(disposal)?;
    Ok(effects)
}

pub(crate) fn approve(
    uow: &mut UnitOfWork<'_>,
    config: &LifecycleConfig,
    disposal_id: DisposalId,
    approver_id: UserId,
) -> DomainResult<Effects> {
    let mut disposal = uow.load::<AssetDisposal>(disposal_id)?;
    let change = disposal.approve(approver_id)?;
    let mut effects =
        Effects::on(disposal_id).event(LifecycleEvent::disposal(disposal_id, disposal.asset_id(), &change));

    if config.execution_model == ExecutionModel::ImmediateOnApproval {
        execute(uow, config, &mut disposal, &mut effects)?;
    }
    uow.save(disposal)?;
    Ok(effects)
}

pub(crate) fn reject(
    uow: &mut UnitOfWork<'_>,
    disposal_id: DisposalId,
    approver_id: UserId,
    reason: String,
) -> DomainResult<Effects> {
    let mut disposal = uow.load::<AssetDisposal>(disposal_id)?;
    let change = disposal.reject(approver_id, reason)?;
    let effects =
        Effects::on(disposal_id).event(LifecycleEvent::disposal(disposal_id, disposal.asset_id(), &change));
    uow.save(disposal)?;
    Ok(effects)
}

pub(crate) fn complete(
    uow: &mut UnitOfWork<'_>,
    config: &LifecycleConfig,
    disposal_id: DisposalId,
) -> DomainResult<Effects> {
    let mut disposal = uow.load::<AssetDisposal>(disposal_id)?;
    let mut effects = Effects::on(disposal_id);
    execute(uow, config, &mut disposal, &mut effects)?;
    uow.save(disposal)?;
    Ok(effects)
}

pub(crate) fn cancel(
    uow: &mut UnitOfWork<'_>,
    disposal_id: DisposalId,
    reason: String,
) -> DomainResult<Effects> {
    let mut disposal = uow.load::<AssetDisposal>(disposal_id)?;
    let change = disposal.cancel(reason)?;
    let effects =
        Effects::on(disposal_id).event(LifecycleEvent::disposal(disposal_id, disposal.asset_id(), &change));
    uow.save(disposal)?;
    Ok(effects)
}

// Retires the asset and closes everything still open on it; the caller
// stages the disposal.
fn execute(
    uow: &mut UnitOfWork<'_>,
    config: &LifecycleConfig,
    disposal: &mut AssetDisposal,
    effects: &mut Effects,
) -> DomainResult<()> {
    let asset_id = disposal.asset_id();
    let mut asset = load_asset(uow, asset_id)?;
    let department_id = asset.current_department_id();

    let open_transfer =
        uow.find::<AssetTransfer>(|t| t.asset_id() == asset_id && t.status().is_active());
    if let Some(mut transfer) = open_transfer {
        let change = transfer.cancel(CASCADE_REASON)?;
        effects
            .events
            .push(LifecycleEvent::transfer(transfer.id(), asset_id, &change));
        uow.save(transfer)?;
    }

    let open_job =
        uow.find::<MaintenanceSchedule>(|m| m.asset_id() == asset_id && m.status().is_active());
    if let Some(mut job) = open_job {
        let change = job.cancel(&mut asset, CASCADE_REASON)?;
        effects
            .events
            .push(LifecycleEvent::maintenance(job.id(), asset_id, &change));
        uow.save(job)?;
    }

    let execution = disposal.complete(&mut asset)?;
    effects
        .events
        .push(LifecycleEvent::disposal(disposal.id(), asset_id, &execution.transition));
    effects.events.push(LifecycleEvent::DisposalExecuted {
        disposal_id: disposal.id(),
        asset_id,
        book_value: execution.book_value,
        net_gain_loss: execution.net_gain_loss,
    });
    effects.events.push(LifecycleEvent::AssetDisposed { asset_id });

    effects.entries.push(AccountingEntry::disposal(
        &config.accounts,
        asset.organization_id(),
        disposal.id().into(),
        disposal.disposal_date(),
        execution.net_gain_loss,
        asset.code(),
    ));
    effects.costs.push(BudgetCostEvent {
        organization_id: asset.organization_id(),
        department_id,
        fiscal_year: config.fiscal_year(disposal.disposal_date()),
        kind: CostKind::Disposal,
        amount: disposal.disposal_cost(),
        reference_id: disposal.id().into(),
        incurred_on: disposal.disposal_date(),
    });

    uow.save(asset)
}
