// Copyright 2025 Cowboy AI, LLC.

//! Transfer workflow handlers

use super::asset::custody_changed;
use super::{ensure_none_active, load_asset, Effects};
use crate::config::{ExecutionModel, LifecycleConfig};
use crate::entity::{AggregateRoot, AssetId, TransferId, UserId};
use crate::errors::DomainResult;
use crate::events::LifecycleEvent;
use crate::persistence::UnitOfWork;
use crate::transfer::{AssetTransfer, TransferRequest};

pub(crate) fn create(
    uow: &mut UnitOfWork<'_>,
    asset_id: AssetId,
    request: TransferRequest,
) -> DomainResult<Effects> {
    let asset = load_asset(uow, asset_id)?;
    asset.ensure_active("transfer")?;
    ensure_none_active::<AssetTransfer>(uow, asset_id, |t| {
        t.asset_id() == asset_id && t.status().is_active()
    })?;

    let transfer = AssetTransfer::request(&asset, request)?;
    let effects = Effects::on(transfer.id()).event(LifecycleEvent::TransferRequested {
        transfer_id: transfer.id(),
        asset_id,
        transfer_type: transfer.transfer_type(),
        from: *transfer.source(),
        to: *transfer.destination(),
    });
    uow.save(transfer)?;
    Ok(effects)
}

pub(crate) fn approve(
    uow: &mut UnitOfWork<'_>,
    config: &LifecycleConfig,
    transfer_id: TransferId,
    approver_id: UserId,
) -> DomainResult<Effects> {
    let mut transfer = uow.load::<AssetTransfer>(transfer_id)?;
    let change = transfer.approve(approver_id)?;
    let mut effects =
        Effects::on(transfer_id).event(LifecycleEvent::transfer(transfer_id, transfer.asset_id(), &change));

    if config.execution_model == ExecutionModel::ImmediateOnApproval {
        execute(uow, &mut transfer, &mut effects)?;
    }
    uow.save(transfer)?;
    Ok(effects)
}

pub(crate) fn reject(
    uow: &mut UnitOfWork<'_>,
    transfer_id: TransferId,
    approver_id: UserId,
    reason: String,
) -> DomainResult<Effects> {
    let mut transfer = uow.load::<AssetTransfer>(transfer_id)?;
    let change = transfer.reject(approver_id, reason)?;
    let effects =
        Effects::on(transfer_id).event(LifecycleEvent::transfer(transfer_id, transfer.asset_id(), &change));
    uow.save(transfer)?;
    Ok(effects)
}

pub(crate) fn complete(uow: &mut UnitOfWork<'_>, transfer_id: TransferId) -> DomainResult<Effects> {
    let mut transfer = uow.load::<AssetTransfer>(transfer_id)?;
    let mut effects = Effects::on(transfer_id);
    execute(uow, &mut transfer, &mut effects)?;
    uow.save(transfer)?;
    Ok(effects)
}

pub(crate) fn cancel(
    uow: &mut UnitOfWork<'_>,
    transfer_id: TransferId,
    reason: String,
) -> DomainResult<Effects> {
    let mut transfer = uow.load::<AssetTransfer>(transfer_id)?;
    let change = transfer.cancel(reason)?;
    let effects =
        Effects::on(transfer_id).event(LifecycleEvent::transfer(transfer_id, transfer.asset_id(), &change));
    uow.save(transfer)?;
    Ok(effects)
}

// Moves custody and closes the transfer; the caller stages the transfer.
fn execute(
    uow: &mut UnitOfWork<'_>,
    transfer: &mut AssetTransfer,
    effects: &mut Effects,
) -> DomainResult<()> {
    let mut asset = load_asset(uow, transfer.asset_id())?;
    let change = transfer.complete(&mut asset)?;
    effects
        .events
        .push(LifecycleEvent::transfer(transfer.id(), asset.id(), &change));
    effects.events.push(custody_changed(&asset));
    uow.save(asset)
}
