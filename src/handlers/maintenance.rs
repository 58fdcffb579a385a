// Copyright 2025 Cowboy AI, LLC.

//! Maintenance workflow handlers

use super::{ensure_none_active, load_asset, Effects};
use crate::config::LifecycleConfig;
use crate::downstream::{BudgetCostEvent, CostKind};
use crate::entity::{AggregateRoot, AssetId, MaintenanceId, UserId};
use crate::errors::DomainResult;
use crate::events::LifecycleEvent;
use crate::maintenance::{MaintenanceOutcome, MaintenanceRequest, MaintenanceSchedule};
use crate::persistence::UnitOfWork;
use crate::tenant::TenantScoped;

pub(crate) fn create(
    uow: &mut UnitOfWork<'_>,
    asset_id: AssetId,
    request: MaintenanceRequest,
) -> DomainResult<Effects> {
    let asset = load_asset(uow, asset_id)?;
    asset.ensure_active("schedule maintenance for")?;
    ensure_none_active::<MaintenanceSchedule>(uow, asset_id, |m| {
        m.asset_id() == asset_id && m.status().is_active()
    })?;

    let job = MaintenanceSchedule::schedule(&asset, request)?;
    let effects = Effects::on(job.id()).event(LifecycleEvent::MaintenanceScheduled {
        maintenance_id: job.id(),
        asset_id,
        maintenance_type: job.maintenance_type(),
        scheduled_date: job.scheduled_date(),
    });
    uow.save(job)?;
    Ok(effects)
}

pub(crate) fn start(
    uow: &mut UnitOfWork<'_>,
    maintenance_id: MaintenanceId,
    performer_id: UserId,
) -> DomainResult<Effects> {
    let mut job = uow.load::<MaintenanceSchedule>(maintenance_id)?;
    let mut asset = load_asset(uow, job.asset_id())?;
    let change = job.start(&mut asset, performer_id)?;

    let effects = Effects::on(maintenance_id)
        .event(LifecycleEvent::maintenance(maintenance_id, asset.id(), &change));
    uow.save(job)?;
    uow.save(asset)?;
    Ok(effects)
}

pub(crate) fn complete(
    uow: &mut UnitOfWork<'_>,
    config: &LifecycleConfig,
    maintenance_id: MaintenanceId,
    outcome: MaintenanceOutcome,
) -> DomainResult<Effects> {
    let mut job = uow.load::<MaintenanceSchedule>(maintenance_id)?;
    let mut asset = load_asset(uow, job.asset_id())?;
    let change = job.complete(&mut asset, outcome)?;

    let mut effects = Effects::on(maintenance_id)
        .event(LifecycleEvent::maintenance(maintenance_id, asset.id(), &change));
    if let (Some(amount), Some(incurred_on)) = (job.actual_cost(), job.actual_date()) {
        effects.costs.push(BudgetCostEvent {
            organization_id: asset.organization_id(),
            department_id: asset.current_department_id(),
            fiscal_year: config.fiscal_year(incurred_on),
            kind: CostKind::Maintenance,
            amount,
            reference_id: maintenance_id.into(),
            incurred_on,
        });
    }

    uow.save(job)?;
    uow.save(asset)?;
    Ok(effects)
}

pub(crate) fn cancel(
    uow: &mut UnitOfWork<'_>,
    maintenance_id: MaintenanceId,
    reason: String,
) -> DomainResult<Effects> {
    let mut job = uow.load::<MaintenanceSchedule>(maintenance_id)?;
    let mut asset = load_asset(uow, job.asset_id())?;
    let change = job.cancel(&mut asset, reason)?;

    let effects = Effects::on(maintenance_id)
        .event(LifecycleEvent::maintenance(maintenance_id, asset.id(), &change));
    uow.save(job)?;
    uow.save(asset)?;
    Ok(effects)
}
