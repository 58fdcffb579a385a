// Copyright 2025 Cowboy AI, LLC.

//! Depreciation ledger handler

use super::{load_asset, Effects};
use crate::config::LifecycleConfig;
use crate::depreciation::{AssetDepreciation, DepreciationCharge};
use crate::downstream::AccountingEntry;
use crate::entity::{AggregateRoot, AssetId};
use crate::errors::DomainResult;
use crate::events::LifecycleEvent;
use crate::persistence::UnitOfWork;
use crate::tenant::TenantScoped;

pub(crate) fn record(
    uow: &mut UnitOfWork<'_>,
    config: &LifecycleConfig,
    asset_id: AssetId,
    charge: DepreciationCharge,
) -> DomainResult<Effects> {
    let mut asset = load_asset(uow, asset_id)?;
    let last = uow
        .rows::<AssetDepreciation>()
        .filter(|row| row.asset_id() == asset_id)
        .last()
        .cloned();

    let row = AssetDepreciation::record(&mut asset, last.as_ref(), charge)?;

    let mut effects = Effects::on(row.id()).event(LifecycleEvent::DepreciationRecorded {
        depreciation_id: row.id(),
        asset_id,
        method: row.method(),
        depreciation_date: row.depreciation_date(),
        depreciation_value: row.depreciation_value(),
        accumulated_depreciation: row.accumulated_depreciation(),
        remaining_value: row.remaining_value(),
    });
    effects.entries.push(AccountingEntry::depreciation(
        &config.accounts,
        asset.organization_id(),
        row.id().into(),
        row.depreciation_date(),
        row.depreciation_value(),
        asset.code(),
    ));

    uow.save(row)?;
    uow.save(asset)?;
    Ok(effects)
}
