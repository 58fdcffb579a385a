// Copyright 2025 Cowboy AI, LLC.

//! Asset registry handlers

use super::{load_asset, Effects};
use crate::asset::{Asset, NewAsset};
use crate::category::AssetCategory;
use crate::entity::{AggregateRoot, AssetId, CategoryId, DepartmentId, UserId};
use crate::errors::{DomainError, DomainResult};
use crate::events::LifecycleEvent;
use crate::persistence::UnitOfWork;
use rust_decimal::Decimal;

pub(crate) fn register_category(
    uow: &mut UnitOfWork<'_>,
    code: String,
    name: String,
    parent_id: Option<CategoryId>,
) -> DomainResult<Effects> {
    if let Some(parent_id) = parent_id {
        uow.load::<AssetCategory>(parent_id)?;
    }
    let category = AssetCategory::new(uow.scope().organization_id(), code, name, parent_id)?;
    if uow
        .find::<AssetCategory>(|c| c.code.eq_ignore_ascii_case(category.code.trim()))
        .is_some()
    {
        return Err(DomainError::conflict(format!(
            "category code {} already exists",
            category.code
        )));
    }

    let effects = Effects::on(category.id()).event(LifecycleEvent::CategoryRegistered {
        category_id: category.id(),
        code: category.code.clone(),
        parent_id,
    });
    uow.save(category)?;
    Ok(effects)
}

pub(crate) fn register_asset(uow: &mut UnitOfWork<'_>, new: NewAsset) -> DomainResult<Effects> {
    uow.load::<AssetCategory>(new.category_id)?;
    let asset = Asset::register(uow.scope().organization_id(), new)?;
    if uow
        .find::<Asset>(|a| a.code().eq_ignore_ascii_case(asset.code()))
        .is_some()
    {
        return Err(DomainError::conflict(format!(
            "asset code {} already exists",
            asset.code()
        )));
    }

    let effects = Effects::on(asset.id()).event(LifecycleEvent::AssetRegistered {
        asset_id: asset.id(),
        organization_id: uow.scope().organization_id(),
        code: asset.code().to_string(),
        original_cost: asset.financials().original_cost(),
    });
    uow.save(asset)?;
    Ok(effects)
}

pub(crate) fn update_financials(
    uow: &mut UnitOfWork<'_>,
    asset_id: AssetId,
    purchase_price: Decimal,
    original_cost: Decimal,
    current_value: Decimal,
) -> DomainResult<Effects> {
    let mut asset = load_asset(uow, asset_id)?;
    asset.update_financials(purchase_price, original_cost, current_value)?;
    uow.save(asset)?;
    Ok(Effects::on(asset_id).event(LifecycleEvent::AssetFinancialsUpdated {
        asset_id,
        purchase_price,
        original_cost,
        current_value,
    }))
}

/// Direct custody changes share one shape: load, mutate, stage, report
pub(crate) fn change_custody(
    uow: &mut UnitOfWork<'_>,
    asset_id: AssetId,
    change: impl FnOnce(&mut Asset) -> DomainResult<()>,
) -> DomainResult<Effects> {
    let mut asset = load_asset(uow, asset_id)?;
    change(&mut asset)?;
    let event = custody_changed(&asset);
    uow.save(asset)?;
    Ok(Effects::on(asset_id).event(event))
}

pub(crate) fn assign_to_user(
    uow: &mut UnitOfWork<'_>,
    asset_id: AssetId,
    user_id: UserId,
    department_id: Option<DepartmentId>,
) -> DomainResult<Effects> {
    change_custody(uow, asset_id, |asset| asset.assign_to_user(user_id, department_id))
}

pub(crate) fn unassign(uow: &mut UnitOfWork<'_>, asset_id: AssetId) -> DomainResult<Effects> {
    change_custody(uow, asset_id, Asset::unassign)
}

pub(crate) fn store_in_department(
    uow: &mut UnitOfWork<'_>,
    asset_id: AssetId,
    department_id: DepartmentId,
) -> DomainResult<Effects> {
    change_custody(uow, asset_id, |asset| asset.store_in_department(department_id))
}

pub(crate) fn custody_changed(asset: &Asset) -> LifecycleEvent {
    LifecycleEvent::AssetCustodyChanged {
        asset_id: asset.id(),
        custody: *asset.custody(),
        status: asset.status(),
    }
}
