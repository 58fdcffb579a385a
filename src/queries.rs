// Copyright 2025 Cowboy AI, LLC.

//! Tenant-scoped reads
//!
//! Queries never mutate. Lookups of a record outside the scope answer
//! `NotFound`, and history queries first require the asset itself to be
//! visible, so a foreign asset id yields `NotFound` rather than an empty list.

use crate::asset::Asset;
use crate::category::{AssetCategory, CategoryIndex};
use crate::depreciation::AssetDepreciation;
use crate::disposal::AssetDisposal;
use crate::entity::{AssetId, CategoryId, DisposalId, MaintenanceId, TransferId};
use crate::errors::DomainResult;
use crate::maintenance::MaintenanceSchedule;
use crate::persistence::{LifecycleStore, Stored, UnitOfWork};
use crate::tenant::TenantScope;
use crate::transfer::AssetTransfer;

/// Read side of the lifecycle store
pub struct LifecycleQueries<'s, S: LifecycleStore> {
    store: &'s S,
}

impl<'s, S: LifecycleStore> LifecycleQueries<'s, S> {
    /// Queries over a store
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    fn get<R: Stored>(&self, scope: TenantScope, id: R::Id) -> DomainResult<R> {
        self.store.read(scope, |uow| uow.load::<R>(id))?
    }

    fn history<R: Stored>(
        &self,
        scope: TenantScope,
        asset_id: AssetId,
        belongs: impl Fn(&R) -> bool,
    ) -> DomainResult<Vec<R>> {
        self.store.read(scope, |uow| {
            uow.load::<Asset>(asset_id)?;
            Ok(uow.rows::<R>().filter(|row| belongs(row)).cloned().collect())
        })?
    }

    /// Asset by id
    pub fn asset(&self, scope: TenantScope, id: AssetId) -> DomainResult<Asset> {
        self.get(scope, id)
    }

    /// Asset by code, case-insensitive
    pub fn asset_by_code(&self, scope: TenantScope, code: &str) -> DomainResult<Option<Asset>> {
        let code = code.trim();
        self.store
            .read(scope, |uow| uow.find::<Asset>(|a| a.code().eq_ignore_ascii_case(code)))
    }

    /// Every asset of the organization
    pub fn assets(&self, scope: TenantScope) -> DomainResult<Vec<Asset>> {
        self.store.read(scope, |uow| uow.rows::<Asset>().cloned().collect())
    }

    /// Category by id
    pub fn category(&self, scope: TenantScope, id: CategoryId) -> DomainResult<AssetCategory> {
        self.get(scope, id)
    }

    /// Direct children of a category
    pub fn category_children(
        &self,
        scope: TenantScope,
        id: CategoryId,
    ) -> DomainResult<Vec<AssetCategory>> {
        self.store.read(scope, |uow| {
            uow.load::<AssetCategory>(id)?;
            let index = CategoryIndex::build(uow.rows::<AssetCategory>());
            collect_categories(uow, index.children(id))
        })?
    }

    /// Every category below `id`, breadth first
    pub fn category_descendants(
        &self,
        scope: TenantScope,
        id: CategoryId,
    ) -> DomainResult<Vec<AssetCategory>> {
        self.store.read(scope, |uow| {
            uow.load::<AssetCategory>(id)?;
            let index = CategoryIndex::build(uow.rows::<AssetCategory>());
            collect_categories(uow, &index.descendants(id))
        })?
    }

    /// Transfer by id
    pub fn transfer(&self, scope: TenantScope, id: TransferId) -> DomainResult<AssetTransfer> {
        self.get(scope, id)
    }

    /// Every transfer of an asset, oldest first
    pub fn transfers_for_asset(
        &self,
        scope: TenantScope,
        asset_id: AssetId,
    ) -> DomainResult<Vec<AssetTransfer>> {
        self.history(scope, asset_id, |t: &AssetTransfer| t.asset_id() == asset_id)
    }

    /// The pending or approved transfer of an asset, if any
    pub fn active_transfer(
        &self,
        scope: TenantScope,
        asset_id: AssetId,
    ) -> DomainResult<Option<AssetTransfer>> {
        Ok(self
            .history(scope, asset_id, |t: &AssetTransfer| {
                t.asset_id() == asset_id && t.status().is_active()
            })?
            .into_iter()
            .next())
    }

    /// Disposal by id
    pub fn disposal(&self, scope: TenantScope, id: DisposalId) -> DomainResult<AssetDisposal> {
        self.get(scope, id)
    }

    /// Every disposal of an asset, oldest first
    pub fn disposals_for_asset(
        &self,
        scope: TenantScope,
        asset_id: AssetId,
    ) -> DomainResult<Vec<AssetDisposal>> {
        self.history(scope, asset_id, |d: &AssetDisposal| d.asset_id() == asset_id)
    }

    /// Maintenance job by id
    pub fn maintenance(
        &self,
        scope: TenantScope,
        id: MaintenanceId,
    ) -> DomainResult<MaintenanceSchedule> {
        self.get(scope, id)
    }

    /// Every maintenance job of an asset, oldest first
    pub fn maintenance_for_asset(
        &self,
        scope: TenantScope,
        asset_id: AssetId,
    ) -> DomainResult<Vec<MaintenanceSchedule>> {
        self.history(scope, asset_id, |m: &MaintenanceSchedule| m.asset_id() == asset_id)
    }

    /// Depreciation ledger of an asset, in recording order
    pub fn depreciation_history(
        &self,
        scope: TenantScope,
        asset_id: AssetId,
    ) -> DomainResult<Vec<AssetDepreciation>> {
        self.history(scope, asset_id, |r: &AssetDepreciation| r.asset_id() == asset_id)
    }
}

fn collect_categories(uow: &UnitOfWork<'_>, ids: &[CategoryId]) -> DomainResult<Vec<AssetCategory>> {
    ids.iter().map(|id| uow.load::<AssetCategory>(*id)).collect()
}
