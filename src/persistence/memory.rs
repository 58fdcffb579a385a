// Copyright 2025 Cowboy AI, LLC.

//! In-memory lifecycle store
//!
//! A single mutex serializes transactions, which gives every command the
//! row-lock it needs for its check-then-act on the asset. The commit step
//! re-verifies the partial-unique constraints against the merged view
//! anyway, so a handler that forgets a check still cannot persist a second
//! active workflow.

use super::{merged, LifecycleStore, Stored, Tables, TransactionInput, TransactionState, UnitOfWork};
use crate::asset::Asset;
use crate::category::AssetCategory;
use crate::depreciation::AssetDepreciation;
use crate::disposal::AssetDisposal;
use crate::entity::{AggregateRoot, AssetId};
use crate::errors::{DomainError, DomainResult};
use crate::maintenance::MaintenanceSchedule;
use crate::tenant::{TenantScope, TenantScoped};
use crate::transfer::AssetTransfer;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Mutex-serialized store holding every table in memory
#[derive(Debug, Default)]
pub struct InMemoryLifecycleStore {
    tables: Mutex<Tables>,
    fail_next_commit: AtomicBool,
}

impl InMemoryLifecycleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next commit fail after the command has validated
    ///
    /// Used to prove that a failed commit of a two-aggregate write leaves
    /// both aggregates untouched.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Copy of the committed rows
    pub fn snapshot(&self) -> DomainResult<Tables> {
        Ok(self.lock().clone())
    }

    // Committed tables only change in `apply`, which cannot fail halfway, so
    // a panic while the lock is held leaves them consistent.
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit_checks(committed: &Tables, staged: &Tables) -> DomainResult<()> {
        versions_match::<AssetCategory>(committed, staged)?;
        versions_match::<Asset>(committed, staged)?;
        versions_match::<AssetTransfer>(committed, staged)?;
        versions_match::<AssetDisposal>(committed, staged)?;
        versions_match::<AssetDepreciation>(committed, staged)?;
        versions_match::<MaintenanceSchedule>(committed, staged)?;

        for asset in <Asset as Stored>::table(staged).values() {
            let f = asset.financials();
            if f.current_value() < Decimal::ZERO || f.current_value() > f.original_cost() {
                return Err(DomainError::Persistence(format!(
                    "asset {} violates 0 <= current_value <= original_cost",
                    asset.id()
                )));
            }
            let duplicates = merged::<Asset>(committed, staged)
                .filter(|other| {
                    other.organization_id() == asset.organization_id()
                        && other.code().eq_ignore_ascii_case(asset.code())
                })
                .count();
            if duplicates > 1 {
                return Err(DomainError::conflict(format!(
                    "asset code {} already exists",
                    asset.code()
                )));
            }
        }

        single_active::<AssetTransfer>(committed, staged, "transfer", |t| {
            t.status().is_active().then(|| t.asset_id())
        })?;
        single_active::<AssetDisposal>(committed, staged, "disposal", |d| {
            d.status().is_active().then(|| d.asset_id())
        })?;
        single_active::<MaintenanceSchedule>(committed, staged, "maintenance", |m| {
            m.status().is_active().then(|| m.asset_id())
        })?;

        references_own_asset::<AssetTransfer>(committed, staged, |t| t.asset_id())?;
        references_own_asset::<AssetDisposal>(committed, staged, |d| d.asset_id())?;
        references_own_asset::<AssetDepreciation>(committed, staged, |r| r.asset_id())?;
        references_own_asset::<MaintenanceSchedule>(committed, staged, |m| m.asset_id())?;
        Ok(())
    }

    fn apply(committed: &mut Tables, mut staged: Tables) {
        apply_table::<AssetCategory>(committed, &mut staged);
        apply_table::<Asset>(committed, &mut staged);
        apply_table::<AssetTransfer>(committed, &mut staged);
        apply_table::<AssetDisposal>(committed, &mut staged);
        apply_table::<AssetDepreciation>(committed, &mut staged);
        apply_table::<MaintenanceSchedule>(committed, &mut staged);
    }
}

// A staged row must have been loaded at the committed version.
fn versions_match<R: Stored>(committed: &Tables, staged: &Tables) -> DomainResult<()> {
    for (id, row) in R::table(staged) {
        if let Some(current) = R::table(committed).get(id) {
            if current.version() != row.version() {
                return Err(DomainError::conflict(format!(
                    "{} {} was modified concurrently (version {} != {})",
                    R::entity_type(),
                    id,
                    row.version(),
                    current.version()
                )));
            }
        }
    }
    Ok(())
}

fn single_active<R: Stored>(
    committed: &Tables,
    staged: &Tables,
    kind: &str,
    active_asset: impl Fn(&R) -> Option<AssetId>,
) -> DomainResult<()> {
    for row in R::table(staged).values() {
        let Some(asset_id) = active_asset(row) else {
            continue;
        };
        let count = merged::<R>(committed, staged)
            .filter(|other| active_asset(other) == Some(asset_id))
            .count();
        if count > 1 {
            return Err(DomainError::conflict(format!(
                "asset {asset_id} already has an active {kind}"
            )));
        }
    }
    Ok(())
}

fn references_own_asset<R: Stored>(
    committed: &Tables,
    staged: &Tables,
    asset_of: impl Fn(&R) -> AssetId,
) -> DomainResult<()> {
    for row in R::table(staged).values() {
        let asset_id = asset_of(row);
        let owner = merged::<Asset>(committed, staged)
            .find(|asset| asset.id() == asset_id)
            .map(|asset| asset.organization_id());
        if owner != Some(row.organization_id()) {
            return Err(DomainError::Persistence(format!(
                "{} {} references asset {} outside its organization",
                R::entity_type(),
                row.id(),
                asset_id
            )));
        }
    }
    Ok(())
}

fn apply_table<R: Stored>(committed: &mut Tables, staged: &mut Tables) {
    for (id, mut row) in R::table_mut(staged).drain(..) {
        row.increment_version();
        R::table_mut(committed).insert(id, row);
    }
}

impl LifecycleStore for InMemoryLifecycleStore {
    fn transaction<T, F>(&self, scope: TenantScope, work: F) -> DomainResult<T>
    where
        F: FnOnce(&mut UnitOfWork<'_>) -> DomainResult<T>,
    {
        let mut tables = self.lock();
        let mut state = TransactionState::Idle;
        state.advance(TransactionInput::Begin)?;

        let (outcome, staged) = {
            let mut uow = UnitOfWork::begin(scope, &tables);
            let outcome = work(&mut uow);
            (outcome, uow.into_staged())
        };

        let value = match outcome {
            Ok(value) => value,
            Err(err) => {
                state.advance(TransactionInput::Abort)?;
                debug!(%scope, staged = staged.len(), error = %err, "transaction rolled back");
                return Err(err);
            }
        };
        state.advance(TransactionInput::Validated)?;

        let checked = Self::commit_checks(&tables, &staged).and_then(|_| {
            if self.fail_next_commit.swap(false, Ordering::SeqCst) {
                Err(DomainError::Persistence("commit failed".to_string()))
            } else {
                Ok(())
            }
        });
        if let Err(err) = checked {
            state.advance(TransactionInput::CommitFailed)?;
            warn!(%scope, staged = staged.len(), error = %err, "commit refused, staged writes discarded");
            return Err(err);
        }

        let rows = staged.len();
        Self::apply(&mut tables, staged);
        state.advance(TransactionInput::Commit)?;
        debug!(%scope, rows, "transaction committed");
        Ok(value)
    }

    fn read<T, F>(&self, scope: TenantScope, query: F) -> DomainResult<T>
    where
        F: FnOnce(&UnitOfWork<'_>) -> T,
    {
        let tables = self.lock();
        let uow = UnitOfWork::begin(scope, &tables);
        Ok(query(&uow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::NewAsset;
    use crate::entity::{CategoryId, OrganizationId};
    use crate::value_objects::{AssetCondition, Custody};

    fn new_asset(org: OrganizationId, code: &str) -> Asset {
        Asset::register(
            org,
            NewAsset {
                code: code.to_string(),
                name: "Desk".to_string(),
                category_id: CategoryId::new(),
                purchase_price: Decimal::from(300),
                original_cost: Decimal::from(300),
                purchase_date: None,
                condition: AssetCondition::New,
                custody: Custody::Unassigned,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_commit_applies_and_bumps_version() {
        let store = InMemoryLifecycleStore::new();
        let org = OrganizationId::new();
        let scope = TenantScope::new(org);
        let asset = new_asset(org, "D-1");
        let id = asset.id();

        store.transaction(scope, |uow| uow.save(asset)).unwrap();

        let loaded = store.read(scope, |uow| uow.load::<Asset>(id)).unwrap().unwrap();
        assert_eq!(loaded.version(), 1);
    }

    #[test]
    fn test_error_discards_staged_writes() {
        let store = InMemoryLifecycleStore::new();
        let org = OrganizationId::new();
        let scope = TenantScope::new(org);

        let err = store
            .transaction(scope, |uow| -> DomainResult<()> {
                uow.save(new_asset(org, "D-1"))?;
                Err(DomainError::invalid_value("nope"))
            })
            .unwrap_err();
        assert!(err.is_invalid_value());
        assert!(store.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_injected_failure_discards_staged_writes() {
        let store = InMemoryLifecycleStore::new();
        let org = OrganizationId::new();
        let scope = TenantScope::new(org);

        store.fail_next_commit();
        let err = store
            .transaction(scope, |uow| uow.save(new_asset(org, "D-1")))
            .unwrap_err();
        assert!(err.is_persistence());
        assert!(store.snapshot().unwrap().is_empty());

        // the fault is one-shot
        store.transaction(scope, |uow| uow.save(new_asset(org, "D-1"))).unwrap();
        assert_eq!(store.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn test_panic_inside_transaction_does_not_wedge_the_store() {
        let store = InMemoryLifecycleStore::new();
        let org = OrganizationId::new();
        let scope = TenantScope::new(org);

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.transaction(scope, |uow| -> DomainResult<()> {
                uow.save(new_asset(org, "D-1"))?;
                panic!("handler blew up");
            })
        }));
        assert!(outcome.is_err());
        assert!(store.snapshot().unwrap().is_empty());

        store.transaction(scope, |uow| uow.save(new_asset(org, "D-2"))).unwrap();
        assert_eq!(store.snapshot().unwrap().len(), 1);
        assert_eq!(store.read(scope, |uow| uow.rows::<Asset>().count()).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_code_refused_at_commit() {
        let store = InMemoryLifecycleStore::new();
        let org = OrganizationId::new();
        let scope = TenantScope::new(org);

        store.transaction(scope, |uow| uow.save(new_asset(org, "D-1"))).unwrap();
        let err = store
            .transaction(scope, |uow| uow.save(new_asset(org, "d-1")))
            .unwrap_err();
        assert!(err.is_conflict());

        // same code in another organization is fine
        let other = OrganizationId::new();
        store
            .transaction(TenantScope::new(other), |uow| uow.save(new_asset(other, "D-1")))
            .unwrap();
    }

    #[test]
    fn test_foreign_rows_invisible_and_unwritable() {
        let store = InMemoryLifecycleStore::new();
        let org = OrganizationId::new();
        let asset = new_asset(org, "D-1");
        let id = asset.id();
        store.transaction(TenantScope::new(org), |uow| uow.save(asset.clone())).unwrap();

        let intruder = TenantScope::new(OrganizationId::new());
        let err = store.read(intruder, |uow| uow.load::<Asset>(id)).unwrap().unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.read(intruder, |uow| uow.rows::<Asset>().count()).unwrap(), 0);

        let err = store.transaction(intruder, |uow| uow.save(asset)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_stale_version_refused() {
        let store = InMemoryLifecycleStore::new();
        let org = OrganizationId::new();
        let scope = TenantScope::new(org);
        let asset = new_asset(org, "D-1");
        store.transaction(scope, |uow| uow.save(asset.clone())).unwrap();

        // `asset` is still at version 0, the committed row is at 1
        let err = store.transaction(scope, |uow| uow.save(asset)).unwrap_err();
        assert!(err.is_conflict());
    }
}
