// Copyright 2025 Cowboy AI, LLC.

//! # Persistence boundary
//!
//! Every command runs inside one [`LifecycleStore::transaction`]. The closure
//! receives a [`UnitOfWork`]: reads see the committed rows overlaid with the
//! rows staged so far, and writes are staged only. When the closure returns
//! `Ok` the store re-checks its constraints and applies every staged row at
//! once; on any failure it applies none of them. This is what lets
//! `CompleteTransfer` and `RecordDepreciation` write two aggregates without
//! ever leaving one of them behind.
//!
//! ## Components
//!
//! - **UnitOfWork**: tenant-scoped reads, staged writes
//! - **LifecycleStore**: transaction boundary and commit-time constraints
//! - **InMemoryLifecycleStore**: mutex-serialized implementation
//! - **TransactionState**: Mealy machine tracking each unit of work

pub mod memory;
pub mod transaction_state;

pub use memory::InMemoryLifecycleStore;
pub use transaction_state::{TransactionInput, TransactionState};

use crate::asset::Asset;
use crate::category::AssetCategory;
use crate::depreciation::AssetDepreciation;
use crate::disposal::AssetDisposal;
use crate::entity::AggregateRoot;
use crate::errors::DomainResult;
use crate::maintenance::MaintenanceSchedule;
use crate::tenant::{TenantScope, TenantScoped};
use crate::transfer::AssetTransfer;
use indexmap::IndexMap;

/// One table per aggregate, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Tables {
    categories: IndexMap<<AssetCategory as AggregateRoot>::Id, AssetCategory>,
    assets: IndexMap<<Asset as AggregateRoot>::Id, Asset>,
    transfers: IndexMap<<AssetTransfer as AggregateRoot>::Id, AssetTransfer>,
    disposals: IndexMap<<AssetDisposal as AggregateRoot>::Id, AssetDisposal>,
    depreciations: IndexMap<<AssetDepreciation as AggregateRoot>::Id, AssetDepreciation>,
    maintenance: IndexMap<<MaintenanceSchedule as AggregateRoot>::Id, MaintenanceSchedule>,
}

impl Tables {
    /// Whether no row is present in any table
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.assets.is_empty()
            && self.transfers.is_empty()
            && self.disposals.is_empty()
            && self.depreciations.is_empty()
            && self.maintenance.is_empty()
    }

    /// Total number of rows
    pub fn len(&self) -> usize {
        self.categories.len()
            + self.assets.len()
            + self.transfers.len()
            + self.disposals.len()
            + self.depreciations.len()
            + self.maintenance.len()
    }
}

/// An aggregate the store keeps a table for
pub trait Stored: AggregateRoot + TenantScoped + Clone + Send + Sync + 'static {
    /// The table holding this aggregate
    fn table(tables: &Tables) -> &IndexMap<Self::Id, Self>;

    /// The table holding this aggregate, mutably
    fn table_mut(tables: &mut Tables) -> &mut IndexMap<Self::Id, Self>;
}

macro_rules! stored {
    ($ty:ty, $field:ident) => {
        impl Stored for $ty {
            fn table(tables: &Tables) -> &IndexMap<Self::Id, Self> {
                &tables.$field
            }

            fn table_mut(tables: &mut Tables) -> &mut IndexMap<Self::Id, Self> {
                &mut tables.$field
            }
        }
    };
}

stored!(AssetCategory, categories);
stored!(Asset, assets);
stored!(AssetTransfer, transfers);
stored!(AssetDisposal, disposals);
stored!(AssetDepreciation, depreciations);
stored!(MaintenanceSchedule, maintenance);

/// Rows of one table as they would look after `staged` is applied
///
/// Unscoped: callers that serve a tenant filter with [`TenantScope::owns`].
pub(crate) fn merged<'t, R: Stored>(
    committed: &'t Tables,
    staged: &'t Tables,
) -> impl Iterator<Item = &'t R> + 't {
    let overlay = R::table(staged);
    R::table(committed)
        .iter()
        .filter(move |(id, _)| !overlay.contains_key(*id))
        .map(|(_, row)| row)
        .chain(overlay.values())
}

/// Reads and staged writes of one transaction, confined to one tenant
pub struct UnitOfWork<'a> {
    scope: TenantScope,
    committed: &'a Tables,
    staged: Tables,
}

impl<'a> UnitOfWork<'a> {
    pub(crate) fn begin(scope: TenantScope, committed: &'a Tables) -> Self {
        Self {
            scope,
            committed,
            staged: Tables::default(),
        }
    }

    /// The tenant this unit of work is confined to
    pub fn scope(&self) -> TenantScope {
        self.scope
    }

    /// Load a record visible in scope, `NotFound` otherwise
    pub fn load<R: Stored>(&self, id: R::Id) -> DomainResult<R> {
        let row = R::table(&self.staged)
            .get(&id)
            .or_else(|| R::table(self.committed).get(&id))
            .cloned();
        self.scope.require(row, id)
    }

    /// All records of a kind visible in scope
    pub fn rows<R: Stored>(&self) -> impl Iterator<Item = &R> + '_ {
        let scope = self.scope;
        merged::<R>(self.committed, &self.staged).filter(move |row| scope.owns(*row))
    }

    /// First visible record matching a predicate
    pub fn find<R: Stored>(&self, predicate: impl Fn(&R) -> bool) -> Option<R> {
        self.rows::<R>().find(|row| predicate(row)).cloned()
    }

    /// Stage a write; applied only if the whole transaction commits
    pub fn save<R: Stored>(&mut self, record: R) -> DomainResult<()> {
        self.scope.check_write(&record, record.id())?;
        R::table_mut(&mut self.staged).insert(record.id(), record);
        Ok(())
    }

    /// Number of staged rows
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub(crate) fn into_staged(self) -> Tables {
        self.staged
    }
}

/// Transactional storage for the lifecycle aggregates
pub trait LifecycleStore: Send + Sync {
    /// Run `work` as one atomic unit in `scope`
    ///
    /// Staged writes are applied only if `work` returns `Ok` and the commit
    /// checks pass. Any error leaves storage exactly as it was.
    fn transaction<T, F>(&self, scope: TenantScope, work: F) -> DomainResult<T>
    where
        F: FnOnce(&mut UnitOfWork<'_>) -> DomainResult<T>;

    /// Run a read-only closure against a consistent snapshot in `scope`
    fn read<T, F>(&self, scope: TenantScope, query: F) -> DomainResult<T>
    where
        F: FnOnce(&UnitOfWork<'_>) -> T;
}
