// Copyright 2025 Cowboy AI, LLC.

//! Downstream collaborators: accounting and budget
//!
//! Both receive data one way. The engine computes the amounts (net gain or
//! loss, depreciation charge, disposal and maintenance cost) and sends them
//! after commit; nothing they answer can make a lifecycle command fail.

use crate::config::AccountCodes;
use crate::entity::{DepartmentId, OrganizationId};
use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Failure reported by a downstream collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownstreamError {
    /// The collaborator could not be reached
    #[error("downstream unavailable: {0}")]
    Unavailable(String),

    /// The collaborator refused the record
    #[error("downstream rejected record: {0}")]
    Rejected(String),
}

/// What an accounting entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    /// Net gain or loss of an executed disposal
    AssetDisposal,
    /// A depreciation ledger row
    AssetDepreciation,
}

/// A double-entry line sent to the accounting ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingEntry {
    /// Owning organization
    pub organization_id: OrganizationId,
    /// Non-negative amount
    pub amount: Decimal,
    /// Debited account code
    pub debit_account: String,
    /// Credited account code
    pub credit_account: String,
    /// Kind of source record
    pub reference_type: ReferenceType,
    /// Id of the source record
    pub reference_id: Uuid,
    /// Posting date
    pub entry_date: NaiveDate,
    /// Free text
    pub description: String,
}

impl AccountingEntry {
    /// Entry for a depreciation charge
    pub fn depreciation(
        accounts: &AccountCodes,
        organization_id: OrganizationId,
        reference_id: Uuid,
        entry_date: NaiveDate,
        amount: Decimal,
        asset_code: &str,
    ) -> Self {
        Self {
            organization_id,
            amount,
            debit_account: accounts.depreciation_expense.clone(),
            credit_account: accounts.accumulated_depreciation.clone(),
            reference_type: ReferenceType::AssetDepreciation,
            reference_id,
            entry_date,
            description: format!("Depreciation of asset {asset_code}"),
        }
    }

    /// Entry for the net result of a disposal
    ///
    /// A gain (or break-even) credits the gain account, a loss debits the
    /// loss account; the amount is always the absolute value.
    pub fn disposal(
        accounts: &AccountCodes,
        organization_id: OrganizationId,
        reference_id: Uuid,
        entry_date: NaiveDate,
        net_gain_loss: Decimal,
        asset_code: &str,
    ) -> Self {
        let (debit_account, credit_account, label) = if net_gain_loss >= Decimal::ZERO {
            (&accounts.disposal_clearing, &accounts.gain_on_disposal, "Gain")
        } else {
            (&accounts.loss_on_disposal, &accounts.disposal_clearing, "Loss")
        };
        Self {
            organization_id,
            amount: net_gain_loss.abs(),
            debit_account: debit_account.clone(),
            credit_account: credit_account.clone(),
            reference_type: ReferenceType::AssetDisposal,
            reference_id,
            entry_date,
            description: format!("{label} on disposal of asset {asset_code}"),
        }
    }
}

/// Receives accounting entries; never read back by the engine
pub trait AccountingSink: Send + Sync {
    /// Post one entry
    fn post_entry(&self, entry: &AccountingEntry) -> Result<(), DownstreamError>;
}

/// What a budget cost stems from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostKind {
    /// Actual cost of a completed maintenance job
    Maintenance,
    /// Cost of executing a disposal
    Disposal,
}

/// A cost reported to the budget plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCostEvent {
    /// Owning organization
    pub organization_id: OrganizationId,
    /// Department charged; `None` when the asset had no department
    pub department_id: Option<DepartmentId>,
    /// Fiscal year, named by the calendar year it starts in
    pub fiscal_year: i32,
    /// Source of the cost
    pub kind: CostKind,
    /// Non-negative amount
    pub amount: Decimal,
    /// Id of the source record
    pub reference_id: Uuid,
    /// Date the cost was incurred
    pub incurred_on: NaiveDate,
}

/// Budget position after a cost was recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetReport {
    /// Department charged
    pub department_id: Option<DepartmentId>,
    /// Fiscal year
    pub fiscal_year: i32,
    /// Total spent in this department and year
    pub spent: Decimal,
    /// Planned limit, if one is known
    pub limit: Option<Decimal>,
    /// Spent exceeds the limit; reported, never enforced
    pub over_budget: bool,
}

/// Receives cost events keyed by department and fiscal year
pub trait BudgetTracker: Send + Sync {
    /// Record a cost and report the resulting position
    fn record_cost(&self, event: &BudgetCostEvent) -> Result<BudgetReport, DownstreamError>;
}

/// Collaborator that only writes to the trace log
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingDownstream;

impl AccountingSink for LoggingDownstream {
    fn post_entry(&self, entry: &AccountingEntry) -> Result<(), DownstreamError> {
        debug!(
            reference_id = %entry.reference_id,
            amount = %entry.amount,
            debit = %entry.debit_account,
            credit = %entry.credit_account,
            "accounting entry"
        );
        Ok(())
    }
}

impl BudgetTracker for LoggingDownstream {
    fn record_cost(&self, event: &BudgetCostEvent) -> Result<BudgetReport, DownstreamError> {
        debug!(
            reference_id = %event.reference_id,
            amount = %event.amount,
            fiscal_year = event.fiscal_year,
            "budget cost"
        );
        Ok(BudgetReport {
            department_id: event.department_id,
            fiscal_year: event.fiscal_year,
            spent: event.amount,
            limit: None,
            over_budget: false,
        })
    }
}

/// Accounting sink that keeps entries in memory
#[derive(Debug, Default)]
pub struct InMemoryAccountingSink {
    entries: Mutex<Vec<AccountingEntry>>,
    unavailable: AtomicBool,
}

impl InMemoryAccountingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse (or accept again) every following entry
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Entries posted so far
    pub fn entries(&self) -> Vec<AccountingEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl AccountingSink for InMemoryAccountingSink {
    fn post_entry(&self, entry: &AccountingEntry) -> Result<(), DownstreamError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DownstreamError::Unavailable("accounting ledger offline".to_string()));
        }
        self.entries
            .lock()
            .map_err(|_| DownstreamError::Unavailable("accounting sink lock poisoned".to_string()))?
            .push(entry.clone());
        Ok(())
    }
}

type BudgetKey = (OrganizationId, Option<DepartmentId>, i32);

#[derive(Debug, Default)]
struct BudgetBook {
    limits: IndexMap<BudgetKey, Decimal>,
    spent: IndexMap<BudgetKey, Decimal>,
    events: Vec<BudgetCostEvent>,
}

/// Budget tracker that sums costs in memory against optional limits
#[derive(Debug, Default)]
pub struct InMemoryBudgetTracker {
    book: Mutex<BudgetBook>,
}

impl InMemoryBudgetTracker {
    /// Create a tracker with no limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the planned limit for a department and fiscal year
    pub fn with_limit(
        self,
        organization_id: OrganizationId,
        department_id: Option<DepartmentId>,
        fiscal_year: i32,
        limit: Decimal,
    ) -> Self {
        if let Ok(mut book) = self.book.lock() {
            book.limits.insert((organization_id, department_id, fiscal_year), limit);
        }
        self
    }

    /// Cost events recorded so far
    pub fn events(&self) -> Vec<BudgetCostEvent> {
        self.book
            .lock()
            .map(|book| book.events.clone())
            .unwrap_or_default()
    }

    /// Total spent for a department and fiscal year
    pub fn spent(
        &self,
        organization_id: OrganizationId,
        department_id: Option<DepartmentId>,
        fiscal_year: i32,
    ) -> Decimal {
        self.book
            .lock()
            .ok()
            .and_then(|book| {
                book.spent
                    .get(&(organization_id, department_id, fiscal_year))
                    .copied()
            })
            .unwrap_or(Decimal::ZERO)
    }
}

impl BudgetTracker for InMemoryBudgetTracker {
    fn record_cost(&self, event: &BudgetCostEvent) -> Result<BudgetReport, DownstreamError> {
        let mut book = self
            .book
            .lock()
            .map_err(|_| DownstreamError::Unavailable("budget tracker lock poisoned".to_string()))?;
        let key = (event.organization_id, event.department_id, event.fiscal_year);

        let total = book.spent.entry(key).or_insert(Decimal::ZERO);
        *total += event.amount;
        let spent = *total;
        let limit = book.limits.get(&key).copied();
        book.events.push(event.clone());

        Ok(BudgetReport {
            department_id: event.department_id,
            fiscal_year: event.fiscal_year,
            spent,
            limit,
            over_budget: limit.is_some_and(|limit| spent > limit),
        })
    }
}
