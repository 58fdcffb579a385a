// Copyright 2025 Cowboy AI, LLC.

//! Asset registry: the root aggregate of the lifecycle
//!
//! The asset owns identity, custody, financial values and lifecycle status.
//! Workflows never touch these fields directly; they call the mutators below,
//! which enforce the two asset-wide rules:
//!
//! - `0 <= current_value <= original_cost` at all times
//! - `Disposed` is terminal: no custody or financial change afterwards

use crate::entity::{
    AggregateRoot, AssetId, CategoryId, DepartmentId, OrganizationId, RecordMeta, UserId,
};
use crate::errors::{require_text, DomainError, DomainResult};
use crate::state_machine::State;
use crate::tenant::TenantScoped;
use crate::value_objects::{AssetCondition, Custody, Financials};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle status of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetStatus {
    /// Not held by anyone
    Available,
    /// Held by a user
    InUse,
    /// Stored by a department (godown = storeroom)
    InGodown,
    /// A maintenance job is in progress
    UnderMaintenance,
    /// Retired (terminal)
    Disposed,
}

impl State for AssetStatus {
    fn name(&self) -> &'static str {
        match self {
            AssetStatus::Available => "Available",
            AssetStatus::InUse => "InUse",
            AssetStatus::InGodown => "InGodown",
            AssetStatus::UnderMaintenance => "UnderMaintenance",
            AssetStatus::Disposed => "Disposed",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, AssetStatus::Disposed)
    }
}

impl AssetStatus {
    /// Status implied by a custody value
    pub fn for_custody(custody: &Custody) -> Self {
        match custody {
            Custody::Unassigned => AssetStatus::Available,
            Custody::AssignedToUser { .. } => AssetStatus::InUse,
            Custody::StoredInDepartment { .. } => AssetStatus::InGodown,
        }
    }
}

/// Input for registering an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NewAsset {
    /// Code, unique within the organization
    pub code: String,
    /// Display name
    pub name: String,
    /// Category the asset belongs to
    pub category_id: CategoryId,
    /// Price actually paid
    pub purchase_price: Decimal,
    /// Cost basis for depreciation
    pub original_cost: Decimal,
    /// Acquisition date
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    /// Physical condition at registration
    #[serde(default)]
    pub condition: AssetCondition,
    /// Custody at registration
    #[serde(default)]
    pub custody: Custody,
}

/// A tracked physical asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    id: AssetId,
    organization_id: OrganizationId,
    code: String,
    /// Display name
    pub name: String,
    category_id: CategoryId,
    custody: Custody,
    financials: Financials,
    status: AssetStatus,
    /// Physical condition
    pub condition: AssetCondition,
    /// Acquisition date
    pub purchase_date: Option<NaiveDate>,
    version: u64,
    /// Timestamps
    pub meta: RecordMeta,
}

impl Asset {
    /// Validated constructor; the book value starts at the original cost
    pub fn register(organization_id: OrganizationId, new: NewAsset) -> DomainResult<Self> {
        require_text("asset code", &new.code)?;
        require_text("asset name", &new.name)?;
        let financials = Financials::acquired(new.purchase_price, new.original_cost)?;

        Ok(Self {
            id: AssetId::new(),
            organization_id,
            code: new.code.trim().to_string(),
            name: new.name,
            category_id: new.category_id,
            status: AssetStatus::for_custody(&new.custody),
            custody: new.custody,
            financials,
            condition: new.condition,
            purchase_date: new.purchase_date,
            version: 0,
            meta: RecordMeta::new(),
        })
    }

    /// Code, unique within the organization
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Category id
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    /// Current custody
    pub fn custody(&self) -> &Custody {
        &self.custody
    }

    /// User currently holding the asset
    pub fn current_user_id(&self) -> Option<UserId> {
        self.custody.current_user_id()
    }

    /// Department currently responsible for the asset
    pub fn current_department_id(&self) -> Option<DepartmentId> {
        self.custody.current_department_id()
    }

    /// Financial values
    pub fn financials(&self) -> &Financials {
        &self.financials
    }

    /// Book value
    pub fn current_value(&self) -> Decimal {
        self.financials.current_value()
    }

    /// Lifecycle status
    pub fn status(&self) -> AssetStatus {
        self.status
    }

    /// Whether the asset has been retired
    pub fn is_disposed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Fail with `InvalidState` if the asset is disposed
    pub fn ensure_active(&self, action: &str) -> DomainResult<()> {
        if self.is_disposed() {
            return Err(DomainError::invalid_state(
                Self::entity_type(),
                self.status.name(),
                action,
            ));
        }
        Ok(())
    }

    /// Hand the asset to a user; status becomes `InUse`
    pub fn assign_to_user(
        &mut self,
        user_id: UserId,
        department_id: Option<DepartmentId>,
    ) -> DomainResult<()> {
        self.ensure_active("assign")?;
        self.set_custody(Custody::AssignedToUser {
            user_id,
            department_id,
        });
        Ok(())
    }

    /// Clear custody; status becomes `Available`
    pub fn unassign(&mut self) -> DomainResult<()> {
        self.ensure_active("unassign")?;
        self.set_custody(Custody::Unassigned);
        Ok(())
    }

    /// Put the asset in a department's store with no individual holder
    pub fn store_in_department(&mut self, department_id: DepartmentId) -> DomainResult<()> {
        self.ensure_active("store")?;
        self.set_custody(Custody::StoredInDepartment { department_id });
        Ok(())
    }

    /// Apply a custody value as described by a transfer destination
    pub(crate) fn apply_custody(&mut self, custody: Custody) -> DomainResult<()> {
        match custody {
            Custody::AssignedToUser {
                user_id,
                department_id,
            } => self.assign_to_user(user_id, department_id),
            Custody::StoredInDepartment { department_id } => self.store_in_department(department_id),
            Custody::Unassigned => self.unassign(),
        }
    }

    // While a maintenance job runs the status stays UnderMaintenance; it is
    // re-derived from custody when the job ends.
    fn set_custody(&mut self, custody: Custody) {
        self.custody = custody;
        if self.status != AssetStatus::UnderMaintenance {
            self.status = AssetStatus::for_custody(&self.custody);
        }
        self.meta.touch();
    }

    /// Direct financial correction
    pub fn update_financials(
        &mut self,
        purchase_price: Decimal,
        original_cost: Decimal,
        current_value: Decimal,
    ) -> DomainResult<()> {
        self.ensure_active("update financials of")?;
        self.financials = Financials::new(purchase_price, original_cost, current_value)?;
        self.meta.touch();
        Ok(())
    }

    /// Set the book value after a depreciation charge
    pub(crate) fn set_current_value(&mut self, current_value: Decimal) -> DomainResult<()> {
        self.ensure_active("depreciate")?;
        self.financials = self.financials.with_current_value(current_value)?;
        self.meta.touch();
        Ok(())
    }

    /// Mark the asset as under maintenance
    pub(crate) fn begin_maintenance(&mut self) -> DomainResult<()> {
        self.ensure_active("start maintenance on")?;
        self.status = AssetStatus::UnderMaintenance;
        self.meta.touch();
        Ok(())
    }

    /// Leave maintenance; status follows custody again
    pub(crate) fn end_maintenance(&mut self) -> DomainResult<()> {
        self.ensure_active("end maintenance on")?;
        if self.status == AssetStatus::UnderMaintenance {
            self.status = AssetStatus::for_custody(&self.custody);
            self.meta.touch();
        }
        Ok(())
    }

    /// Retire the asset
    ///
    /// Returns `false` (and changes nothing) when it was already disposed.
    pub fn mark_disposed(&mut self) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.status = AssetStatus::Disposed;
        self.meta.touch();
        true
    }
}

impl AggregateRoot for Asset {
    type Id = AssetId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn increment_version(&mut self) {
        self.version += 1;
    }
}

impl TenantScoped for Asset {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn entity_type() -> &'static str {
        "Asset"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop() -> Asset {
        Asset::register(
            OrganizationId::new(),
            NewAsset {
                code: "LAP-001".to_string(),
                name: "Laptop".to_string(),
                category_id: CategoryId::new(),
                purchase_price: Decimal::from(950),
                original_cost: Decimal::from(1000),
                purchase_date: None,
                condition: AssetCondition::New,
                custody: Custody::Unassigned,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_register_starts_at_original_cost() {
        let asset = laptop();
        assert_eq!(asset.status(), AssetStatus::Available);
        assert_eq!(asset.current_value(), Decimal::from(1000));
        assert_eq!(asset.financials().accumulated_depreciation(), Decimal::ZERO);
    }

    #[test]
    fn test_register_rejects_blank_code() {
        let mut new = NewAsset {
            code: "  ".to_string(),
            name: "Laptop".to_string(),
            category_id: CategoryId::new(),
            purchase_price: Decimal::from(1),
            original_cost: Decimal::from(1),
            purchase_date: None,
            condition: AssetCondition::New,
            custody: Custody::Unassigned,
        };
        assert!(Asset::register(OrganizationId::new(), new.clone())
            .unwrap_err()
            .is_invalid_value());

        new.code = "OK-1".to_string();
        new.original_cost = Decimal::from(-1);
        assert!(Asset::register(OrganizationId::new(), new)
            .unwrap_err()
            .is_invalid_value());
    }

    #[test]
    fn test_assign_unassign_store() {
        let mut asset = laptop();
        let user = UserId::new();
        let dept = DepartmentId::new();

        asset.assign_to_user(user, Some(dept)).unwrap();
        assert_eq!(asset.status(), AssetStatus::InUse);
        assert_eq!(asset.current_user_id(), Some(user));
        assert_eq!(asset.current_department_id(), Some(dept));

        asset.store_in_department(dept).unwrap();
        assert_eq!(asset.status(), AssetStatus::InGodown);
        assert_eq!(asset.current_user_id(), None);
        assert_eq!(asset.current_department_id(), Some(dept));

        asset.unassign().unwrap();
        assert_eq!(asset.status(), AssetStatus::Available);
        assert_eq!(asset.current_department_id(), None);
    }

    #[test]
    fn test_update_financials_checks_range() {
        let mut asset = laptop();
        asset
            .update_financials(Decimal::from(900), Decimal::from(1000), Decimal::from(700))
            .unwrap();
        assert_eq!(asset.current_value(), Decimal::from(700));

        let err = asset
            .update_financials(Decimal::from(900), Decimal::from(1000), Decimal::from(1500))
            .unwrap_err();
        assert!(err.is_invalid_value());
        assert_eq!(asset.current_value(), Decimal::from(700));
    }

    #[test]
    fn test_disposed_is_terminal() {
        let mut asset = laptop();
        assert!(asset.mark_disposed());
        assert!(!asset.mark_disposed());
        assert_eq!(asset.status(), AssetStatus::Disposed);

        assert!(asset.assign_to_user(UserId::new(), None).unwrap_err().is_invalid_state());
        assert!(asset.unassign().unwrap_err().is_invalid_state());
        assert!(asset
            .store_in_department(DepartmentId::new())
            .unwrap_err()
            .is_invalid_state());
        assert!(asset
            .update_financials(Decimal::ONE, Decimal::ONE, Decimal::ONE)
            .unwrap_err()
            .is_invalid_state());
        assert!(asset.set_current_value(Decimal::ZERO).unwrap_err().is_invalid_state());
        assert_eq!(asset.status(), AssetStatus::Disposed);
    }

    #[test]
    fn test_maintenance_keeps_status_until_finished() {
        let mut asset = laptop();
        let user = UserId::new();
        asset.begin_maintenance().unwrap();
        assert_eq!(asset.status(), AssetStatus::UnderMaintenance);

        asset.assign_to_user(user, None).unwrap();
        assert_eq!(asset.status(), AssetStatus::UnderMaintenance);

        asset.end_maintenance().unwrap();
        assert_eq!(asset.status(), AssetStatus::InUse);
    }
}
