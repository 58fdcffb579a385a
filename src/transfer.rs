// Copyright 2025 Cowboy AI, LLC.

//! Transfer workflow: approval pipeline for custody changes
//!
//! ```text
//! Pending --approve--> Approved --complete--> Completed
//!    |  \                  |
//!    |   reject            cancel
//!    |     \               |
//!  cancel   Rejected       Cancelled
//! ```
//!
//! Completion is the decisive step: it rewrites the asset's custody, and the
//! transfer and the asset are committed together.

use crate::asset::Asset;
use crate::entity::{
    AggregateRoot, AssetId, OrganizationId, RecordMeta, TransferId, UserId,
};
use crate::errors::{require_text, DomainError, DomainResult};
use crate::state_machine::{transition, MooreStateTransitions, State, StateTransition};
use crate::tenant::TenantScoped;
use crate::value_objects::{Custody, CustodyEndpoint};
use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Requested, awaiting a decision
    Pending,
    /// Authorized, awaiting execution
    Approved,
    /// Refused (terminal)
    Rejected,
    /// Custody moved (terminal)
    Completed,
    /// Withdrawn (terminal)
    Cancelled,
}

impl State for TransferStatus {
    fn name(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "Pending",
            TransferStatus::Approved => "Approved",
            TransferStatus::Rejected => "Rejected",
            TransferStatus::Completed => "Completed",
            TransferStatus::Cancelled => "Cancelled",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferStatus::Rejected | TransferStatus::Completed | TransferStatus::Cancelled
        )
    }
}

crate::define_moore_transitions!(TransferStatus,
    TransferStatus::Pending => [
        TransferStatus::Approved,
        TransferStatus::Rejected,
        TransferStatus::Cancelled
    ],
    TransferStatus::Approved => [TransferStatus::Completed, TransferStatus::Cancelled],
    TransferStatus::Rejected => [],
    TransferStatus::Completed => [],
    TransferStatus::Cancelled => [],
);

impl TransferStatus {
    /// Pending or approved: blocks a second transfer of the same asset
    pub fn is_active(&self) -> bool {
        matches!(self, TransferStatus::Pending | TransferStatus::Approved)
    }
}

/// Kind of custody change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferType {
    /// Ownership moves for good
    Permanent,
    /// Moves for a limited period
    Temporary,
    /// Lent out, expected back
    Loan,
}

/// Input for requesting a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TransferRequest {
    /// Kind of transfer
    pub transfer_type: TransferType,
    /// Planned transfer date
    pub transfer_date: NaiveDate,
    /// Source custody; defaults to the asset's current custody
    #[serde(default)]
    pub from: Option<CustodyEndpoint>,
    /// Destination custody
    pub to: CustodyEndpoint,
    /// Why the asset moves
    pub reason: String,
    /// For temporary transfers and loans
    #[serde(default)]
    pub expected_return_date: Option<NaiveDate>,
}

/// A request to move an asset's custody
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTransfer {
    id: TransferId,
    asset_id: AssetId,
    organization_id: OrganizationId,
    transfer_type: TransferType,
    from: CustodyEndpoint,
    to: CustodyEndpoint,
    transfer_date: NaiveDate,
    expected_return_date: Option<NaiveDate>,
    reason: String,
    status: TransferStatus,
    approved_by: Option<UserId>,
    approved_at: Option<DateTime<Utc>>,
    rejected_by: Option<UserId>,
    rejection_reason: Option<String>,
    cancellation_reason: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    version: u64,
    /// Timestamps
    pub meta: RecordMeta,
}

impl AssetTransfer {
    const ENTITY: &'static str = "AssetTransfer";

    /// Validated constructor
    ///
    /// Checks everything that depends only on the asset and the request; the
    /// "one active transfer per asset" rule needs the store and is checked by
    /// the handler.
    pub fn request(asset: &Asset, request: TransferRequest) -> DomainResult<Self> {
        asset.ensure_active("transfer")?;
        require_text("transfer reason", &request.reason)?;
        if request.to.is_empty() {
            return Err(DomainError::invalid_value(
                "transfer destination must name a department or a user",
            ));
        }
        let from = request.from.unwrap_or_else(|| asset.custody().endpoint());
        let lands_in = resolve_destination(&request.to, asset).endpoint();
        if from == request.to || from == lands_in {
            return Err(DomainError::invalid_value(
                "transfer source and destination are the same",
            ));
        }
        if let Some(back) = request.expected_return_date {
            if back < request.transfer_date {
                return Err(DomainError::invalid_value(
                    "expected return date precedes the transfer date",
                ));
            }
        }

        Ok(Self {
            id: TransferId::new(),
            asset_id: asset.id(),
            organization_id: asset.organization_id(),
            transfer_type: request.transfer_type,
            from,
            to: request.to,
            transfer_date: request.transfer_date,
            expected_return_date: request.expected_return_date,
            reason: request.reason,
            status: TransferStatus::Pending,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejection_reason: None,
            cancellation_reason: None,
            completed_at: None,
            version: 0,
            meta: RecordMeta::new(),
        })
    }

    /// Asset being moved
    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    /// Kind of transfer
    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    /// Source custody
    pub fn source(&self) -> &CustodyEndpoint {
        &self.from
    }

    /// Destination custody
    pub fn destination(&self) -> &CustodyEndpoint {
        &self.to
    }

    /// Planned transfer date
    pub fn transfer_date(&self) -> NaiveDate {
        self.transfer_date
    }

    /// Expected return date
    pub fn expected_return_date(&self) -> Option<NaiveDate> {
        self.expected_return_date
    }

    /// Why the asset moves
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Current status
    pub fn status(&self) -> TransferStatus {
        self.status
    }

    /// Who approved the transfer
    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    /// When the transfer was approved
    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// Who rejected the transfer
    pub fn rejected_by(&self) -> Option<UserId> {
        self.rejected_by
    }

    /// Why the transfer was rejected
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Why the transfer was cancelled
    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// When custody moved
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    fn ensure_can(&self, target: TransferStatus, action: &str) -> DomainResult<()> {
        if self.status.is_terminal() || !self.status.can_transition_to(&target) {
            return Err(DomainError::invalid_state(Self::ENTITY, self.status.name(), action));
        }
        Ok(())
    }

    /// Authorize a pending transfer
    pub fn approve(&mut self, approver: UserId) -> DomainResult<StateTransition<TransferStatus>> {
        let record = transition(Self::ENTITY, &mut self.status, TransferStatus::Approved, "approve")?;
        self.approved_by = Some(approver);
        self.approved_at = Some(record.timestamp);
        self.meta.touch();
        Ok(record)
    }

    /// Refuse a pending transfer
    pub fn reject(
        &mut self,
        approver: UserId,
        reason: impl Into<String>,
    ) -> DomainResult<StateTransition<TransferStatus>> {
        let reason = reason.into();
        self.ensure_can(TransferStatus::Rejected, "reject")?;
        require_text("rejection reason", &reason)?;
        let record = transition(Self::ENTITY, &mut self.status, TransferStatus::Rejected, "reject")?;
        self.rejected_by = Some(approver);
        self.rejection_reason = Some(reason);
        self.meta.touch();
        Ok(record)
    }

    /// Withdraw a pending or approved transfer
    pub fn cancel(&mut self, reason: impl Into<String>) -> DomainResult<StateTransition<TransferStatus>> {
        let reason = reason.into();
        self.ensure_can(TransferStatus::Cancelled, "cancel")?;
        require_text("cancellation reason", &reason)?;
        let record = transition(Self::ENTITY, &mut self.status, TransferStatus::Cancelled, "cancel")?;
        self.cancellation_reason = Some(reason);
        self.meta.touch();
        Ok(record)
    }

    /// Custody the asset ends up in when this transfer completes
    ///
    /// A user destination keeps the asset's current department when the
    /// transfer names none; a department-only destination stores the asset in
    /// that department.
    pub fn destination_custody(&self, asset: &Asset) -> Custody {
        resolve_destination(&self.to, asset)
    }

    /// Execute an approved transfer against its asset
    ///
    /// Both aggregates are validated before either is mutated.
    pub fn complete(&mut self, asset: &mut Asset) -> DomainResult<StateTransition<TransferStatus>> {
        if asset.id() != self.asset_id {
            return Err(DomainError::invalid_value(format!(
                "transfer {} does not belong to asset {}",
                self.id,
                asset.id()
            )));
        }
        self.ensure_can(TransferStatus::Completed, "complete")?;
        asset.ensure_active("transfer")?;

        let destination = self.destination_custody(asset);
        asset.apply_custody(destination)?;
        let record = transition(Self::ENTITY, &mut self.status, TransferStatus::Completed, "complete")?;
        self.completed_at = Some(record.timestamp);
        self.meta.touch();
        Ok(record)
    }
}

fn resolve_destination(to: &CustodyEndpoint, asset: &Asset) -> Custody {
    match (to.user_id, to.department_id) {
        (Some(user_id), department_id) => Custody::AssignedToUser {
            user_id,
            department_id: department_id.or_else(|| asset.current_department_id()),
        },
        (None, Some(department_id)) => Custody::StoredInDepartment { department_id },
        (None, None) => Custody::Unassigned,
    }
}

impl AggregateRoot for AssetTransfer {
    type Id = TransferId;

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

impl TenantScoped for AssetTransfer {
    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn entity_type() -> &'static str {
        Self::ENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetStatus, NewAsset};
    use crate::entity::{CategoryId, DepartmentId};
    use crate::value_objects::AssetCondition;
    use rust_decimal::Decimal;

    fn asset_held_by(custody: Custody) -> Asset {
        Asset::register(
            OrganizationId::new(),
            NewAsset {
                code: "PRJ-7".to_string(),
                name: "Projector".to_string(),
                category_id: CategoryId::new(),
                purchase_price: Decimal::from(400),
                original_cost: Decimal::from(400),
                purchase_date: None,
                condition: AssetCondition::Good,
                custody,
            },
        )
        .unwrap()
    }

    fn request_to(to: CustodyEndpoint) -> TransferRequest {
        TransferRequest {
            transfer_type: TransferType::Permanent,
            transfer_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            from: None,
            to,
            reason: "team move".to_string(),
            expected_return_date: None,
        }
    }

    #[test]
    fn test_request_defaults_source_to_current_custody() {
        let dept = DepartmentId::new();
        let asset = asset_held_by(Custody::StoredInDepartment { department_id: dept });
        let transfer =
            AssetTransfer::request(&asset, request_to(CustodyEndpoint::user(UserId::new(), None)))
                .unwrap();
        assert_eq!(transfer.source(), &CustodyEndpoint::department(dept));
        assert_eq!(transfer.status(), TransferStatus::Pending);
    }

    #[test]
    fn test_request_rejects_self_transfer_and_empty_destination() {
        let dept = DepartmentId::new();
        let asset = asset_held_by(Custody::StoredInDepartment { department_id: dept });

        let err = AssetTransfer::request(&asset, request_to(CustodyEndpoint::department(dept)))
            .unwrap_err();
        assert!(err.is_invalid_value());

        let err = AssetTransfer::request(&asset, request_to(CustodyEndpoint::default())).unwrap_err();
        assert!(err.is_invalid_value());
    }

    #[test]
    fn test_request_rejects_destination_resolving_to_current_custody() {
        let user = UserId::new();
        let asset = asset_held_by(Custody::AssignedToUser {
            user_id: user,
            department_id: Some(DepartmentId::new()),
        });

        // the unnamed department falls back to the current one
        let err = AssetTransfer::request(&asset, request_to(CustodyEndpoint::user(user, None)))
            .unwrap_err();
        assert!(err.is_invalid_value());
    }

    #[test]
    fn test_state_table() {
        use TransferStatus::*;
        assert!(Pending.can_transition_to(&Approved));
        assert!(Pending.can_transition_to(&Rejected));
        assert!(Pending.can_transition_to(&Cancelled));
        assert!(!Pending.can_transition_to(&Completed));
        assert!(Approved.can_transition_to(&Completed));
        assert!(Approved.can_transition_to(&Cancelled));
        assert!(!Approved.can_transition_to(&Rejected));
        for terminal in [Rejected, Completed, Cancelled] {
            assert!(terminal.valid_transitions().is_empty());
        }
    }

    #[test]
    fn test_complete_requires_approval() {
        let mut asset = asset_held_by(Custody::Unassigned);
        let mut transfer =
            AssetTransfer::request(&asset, request_to(CustodyEndpoint::department(DepartmentId::new())))
                .unwrap();

        let err = transfer.complete(&mut asset).unwrap_err();
        assert!(err.is_invalid_state());
        assert_eq!(asset.custody(), &Custody::Unassigned);
    }

    #[test]
    fn test_department_only_destination_stores_asset() {
        let user = UserId::new();
        let old_dept = DepartmentId::new();
        let new_dept = DepartmentId::new();
        let mut asset = asset_held_by(Custody::AssignedToUser {
            user_id: user,
            department_id: Some(old_dept),
        });

        let mut transfer =
            AssetTransfer::request(&asset, request_to(CustodyEndpoint::department(new_dept))).unwrap();
        transfer.approve(UserId::new()).unwrap();
        transfer.complete(&mut asset).unwrap();

        assert_eq!(transfer.status(), TransferStatus::Completed);
        assert_eq!(asset.current_user_id(), None);
        assert_eq!(asset.current_department_id(), Some(new_dept));
        assert_eq!(asset.status(), AssetStatus::InGodown);
    }

    #[test]
    fn test_user_destination_keeps_department_when_unnamed() {
        let dept = DepartmentId::new();
        let new_user = UserId::new();
        let mut asset = asset_held_by(Custody::StoredInDepartment { department_id: dept });

        let mut transfer =
            AssetTransfer::request(&asset, request_to(CustodyEndpoint::user(new_user, None))).unwrap();
        transfer.approve(UserId::new()).unwrap();
        transfer.complete(&mut asset).unwrap();

        assert_eq!(asset.current_user_id(), Some(new_user));
        assert_eq!(asset.current_department_id(), Some(dept));
        assert_eq!(asset.status(), AssetStatus::InUse);
    }

    #[test]
    fn test_reject_and_cancel_rules() {
        let asset = asset_held_by(Custody::Unassigned);
        let mut transfer =
            AssetTransfer::request(&asset, request_to(CustodyEndpoint::department(DepartmentId::new())))
                .unwrap();

        assert!(transfer.reject(UserId::new(), "").unwrap_err().is_invalid_value());
        assert_eq!(transfer.status(), TransferStatus::Pending);

        transfer.approve(UserId::new()).unwrap();
        assert!(transfer.reject(UserId::new(), "no").unwrap_err().is_invalid_state());
        assert!(transfer.approve(UserId::new()).unwrap_err().is_invalid_state());

        transfer.cancel("plans changed").unwrap();
        assert_eq!(transfer.status(), TransferStatus::Cancelled);
        assert_eq!(transfer.cancellation_reason(), Some("plans changed"));
        assert!(transfer.cancel("again").unwrap_err().is_invalid_state());
    }
}
