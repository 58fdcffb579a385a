// Copyright 2025 Cowboy AI, LLC.

//! Disposal workflow: approval pipeline for retiring an asset
//!
//! ```text
//! Pending --approve--> Approved --complete--> Completed   (asset -> Disposed)
//!    |  \                  |
//!  cancel reject         cancel
//! ```
//!
//! Completion is the effect-bearing step: it freezes the book value, computes
//! the gain or loss and drives the asset into its terminal state. Whether
//! approval and completion happen in one command or two is decided by the
//! engine's execution model, the same way for transfers.

use crate::asset::Asset;
use crate::entity::{AggregateRoot, AssetId, DisposalId, OrganizationId, RecordMeta, UserId};
use crate::errors::{require_amount, require_text, DomainError, DomainResult};
use crate::state_machine::{transition, MooreStateTransitions, State, StateTransition};
use crate::tenant::TenantScoped;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of a disposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisposalStatus {
    /// Requested, awaiting a decision
    Pending,
    /// Authorized, awaiting execution
    Approved,
    /// Refused (terminal)
    Rejected,
    /// Withdrawn (terminal)
    Cancelled,
    /// Asset retired (terminal)
    Completed,
}

impl State for DisposalStatus {
    fn name(&self) -> &'static str {
        match self {
            DisposalStatus::Pending => "Pending",
            DisposalStatus::Approved => "Approved",
            DisposalStatus::Rejected => "Rejected",
            DisposalStatus::Cancelled => "Cancelled",
            DisposalStatus::Completed => "Completed",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            DisposalStatus::Rejected | DisposalStatus::Cancelled | DisposalStatus::Completed
        )
    }
}

crate::define_moore_transitions!(DisposalStatus,
    DisposalStatus::Pending => [
        DisposalStatus::Approved,
        DisposalStatus::Rejected,
        DisposalStatus::Cancelled
    ],
    DisposalStatus::Approved => [DisposalStatus::Completed, DisposalStatus::Cancelled],
    DisposalStatus::Rejected => [],
    DisposalStatus::Cancelled => [],
    DisposalStatus::Completed => [],
);

impl DisposalStatus {
    /// Pending or approved: blocks a second disposal of the same asset
    pub fn is_active(&self) -> bool {
        matches!(self, DisposalStatus::Pending | DisposalStatus::Approved)
    }
}

/// How the asset leaves the organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisposalType {
    /// Sold to a third party
    Sale,
    /// Scrapped or recycled
    Scrap,
    /// Given away
    Donation,
    /// Exchanged against a new purchase
    TradeIn,
    /// Lost, stolen or destroyed
    WriteOff,
}

/// Input for requesting a disposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisposalRequest {
    /// How the asset leaves
    pub disposal_type: DisposalType,
    /// Planned disposal date
    pub disposal_date: NaiveDate,
    /// Proceeds (sale price)
    pub disposal_value: Decimal,
    /// Cost of disposing
    pub disposal_cost: Decimal,
    /// Why the asset is retired
    pub reason: String,
}

/// Figures fixed when a disposal is executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisposalExecution {
    /// The status change
    pub transition: StateTransition<DisposalStatus>,
    /// Book value at the moment of disposal
    pub book_value: Decimal,
    /// Proceeds minus cost minus book value
    pub net_gain_loss: Decimal,
}

/// A request to retire an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDisposal {
    id: DisposalId,
    asset_id: AssetId,
    organization_id: OrganizationId,
    disposal_type: DisposalType,
    disposal_date: NaiveDate,
    disposal_value: Decimal,
    disposal_cost: Decimal,
    reason: String,
    status: DisposalStatus,
    approved_by: Option<UserId>,
    approved_at: Option<DateTime<Utc>>,
    rejected_by: Option<UserId>,
    rejection_reason: Option<String>,
    cancellation_reason: Option<String>,
    completed_at: Option<DateTime<Utc>>,
    book_value_at_disposal: Option<Decimal>,
    net_gain_loss: Option<Decimal>,
    version: u64,
    /// Timestamps
    pub meta: RecordMeta,
}

impl AssetDisposal {
    const ENTITY: &'static str = "AssetDisposal";

    /// Validated constructor
    pub fn request(asset: &Asset, request: DisposalRequest) -> DomainResult<Self> {
        asset.ensure_active("dispose")?;
        require_amount("disposal value", request.disposal_value)?;
        require_amount("disposal cost", request.disposal_cost)?;
        require_text("disposal reason", &request.reason)?;

        Ok(Self {
            id: DisposalId::new(),
            asset_id: asset.id(),
            organization_id: asset.organization_id(),
            disposal_type: request.disposal_type,
            disposal_date: request.disposal_date,
            disposal_value: request.disposal_value,
            disposal_cost: request.disposal_cost,
            reason: request.reason,
            status: DisposalStatus::Pending,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejection_reason: None,
            cancellation_reason: None,
            completed_at: None,
            book_value_at_disposal: None,
            net_gain_loss: None,
            version: 0,
            meta: RecordMeta::new(),
        })
    }

    /// Asset being retired
    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    /// How the asset leaves
    pub fn disposal_type(&self) -> DisposalType {
        self.disposal_type
    }

    /// Planned disposal date
    pub fn disposal_date(&self) -> NaiveDate {
        self.disposal_date
    }

    /// Proceeds
    pub fn disposal_value(&self) -> Decimal {
        self.disposal_value
    }

    /// Cost of disposing
    pub fn disposal_cost(&self) -> Decimal {
        self.disposal_cost
    }

    /// Why the asset is retired
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Current status
    pub fn status(&self) -> DisposalStatus {
        self.status
    }

    /// Who approved the disposal
    pub fn approved_by(&self) -> Option<UserId> {
        self.approved_by
    }

    /// When the disposal was approved
    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// Why the disposal was rejected
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Why the disposal was cancelled
    pub fn cancellation_reason(&self) -> Option<&str> {
        self.cancellation_reason.as_deref()
    }

    /// When the asset was retired
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Book value frozen at execution
    pub fn book_value_at_disposal(&self) -> Option<Decimal> {
        self.book_value_at_disposal
    }

    /// Gain (positive) or loss (negative) fixed at execution
    pub fn net_gain_loss(&self) -> Option<Decimal> {
        self.net_gain_loss
    }

    /// `disposal_value - disposal_cost - book_value`
    pub fn calculate_net_gain_loss(&self, book_value: Decimal) -> DomainResult<Decimal> {
        self.disposal_value
            .checked_sub(self.disposal_cost)
            .and_then(|net| net.checked_sub(book_value))
            .ok_or_else(|| {
                DomainError::invalid_value(format!(
                    "net gain or loss of disposal {} is out of range",
                    self.id
                ))
            })
    }

    fn ensure_can(&self, target: DisposalStatus, action: &str) -> DomainResult<()> {
        if self.status.is_terminal() || !self.status.can_transition_to(&target) {
            return Err(DomainError::invalid_state(Self::ENTITY, self.status.name(), action));
        }
        Ok(())
    }

    /// Authorize a pending disposal
    pub fn approve(&mut self, approver: UserId) -> DomainResult<StateTransition<DisposalStatus>> {
        let record = transition(Self::ENTITY, &mut self.status, DisposalStatus::Approved, "approve")?;
        self.approved_by = Some(approver);
        self.approved_at = Some(record.timestamp);
        self.meta.touch();
        Ok(record)
    }

    /// Refuse a pending disposal
    pub fn reject(
        &mut self,
        approver: UserId,
        reason: impl Into<String>,
    ) -> DomainResult<StateTransition<DisposalStatus>> {
        let reason = reason.into();
        self.ensure_can(DisposalStatus::Rejected, "reject")?;
        require_text("rejection reason", &reason)?;
        let record = transition(Self::ENTITY, &mut self.status, DisposalStatus::Rejected, "reject")?;
        self.rejected_by = Some(approver);
        self.rejection_reason = Some(reason);
        self.meta.touch();
        Ok(record)
    }

    /// Withdraw a pending or approved disposal
    pub fn cancel(&mut self, reason: impl Into<String>) -> DomainResult<StateTransition<DisposalStatus>> {
        let reason = reason.into();
        self.ensure_can(DisposalStatus::Cancelled, "cancel")?;
        require_text("cancellation reason", &reason)?;
        let record = transition(Self::ENTITY, &mut self.status, DisposalStatus::Cancelled, "cancel")?;
        self.cancellation_reason = Some(reason);
        self.meta.touch();
        Ok(record)
    }

    /// Execute an approved disposal against its asset
    ///
    /// Validates both aggregates, then retires the asset and records the
    /// book value and the net gain or loss on the disposal.
    pub fn complete(&mut self, asset: &mut Asset) -> DomainResult<DisposalExecution> {
        if asset.id() != self.asset_id {
            return Err(DomainError::invalid_value(format!(
                "disposal {} does not belong to asset {}",
                self.id,
                asset.id()
            )));
        }
        self.ensure_can(DisposalStatus::Completed, "complete")?;
        asset.ensure_active("dispose")?;

        let book_value = asset.current_value();
        let net_gain_loss = self.calculate_net_gain_loss(book_value)?;
        asset.mark_disposed();

        let record = transition(Self::ENTITY, &mut self.status, DisposalStatus::Completed, "complete")?;
        self.completed_at = Some(record.timestamp);
        self.book_value_at_disposal = Some(book_value);
        self.net_gain_loss = Some(net_gain_loss);
        self.meta.touch();

        Ok(DisposalExecution {
            transition: record,
            book_value,
            net_gain_loss,
        })
    }
}

impl AggregateRoot for AssetDisposal {
    type Id = DisposalId;

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

impl TenantScoped for AssetDisposal {
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
    use crate::entity::CategoryId;
    use crate::value_objects::{AssetCondition, Custody};

    fn asset_worth(value: i64) -> Asset {
        let mut asset = Asset::register(
            OrganizationId::new(),
            NewAsset {
                code: "VAN-2".to_string(),
                name: "Delivery van".to_string(),
                category_id: CategoryId::new(),
                purchase_price: Decimal::from(1000),
                original_cost: Decimal::from(1000),
                purchase_date: None,
                condition: AssetCondition::Fair,
                custody: Custody::Unassigned,
            },
        )
        .unwrap();
        asset
            .update_financials(Decimal::from(1000), Decimal::from(1000), Decimal::from(value))
            .unwrap();
        asset
    }

    fn sale(value: i64, cost: i64) -> DisposalRequest {
        DisposalRequest {
            disposal_type: DisposalType::Sale,
            disposal_date: NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
            disposal_value: Decimal::from(value),
            disposal_cost: Decimal::from(cost),
            reason: "end of life".to_string(),
        }
    }

    #[test]
    fn test_net_gain_loss() {
        let asset = asset_worth(700);
        let disposal = AssetDisposal::request(&asset, sale(1000, 100)).unwrap();
        assert_eq!(disposal.calculate_net_gain_loss(Decimal::from(700)).unwrap(), Decimal::from(200));
        assert_eq!(disposal.calculate_net_gain_loss(Decimal::from(950)).unwrap(), Decimal::from(-50));
    }

    #[test]
    fn test_net_gain_loss_overflow_is_an_error() {
        let asset = asset_worth(700);
        let disposal = AssetDisposal::request(&asset, sale(0, 100)).unwrap();
        let err = disposal.calculate_net_gain_loss(Decimal::MAX).unwrap_err();
        assert!(err.is_invalid_value());
    }

    #[test]
    fn test_request_rejects_amounts_beyond_limit() {
        let asset = asset_worth(700);
        let mut request = sale(0, 0);
        request.disposal_cost = Decimal::MAX;
        assert!(AssetDisposal::request(&asset, request).unwrap_err().is_invalid_value());

        let mut request = sale(0, 0);
        request.disposal_value = Decimal::MAX;
        assert!(AssetDisposal::request(&asset, request).unwrap_err().is_invalid_value());
    }

    #[test]
    fn test_request_rejects_negative_amounts() {
        let asset = asset_worth(700);
        assert!(AssetDisposal::request(&asset, sale(-1, 0)).unwrap_err().is_invalid_value());
        assert!(AssetDisposal::request(&asset, sale(10, -5)).unwrap_err().is_invalid_value());
    }

    #[test]
    fn test_complete_retires_asset_and_fixes_figures() {
        let mut asset = asset_worth(700);
        let mut disposal = AssetDisposal::request(&asset, sale(1000, 100)).unwrap();

        assert!(disposal.complete(&mut asset).unwrap_err().is_invalid_state());
        assert_eq!(asset.status(), AssetStatus::Available);

        disposal.approve(UserId::new()).unwrap();
        let execution = disposal.complete(&mut asset).unwrap();

        assert_eq!(execution.book_value, Decimal::from(700));
        assert_eq!(execution.net_gain_loss, Decimal::from(200));
        assert_eq!(disposal.status(), DisposalStatus::Completed);
        assert_eq!(disposal.net_gain_loss(), Some(Decimal::from(200)));
        assert_eq!(asset.status(), AssetStatus::Disposed);
    }

    #[test]
    fn test_cannot_request_on_disposed_asset() {
        let mut asset = asset_worth(10);
        asset.mark_disposed();
        assert!(AssetDisposal::request(&asset, sale(0, 0)).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_state_table() {
        use DisposalStatus::*;
        assert!(Pending.can_transition_to(&Approved));
        assert!(Pending.can_transition_to(&Rejected));
        assert!(!Pending.can_transition_to(&Completed));
        assert!(Approved.can_transition_to(&Completed));
        assert!(!Approved.can_transition_to(&Pending));
        for terminal in [Rejected, Cancelled, Completed] {
            assert!(terminal.is_terminal());
            assert!(terminal.valid_transitions().is_empty());
        }
    }
}
