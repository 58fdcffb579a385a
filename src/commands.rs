// Copyright 2025 Cowboy AI, LLC.

//! Command surface
//!
//! One variant per lifecycle operation. Commands carry ids and payloads
//! only; the tenant travels separately as a [`TenantScope`](crate::TenantScope)
//! so a command body can never choose its own organization.

use crate::asset::NewAsset;
use crate::depreciation::DepreciationCharge;
use crate::disposal::DisposalRequest;
use crate::entity::{
    AssetId, CategoryId, DepartmentId, DisposalId, MaintenanceId, TransferId, UserId,
};
use crate::events::LifecycleEvent;
use crate::downstream::BudgetReport;
use crate::maintenance::{MaintenanceOutcome, MaintenanceRequest};
use crate::transfer::TransferRequest;
use rust_decimal::Decimal;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every command the lifecycle engine accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LifecycleCommand {
    /// Register an asset category
    RegisterCategory {
        /// Category code
        code: String,
        /// Display name
        name: String,
        /// Parent category
        #[serde(default)]
        parent_id: Option<CategoryId>,
    },
    /// Register an asset
    RegisterAsset {
        /// Asset data
        asset: NewAsset,
    },
    /// Correct an asset's financial values
    UpdateAssetFinancials {
        /// Target asset
        asset_id: AssetId,
        /// Price paid
        purchase_price: Decimal,
        /// Cost basis
        original_cost: Decimal,
        /// Book value
        current_value: Decimal,
    },
    /// Hand an asset to a user
    AssignAssetToUser {
        /// Target asset
        asset_id: AssetId,
        /// New holder
        user_id: UserId,
        /// Holder's department
        #[serde(default)]
        department_id: Option<DepartmentId>,
    },
    /// Clear an asset's custody
    UnassignAsset {
        /// Target asset
        asset_id: AssetId,
    },
    /// Put an asset in a department's store
    StoreAssetInDepartment {
        /// Target asset
        asset_id: AssetId,
        /// Storing department
        department_id: DepartmentId,
    },
    /// Request a custody transfer
    CreateTransfer {
        /// Asset to move
        asset_id: AssetId,
        /// Transfer details
        request: TransferRequest,
    },
    /// Approve a pending transfer
    ApproveTransfer {
        /// Transfer
        transfer_id: TransferId,
        /// Approving user
        approver_id: UserId,
    },
    /// Reject a pending transfer
    RejectTransfer {
        /// Transfer
        transfer_id: TransferId,
        /// Rejecting user
        approver_id: UserId,
        /// Why
        reason: String,
    },
    /// Execute an approved transfer
    CompleteTransfer {
        /// Transfer
        transfer_id: TransferId,
    },
    /// Withdraw a pending or approved transfer
    CancelTransfer {
        /// Transfer
        transfer_id: TransferId,
        /// Why
        reason: String,
    },
    /// Request a disposal
    CreateDisposal {
        /// Asset to retire
        asset_id: AssetId,
        /// Disposal details
        request: DisposalRequest,
    },
    /// Approve a pending disposal
    ApproveDisposal {
        /// Disposal
        disposal_id: DisposalId,
        /// Approving user
        approver_id: UserId,
    },
    /// Reject a pending disposal
    RejectDisposal {
        /// Disposal
        disposal_id: DisposalId,
        /// Rejecting user
        approver_id: UserId,
        /// Why
        reason: String,
    },
    /// Execute an approved disposal
    CompleteDisposal {
        /// Disposal
        disposal_id: DisposalId,
    },
    /// Withdraw a pending or approved disposal
    CancelDisposal {
        /// Disposal
        disposal_id: DisposalId,
        /// Why
        reason: String,
    },
    /// Append a depreciation charge
    RecordDepreciation {
        /// Asset to depreciate
        asset_id: AssetId,
        /// Charge details
        charge: DepreciationCharge,
    },
    /// Schedule maintenance
    CreateMaintenance {
        /// Asset to maintain
        asset_id: AssetId,
        /// Job details
        request: MaintenanceRequest,
    },
    /// Begin a scheduled job
    StartMaintenance {
        /// Job
        maintenance_id: MaintenanceId,
        /// Who does the work
        performer_id: UserId,
    },
    /// Finish a running job
    CompleteMaintenance {
        /// Job
        maintenance_id: MaintenanceId,
        /// Reported outcome
        outcome: MaintenanceOutcome,
    },
    /// Call off a scheduled or running job
    CancelMaintenance {
        /// Job
        maintenance_id: MaintenanceId,
        /// Why
        reason: String,
    },
}

impl LifecycleCommand {
    /// Command name for logs
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleCommand::RegisterCategory { .. } => "RegisterCategory",
            LifecycleCommand::RegisterAsset { .. } => "RegisterAsset",
            LifecycleCommand::UpdateAssetFinancials { .. } => "UpdateAssetFinancials",
            LifecycleCommand::AssignAssetToUser { .. } => "AssignAssetToUser",
            LifecycleCommand::UnassignAsset { .. } => "UnassignAsset",
            LifecycleCommand::StoreAssetInDepartment { .. } => "StoreAssetInDepartment",
            LifecycleCommand::CreateTransfer { .. } => "CreateTransfer",
            LifecycleCommand::ApproveTransfer { .. } => "ApproveTransfer",
            LifecycleCommand::RejectTransfer { .. } => "RejectTransfer",
            LifecycleCommand::CompleteTransfer { .. } => "CompleteTransfer",
            LifecycleCommand::CancelTransfer { .. } => "CancelTransfer",
            LifecycleCommand::CreateDisposal { .. } => "CreateDisposal",
            LifecycleCommand::ApproveDisposal { .. } => "ApproveDisposal",
            LifecycleCommand::RejectDisposal { .. } => "RejectDisposal",
            LifecycleCommand::CompleteDisposal { .. } => "CompleteDisposal",
            LifecycleCommand::CancelDisposal { .. } => "CancelDisposal",
            LifecycleCommand::RecordDepreciation { .. } => "RecordDepreciation",
            LifecycleCommand::CreateMaintenance { .. } => "CreateMaintenance",
            LifecycleCommand::StartMaintenance { .. } => "StartMaintenance",
            LifecycleCommand::CompleteMaintenance { .. } => "CompleteMaintenance",
            LifecycleCommand::CancelMaintenance { .. } => "CancelMaintenance",
        }
    }
}

/// JSON schema of the whole command surface
pub fn command_schema() -> RootSchema {
    schemars::schema_for!(LifecycleCommand)
}

/// Acknowledgment returned when a command was committed
///
/// Commands return acknowledgments, not data; use the queries to read state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAcknowledgment {
    /// Id assigned to this command execution
    pub command_id: Uuid,
    /// Aggregate created or changed by the command
    pub aggregate_id: Uuid,
    /// Events committed by the command
    pub events: Vec<LifecycleEvent>,
    /// Budget positions reported for costs this command incurred
    #[serde(default)]
    pub budget_reports: Vec<BudgetReport>,
}

impl CommandAcknowledgment {
    /// Whether any reported budget is exceeded
    pub fn over_budget(&self) -> bool {
        self.budget_reports.iter().any(|report| report.over_budget)
    }
}
