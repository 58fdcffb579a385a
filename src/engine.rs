// Copyright 2025 Cowboy AI, LLC.

//! Lifecycle engine: the single entry point for commands
//!
//! `dispatch` maps each [`LifecycleCommand`] onto its handler, runs it inside
//! one store transaction and, only once that transaction committed, forwards
//! events, accounting entries and budget costs downstream. A failure in a
//! downstream collaborator is logged and never reaches the caller.
//!
//! # Examples
//!
//! ```rust
//! use cim_domain_asset::{
//!     LifecycleCommand, LifecycleConfig, LifecycleEngine, InMemoryLifecycleStore,
//!     OrganizationId, TenantScope,
//! };
//! use std::sync::Arc;
//!
//! let engine = LifecycleEngine::new(
//!     Arc::new(InMemoryLifecycleStore::new()),
//!     LifecycleConfig::default(),
//! );
//! let scope = TenantScope::new(OrganizationId::new());
//!
//! let ack = engine
//!     .dispatch(
//!         scope,
//!         LifecycleCommand::RegisterCategory {
//!             code: "IT".to_string(),
//!             name: "IT equipment".to_string(),
//!             parent_id: None,
//!         },
//!     )
//!     .unwrap();
//! assert_eq!(ack.events.len(), 1);
//! ```

use crate::commands::{CommandAcknowledgment, LifecycleCommand};
use crate::config::LifecycleConfig;
use crate::downstream::{AccountingSink, BudgetReport, BudgetTracker, LoggingDownstream};
use crate::errors::DomainResult;
use crate::events::{EventPublisher, TracingEventPublisher};
use crate::handlers::{self, Effects};
use crate::persistence::{InMemoryLifecycleStore, LifecycleStore, UnitOfWork};
use crate::queries::LifecycleQueries;
use crate::tenant::TenantScope;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Command dispatcher bound to a store and its downstream collaborators
pub struct LifecycleEngine<S: LifecycleStore = InMemoryLifecycleStore> {
    store: Arc<S>,
    config: LifecycleConfig,
    publisher: Arc<dyn EventPublisher>,
    accounting: Arc<dyn AccountingSink>,
    budget: Arc<dyn BudgetTracker>,
}

impl<S: LifecycleStore> LifecycleEngine<S> {
    /// Engine that logs events and downstream records
    pub fn new(store: Arc<S>, config: LifecycleConfig) -> Self {
        Self {
            store,
            config,
            publisher: Arc::new(TracingEventPublisher),
            accounting: Arc::new(LoggingDownstream),
            budget: Arc::new(LoggingDownstream),
        }
    }

    /// Replace the event publisher
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Replace the accounting sink
    pub fn with_accounting_sink(mut self, accounting: Arc<dyn AccountingSink>) -> Self {
        self.accounting = accounting;
        self
    }

    /// Replace the budget tracker
    pub fn with_budget_tracker(mut self, budget: Arc<dyn BudgetTracker>) -> Self {
        self.budget = budget;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Tenant-scoped reads over the same store
    pub fn queries(&self) -> LifecycleQueries<'_, S> {
        LifecycleQueries::new(&self.store)
    }

    /// Execute one command as an atomic unit
    pub fn dispatch(
        &self,
        scope: TenantScope,
        command: LifecycleCommand,
    ) -> DomainResult<CommandAcknowledgment> {
        let command_id = Uuid::new_v4();
        let name = command.name();
        let config = &self.config;

        let effects = match self
            .store
            .transaction(scope, |uow| route(uow, config, command))
        {
            Ok(effects) => effects,
            Err(err) => {
                debug!(%command_id, command = name, %scope, error = %err, "command refused");
                return Err(err);
            }
        };

        info!(
            %command_id,
            command = name,
            %scope,
            aggregate_id = %effects.aggregate_id,
            events = effects.events.len(),
            "command committed"
        );

        let budget_reports = self.forward(command_id, &effects);
        Ok(CommandAcknowledgment {
            command_id,
            aggregate_id: effects.aggregate_id,
            events: effects.events,
            budget_reports,
        })
    }

    // Post-commit fan-out. Failures are logged only: the command has
    // already been committed.
    fn forward(&self, command_id: Uuid, effects: &Effects) -> Vec<BudgetReport> {
        if let Err(err) = self.publisher.publish_events(&effects.events, command_id) {
            warn!(%command_id, error = %err, "event publishing failed after commit");
        }

        for entry in &effects.entries {
            if let Err(err) = self.accounting.post_entry(entry) {
                warn!(
                    %command_id,
                    reference_id = %entry.reference_id,
                    error = %err,
                    "accounting entry not delivered"
                );
            }
        }

        let mut reports = Vec::with_capacity(effects.costs.len());
        for cost in &effects.costs {
            match self.budget.record_cost(cost) {
                Ok(report) => {
                    if report.over_budget {
                        warn!(
                            %command_id,
                            fiscal_year = report.fiscal_year,
                            spent = %report.spent,
                            limit = ?report.limit,
                            "department over budget"
                        );
                    }
                    reports.push(report);
                }
                Err(err) => warn!(
                    %command_id,
                    reference_id = %cost.reference_id,
                    error = %err,
                    "budget cost not delivered"
                ),
            }
        }
        reports
    }
}

fn route(
    uow: &mut UnitOfWork<'_>,
    config: &LifecycleConfig,
    command: LifecycleCommand,
) -> DomainResult<Effects> {
    use handlers::{asset, depreciation, disposal, maintenance, transfer};
    use LifecycleCommand as C;

    match command {
        C::RegisterCategory {
            code,
            name,
            parent_id,
        } => asset::register_category(uow, code, name, parent_id),
        C::RegisterAsset { asset: new_asset } => asset::register_asset(uow, new_asset),
        C::UpdateAssetFinancials {
            asset_id,
            purchase_price,
            original_cost,
            current_value,
        } => asset::update_financials(uow, asset_id, purchase_price, original_cost, current_value),
        C::AssignAssetToUser {
            asset_id,
            user_id,
            department_id,
        } => asset::assign_to_user(uow, asset_id, user_id, department_id),
        C::UnassignAsset { asset_id } => asset::unassign(uow, asset_id),
        C::StoreAssetInDepartment {
            asset_id,
            department_id,
        } => asset::store_in_department(uow, asset_id, department_id),

        C::CreateTransfer { asset_id, request } => transfer::create(uow, asset_id, request),
        C::ApproveTransfer {
            transfer_id,
            approver_id,
        } => transfer::approve(uow, config, transfer_id, approver_id),
        C::RejectTransfer {
            transfer_id,
            approver_id,
            reason,
        } => transfer::reject(uow, transfer_id, approver_id, reason),
        C::CompleteTransfer { transfer_id } => transfer::complete(uow, transfer_id),
        C::CancelTransfer {
            transfer_id,
            reason,
        } => transfer::cancel(uow, transfer_id, reason),

        C::CreateDisposal { asset_id, request } => disposal::create(uow, asset_id, request),
        C::ApproveDisposal {
            disposal_id,
            approver_id,
        } => disposal::approve(uow, config, disposal_id, approver_id),
        C::RejectDisposal {
            disposal_id,
            approver_id,
            reason,
        } => disposal::reject(uow, disposal_id, approver_id, reason),
        C::CompleteDisposal { disposal_id } => disposal::complete(uow, config, disposal_id),
        C::CancelDisposal {
            disposal_id,
            reason,
        } => disposal::cancel(uow, disposal_id, reason),

        C::RecordDepreciation { asset_id, charge } => {
            depreciation::record(uow, config, asset_id, charge)
        }

        C::CreateMaintenance { asset_id, request } => maintenance::create(uow, asset_id, request),
        C::StartMaintenance {
            maintenance_id,
            performer_id,
        } => maintenance::start(uow, maintenance_id, performer_id),
        C::CompleteMaintenance {
            maintenance_id,
            outcome,
        } => maintenance::complete(uow, config, maintenance_id, outcome),
        C::CancelMaintenance {
            maintenance_id,
            reason,
        } => maintenance::cancel(uow, maintenance_id, reason),
    }
}
