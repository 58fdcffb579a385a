//! Shared harness for the lifecycle integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use cim_domain_asset::{
    Asset, AssetCondition, AssetId, CategoryId, CommandAcknowledgment, Custody, DomainResult,
    InMemoryAccountingSink, InMemoryBudgetTracker, InMemoryLifecycleStore, LifecycleCommand,
    LifecycleConfig, LifecycleEngine, NewAsset, OrganizationId, RecordingEventPublisher,
    TenantScope,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

pub struct Harness {
    pub engine: LifecycleEngine,
    pub store: Arc<InMemoryLifecycleStore>,
    pub events: RecordingEventPublisher,
    pub accounting: Arc<InMemoryAccountingSink>,
    pub budget: Arc<InMemoryBudgetTracker>,
    pub scope: TenantScope,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(LifecycleConfig::default(), InMemoryBudgetTracker::new(), OrganizationId::new())
    }

    pub fn with_config(config: LifecycleConfig) -> Self {
        Self::build(config, InMemoryBudgetTracker::new(), OrganizationId::new())
    }

    pub fn build(
        config: LifecycleConfig,
        budget: InMemoryBudgetTracker,
        organization_id: OrganizationId,
    ) -> Self {
        init_tracing();
        let store = Arc::new(InMemoryLifecycleStore::new());
        let events = RecordingEventPublisher::new();
        let accounting = Arc::new(InMemoryAccountingSink::new());
        let budget = Arc::new(budget);
        let engine = LifecycleEngine::new(store.clone(), config)
            .with_publisher(Arc::new(events.clone()))
            .with_accounting_sink(accounting.clone())
            .with_budget_tracker(budget.clone());
        Self {
            engine,
            store,
            events,
            accounting,
            budget,
            scope: TenantScope::new(organization_id),
        }
    }

    pub fn org(&self) -> OrganizationId {
        self.scope.organization_id()
    }

    pub fn run(&self, command: LifecycleCommand) -> DomainResult<CommandAcknowledgment> {
        self.engine.dispatch(self.scope, command)
    }

    pub fn run_in(
        &self,
        scope: TenantScope,
        command: LifecycleCommand,
    ) -> DomainResult<CommandAcknowledgment> {
        self.engine.dispatch(scope, command)
    }

    pub fn category(&self, code: &str) -> CategoryId {
        let ack = self
            .run(LifecycleCommand::RegisterCategory {
                code: code.to_string(),
                name: format!("{code} category"),
                parent_id: None,
            })
            .unwrap();
        CategoryId::from_uuid(ack.aggregate_id)
    }

    pub fn asset_with(&self, code: &str, original_cost: i64, custody: Custody) -> AssetId {
        let category_id = self.category(&format!("CAT-{code}"));
        let ack = self
            .run(LifecycleCommand::RegisterAsset {
                asset: NewAsset {
                    code: code.to_string(),
                    name: format!("Asset {code}"),
                    category_id,
                    purchase_price: dec(original_cost),
                    original_cost: dec(original_cost),
                    purchase_date: Some(date(2024, 1, 15)),
                    condition: AssetCondition::New,
                    custody,
                },
            })
            .unwrap();
        AssetId::from_uuid(ack.aggregate_id)
    }

    pub fn asset(&self, code: &str, original_cost: i64) -> AssetId {
        self.asset_with(code, original_cost, Custody::Unassigned)
    }

    pub fn load(&self, asset_id: AssetId) -> Asset {
        self.engine.queries().asset(self.scope, asset_id).unwrap()
    }
}
