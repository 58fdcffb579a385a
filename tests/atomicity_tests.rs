//! Commit atomicity, concurrent commands and post-commit fan-out

mod common;

use cim_domain_asset::{
    AssetStatus, CategoryId, Custody, CustodyEndpoint, DepartmentId, DepreciationCharge, DepreciationMethod,
    DisposalId, DisposalRequest, DisposalStatus, DisposalType, EventPublisher,
    InMemoryLifecycleStore, LifecycleCommand, LifecycleConfig, LifecycleEngine, LifecycleEvent,
    OrganizationId, TenantScope, TransferId, TransferRequest, TransferStatus, TransferType,
    UserId,
};
use common::{date, dec, Harness};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

fn transfer_request(to: CustodyEndpoint) -> TransferRequest {
    TransferRequest {
        transfer_type: TransferType::Permanent,
        transfer_date: date(2025, 4, 1),
        from: None,
        to,
        reason: "relocation".to_string(),
        expected_return_date: None,
    }
}

#[test]
fn failed_commit_of_transfer_completion_changes_neither_aggregate() {
    let h = Harness::new();
    let dept = DepartmentId::new();
    let asset_id = h.asset("ATM-1", 2000);
    let transfer_id = TransferId::from_uuid(
        h.run(LifecycleCommand::CreateTransfer {
            asset_id,
            request: transfer_request(CustodyEndpoint::department(dept)),
        })
        .unwrap()
        .aggregate_id,
    );
    h.run(LifecycleCommand::ApproveTransfer {
        transfer_id,
        approver_id: UserId::new(),
    })
    .unwrap();
    let published_before = h.events.published().len();

    h.store.fail_next_commit();
    let err = h
        .run(LifecycleCommand::CompleteTransfer { transfer_id })
        .unwrap_err();
    assert!(err.is_persistence());

    let transfer = h.engine.queries().transfer(h.scope, transfer_id).unwrap();
    assert_eq!(transfer.status(), TransferStatus::Approved);
    assert!(transfer.completed_at().is_none());
    let asset = h.load(asset_id);
    assert_eq!(asset.custody(), &Custody::Unassigned);
    assert_eq!(asset.status(), AssetStatus::Available);
    // nothing leaves the engine for a refused commit
    assert_eq!(h.events.published().len(), published_before);

    // the same command succeeds once storage recovers
    h.run(LifecycleCommand::CompleteTransfer { transfer_id })
        .unwrap();
    assert_eq!(h.load(asset_id).current_department_id(), Some(dept));
}

#[test]
fn failed_commit_of_depreciation_leaves_ledger_and_asset_untouched() {
    let h = Harness::new();
    let asset_id = h.asset("ATM-2", 1000);
    let charge = DepreciationCharge {
        method: DepreciationMethod::StraightLine,
        depreciation_date: date(2025, 1, 31),
        depreciation_value: dec(100),
    };

    h.store.fail_next_commit();
    let err = h
        .run(LifecycleCommand::RecordDepreciation {
            asset_id,
            charge: charge.clone(),
        })
        .unwrap_err();
    assert!(err.is_persistence());

    assert_eq!(h.load(asset_id).current_value(), dec(1000));
    assert!(h
        .engine
        .queries()
        .depreciation_history(h.scope, asset_id)
        .unwrap()
        .is_empty());
    assert!(h.accounting.entries().is_empty());

    h.run(LifecycleCommand::RecordDepreciation { asset_id, charge })
        .unwrap();
    assert_eq!(h.load(asset_id).current_value(), dec(900));
    assert_eq!(h.accounting.entries().len(), 1);
}

#[test]
fn failed_commit_of_disposal_cascade_keeps_everything_open() {
    let h = Harness::new();
    let asset_id = h.asset("ATM-3", 3000);
    let transfer_id = TransferId::from_uuid(
        h.run(LifecycleCommand::CreateTransfer {
            asset_id,
            request: transfer_request(CustodyEndpoint::user(UserId::new(), None)),
        })
        .unwrap()
        .aggregate_id,
    );
    let disposal_id = DisposalId::from_uuid(
        h.run(LifecycleCommand::CreateDisposal {
            asset_id,
            request: DisposalRequest {
                disposal_type: DisposalType::Sale,
                disposal_date: date(2025, 8, 1),
                disposal_value: dec(500),
                disposal_cost: dec(20),
                reason: "surplus".to_string(),
            },
        })
        .unwrap()
        .aggregate_id,
    );
    h.run(LifecycleCommand::ApproveDisposal {
        disposal_id,
        approver_id: UserId::new(),
    })
    .unwrap();

    h.store.fail_next_commit();
    assert!(h
        .run(LifecycleCommand::CompleteDisposal { disposal_id })
        .unwrap_err()
        .is_persistence());

    let queries = h.engine.queries();
    assert_eq!(
        queries.disposal(h.scope, disposal_id).unwrap().status(),
        DisposalStatus::Approved
    );
    assert_eq!(
        queries.transfer(h.scope, transfer_id).unwrap().status(),
        TransferStatus::Pending
    );
    assert_eq!(h.load(asset_id).status(), AssetStatus::Available);
    assert!(h.budget.events().is_empty());
}

#[test]
fn concurrent_transfer_requests_admit_exactly_one() {
    let h = Harness::new();
    let asset_id = h.asset("RACE-1", 5000);
    let engine = &h.engine;
    let scope = h.scope;

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                s.spawn(move || {
                    engine.dispatch(
                        scope,
                        LifecycleCommand::CreateTransfer {
                            asset_id,
                            request: transfer_request(CustodyEndpoint::department(
                                DepartmentId::new(),
                            )),
                        },
                    )
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(err) if err.is_conflict()))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(
        h.engine
            .queries()
            .transfers_for_asset(h.scope, asset_id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn concurrent_depreciation_never_overdraws() {
    let h = Harness::new();
    let asset_id = h.asset("RACE-2", 1000);
    let engine = &h.engine;
    let scope = h.scope;

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(move || {
                    engine.dispatch(
                        scope,
                        LifecycleCommand::RecordDepreciation {
                            asset_id,
                            charge: DepreciationCharge {
                                method: DepreciationMethod::Manual,
                                depreciation_date: date(2025, 3, 31),
                                depreciation_value: dec(300),
                            },
                        },
                    )
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    // 3 x 300 fit in 1000, the fourth would overdraw
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    assert_eq!(h.load(asset_id).current_value(), dec(100));
    assert_eq!(
        h.engine
            .queries()
            .depreciation_history(h.scope, asset_id)
            .unwrap()
            .len(),
        3
    );
}

#[test]
fn unavailable_accounting_does_not_undo_the_commit() {
    let h = Harness::new();
    let asset_id = h.asset("ATM-4", 800);
    h.accounting.set_unavailable(true);

    let ack = h
        .run(LifecycleCommand::RecordDepreciation {
            asset_id,
            charge: DepreciationCharge {
                method: DepreciationMethod::StraightLine,
                depreciation_date: date(2025, 2, 28),
                depreciation_value: dec(80),
            },
        })
        .unwrap();

    assert_eq!(ack.events.len(), 1);
    assert_eq!(h.load(asset_id).current_value(), dec(720));
    assert!(h.accounting.entries().is_empty());
}

struct FailingPublisher {
    calls: AtomicUsize,
}

impl EventPublisher for FailingPublisher {
    fn publish_events(&self, _events: &[LifecycleEvent], _command_id: Uuid) -> Result<(), String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err("bus offline".to_string())
    }
}

#[test]
fn failing_publisher_does_not_undo_the_commit() {
    common::init_tracing();
    let publisher = Arc::new(FailingPublisher {
        calls: AtomicUsize::new(0),
    });
    let engine = LifecycleEngine::new(
        Arc::new(InMemoryLifecycleStore::new()),
        LifecycleConfig::default(),
    )
    .with_publisher(publisher.clone());
    let scope = TenantScope::new(OrganizationId::new());

    let ack = engine
        .dispatch(
            scope,
            LifecycleCommand::RegisterCategory {
                code: "PUB".to_string(),
                name: "Publishing".to_string(),
                parent_id: None,
            },
        )
        .unwrap();

    assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    let category = engine
        .queries()
        .category(scope, CategoryId::from_uuid(ack.aggregate_id))
        .unwrap();
    assert_eq!(category.code, "PUB");
}
