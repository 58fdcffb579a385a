//! JSON command surface, schema and category registry

mod common;

use cim_domain_asset::{
    command_schema, AssetId, AssetStatus, CategoryId, CommandAcknowledgment, ExecutionModel,
    LifecycleCommand, LifecycleConfig, LifecycleEvent,
};
use common::{dec, Harness};
use serde_json::json;

#[test]
fn commands_dispatch_from_json() {
    let h = Harness::new();
    let category_id = h.category("IT");

    let register: LifecycleCommand = serde_json::from_value(json!({
        "command": "register_asset",
        "asset": {
            "code": "NB-204",
            "name": "Notebook",
            "category_id": category_id.to_string(),
            "purchase_price": "1150.00",
            "original_cost": "1200.00"
        }
    }))
    .unwrap();
    let ack = h.run(register).unwrap();
    let asset_id = AssetId::from_uuid(ack.aggregate_id);

    let asset = h.load(asset_id);
    assert_eq!(asset.code(), "NB-204");
    assert_eq!(asset.status(), AssetStatus::Available);
    assert_eq!(asset.current_value(), dec(1200));

    let depreciate: LifecycleCommand = serde_json::from_value(json!({
        "command": "record_depreciation",
        "asset_id": asset_id.to_string(),
        "charge": {
            "method": "STRAIGHT_LINE",
            "depreciation_date": "2025-01-31",
            "depreciation_value": "100.50"
        }
    }))
    .unwrap();
    h.run(depreciate).unwrap();
    assert_eq!(
        h.load(asset_id).current_value(),
        rust_decimal::Decimal::new(109950, 2)
    );
}

#[test]
fn unknown_command_is_rejected_by_serde() {
    let parsed = serde_json::from_value::<LifecycleCommand>(json!({
        "command": "delete_everything"
    }));
    assert!(parsed.is_err());
}

#[test]
fn acknowledgment_round_trips_as_json() {
    let h = Harness::new();
    let category_id = h.category("FURN");
    let ack = h
        .run(LifecycleCommand::RegisterCategory {
            code: "CHAIRS".to_string(),
            name: "Chairs".to_string(),
            parent_id: Some(category_id),
        })
        .unwrap();

    let json = serde_json::to_value(&ack).unwrap();
    assert_eq!(json["events"][0]["type"], "CategoryRegistered");
    assert_eq!(json["events"][0]["parent_id"], category_id.to_string());

    let back: CommandAcknowledgment = serde_json::from_value(json).unwrap();
    assert_eq!(back, ack);
    assert!(matches!(
        back.events[0],
        LifecycleEvent::CategoryRegistered { parent_id: Some(p), .. } if p == category_id
    ));
}

#[test]
fn schema_describes_every_command() {
    let schema = serde_json::to_value(command_schema()).unwrap();
    let text = schema.to_string();
    for name in [
        "register_category",
        "register_asset",
        "update_asset_financials",
        "assign_asset_to_user",
        "unassign_asset",
        "store_asset_in_department",
        "create_transfer",
        "approve_transfer",
        "reject_transfer",
        "complete_transfer",
        "cancel_transfer",
        "create_disposal",
        "approve_disposal",
        "reject_disposal",
        "complete_disposal",
        "cancel_disposal",
        "record_depreciation",
        "create_maintenance",
        "start_maintenance",
        "complete_maintenance",
        "cancel_maintenance",
    ] {
        assert!(text.contains(&format!("\"{name}\"")), "missing {name}");
    }
}

#[test]
fn category_tree_queries() {
    let h = Harness::new();
    let root = h.category("VEHICLES");
    let child = |code: &str, parent: CategoryId| {
        CategoryId::from_uuid(
            h.run(LifecycleCommand::RegisterCategory {
                code: code.to_string(),
                name: code.to_lowercase(),
                parent_id: Some(parent),
            })
            .unwrap()
            .aggregate_id,
        )
    };
    let cars = child("CARS", root);
    let trucks = child("TRUCKS", root);
    let electric = child("EV", cars);

    let queries = h.engine.queries();
    let children: Vec<_> = queries
        .category_children(h.scope, root)
        .unwrap()
        .into_iter()
        .map(|c| c.code)
        .collect();
    assert_eq!(children, vec!["CARS", "TRUCKS"]);

    let descendants = queries.category_descendants(h.scope, root).unwrap();
    assert_eq!(descendants.len(), 3);
    assert!(descendants.iter().any(|c| c.code == "EV"));
    assert_eq!(queries.category(h.scope, electric).unwrap().parent_id(), Some(cars));
    assert!(queries.category_children(h.scope, trucks).unwrap().is_empty());
}

#[test]
fn category_rules() {
    let h = Harness::new();
    h.category("TOOLS");

    let duplicate = h
        .run(LifecycleCommand::RegisterCategory {
            code: "tools".to_string(),
            name: "Tools again".to_string(),
            parent_id: None,
        })
        .unwrap_err();
    assert!(duplicate.is_conflict());

    let orphan = h
        .run(LifecycleCommand::RegisterCategory {
            code: "ORPHAN".to_string(),
            name: "Orphan".to_string(),
            parent_id: Some(CategoryId::new()),
        })
        .unwrap_err();
    assert!(orphan.is_not_found());
}

#[test]
fn financial_correction_is_range_checked() {
    let h = Harness::new();
    let asset_id = h.asset("FIN-1", 1000);

    let err = h
        .run(LifecycleCommand::UpdateAssetFinancials {
            asset_id,
            purchase_price: dec(1000),
            original_cost: dec(1000),
            current_value: dec(1001),
        })
        .unwrap_err();
    assert!(err.is_invalid_value());

    h.run(LifecycleCommand::UpdateAssetFinancials {
        asset_id,
        purchase_price: dec(950),
        original_cost: dec(1100),
        current_value: dec(800),
    })
    .unwrap();
    let asset = h.load(asset_id);
    assert_eq!(asset.current_value(), dec(800));
    assert_eq!(asset.financials().original_cost(), dec(1100));
}

#[test]
fn config_drives_execution_model() {
    let config =
        LifecycleConfig::from_json_str(r#"{ "execution_model": "immediate_on_approval" }"#)
            .unwrap();
    assert_eq!(config.execution_model, ExecutionModel::ImmediateOnApproval);

    let h = Harness::with_config(config);
    assert_eq!(
        h.engine.config().execution_model,
        ExecutionModel::ImmediateOnApproval
    );
    assert!(LifecycleConfig::from_json_str(r#"{ "fiscal_year_start_month": 13 }"#).is_err());
}
