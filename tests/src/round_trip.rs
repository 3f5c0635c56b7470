#![cfg(test)]
use ansinv_core::{Config, Inventory, load};

use crate::fixture;

#[test]
fn json_round_trip_with_vars() {
    let inventory = load(fixture("inventory"), &Config::default()).unwrap();

    let json = inventory.to_json_pretty().unwrap();
    let restored = Inventory::from_json(&json).unwrap();

    assert_eq!(restored.hosts["host1"], inventory.hosts["host1"]);
    assert_eq!(restored.groups["tomcat"], inventory.groups["tomcat"]);
    assert_eq!(restored, inventory);
}

#[test]
fn restored_inventory_reconciles_to_itself() {
    let inventory = load(fixture("inventory"), &Config::default()).unwrap();
    let mut restored = Inventory::from_json(&inventory.to_json().unwrap()).unwrap();

    restored.reconcile();
    assert_eq!(restored, inventory);
}

#[test]
fn relationships_are_name_sets() {
    let inventory = load(fixture("inventory"), &Config::default()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&inventory.to_json().unwrap()).unwrap();

    assert_eq!(
        value["groups"]["nginx"]["parents"],
        serde_json::json!({ "all": null, "web": null })
    );
    assert_eq!(
        value["hosts"]["host3"]["direct_groups"],
        serde_json::json!({ "nginx": null })
    );
}
