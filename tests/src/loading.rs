#![cfg(test)]
use ansinv_core::{ALL, Config, InventoryError, UNGROUPED, load};

use crate::fixture;

#[test]
fn load_with_default_config() {
    let inventory = load(fixture("inventory"), &Config::default()).unwrap();

    assert!(inventory.hosts.contains_key("host7"));
    assert!(!inventory.hosts.contains_key("Host7"));
    assert_eq!(inventory.hosts["host3"].port, 2222);
    assert_eq!(
        inventory.hosts["host7"].vars.get("tomcat_string_var").map(String::as_str),
        Some("string")
    );

    for host in inventory.hosts.values() {
        assert!(host.groups.contains(ALL), "{} is not in all", host.name);
        assert!(!host.groups.contains(UNGROUPED), "{} is still ungrouped", host.name);
    }
    assert_eq!(inventory.groups[ALL].hosts.len(), 4);
}

#[test]
fn load_keep_case_without_vars() {
    let cfg = Config {
        lowercase: false,
        load_vars: false,
        ..Config::default()
    };
    let inventory = load(fixture("inventory"), &cfg).unwrap();

    assert!(inventory.hosts.contains_key("Host7"));
    assert!(inventory.groups.contains_key("TomCat"));
    assert_eq!(inventory.hosts["host1"].vars.get("host1_int_var"), None);
}

#[test]
fn load_missing_inventory() {
    let err = load(fixture("does-not-exist"), &Config::default()).unwrap_err();
    assert!(matches!(err, InventoryError::Io { .. }));
}

#[test]
fn load_reports_broken_var_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("hosts");
    std::fs::write(&path, "[web]\nweb1\n")?;
    std::fs::create_dir_all(dir.path().join("group_vars"))?;
    std::fs::write(dir.path().join("group_vars/web.yml"), "key: [unterminated\n")?;

    let err = load(&path, &Config::default()).unwrap_err();
    assert!(matches!(err, InventoryError::Yaml { .. }), "unexpected error: {err}");
    Ok(())
}
