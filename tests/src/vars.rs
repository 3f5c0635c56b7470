#![cfg(test)]
use ansinv_core::{Inventory, parse_inventory_file};

use crate::fixture;

fn var<'a>(vars: &'a ansinv_core::VarMap, key: &str) -> Option<&'a str> {
    vars.get(key).map(String::as_str)
}

#[test]
fn add_vars_merges_file_layer() {
    let mut inventory: Inventory = parse_inventory_file(fixture("inventory")).unwrap();

    let web = &inventory.groups["web"];
    assert_eq!(var(&web.vars, "web_inventory_string_var"), Some("present"));
    assert_eq!(var(&web.vars, "web_string_var"), Some("should be overwritten"));
    let host1 = &inventory.hosts["host1"];
    assert_eq!(var(&host1.vars, "host1_inventory_string_var"), Some("present"));
    assert_eq!(var(&host1.vars, "host1_string_var"), Some("should be overwritten"));

    inventory.add_vars(fixture("")).unwrap();

    let object = r#"{"this":{"is":"object"}}"#;

    let web = &inventory.groups["web"];
    assert_eq!(var(&web.vars, "web_int_var"), Some("1"));
    assert_eq!(var(&web.vars, "web_string_var"), Some("string"));
    assert_eq!(var(&web.vars, "web_object_var"), Some(object));
    assert_eq!(var(&web.vars, "web_inventory_string_var"), Some("present"));

    let nginx = &inventory.groups["nginx"];
    assert_eq!(var(&nginx.vars, "nginx_int_var"), Some("1"));
    assert_eq!(var(&nginx.vars, "nginx_string_var"), Some("string"));
    assert_eq!(var(&nginx.vars, "nginx_bool_var"), Some("true"));
    assert_eq!(var(&nginx.vars, "nginx_object_var"), Some(object));
    // Inherited from web
    assert_eq!(var(&nginx.vars, "web_int_var"), Some("1"));

    let host1 = &inventory.hosts["host1"];
    assert_eq!(var(&host1.vars, "host1_int_var"), Some("1"));
    assert_eq!(var(&host1.vars, "host1_string_var"), Some("string"));
    assert_eq!(var(&host1.vars, "host1_object_var"), Some(object));
    assert_eq!(var(&host1.vars, "host1_inventory_string_var"), Some("present"));
    assert_eq!(var(&host1.vars, "nginx_int_var"), None);

    let host2 = &inventory.hosts["host2"];
    assert_eq!(var(&host2.vars, "host2_int_var"), Some("1"));
    assert_eq!(var(&host2.vars, "host2_string_var"), Some("string"));
    assert_eq!(var(&host2.vars, "host2_object_var"), Some(object));

    let host3 = &inventory.hosts["host3"];
    assert_eq!(var(&host3.vars, "nginx_bool_var"), Some("true"));
    assert_eq!(var(&host3.vars, "web_string_var"), Some("string"));

    assert!(!inventory.groups.contains_key("tomcat"));
    assert!(!inventory.hosts.contains_key("host7"));
    assert!(inventory.groups["TomCat"].vars.is_empty());
}

#[test]
fn add_vars_lower_cased_matches_folded_names() {
    let mut inventory = parse_inventory_file(fixture("inventory")).unwrap();

    inventory.hosts_to_lower();
    inventory.groups_to_lower();
    inventory.add_vars_lower_cased(fixture("")).unwrap();

    assert!(inventory.groups.contains_key("tomcat"));
    assert!(inventory.hosts.contains_key("host7"));
    assert_eq!(var(&inventory.groups["tomcat"].vars, "tomcat_string_var"), Some("string"));
    assert_eq!(var(&inventory.hosts["host7"].vars, "host7_string_var"), Some("string"));
    assert_eq!(var(&inventory.hosts["host7"].vars, "tomcat_string_var"), Some("string"));
}
