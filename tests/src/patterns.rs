#![cfg(test)]
use ansinv_core::{Config, Inventory, PatternError, load};

use crate::fixture;

fn inventory() -> Inventory {
    load(fixture("inventory"), &Config::default()).unwrap()
}

fn select<'a>(inventory: &'a Inventory, expression: &str) -> Vec<&'a str> {
    inventory
        .match_hosts_by_patterns(expression)
        .unwrap()
        .into_keys()
        .collect()
}

#[test]
fn host_patterns_over_fixture() {
    let inventory = inventory();

    assert_eq!(select(&inventory, "web"), vec!["host1", "host2", "host3"]);
    assert_eq!(select(&inventory, "web:!nginx"), vec!["host1", "host2"]);
    assert_eq!(select(&inventory, "all:&nginx"), vec!["host3"]);
    assert_eq!(select(&inventory, "tomcat:host1"), vec!["host1", "host7"]);
}

#[test]
fn leading_operators_are_rejected() {
    let inventory = inventory();
    assert!(matches!(
        inventory.match_hosts_by_patterns("&web"),
        Err(PatternError::LeadingIntersection(_))
    ));
    assert!(matches!(
        inventory.match_hosts_by_patterns("!web"),
        Err(PatternError::LeadingExclusion(_))
    ));
}

#[test]
fn ordered_groups_over_fixture() {
    let inventory = inventory();

    let host3 = &inventory.hosts["host3"];
    let groups: Vec<&str> = host3
        .list_groups_ordered(&inventory)
        .into_iter()
        .map(|group| group.name.as_str())
        .collect();
    assert_eq!(groups, vec!["nginx", "web", "all"]);

    let matched = host3.match_groups(&inventory, "*n*").unwrap();
    assert_eq!(matched.into_keys().collect::<Vec<_>>(), vec!["nginx"]);

    let web_hosts = inventory.groups["web"].match_hosts(&inventory, "host[13]").unwrap();
    assert_eq!(web_hosts.into_keys().collect::<Vec<_>>(), vec!["host1", "host3"]);
}

#[test]
fn var_values_match_by_glob() {
    let inventory = inventory();
    let vars = inventory.groups["nginx"].match_vars("{*").unwrap();
    let keys: Vec<&str> = vars.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["nginx_object_var", "web_object_var"]);
}
