use std::collections::BTreeMap;

use anyhow::Context;
use colored::*;
use serde::Serialize;
use tracing::info;

use ansinv_common::config::Config;
use ansinv_core::{Group, Host, Inventory, VarMap};

use crate::terminal::{colors, print};

type Detail = (String, ColoredString);

#[derive(Debug, Serialize)]
pub struct HostExport<'a> {
    pub name: &'a str,
    pub port: u16,
    /// Most specific first, `all` last
    pub groups: Vec<&'a str>,
    pub vars: &'a VarMap,
}

#[derive(Debug, Serialize)]
pub struct GroupExport<'a> {
    pub name: &'a str,
    pub parents: Vec<&'a str>,
    pub descendants: Vec<&'a str>,
    pub hosts: Vec<&'a str>,
    pub vars: &'a VarMap,
}

#[derive(Debug, Serialize)]
pub struct InventoryExport<'a> {
    pub hosts: Vec<HostExport<'a>>,
    pub groups: Vec<GroupExport<'a>>,
}

impl<'a> HostExport<'a> {
    pub fn new(host: &'a Host, inventory: &'a Inventory) -> Self {
        Self {
            name: &host.name,
            port: host.port,
            groups: names(host.list_groups_ordered(inventory)),
            vars: &host.vars,
        }
    }
}

impl<'a> GroupExport<'a> {
    pub fn new(group: &'a Group, inventory: &'a Inventory) -> Self {
        Self {
            name: &group.name,
            parents: names(group.list_parent_groups_ordered(inventory)),
            descendants: group.children.iter().map(String::as_str).collect(),
            hosts: group.hosts.iter().map(String::as_str).collect(),
            vars: &group.vars,
        }
    }
}

impl<'a> InventoryExport<'a> {
    pub fn new(inventory: &'a Inventory) -> Self {
        Self {
            hosts: inventory
                .hosts
                .values()
                .map(|host| HostExport::new(host, inventory))
                .collect(),
            groups: inventory
                .groups
                .values()
                .map(|group| GroupExport::new(group, inventory))
                .collect(),
        }
    }
}

fn names(groups: Vec<&Group>) -> Vec<&str> {
    groups.into_iter().map(|group| group.name.as_str()).collect()
}

/// Dumps every host and group.
pub fn full(inventory: &Inventory, pretty: bool, cfg: &Config) -> anyhow::Result<()> {
    let export = InventoryExport::new(inventory);
    if !pretty {
        return print_json(&export);
    }

    print::header("hosts", cfg.quiet);
    for (idx, host) in export.hosts.iter().enumerate() {
        print::tree_head(idx, host.name);
        print::as_tree_one_level(host_details(host));
    }
    print::header("groups", cfg.quiet);
    for (idx, group) in export.groups.iter().enumerate() {
        print::tree_head(idx, group.name);
        print::as_tree_one_level(group_details(group));
    }
    print::end_of_program();
    Ok(())
}

/// Dumps the hosts selected by a host-pattern expression, keyed by name.
pub fn matched(inventory: &Inventory, expression: &str, pretty: bool, cfg: &Config) -> anyhow::Result<()> {
    let hosts = inventory
        .match_hosts_by_patterns(expression)
        .with_context(|| format!("invalid host pattern '{expression}'"))?;
    info!("{} hosts matched '{expression}'", hosts.len());

    let export: BTreeMap<&str, HostExport> = hosts
        .into_iter()
        .map(|(name, host)| (name, HostExport::new(host, inventory)))
        .collect();
    if !pretty {
        return print_json(&export);
    }

    if export.is_empty() {
        print::header("zero hosts matched", cfg.quiet);
        return Ok(());
    }
    print::header(expression, cfg.quiet);
    for (idx, host) in export.values().enumerate() {
        print::tree_head(idx, host.name);
        print::as_tree_one_level(host_details(host));
    }
    print::end_of_program();
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode inventory")?;
    println!("{json}");
    Ok(())
}

fn host_details(host: &HostExport) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("port".to_string(), host.port.to_string().color(colors::ACCENT)),
        ("groups".to_string(), host.groups.join(", ").color(colors::GROUP)),
    ];
    details.extend(var_details(host.vars));
    details
}

fn group_details(group: &GroupExport) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();
    if !group.parents.is_empty() {
        details.push(("parents".to_string(), group.parents.join(", ").color(colors::GROUP)));
    }
    if !group.descendants.is_empty() {
        details.push(("children".to_string(), group.descendants.join(", ").color(colors::GROUP)));
    }
    details.push(("hosts".to_string(), group.hosts.len().to_string().color(colors::ACCENT)));
    details.extend(var_details(group.vars));
    details
}

fn var_details(vars: &VarMap) -> impl Iterator<Item = Detail> + '_ {
    vars.iter()
        .map(|(key, value)| (key.clone(), value.as_str().color(colors::VALUE)))
}
