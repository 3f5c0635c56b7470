//! # Inventory Graph
//!
//! Hosts and groups live in two name-keyed registries owned by [`Inventory`].
//! Every relationship (host → group, group → parent, group → host) is a set of
//! names into those registries, so the graph never owns itself and cycles in
//! malformed input cannot leak or loop.
//!
//! Parsing only records *direct* relationships. [`Inventory::reconcile`]
//! rebuilds everything else from scratch: ancestor/descendant closures, full
//! membership sets and the resolved variable maps.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::{marshal, ordered, vars};

/// Name of the implicit group every host and group belongs to.
pub const ALL: &str = "all";
/// Name of the implicit group holding hosts without any other direct group.
pub const UNGROUPED: &str = "ungrouped";

pub const DEFAULT_PORT: u16 = 22;

pub type VarMap = BTreeMap<String, String>;
pub type NameSet = BTreeSet<String>;

/// An inventory host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Host {
    pub name: String,
    pub port: u16,
    /// Resolved variables, every layer merged.
    pub vars: VarMap,
    /// Every group the host belongs to, `all` included.
    #[serde(with = "marshal::name_set")]
    pub groups: NameSet,
    /// Groups the host was listed under in the inventory text.
    #[serde(with = "marshal::name_set")]
    pub direct_groups: NameSet,
    /// Inline `key=value` pairs from the host line.
    pub inventory_vars: VarMap,
    /// Values loaded from `host_vars/`.
    pub file_vars: VarMap,
}

/// An inventory group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Group {
    pub name: String,
    pub vars: VarMap,
    /// Every host of this group or of any descendant group.
    #[serde(with = "marshal::name_set")]
    pub hosts: NameSet,
    #[serde(with = "marshal::name_set")]
    pub direct_hosts: NameSet,
    /// Every descendant group.
    #[serde(with = "marshal::name_set")]
    pub children: NameSet,
    /// Every ancestor group.
    #[serde(with = "marshal::name_set")]
    pub parents: NameSet,
    #[serde(with = "marshal::name_set")]
    pub direct_parents: NameSet,
    /// Values from `[name:vars]` sections.
    pub inventory_vars: VarMap,
    /// Values loaded from `group_vars/`.
    pub file_vars: VarMap,
    pub all_inventory_vars: VarMap,
    pub all_file_vars: VarMap,
}

impl Default for Host {
    fn default() -> Self {
        Host::new(String::new())
    }
}

impl Default for Group {
    fn default() -> Self {
        Group::new(String::new())
    }
}

impl Host {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            port: DEFAULT_PORT,
            vars: VarMap::new(),
            groups: NameSet::new(),
            direct_groups: NameSet::new(),
            inventory_vars: VarMap::new(),
            file_vars: VarMap::new(),
        }
    }

    fn clear_computed(&mut self) {
        self.groups.clear();
        self.vars.clear();
    }

    /// Folds another host with the same (case-folded) name into this one.
    fn absorb(&mut self, other: Host) {
        self.port = other.port;
        self.direct_groups.extend(other.direct_groups);
        self.groups.extend(other.groups);
        self.inventory_vars.extend(other.inventory_vars);
        self.file_vars.extend(other.file_vars);
    }
}

impl Group {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            vars: VarMap::new(),
            hosts: NameSet::new(),
            direct_hosts: NameSet::new(),
            children: NameSet::new(),
            parents: NameSet::new(),
            direct_parents: NameSet::new(),
            inventory_vars: VarMap::new(),
            file_vars: VarMap::new(),
            all_inventory_vars: VarMap::new(),
            all_file_vars: VarMap::new(),
        }
    }

    fn clear_computed(&mut self) {
        self.hosts.clear();
        self.direct_hosts.clear();
        self.children.clear();
        self.parents.clear();
        self.vars.clear();
        self.all_inventory_vars.clear();
        self.all_file_vars.clear();
    }

    fn absorb(&mut self, other: Group) {
        self.direct_hosts.extend(other.direct_hosts);
        self.hosts.extend(other.hosts);
        self.direct_parents.extend(other.direct_parents);
        self.parents.extend(other.parents);
        self.children.extend(other.children);
        self.inventory_vars.extend(other.inventory_vars);
        self.file_vars.extend(other.file_vars);
    }
}

/// A parsed inventory: all hosts and all groups, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub groups: BTreeMap<String, Group>,
    pub hosts: BTreeMap<String, Host>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the host called `name`, registering an empty one first if needed.
    pub fn get_or_create_host(&mut self, name: &str) -> &mut Host {
        self.hosts
            .entry(name.to_string())
            .or_insert_with(|| Host::new(name.to_string()))
    }

    /// Returns the group called `name`, registering an empty one first if needed.
    pub fn get_or_create_group(&mut self, name: &str) -> &mut Group {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| Group::new(name.to_string()))
    }

    /// Recomputes every derived relationship and variable map from the direct
    /// relationships and raw variables.
    ///
    /// Safe to call any number of times; each call clears and rebuilds.
    pub fn reconcile(&mut self) {
        for group in self.groups.values_mut() {
            group.clear_computed();
        }
        for host in self.hosts.values_mut() {
            host.clear_computed();
        }

        self.get_or_create_group(ALL);
        self.get_or_create_group(UNGROUPED)
            .direct_parents
            .insert(ALL.to_string());

        self.register_referenced_groups();
        self.link_groups();
        self.link_hosts();

        vars::reconcile_vars(self);

        debug!(
            hosts = self.hosts.len(),
            groups = self.groups.len(),
            "inventory reconciled"
        );
    }

    /// Registers groups that are only known through a host's direct groups or
    /// another group's direct parents.
    fn register_referenced_groups(&mut self) {
        let pending: Vec<String> = self
            .hosts
            .values()
            .flat_map(|host| host.direct_groups.iter().cloned())
            .chain(
                self.groups
                    .values()
                    .flat_map(|group| group.direct_parents.iter().cloned()),
            )
            .collect();

        for name in pending {
            if !self.groups.contains_key(&name) {
                debug!(group = %name, "registering group referenced but never declared");
                self.get_or_create_group(&name);
            }
        }
    }

    fn link_groups(&mut self) {
        for (name, group) in self.groups.iter_mut() {
            if name != ALL {
                group.direct_parents.insert(ALL.to_string());
            }
        }

        let names: Vec<String> = self.groups.keys().cloned().collect();
        for name in &names {
            let Some(group) = self.groups.get(name) else {
                continue;
            };
            let ancestors: NameSet =
                ordered::ancestors_ordered(&self.groups, &group.direct_parents, Some(name.as_str()))
                    .into_iter()
                    .map(str::to_owned)
                    .collect();

            for ancestor in &ancestors {
                if let Some(ancestor) = self.groups.get_mut(ancestor) {
                    ancestor.children.insert(name.clone());
                }
            }
            if let Some(group) = self.groups.get_mut(name) {
                group.parents = ancestors;
            }
        }
    }

    fn link_hosts(&mut self) {
        let Inventory { groups, hosts } = self;

        for (host_name, host) in hosts.iter_mut() {
            host.groups.insert(ALL.to_string());
            if let Some(all) = groups.get_mut(ALL) {
                all.hosts.insert(host_name.clone());
            }

            for direct in &host.direct_groups {
                let Some(group) = groups.get_mut(direct) else {
                    continue;
                };
                group.direct_hosts.insert(host_name.clone());
                group.hosts.insert(host_name.clone());
                host.groups.insert(direct.clone());

                let ancestors: Vec<String> = group.parents.iter().cloned().collect();
                for ancestor in ancestors {
                    if let Some(ancestor_group) = groups.get_mut(&ancestor) {
                        ancestor_group.hosts.insert(host_name.clone());
                    }
                    host.groups.insert(ancestor);
                }
            }
        }
    }

    /// Lower-cases every host name and every reference to a host.
    ///
    /// Hosts whose names collide after folding are merged.
    pub fn hosts_to_lower(&mut self) {
        let hosts = std::mem::take(&mut self.hosts);
        for (_, mut host) in hosts {
            host.name = host.name.to_lowercase();
            merge_entry(&mut self.hosts, host, |h| &h.name, Host::absorb);
        }

        for group in self.groups.values_mut() {
            group.hosts = lower_names(&group.hosts);
            group.direct_hosts = lower_names(&group.direct_hosts);
        }

        self.reconcile();
    }

    /// Lower-cases every group name and every reference to a group.
    ///
    /// Groups whose names collide after folding are merged.
    pub fn groups_to_lower(&mut self) {
        let groups = std::mem::take(&mut self.groups);
        for (_, mut group) in groups {
            group.name = group.name.to_lowercase();
            group.parents = lower_names(&group.parents);
            group.direct_parents = lower_names(&group.direct_parents);
            group.children = lower_names(&group.children);
            merge_entry(&mut self.groups, group, |g| &g.name, Group::absorb);
        }

        for host in self.hosts.values_mut() {
            host.groups = lower_names(&host.groups);
            host.direct_groups = lower_names(&host.direct_groups);
        }

        self.reconcile();
    }
}

fn lower_names(names: &NameSet) -> NameSet {
    names.iter().map(|name| name.to_lowercase()).collect()
}

fn merge_entry<T>(
    registry: &mut BTreeMap<String, T>,
    item: T,
    name: impl Fn(&T) -> &String,
    absorb: impl FnOnce(&mut T, T),
) {
    let key = name(&item).clone();
    match registry.get_mut(&key) {
        Some(existing) => absorb(existing, item),
        None => {
            registry.insert(key, item);
        }
    }
}
