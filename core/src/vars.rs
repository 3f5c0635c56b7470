//! Variable precedence.
//!
//! Lowest to highest:
//! 1. group variables from the inventory file
//! 2. group variables from `group_vars/`
//! 3. host variables from the inventory file
//! 4. host variables from `host_vars/`
//!
//! Within each group layer a descendant's value beats its ancestors', so the
//! closest group wins over `all`.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::trace;

use crate::inventory::{Group, Inventory, NameSet, VarMap};
use crate::ordered;

#[derive(Debug, Clone, Copy)]
enum Layer {
    Inventory,
    File,
}

impl Layer {
    fn raw(self, group: &Group) -> &VarMap {
        match self {
            Layer::Inventory => &group.inventory_vars,
            Layer::File => &group.file_vars,
        }
    }
}

/// Memoized per-group projections of one variable layer.
struct Projection<'a> {
    groups: &'a BTreeMap<String, Group>,
    layer: Layer,
    memo: HashMap<&'a str, VarMap>,
    in_progress: HashSet<&'a str>,
}

impl<'a> Projection<'a> {
    fn new(groups: &'a BTreeMap<String, Group>, layer: Layer) -> Self {
        Self {
            groups,
            layer,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// The group's own values on top of everything inherited from its parents.
    fn resolve(&mut self, name: &'a str) -> VarMap {
        if let Some(done) = self.memo.get(name) {
            return done.clone();
        }
        let groups = self.groups;
        let Some(group) = groups.get(name) else {
            return VarMap::new();
        };
        // A cycle back into a group still being resolved contributes nothing.
        if !self.in_progress.insert(name) {
            return VarMap::new();
        }

        let ordered = ordered::ancestors_ordered(groups, &group.direct_parents, Some(name));
        let mut result = VarMap::new();
        for parent in merge_order(groups, &group.direct_parents, &ordered) {
            result.extend(self.resolve(parent));
        }
        result.extend(
            self.layer
                .raw(group)
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        self.in_progress.remove(name);
        self.memo.insert(name, result.clone());
        result
    }
}

/// Picks the direct links worth merging, in merge order.
///
/// A direct link that is also an ancestor of another direct link is already
/// folded into that link's values and is left out, so it cannot override a
/// more specific group. The rest merge in name order, so among unrelated
/// groups the later name wins.
fn merge_order<'a>(
    groups: &BTreeMap<String, Group>,
    direct: &NameSet,
    ordered: &[&'a str],
) -> Vec<&'a str> {
    let is_ancestor_of = |ancestor: &str, of: &str| {
        groups
            .get(of)
            .is_some_and(|group| group.parents.contains(ancestor))
    };

    ordered
        .iter()
        .copied()
        .filter(|name| direct.contains(*name))
        .filter(|name| {
            !direct.iter().any(|other| {
                other.as_str() != *name
                    && is_ancestor_of(*name, other.as_str())
                    && !is_ancestor_of(other.as_str(), *name)
            })
        })
        .collect()
}

/// Rebuilds every group's and every host's resolved variables.
///
/// Expects the group ancestor sets to be up to date.
pub(crate) fn reconcile_vars(inventory: &mut Inventory) {
    let mut resolved: BTreeMap<String, (VarMap, VarMap)> = BTreeMap::new();
    {
        let groups = &inventory.groups;
        let mut inventory_layer = Projection::new(groups, Layer::Inventory);
        let mut file_layer = Projection::new(groups, Layer::File);
        for name in groups.keys() {
            let all_inventory_vars = inventory_layer.resolve(name);
            let all_file_vars = file_layer.resolve(name);
            resolved.insert(name.clone(), (all_inventory_vars, all_file_vars));
        }
    }

    for (name, (all_inventory_vars, all_file_vars)) in resolved {
        if let Some(group) = inventory.groups.get_mut(&name) {
            group.vars = all_inventory_vars.clone();
            group.vars.extend(all_file_vars.clone());
            group.all_inventory_vars = all_inventory_vars;
            group.all_file_vars = all_file_vars;
        }
    }

    let groups = &inventory.groups;
    for host in inventory.hosts.values_mut() {
        let ordered = ordered::ancestors_ordered(groups, &host.direct_groups, None);
        let mut vars = VarMap::new();
        for name in merge_order(groups, &host.direct_groups, &ordered) {
            if let Some(group) = groups.get(name) {
                vars.extend(group.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        vars.extend(host.inventory_vars.clone());
        vars.extend(host.file_vars.clone());
        trace!(host = %host.name, count = vars.len(), "host variables resolved");
        host.vars = vars;
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_inventory;

    fn var<'a>(vars: &'a crate::VarMap, key: &str) -> Option<&'a str> {
        vars.get(key).map(String::as_str)
    }

    #[test]
    fn test_variables_priority() {
        let inventory = parse_inventory(
            "
            host-ungrouped-with-x x=a
            host-ungrouped

            [web]
            host-web x=b
            host-web-plain

            [web:vars]
            x=c

            [web:children]
            nginx

            [nginx:vars]
            x=d

            [nginx]
            host-nginx
            host-nginx-with-x x=e

            [all:vars]
            x=f
            ",
        )
        .unwrap();

        let x = |host: &str| var(&inventory.hosts[host].vars, "x");
        assert_eq!(x("host-nginx-with-x"), Some("e"));
        assert_eq!(x("host-nginx"), Some("d"));
        assert_eq!(x("host-web"), Some("b"));
        assert_eq!(x("host-web-plain"), Some("c"));
        assert_eq!(x("host-ungrouped-with-x"), Some("a"));
        assert_eq!(x("host-ungrouped"), Some("f"));

        assert_eq!(var(&inventory.groups["nginx"].vars, "x"), Some("d"));
        assert_eq!(var(&inventory.groups["web"].vars, "x"), Some("c"));
    }

    #[test]
    fn test_descendant_beats_its_ancestor_among_direct_parents() {
        // `leaf` sits directly under both `y` and `z`, and `z` is itself a child of `y`.
        let inventory = parse_inventory(
            "
            [y:children]
            z
            leaf
            [z:children]
            leaf
            [y:vars]
            x=from-y
            [z:vars]
            x=from-z
            [leaf]
            host1
            ",
        )
        .unwrap();

        assert_eq!(var(&inventory.groups["leaf"].vars, "x"), Some("from-z"));
        assert_eq!(var(&inventory.hosts["host1"].vars, "x"), Some("from-z"));
    }

    #[test]
    fn test_later_sibling_name_wins() {
        let inventory = parse_inventory(
            "
            [a]
            host1
            [b]
            host1
            [a:vars]
            x=from-a
            [b:vars]
            x=from-b
            [p1:children]
            kid
            [p2:children]
            kid
            [p1:vars]
            y=p1
            [p2:vars]
            y=p2
            ",
        )
        .unwrap();

        assert_eq!(var(&inventory.hosts["host1"].vars, "x"), Some("from-b"));
        assert_eq!(var(&inventory.groups["kid"].vars, "y"), Some("p2"));
    }

    #[test]
    fn test_file_vars_outrank_inventory_vars() {
        let mut inventory = parse_inventory(
            "
            [web]
            host1 level=host-inventory
            [web:vars]
            level=group-inventory
            shared=group-inventory
            ",
        )
        .unwrap();

        inventory
            .groups
            .get_mut("web")
            .unwrap()
            .file_vars
            .insert("shared".into(), "group-file".into());
        inventory.reconcile();

        let host = &inventory.hosts["host1"];
        assert_eq!(var(&host.vars, "level"), Some("host-inventory"));
        assert_eq!(var(&host.vars, "shared"), Some("group-file"));

        inventory
            .hosts
            .get_mut("host1")
            .unwrap()
            .file_vars
            .insert("level".into(), "host-file".into());
        inventory.reconcile();
        assert_eq!(var(&inventory.hosts["host1"].vars, "level"), Some("host-file"));
    }

    #[test]
    fn test_cyclic_groups_resolve_vars() {
        let inventory = parse_inventory(
            "
            [a:children]
            b
            [b:children]
            a
            [a:vars]
            x=1
            [b:vars]
            y=2
            [a]
            host1
            ",
        )
        .unwrap();

        let host = &inventory.hosts["host1"];
        assert_eq!(var(&host.vars, "x"), Some("1"));
        assert_eq!(var(&host.vars, "y"), Some("2"));
    }
}
