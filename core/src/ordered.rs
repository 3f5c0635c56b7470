//! Specificity-ordered ancestor lists.
//!
//! Ancestors are listed breadth-first from the closest groups outwards, with
//! `all` always moved to the very end. Within one level groups come in name
//! order.

use std::collections::{BTreeMap, HashSet, VecDeque};

use ansinv_common::error::PatternError;

use crate::inventory::{ALL, Group, Host, Inventory, NameSet};
use crate::matching;

/// Breadth-first walk over `direct_parents` starting from `start`.
///
/// `exclude` is treated as already visited, so a group never lists itself.
/// Names without a registered group are skipped.
pub(crate) fn ancestors_ordered<'a>(
    groups: &'a BTreeMap<String, Group>,
    start: &'a NameSet,
    exclude: Option<&'a str>,
) -> Vec<&'a str> {
    let mut visited: HashSet<&str> = exclude.into_iter().collect();
    let mut queue: VecDeque<&str> = start.iter().map(String::as_str).collect();
    let mut result = Vec::new();
    let mut reached_all = false;

    while let Some(name) = queue.pop_front() {
        if name == ALL {
            reached_all = true;
            continue;
        }
        if !visited.insert(name) {
            continue;
        }
        let Some(group) = groups.get(name) else {
            continue;
        };
        result.push(group.name.as_str());
        queue.extend(group.direct_parents.iter().map(String::as_str));
    }

    if reached_all && exclude != Some(ALL) && groups.contains_key(ALL) {
        result.push(ALL);
    }
    result
}

fn resolve<'a>(inventory: &'a Inventory, names: Vec<&str>) -> Vec<&'a Group> {
    names
        .into_iter()
        .filter_map(|name| inventory.groups.get(name))
        .collect()
}

impl Host {
    /// Every group of the host, most specific first and `all` last.
    pub fn list_groups_ordered<'a>(&self, inventory: &'a Inventory) -> Vec<&'a Group> {
        let names = ancestors_ordered(&inventory.groups, &self.direct_groups, None);
        resolve(inventory, names)
    }

    /// Like [`Host::list_groups_ordered`], keeping only groups whose name matches the glob.
    pub fn match_groups_ordered<'a>(
        &self,
        inventory: &'a Inventory,
        pattern: &str,
    ) -> Result<Vec<&'a Group>, PatternError> {
        let glob = matching::compile(pattern)?;
        Ok(self
            .list_groups_ordered(inventory)
            .into_iter()
            .filter(|group| glob.matches(&group.name))
            .collect())
    }
}

impl Group {
    /// Every ancestor of the group, most specific first and `all` last.
    pub fn list_parent_groups_ordered<'a>(&self, inventory: &'a Inventory) -> Vec<&'a Group> {
        let names = ancestors_ordered(
            &inventory.groups,
            &self.direct_parents,
            Some(self.name.as_str()),
        );
        resolve(inventory, names)
    }

    pub fn match_groups_ordered<'a>(
        &self,
        inventory: &'a Inventory,
        pattern: &str,
    ) -> Result<Vec<&'a Group>, PatternError> {
        let glob = matching::compile(pattern)?;
        Ok(self
            .list_parent_groups_ordered(inventory)
            .into_iter()
            .filter(|group| glob.matches(&group.name))
            .collect())
    }
}
