//! JSON form of a resolved inventory.
//!
//! Relationship sets are written as `{"name": null, ...}` so the graph
//! flattens without duplicating entities. Loading re-resolves those names
//! against the loaded registries and drops the ones that do not resolve.

use std::collections::BTreeMap;

use ansinv_common::error::Result;
use serde::{Deserialize, Deserializer};

use crate::inventory::{Group, Host, Inventory, NameSet};

/// `#[serde(with)]` adapter writing a name set as a map of names to `null`.
pub(crate) mod name_set {
    use std::collections::BTreeMap;

    use serde::de::IgnoredAny;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::inventory::NameSet;

    pub fn serialize<S: Serializer>(names: &NameSet, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for name in names {
            map.serialize_entry(name, &())?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NameSet, D::Error> {
        let raw = BTreeMap::<String, IgnoredAny>::deserialize(deserializer)?;
        Ok(raw.into_keys().collect())
    }
}

#[derive(Deserialize)]
struct RawInventory {
    #[serde(default)]
    groups: BTreeMap<String, Group>,
    #[serde(default)]
    hosts: BTreeMap<String, Host>,
}

fn keep_known(names: &mut NameSet, known: &NameSet) {
    names.retain(|name| known.contains(name));
}

impl<'de> Deserialize<'de> for Inventory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let RawInventory {
            mut groups,
            mut hosts,
        } = RawInventory::deserialize(deserializer)?;

        let group_names: NameSet = groups.keys().cloned().collect();
        let host_names: NameSet = hosts.keys().cloned().collect();

        for group in groups.values_mut() {
            keep_known(&mut group.parents, &group_names);
            keep_known(&mut group.direct_parents, &group_names);
            keep_known(&mut group.children, &group_names);
            keep_known(&mut group.hosts, &host_names);
            keep_known(&mut group.direct_hosts, &host_names);
        }
        for host in hosts.values_mut() {
            keep_known(&mut host.groups, &group_names);
            keep_known(&mut host.direct_groups, &group_names);
        }

        Ok(Inventory { groups, hosts })
    }
}

impl Inventory {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
