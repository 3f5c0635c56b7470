//! The Ansible INI inventory **resolution engine**.
//!
//! Text is parsed into hosts and groups carrying only their *direct*
//! relationships, then [`Inventory::reconcile`] derives full membership,
//! ancestor chains and the resolved variables of every entity. Lookups by
//! glob or host-pattern expression and specificity-ordered traversal work on
//! the reconciled graph.
//!
//! ```no_run
//! use ansinv_core::{Config, load};
//!
//! let inventory = load("inventory/hosts", &Config::default())?;
//! for (name, host) in inventory.match_hosts_by_patterns("web:!atlanta")? {
//!     println!("{name}:{}", host.port);
//! }
//! # Ok::<(), ansinv_core::InventoryError>(())
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

mod inventory;
mod loader;
mod marshal;
mod matching;
mod ordered;
mod parser;
mod vars;

pub use ansinv_common::config::Config;
pub use ansinv_common::error::{InventoryError, ParseError, PatternError, Result};
pub use inventory::{ALL, DEFAULT_PORT, Group, Host, Inventory, NameSet, UNGROUPED, VarMap};
pub use matching::HostPattern;

/// Parses inventory text and reconciles the result.
pub fn parse_inventory(text: &str) -> Result<Inventory> {
    let mut inventory = Inventory::new();
    parser::parse_into(&mut inventory, text)?;
    inventory.reconcile();
    Ok(inventory)
}

/// Reads and parses an inventory file.
pub fn parse_inventory_file(path: impl AsRef<Path>) -> Result<Inventory> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| InventoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_inventory(&text)
}

impl FromStr for Inventory {
    type Err = InventoryError;

    fn from_str(text: &str) -> Result<Self> {
        parse_inventory(text)
    }
}

/// Parses `path` and applies the loading options of `cfg`.
///
/// Variable files are looked up in `group_vars/` and `host_vars/` next to
/// the inventory file.
pub fn load(path: impl AsRef<Path>, cfg: &Config) -> Result<Inventory> {
    let path = path.as_ref();
    let mut inventory = parse_inventory_file(path)?;

    if cfg.lowercase {
        inventory.hosts_to_lower();
        inventory.groups_to_lower();
    }

    if cfg.load_vars {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if cfg.lowercase {
            inventory.add_vars_lower_cased(dir)?;
        } else {
            inventory.add_vars(dir)?;
        }
    }

    info!(
        path = %path.display(),
        hosts = inventory.hosts.len(),
        groups = inventory.groups.len(),
        "inventory loaded"
    );
    Ok(inventory)
}
