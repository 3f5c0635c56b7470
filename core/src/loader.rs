//! Loads `group_vars/` and `host_vars/` trees into the file variable layer.
//!
//! Each entry of those directories is either `<name>.yml` / `<name>.yaml`, or
//! a directory `<name>/` whose YAML files (recursively, in lexical order) all
//! apply to `<name>`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ansinv_common::error::{InventoryError, Result};
use serde_yaml::Value;
use tracing::{debug, trace};

use crate::inventory::{Inventory, VarMap};

impl Inventory {
    /// Reads `group_vars/` and `host_vars/` under `path`, then reconciles.
    ///
    /// Files naming unknown hosts or groups are skipped. Missing
    /// `group_vars/` or `host_vars/` directories are not an error.
    pub fn add_vars(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load_vars(path.as_ref(), false)
    }

    /// Same as [`Inventory::add_vars`], matching file names lower-cased.
    ///
    /// Use after [`Inventory::hosts_to_lower`] / [`Inventory::groups_to_lower`].
    pub fn add_vars_lower_cased(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load_vars(path.as_ref(), true)
    }

    fn load_vars(&mut self, root: &Path, lowercased: bool) -> Result<()> {
        fs::metadata(root).map_err(|e| io_error(root, e))?;

        for (name, files) in collect_var_files(&root.join("group_vars"), lowercased)? {
            let Some(group) = self.groups.get_mut(&name) else {
                debug!(group = %name, "skipping vars for unknown group");
                continue;
            };
            for file in files {
                group.file_vars.extend(read_vars_file(&file)?);
            }
        }

        for (name, files) in collect_var_files(&root.join("host_vars"), lowercased)? {
            let Some(host) = self.hosts.get_mut(&name) else {
                debug!(host = %name, "skipping vars for unknown host");
                continue;
            };
            for file in files {
                host.file_vars.extend(read_vars_file(&file)?);
            }
        }

        self.reconcile();
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> InventoryError {
    InventoryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yml" | "yaml")
    )
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| io_error(dir, e))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| io_error(dir, e))?;
    entries.sort();
    Ok(entries)
}

/// Maps every entity name found under `dir` to its YAML files.
fn collect_var_files(dir: &Path, lowercased: bool) -> Result<BTreeMap<String, Vec<PathBuf>>> {
    let mut found: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(found);
    }

    for path in read_dir_sorted(dir)? {
        let name = if path.is_dir() {
            path.file_name()
        } else if is_yaml(&path) {
            path.file_stem()
        } else {
            None
        };
        let Some(name) = name.map(|name| name.to_string_lossy()) else {
            continue;
        };
        let name = if lowercased {
            name.to_lowercase()
        } else {
            name.into_owned()
        };

        let files = found.entry(name).or_default();
        if path.is_dir() {
            collect_yaml_recursive(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(found)
}

fn collect_yaml_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for path in read_dir_sorted(dir)? {
        if path.is_dir() {
            collect_yaml_recursive(&path, files)?;
        } else if is_yaml(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn read_vars_file(path: &Path) -> Result<VarMap> {
    trace!(path = %path.display(), "reading variables file");
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let yaml_error = |source| InventoryError::Yaml {
        path: path.to_path_buf(),
        source,
    };

    // An empty file deserializes to `None`.
    let values: Option<BTreeMap<String, Value>> =
        serde_yaml::from_str(&text).map_err(yaml_error)?;

    values
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| Ok((key, stringify(value)?)))
        .collect()
}

/// Flattens a YAML value into the string stored in a variable map.
///
/// Scalars keep their textual form; sequences and mappings become compact
/// JSON with sorted keys.
pub(crate) fn stringify(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => stringify(tagged.value),
        other => {
            let json = serde_json::to_value(&other)?;
            Ok(serde_json::to_string(&json)?)
        }
    }
}
