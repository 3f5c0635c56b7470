//! # INI Line Parser
//!
//! Turns inventory text into direct relationships and raw variables. Nothing
//! here is transitive; [`Inventory::reconcile`] derives the rest.

use std::sync::OnceLock;

use ansinv_common::error::ParseError;
use ansinv_common::range::expand_host_pattern;
use regex::Regex;
use tracing::{debug, trace};

use crate::inventory::{DEFAULT_PORT, Inventory, UNGROUPED};

/// Ansible's own section header grammar: `[name]` or `[name:type]`, with an
/// optional trailing comment.
fn section_regex() -> &'static Regex {
    static SECTION: OnceLock<Regex> = OnceLock::new();
    SECTION.get_or_init(|| {
        Regex::new(r"^\[([^:\]\s]+)(?::(\w+))?\]\s*(?:#.*)?$")
            .expect("section header regex is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Hosts,
    Children,
    Vars,
}

impl Section {
    fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "" | "hosts" => Some(Section::Hosts),
            "children" => Some(Section::Children),
            "vars" => Some(Section::Vars),
            _ => None,
        }
    }
}

/// Feeds every line of `text` into `inventory`.
///
/// Lines before the first header are hosts of `ungrouped`.
pub(crate) fn parse_into(inventory: &mut Inventory, text: &str) -> Result<(), ParseError> {
    let mut section = Section::Hosts;
    let mut active = UNGROUPED.to_string();
    inventory.get_or_create_group(&active);

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(caps) = section_regex().captures(line) {
            let name = &caps[1];
            let kind = caps.get(2).map_or("", |m| m.as_str());
            section = Section::from_kind(kind).ok_or_else(|| ParseError::UnknownSectionType {
                line: line_no,
                section: name.to_string(),
                kind: kind.to_string(),
            })?;
            active = name.to_string();
            inventory.get_or_create_group(&active);
            debug!(line = line_no, group = %active, ?section, "entering section");
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            return Err(ParseError::InvalidSection {
                line: line_no,
                text: line.to_string(),
            });
        }

        trace!(line = line_no, ?section, "{line}");
        match section {
            Section::Hosts => parse_hosts_line(inventory, &active, line, line_no)?,
            Section::Children => {
                let Some(child) = line.split_whitespace().next() else {
                    continue;
                };
                inventory
                    .get_or_create_group(child)
                    .direct_parents
                    .insert(active.clone());
            }
            Section::Vars => {
                let (key, value) = split_kv(line, line_no)?;
                let value = unquote(value);
                inventory
                    .get_or_create_group(&active)
                    .inventory_vars
                    .insert(key, value);
            }
        }
    }

    release_grouped_hosts(inventory);
    Ok(())
}

/// Shell-style split, dropping an inline `# comment` tail.
fn tokenize(line: &str, line_no: usize) -> Result<Vec<String>, ParseError> {
    let tokens = shlex::split(line).ok_or_else(|| ParseError::Tokenize {
        line: line_no,
        text: line.to_string(),
    })?;
    Ok(tokens
        .into_iter()
        .take_while(|token| !token.starts_with('#'))
        .collect())
}

fn parse_hosts_line(
    inventory: &mut Inventory,
    group: &str,
    line: &str,
    line_no: usize,
) -> Result<(), ParseError> {
    let tokens = tokenize(line, line_no)?;
    let Some((entry, params)) = tokens.split_first() else {
        return Ok(());
    };

    let (pattern, port) = split_host_port(entry).ok_or_else(|| ParseError::InvalidPort {
        line: line_no,
        text: entry.clone(),
    })?;
    let names = expand_host_pattern(pattern).map_err(|e| e.at_line(line_no))?;

    let vars = params
        .iter()
        .map(|param| split_kv(param, line_no))
        .collect::<Result<Vec<_>, _>>()?;

    for name in &names {
        let host = inventory.get_or_create_host(name);
        host.port = port;
        host.direct_groups.insert(group.to_string());
        host.inventory_vars.extend(vars.iter().cloned());
    }
    inventory
        .get_or_create_group(group)
        .direct_hosts
        .extend(names);
    Ok(())
}

/// Splits `key=value` on the first `=`.
fn split_kv(text: &str, line_no: usize) -> Result<(String, String), ParseError> {
    let (key, value) = text.split_once('=').ok_or_else(|| ParseError::InvalidKeyValue {
        line: line_no,
        text: text.to_string(),
    })?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Strips shell quoting from a value that forms exactly one token.
/// Anything else stays as written.
fn unquote(value: String) -> String {
    match shlex::split(&value) {
        Some(mut tokens) if tokens.len() == 1 => tokens.remove(0),
        _ => value,
    }
}

/// `web1:2222` → (`web1`, 2222). A last segment holding `]` belongs to a range,
/// not a port. `None` for a port that is not a valid number.
fn split_host_port(entry: &str) -> Option<(&str, u16)> {
    match entry.rsplit_once(':') {
        None => Some((entry, DEFAULT_PORT)),
        Some((_, tail)) if tail.contains(']') => Some((entry, DEFAULT_PORT)),
        Some((pattern, port)) => port.parse().ok().map(|port| (pattern, port)),
    }
}

/// Hosts listed both before the first section and under a real group leave `ungrouped`.
fn release_grouped_hosts(inventory: &mut Inventory) {
    let mut released = Vec::new();
    for host in inventory.hosts.values_mut() {
        if host.direct_groups.len() > 1 && host.direct_groups.remove(UNGROUPED) {
            released.push(host.name.clone());
        }
    }
    if let Some(ungrouped) = inventory.groups.get_mut(UNGROUPED) {
        for name in &released {
            ungrouped.direct_hosts.remove(name);
        }
    }
}
