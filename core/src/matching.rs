//! # Pattern Matching
//!
//! Two layers:
//! * shell globs (`*`, `?`, `[...]`, `[!...]`) over host names, group names
//!   or variable values;
//! * Ansible host-pattern expressions such as `web:&staging:!atlanta`, which
//!   combine globs with union, intersection and exclusion.

use std::collections::BTreeMap;
use std::str::FromStr;

use ansinv_common::error::PatternError;
use glob::{MatchOptions, Pattern};
use rayon::prelude::*;

use crate::inventory::{Group, Host, Inventory, VarMap};

/// `*` and `?` stop at `/`, as in a path match.
const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled shell glob.
#[derive(Debug, Clone)]
pub(crate) struct Glob(Pattern);

impl Glob {
    pub(crate) fn matches(&self, name: &str) -> bool {
        self.0.matches_with(name, OPTIONS)
    }
}

pub(crate) fn compile(pattern: &str) -> Result<Glob, PatternError> {
    Pattern::new(pattern)
        .map(Glob)
        .map_err(|err| PatternError::from_glob(pattern, err))
}

fn match_entries<'a, T>(
    registry: &'a BTreeMap<String, T>,
    names: impl IntoIterator<Item = &'a String>,
    pattern: &str,
) -> Result<BTreeMap<&'a str, &'a T>, PatternError> {
    let glob = compile(pattern)?;
    Ok(names
        .into_iter()
        .filter(|name| glob.matches(name))
        .filter_map(|name| registry.get_key_value(name))
        .map(|(name, entry)| (name.as_str(), entry))
        .collect())
}

fn match_vars(vars: &VarMap, pattern: &str) -> Result<VarMap, PatternError> {
    let glob = compile(pattern)?;
    Ok(vars
        .iter()
        .filter(|(_, value)| glob.matches(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect())
}

impl Inventory {
    /// Hosts whose name matches the glob.
    pub fn match_hosts(&self, pattern: &str) -> Result<BTreeMap<&str, &Host>, PatternError> {
        match_entries(&self.hosts, self.hosts.keys(), pattern)
    }

    /// Groups whose name matches the glob.
    pub fn match_groups(&self, pattern: &str) -> Result<BTreeMap<&str, &Group>, PatternError> {
        match_entries(&self.groups, self.groups.keys(), pattern)
    }

    /// Hosts selected by an Ansible host-pattern expression.
    ///
    /// The expression is validated before any host is looked at, so a
    /// malformed one fails even on an empty inventory.
    pub fn match_hosts_by_patterns(
        &self,
        expression: &str,
    ) -> Result<BTreeMap<&str, &Host>, PatternError> {
        let pattern: HostPattern = expression.parse()?;
        Ok(self
            .hosts
            .par_iter()
            .filter(|(_, host)| pattern.matches_host(host))
            .map(|(name, host)| (name.as_str(), host))
            .collect())
    }
}

impl Group {
    /// Hosts of the group (descendants included) whose name matches the glob.
    pub fn match_hosts<'a>(
        &'a self,
        inventory: &'a Inventory,
        pattern: &str,
    ) -> Result<BTreeMap<&'a str, &'a Host>, PatternError> {
        match_entries(&inventory.hosts, &self.hosts, pattern)
    }

    /// Resolved variables whose *value* matches the glob.
    pub fn match_vars(&self, pattern: &str) -> Result<VarMap, PatternError> {
        match_vars(&self.vars, pattern)
    }
}

impl Host {
    /// Groups of the host (ancestors and `all` included) whose name matches the glob.
    pub fn match_groups<'a>(
        &'a self,
        inventory: &'a Inventory,
        pattern: &str,
    ) -> Result<BTreeMap<&'a str, &'a Group>, PatternError> {
        match_entries(&inventory.groups, &self.groups, pattern)
    }

    pub fn match_vars(&self, pattern: &str) -> Result<VarMap, PatternError> {
        match_vars(&self.vars, pattern)
    }
}

#[derive(Debug, Clone)]
enum Term {
    All,
    Include(Glob),
    Exclude(Glob),
    Intersect(Glob),
}

/// A compiled host-pattern expression, e.g. `web:&staging:!atlanta`.
///
/// Sub-patterns are separated by `:` and tried against the host name and the
/// names of all its groups:
/// * `all` and `*` match everything;
/// * `!glob` rejects the host when any name matches;
/// * `&glob` rejects the host when no name matches;
/// * a plain glob counts as a positive match when any name matches.
///
/// A host is selected when it is not rejected and had at least one positive
/// match. An expression starting with an empty sub-pattern selects nothing.
#[derive(Debug, Clone)]
pub struct HostPattern {
    terms: Vec<Term>,
    never: bool,
}

impl FromStr for HostPattern {
    type Err = PatternError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let mut terms = Vec::new();
        let mut never = false;

        for (idx, part) in expression.split(':').enumerate() {
            if part.is_empty() {
                if idx == 0 {
                    never = true;
                }
                continue;
            }
            let term = if part == "all" || part == "*" {
                Term::All
            } else if let Some(glob) = part.strip_prefix('!') {
                if idx == 0 {
                    return Err(PatternError::LeadingExclusion(part.to_string()));
                }
                Term::Exclude(compile(glob)?)
            } else if let Some(glob) = part.strip_prefix('&') {
                if idx == 0 {
                    return Err(PatternError::LeadingIntersection(part.to_string()));
                }
                Term::Intersect(compile(glob)?)
            } else {
                Term::Include(compile(part)?)
            };
            terms.push(term);
        }

        Ok(Self { terms, never })
    }
}

impl HostPattern {
    /// Evaluates the expression against a set of names.
    pub fn matches<'a, I>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        if self.never {
            return false;
        }
        let any = |glob: &Glob| names.clone().into_iter().any(|name| glob.matches(name));

        let mut positives = 0usize;
        for term in &self.terms {
            match term {
                Term::All => positives += 1,
                Term::Include(glob) => {
                    if any(glob) {
                        positives += 1;
                    }
                }
                Term::Exclude(glob) => {
                    if any(glob) {
                        return false;
                    }
                }
                Term::Intersect(glob) => {
                    if !any(glob) {
                        return false;
                    }
                }
            }
        }
        positives > 0
    }

    /// Evaluates the expression against the host name and all its group names.
    pub fn matches_host(&self, host: &Host) -> bool {
        let names = std::iter::once(host.name.as_str()).chain(host.groups.iter().map(String::as_str));
        self.matches(names)
    }
}
