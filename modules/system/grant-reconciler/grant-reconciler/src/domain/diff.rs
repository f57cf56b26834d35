//! Set difference between desired and observed grant strings.

use std::collections::HashSet;

/// Outcome of comparing desired and observed grants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Both sides hold the same set. Nothing needs to be issued.
    pub equal: bool,
    /// Desired but not observed, in desired order.
    pub to_add: Vec<String>,
    /// Observed but not desired, in observed order.
    pub to_remove: Vec<String>,
}

/// Compare two lists as unordered sets; duplicates collapse.
#[must_use]
pub fn diff(desired: &[String], observed: &[String]) -> Diff {
    let desired_set: HashSet<&str> = desired.iter().map(String::as_str).collect();
    let observed_set: HashSet<&str> = observed.iter().map(String::as_str).collect();

    let to_add = unique(
        desired
            .iter()
            .filter(|entry| !observed_set.contains(entry.as_str())),
    );
    let to_remove = unique(
        observed
            .iter()
            .filter(|entry| !desired_set.contains(entry.as_str())),
    );

    let equal =
        desired_set.len() == observed_set.len() && to_add.is_empty() && to_remove.is_empty();

    Diff {
        equal,
        to_add,
        to_remove,
    }
}

/// Drop repeated entries, keeping the first occurrence.
#[must_use]
pub fn unique<'a>(entries: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen: HashSet<&String> = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(*entry))
        .cloned()
        .collect()
}
