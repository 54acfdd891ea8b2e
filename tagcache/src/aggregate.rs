//! Fan-out result aggregation.
//!
//! Operations that fan out over the active alias set produce one result
//! per alias. Callers working against a single alias should not have to
//! unwrap a one-entry map, so aggregation collapses that case.

use std::collections::BTreeMap;

/// Result of an operation fanned out over the active alias set.
///
/// Exactly one alias processed yields `Single`; any other count
/// (including zero) yields the full alias-keyed mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasResult<T> {
    Single(T),
    PerAlias(BTreeMap<String, T>),
}

impl<T> AliasResult<T> {
    /// Collapse per-alias results into the caller-facing shape.
    pub fn from_results(results: BTreeMap<String, T>) -> Self {
        if results.len() == 1 {
            match results.into_iter().next() {
                Some((_, value)) => AliasResult::Single(value),
                None => AliasResult::PerAlias(BTreeMap::new()),
            }
        } else {
            AliasResult::PerAlias(results)
        }
    }

    /// The unwrapped result, if exactly one alias was processed.
    pub fn into_single(self) -> Option<T> {
        match self {
            AliasResult::Single(value) => Some(value),
            AliasResult::PerAlias(_) => None,
        }
    }

    /// The alias-keyed mapping, if more than one alias was processed.
    pub fn into_per_alias(self) -> Option<BTreeMap<String, T>> {
        match self {
            AliasResult::Single(_) => None,
            AliasResult::PerAlias(results) => Some(results),
        }
    }
}
