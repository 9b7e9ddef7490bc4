//! Ordered collection of mogrifiers
//!
//! The set is built once from configuration and never mutated afterwards.
//! Entries are tried in configuration order and the first match wins.

use super::entry::{Mogrified, Mogrifier};
use super::spec::MogrifierSpec;
use crate::error::MogrifyError;

/// Immutable, ordered set of compiled mogrifiers
///
/// `mogrify` only reads the set, so one instance can be shared (e.g. via
/// `Arc`) between any number of threads.
#[derive(Debug, Clone, Default)]
pub struct MogrifierSet {
    entries: Vec<Mogrifier>,
}

impl MogrifierSet {
    /// A set with no mogrifiers; every name passes through unchanged
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile every specification, preserving order
    ///
    /// Construction is all-or-nothing: the first failing entry aborts the
    /// build and no set is returned.
    ///
    /// # Errors
    ///
    /// Returns the `MogrifyError` of the first entry that fails to compile
    /// or validate.
    pub fn build<I>(specs: I) -> Result<Self, MogrifyError>
    where
        I: IntoIterator<Item = MogrifierSpec>,
    {
        let entries = specs
            .into_iter()
            .enumerate()
            .map(|(position, spec)| Mogrifier::from_spec(position, spec))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(mogrifiers = entries.len(), "Mogrifier set built");

        Ok(Self { entries })
    }

    /// Rewrite a metric name
    ///
    /// Returns the result of the first matching mogrifier, or the name
    /// unchanged with no tags if nothing matches.
    pub fn mogrify(&self, name: &str) -> Mogrified {
        match self.find(name) {
            Some((_, result)) => result,
            None => Mogrified::unchanged(name),
        }
    }

    /// Find the first matching mogrifier and its result
    pub fn find(&self, name: &str) -> Option<(&Mogrifier, Mogrified)> {
        for entry in &self.entries {
            if let Some(result) = entry.apply(name) {
                tracing::trace!(
                    metric = %name,
                    mogrifier = entry.position(),
                    rewritten = %result.name,
                    "Mogrifier matched"
                );
                return Some((entry, result));
            }
        }

        tracing::trace!(metric = %name, "No matching mogrifier");
        None
    }

    /// Number of mogrifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no mogrifiers
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over mogrifiers in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &Mogrifier> {
        self.entries.iter()
    }

    /// Get a mogrifier by position
    pub fn get(&self, position: usize) -> Option<&Mogrifier> {
        self.entries.get(position)
    }
}

impl<'a> IntoIterator for &'a MogrifierSet {
    type Item = &'a Mogrifier;
    type IntoIter = std::slice::Iter<'a, Mogrifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
