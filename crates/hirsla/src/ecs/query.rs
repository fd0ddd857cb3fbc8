//! # Query — Archetype Filtering
//!
//! A query is an include-set and an exclude-set of component names. It yields
//! every archetype whose component set is a superset of `include` and disjoint
//! from `exclude`; callers then iterate the matching columns directly.
//!
//! ```text
//! include [position, velocity]   exclude [frozen]
//!
//! [id, position]                  ✗ no velocity
//! [id, position, velocity]        ✓
//! [id, frozen, position, velocity]✗ frozen
//! ```
//!
//! The scan is linear and lazy. Re-running a query re-scans, so it sees the
//! archetypes that exist at that moment.

use std::iter::FusedIterator;

use super::archetype::Archetype;
use super::entity::Entity;

/// Lazy iterator over the archetypes matching a query.
///
/// Created by [`Store::query_archetypes`](super::store::Store::query_archetypes).
pub struct QueryArchetypes<'a, S> {
    archetypes: std::slice::Iter<'a, Archetype>,
    include: &'a [S],
    exclude: &'a [S],
}

impl<'a, S: AsRef<str>> QueryArchetypes<'a, S> {
    pub(crate) fn new(archetypes: &'a [Archetype], include: &'a [S], exclude: &'a [S]) -> Self {
        Self {
            archetypes: archetypes.iter(),
            include,
            exclude,
        }
    }

    /// Flatten the matching archetypes into their entities.
    pub fn entities(self) -> impl Iterator<Item = Entity> + 'a {
        self.flat_map(|archetype| archetype.entities().iter().copied())
    }
}

impl<'a, S: AsRef<str>> Iterator for QueryArchetypes<'a, S> {
    type Item = &'a Archetype;

    fn next(&mut self) -> Option<Self::Item> {
        let (include, exclude) = (self.include, self.exclude);
        self.archetypes
            .find(|archetype| archetype.matches(include, exclude))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.archetypes.size_hint().1)
    }
}

impl<S: AsRef<str>> FusedIterator for QueryArchetypes<'_, S> {}
