// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Edge;
use std::collections::HashSet;

/// A mutable set of banned OSM way ids.
///
/// The set only grows (by banning) or is cleared wholesale; there is no
/// partial un-ban. Membership is consulted once per edge during route
/// search, hence the hash set. An [Edge] is considered banned when *any*
/// of the way ids it carries is in the set - a physical segment may map
/// to several ways and banning one of them suffices.
///
/// Cloning the set yields an immutable snapshot; callers that interleave
/// bans with in-flight searches should hand the search a clone. The
/// [Planner](crate::Planner) is synchronous and only mutates the set
/// between searches, so it passes a shared reference.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<i64>);

impl ExclusionSet {
    /// Creates an empty exclusion set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bans a single way id. Returns true if the id was not banned before.
    pub fn add(&mut self, id: i64) -> bool {
        self.0.insert(id)
    }

    /// Bans every way id from the provided iterable.
    pub fn extend<I: IntoIterator<Item = i64>>(&mut self, ids: I) {
        self.0.extend(ids);
    }

    /// Checks whether a specific way id is banned.
    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    /// Checks whether any way id carried by the edge is banned.
    pub fn bans_edge(&self, edge: &Edge) -> bool {
        edge.way_ids.iter().any(|id| self.0.contains(id))
    }

    /// Lifts every ban.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns the number of banned way ids.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when nothing is banned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the banned way ids, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiLineString;

    fn edge_with_ways(ways: &[i64]) -> Edge {
        Edge {
            to: 2,
            length: 100.0,
            names: vec![],
            way_ids: ways.to_vec(),
            geometry: MultiLineString::new(vec![]),
        }
    }

    #[test]
    fn banning_any_carried_way_id_bans_the_edge() {
        let edge = edge_with_ways(&[7, 8]);

        let mut bans = ExclusionSet::new();
        assert!(!bans.bans_edge(&edge));

        assert!(bans.add(7));
        assert!(!bans.add(7));
        assert!(bans.bans_edge(&edge));
        assert!(bans.contains(7));
        assert!(!bans.contains(8));
    }

    #[test]
    fn clear_lifts_all_bans() {
        let edge = edge_with_ways(&[7, 8]);

        let mut bans = ExclusionSet::new();
        bans.extend([7, 8, 9]);
        assert_eq!(bans.len(), 3);
        assert!(bans.bans_edge(&edge));

        bans.clear();
        assert!(bans.is_empty());
        assert!(!bans.bans_edge(&edge));
    }
}
