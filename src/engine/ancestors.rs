//! Ancestor Fan-out Manager - ancestor → descendants with percent rules.
//!
//! Percent breakpoints depend on the parent's size, so the parent must be
//! observed too, and its resize must re-evaluate the child. This index is kept
//! eagerly in sync with every percent record added or removed.
//!
//! Bookkeeping is per record: each percent record remembers the ancestor it was
//! registered against, and a (descendant, ancestor) pair lives as long as at
//! least one record references it. An ancestor entry exists only while its
//! descendant set is non-empty.

use std::collections::{HashMap, HashSet};

use crate::types::{Element, QueryId};

#[derive(Debug)]
pub struct AncestorRegistry<E: Element> {
    descendants: HashMap<E, HashSet<E>>,
    pair_refs: HashMap<(E, E), usize>,
    anchors: HashMap<QueryId, (E, E)>,
}

impl<E: Element> Default for AncestorRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> AncestorRegistry<E> {
    pub fn new() -> Self {
        Self {
            descendants: HashMap::new(),
            pair_refs: HashMap::new(),
            anchors: HashMap::new(),
        }
    }

    /// Record that `id` on `descendant` is relative to `ancestor`.
    ///
    /// Returns true when `ancestor` was not tracked before (caller subscribes it).
    pub fn on_percent_record_added(&mut self, descendant: E, ancestor: E, id: QueryId) -> bool {
        self.anchors.insert(id, (descendant, ancestor));

        let refs = self.pair_refs.entry((descendant, ancestor)).or_insert(0);
        *refs += 1;

        let newly_tracked = !self.descendants.contains_key(&ancestor);
        self.descendants.entry(ancestor).or_default().insert(descendant);
        newly_tracked
    }

    /// Release the pair held by `id`.
    ///
    /// Returns the ancestor when its entry was removed (caller unsubscribes it).
    /// Ids that were never anchored (orphans at registration) are ignored.
    pub fn on_percent_record_removed(&mut self, id: QueryId) -> Option<E> {
        let (descendant, ancestor) = self.anchors.remove(&id)?;

        let refs = self.pair_refs.get_mut(&(descendant, ancestor))?;
        *refs -= 1;
        if *refs > 0 {
            return None;
        }
        self.pair_refs.remove(&(descendant, ancestor));

        let set = self.descendants.get_mut(&ancestor)?;
        set.remove(&descendant);
        if !set.is_empty() {
            return None;
        }
        self.descendants.remove(&ancestor);
        Some(ancestor)
    }

    /// Descendants whose percent rules depend on `ancestor`.
    pub fn descendants_of(&self, ancestor: E) -> Vec<E> {
        self.descendants
            .get(&ancestor)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// The ancestor a percent record was anchored to at registration.
    pub fn anchor_of(&self, id: QueryId) -> Option<E> {
        self.anchors.get(&id).map(|&(_, ancestor)| ancestor)
    }

    pub fn is_tracked(&self, ancestor: E) -> bool {
        self.descendants.contains_key(&ancestor)
    }

    pub fn is_empty(&self) -> bool {
        self.descendants.is_empty()
    }

    pub fn clear(&mut self) {
        self.descendants.clear();
        self.pair_refs.clear();
        self.anchors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_record_tracks_ancestor() {
        let mut anc: AncestorRegistry<u32> = AncestorRegistry::new();

        assert!(anc.on_percent_record_added(2, 1, 0));
        assert!(!anc.on_percent_record_added(3, 1, 1));
        assert!(anc.is_tracked(1));

        let mut kids = anc.descendants_of(1);
        kids.sort_unstable();
        assert_eq!(kids, vec![2, 3]);
        assert_eq!(anc.anchor_of(1), Some(1));
    }

    #[test]
    fn test_pair_survives_until_last_record() {
        let mut anc: AncestorRegistry<u32> = AncestorRegistry::new();
        anc.on_percent_record_added(2, 1, 10);
        anc.on_percent_record_added(2, 1, 11);

        assert_eq!(anc.on_percent_record_removed(10), None);
        assert_eq!(anc.descendants_of(1), vec![2]);

        assert_eq!(anc.on_percent_record_removed(11), Some(1));
        assert!(!anc.is_tracked(1));
        assert!(anc.is_empty());
    }

    #[test]
    fn test_ancestor_kept_while_other_descendants_remain() {
        let mut anc: AncestorRegistry<u32> = AncestorRegistry::new();
        anc.on_percent_record_added(2, 1, 0);
        anc.on_percent_record_added(3, 1, 1);

        assert_eq!(anc.on_percent_record_removed(0), None);
        assert_eq!(anc.descendants_of(1), vec![3]);
        assert_eq!(anc.on_percent_record_removed(1), Some(1));
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let mut anc: AncestorRegistry<u32> = AncestorRegistry::new();
        anc.on_percent_record_added(2, 1, 0);
        assert_eq!(anc.on_percent_record_removed(5), None);
        assert!(anc.is_tracked(1));
    }

    #[test]
    fn test_reparented_descendant_releases_original_pair() {
        let mut anc: AncestorRegistry<u32> = AncestorRegistry::new();
        anc.on_percent_record_added(2, 1, 0);
        // Same descendant, later registered under a new parent.
        assert!(anc.on_percent_record_added(2, 5, 1));

        assert_eq!(anc.on_percent_record_removed(0), Some(1));
        assert!(anc.is_tracked(5));
        assert_eq!(anc.on_percent_record_removed(1), Some(5));
    }

    #[test]
    fn test_clear() {
        let mut anc: AncestorRegistry<u32> = AncestorRegistry::new();
        anc.on_percent_record_added(2, 1, 0);
        anc.clear();
        assert!(anc.is_empty());
        assert!(anc.anchor_of(0).is_none());
        assert!(anc.descendants_of(1).is_empty());
    }
}
