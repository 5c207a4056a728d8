//! Query Registry - element → ordered breakpoint records.
//!
//! Manages the lifecycle of records:
//! - Monotonic id allocation (ids are never reused until `clear`)
//! - Per-element record lists in insertion order
//! - Id → owner index so removal by id does not scan every element
//!
//! An element present in the map always has at least one record. Lookups hand
//! out clones; only the engine touches the live records.

use std::collections::HashMap;

use crate::types::{Activation, Breakpoint, BreakpointRecord, Element, QueryId};

/// Outcome of removing a single record.
#[derive(Debug)]
pub struct Removed<E> {
    pub element: E,
    pub record: BreakpointRecord,
    /// The element's last record went with it; the element is no longer tracked.
    pub emptied: bool,
}

#[derive(Debug)]
pub struct QueryRegistry<E: Element> {
    elements: HashMap<E, Vec<BreakpointRecord>>,
    owners: HashMap<QueryId, E>,
    next_id: QueryId,
}

impl<E: Element> Default for QueryRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> QueryRegistry<E> {
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
            owners: HashMap::new(),
            next_id: 0,
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append a record to `element`'s list, creating it if absent.
    ///
    /// Returns the new id and whether the element was previously untracked.
    pub fn register(
        &mut self,
        element: E,
        breakpoint: Breakpoint,
        activation: Activation,
    ) -> (QueryId, bool) {
        let id = self.next_id;
        self.next_id += 1;

        let records = self.elements.entry(element).or_default();
        let newly_tracked = records.is_empty();
        records.push(BreakpointRecord {
            id,
            breakpoint,
            activation,
            active: false,
        });
        self.owners.insert(id, element);

        (id, newly_tracked)
    }

    /// Remove the record with `id`, dropping its element when the list empties.
    pub fn remove_by_id(&mut self, id: QueryId) -> Option<Removed<E>> {
        let element = self.owners.remove(&id)?;
        let records = self.elements.get_mut(&element)?;
        let position = records.iter().position(|r| r.id == id)?;
        let record = records.remove(position);

        let emptied = records.is_empty();
        if emptied {
            self.elements.remove(&element);
        }

        Some(Removed { element, record, emptied })
    }

    /// Drop every record of `element`.
    pub fn remove_by_element(&mut self, element: E) -> Option<Vec<BreakpointRecord>> {
        let records = self.elements.remove(&element)?;
        for record in &records {
            self.owners.remove(&record.id);
        }
        Some(records)
    }

    /// Empty the registry and restart ids from zero.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.owners.clear();
        self.next_id = 0;
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn find_by_id(&self, id: QueryId) -> Option<BreakpointRecord> {
        let element = self.owners.get(&id)?;
        self.elements
            .get(element)?
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn find_by_element(&self, element: E) -> Option<Vec<BreakpointRecord>> {
        self.elements.get(&element).cloned()
    }

    pub fn contains(&self, element: E) -> bool {
        self.elements.contains_key(&element)
    }

    /// Number of live records.
    pub fn record_count(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Live records of an element, for evaluation only.
    pub(crate) fn records_mut(&mut self, element: E) -> Option<&mut Vec<BreakpointRecord>> {
        self.elements.get_mut(&element)
    }

    /// Ids of an element's records, in insertion order.
    pub(crate) fn ids_of(&self, element: E) -> Vec<QueryId> {
        self.elements
            .get(&element)
            .map(|records| records.iter().map(|r| r.id).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Comparison, Property, Unit};

    fn bp(value: f64) -> Breakpoint {
        Breakpoint::new(Property::Width, Comparison::Ge, value, Unit::Pixels)
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut reg: QueryRegistry<u32> = QueryRegistry::new();

        let (a, new_a) = reg.register(1, bp(10.0), Activation::class("a"));
        let (b, new_b) = reg.register(1, bp(20.0), Activation::class("b"));
        let (c, new_c) = reg.register(2, bp(30.0), Activation::class("c"));

        assert_eq!((a, b, c), (0, 1, 2));
        assert!(new_a);
        assert!(!new_b);
        assert!(new_c);
        assert!(reg.contains(1) && reg.contains(2));
        assert_eq!(reg.record_count(), 3);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut reg: QueryRegistry<u32> = QueryRegistry::new();
        reg.register(7, bp(3.0), Activation::class("x"));
        reg.register(7, bp(1.0), Activation::class("y"));
        reg.register(7, bp(2.0), Activation::class("z"));

        let values: Vec<f64> = reg
            .find_by_element(7)
            .unwrap()
            .iter()
            .map(|r| r.breakpoint.value)
            .collect();
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_ids_never_reused_after_removal() {
        let mut reg: QueryRegistry<u32> = QueryRegistry::new();
        let (a, _) = reg.register(1, bp(10.0), Activation::class("a"));
        assert!(reg.remove_by_id(a).is_some());

        let (b, _) = reg.register(1, bp(10.0), Activation::class("a"));
        assert_ne!(a, b);
        assert_eq!(b, 1);
    }

    #[test]
    fn test_remove_last_record_drops_element() {
        let mut reg: QueryRegistry<u32> = QueryRegistry::new();
        let (a, _) = reg.register(1, bp(10.0), Activation::class("a"));
        let (b, _) = reg.register(1, bp(20.0), Activation::class("b"));

        let removed = reg.remove_by_id(a).unwrap();
        assert_eq!(removed.element, 1);
        assert!(!removed.emptied);
        assert!(reg.contains(1));

        let removed = reg.remove_by_id(b).unwrap();
        assert!(removed.emptied);
        assert!(!reg.contains(1));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_none() {
        let mut reg: QueryRegistry<u32> = QueryRegistry::new();
        assert!(reg.remove_by_id(42).is_none());
        assert!(reg.remove_by_element(9).is_none());
        assert!(reg.find_by_id(42).is_none());
        assert!(reg.find_by_element(9).is_none());
    }

    #[test]
    fn test_remove_by_element_forgets_ids() {
        let mut reg: QueryRegistry<u32> = QueryRegistry::new();
        let (a, _) = reg.register(1, bp(10.0), Activation::class("a"));
        reg.register(1, bp(20.0), Activation::class("b"));

        let records = reg.remove_by_element(1).unwrap();
        assert_eq!(records.len(), 2);
        assert!(reg.find_by_id(a).is_none());
        assert_eq!(reg.record_count(), 0);
    }

    #[test]
    fn test_snapshots_are_copies() {
        let mut reg: QueryRegistry<u32> = QueryRegistry::new();
        let (a, _) = reg.register(1, bp(10.0), Activation::class("a"));

        let mut snapshot = reg.find_by_id(a).unwrap();
        snapshot.active = true;
        snapshot.breakpoint.value = 999.0;

        let fresh = reg.find_by_id(a).unwrap();
        assert!(!fresh.active);
        assert_eq!(fresh.breakpoint.value, 10.0);
    }

    #[test]
    fn test_clear_resets_counter() {
        let mut reg: QueryRegistry<u32> = QueryRegistry::new();
        reg.register(1, bp(10.0), Activation::class("a"));
        reg.register(2, bp(10.0), Activation::class("a"));
        reg.clear();

        assert!(reg.is_empty());
        let (id, _) = reg.register(3, bp(10.0), Activation::class("a"));
        assert_eq!(id, 0);
    }
}
