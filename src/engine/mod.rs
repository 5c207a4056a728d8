//! Query Engine - registries, resolver, fan-out and evaluation.
//!
//! The engine manages the core data structures:
//! - Registry: element → ordered breakpoint records, id allocation
//! - Ancestors: ancestor → descendants holding percent records
//! - Resolver: unit + value + measurements → pixel threshold
//! - Evaluate: resize batches → class toggles and edge-triggered callbacks
//!
//! # Architecture
//!
//! One [`ContainerQ`] is constructed explicitly and owned by whoever drives
//! it. The host is passed into every call that needs it, so the engine holds
//! no references into the host and no ambient global state:
//!
//! ```text
//! query() ──▶ Registry ──▶ host.observe(element)
//!        └──▶ Ancestors ─▶ host.observe(parent)        (percent units)
//!
//! host resize batch ──▶ on_resize() ──▶ fan-out pass ──▶ direct pass
//! ```
//!
//! # Subscriptions
//!
//! An element is observed while it is a query target, a tracked ancestor, or
//! both. The host sees `observe` on the first role gained and `unobserve` when
//! the last role is lost.

mod ancestors;
mod evaluate;
mod registry;
pub mod resolver;

pub use ancestors::AncestorRegistry;
pub use registry::{QueryRegistry, Removed};

use tracing::{debug, trace, warn};

use crate::config::CqConfig;
use crate::error::Result;
use crate::host::{Host, ResizeObserver};
use crate::types::{Activation, Breakpoint, BreakpointRecord, Element, QueryId, Unit};

/// The container query engine.
#[derive(Debug)]
pub struct ContainerQ<E: Element> {
    registry: QueryRegistry<E>,
    ancestors: AncestorRegistry<E>,
    config: CqConfig,
}

impl<E: Element> Default for ContainerQ<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> ContainerQ<E> {
    pub fn new() -> Self {
        Self::with_config(CqConfig::default())
    }

    pub fn with_config(config: CqConfig) -> Self {
        Self {
            registry: QueryRegistry::new(),
            ancestors: AncestorRegistry::new(),
            config,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a breakpoint on `element` and subscribe what it depends on.
    ///
    /// Percent breakpoints also register the element's current parent as an
    /// ancestor. An element with no parent is still registered; its percent
    /// records are skipped at evaluation until removed.
    pub fn query<H: Host<E>>(
        &mut self,
        host: &mut H,
        element: E,
        breakpoint: Breakpoint,
        activation: Activation,
    ) -> Result<QueryId> {
        breakpoint.validate()?;

        let (id, new_target) = self.registry.register(element, breakpoint, activation);
        if new_target && !self.ancestors.is_tracked(element) {
            trace!(?element, "observe element");
            host.observe(element);
        }

        let parent = if breakpoint.unit.needs_parent() {
            host.parent(element)
        } else {
            None
        };

        if breakpoint.unit == Unit::ParentPercent {
            match parent {
                Some(parent) => {
                    let new_ancestor = self.ancestors.on_percent_record_added(element, parent, id);
                    if new_ancestor && !self.registry.contains(parent) {
                        trace!(?parent, "observe ancestor");
                        host.observe(parent);
                    }
                }
                None => warn!(?element, id, "percent breakpoint on element without parent"),
            }
        }

        debug!(?element, id, %breakpoint, "query registered");
        Ok(id)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Snapshot of the record with `id`.
    pub fn is_querying(&self, id: QueryId) -> Option<BreakpointRecord> {
        self.registry.find_by_id(id)
    }

    /// Snapshot of every record on `element`, in registration order.
    pub fn is_querying_element(&self, element: E) -> Option<Vec<BreakpointRecord>> {
        self.registry.find_by_element(element)
    }

    /// Descendants whose percent breakpoints depend on `ancestor`.
    pub fn descendants_of(&self, ancestor: E) -> Vec<E> {
        self.ancestors.descendants_of(ancestor)
    }

    pub fn is_tracked_ancestor(&self, element: E) -> bool {
        self.ancestors.is_tracked(element)
    }

    /// Number of live records.
    pub fn query_count(&self) -> usize {
        self.registry.record_count()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty() && self.ancestors.is_empty()
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Remove one record. Returns false for unknown ids.
    pub fn stop_querying(&mut self, host: &mut impl ResizeObserver<E>, id: QueryId) -> bool {
        let Some(removed) = self.registry.remove_by_id(id) else {
            return false;
        };

        if removed.record.is_percent() {
            self.release_ancestor(host, id);
        }
        if removed.emptied {
            self.release_element(host, removed.element);
        }

        debug!(element = ?removed.element, id, "query stopped");
        true
    }

    /// Remove every record on `element`. Returns false when it had none.
    pub fn stop_querying_element(&mut self, host: &mut impl ResizeObserver<E>, element: E) -> bool {
        let Some(records) = self.registry.remove_by_element(element) else {
            return false;
        };

        for record in records.iter().filter(|r| r.is_percent()) {
            self.release_ancestor(host, record.id);
        }
        self.release_element(host, element);

        debug!(?element, count = records.len(), "element queries stopped");
        true
    }

    /// Disconnect the observer and return to the freshly constructed state.
    pub fn stop_querying_all(&mut self, host: &mut impl ResizeObserver<E>) {
        host.disconnect();
        self.registry.clear();
        self.ancestors.clear();
        debug!("all queries stopped");
    }

    // =========================================================================
    // Subscription bookkeeping
    // =========================================================================

    fn is_observed(&self, element: E) -> bool {
        self.registry.contains(element) || self.ancestors.is_tracked(element)
    }

    fn release_ancestor(&mut self, host: &mut impl ResizeObserver<E>, id: QueryId) {
        if let Some(ancestor) = self.ancestors.on_percent_record_removed(id) {
            if !self.is_observed(ancestor) {
                trace!(?ancestor, "unobserve ancestor");
                host.unobserve(ancestor);
            }
        }
    }

    fn release_element(&mut self, host: &mut impl ResizeObserver<E>, element: E) {
        if !self.is_observed(element) {
            trace!(?element, "unobserve element");
            host.unobserve(element);
        }
    }
}
