//! Evaluation Engine - resize batches → activation state machine.
//!
//! Each entry of a batch is processed in two passes, always in this order:
//!
//! 1. **Fan-out** - if the target is a tracked ancestor, re-evaluate the
//!    percent records of every dependent descendant against the target's
//!    just-reported border box. Descendants that have since been detached are
//!    skipped, and re-parented ones are left to their own direct pass
//! 2. **Direct** - evaluate every record registered on the target itself
//!
//! Evaluation pulls from the live registry, so a record removed before the
//! batch reaches it is simply never seen.
//!
//! # State machine
//!
//! ```text
//!            passes                    !passes
//! Inactive ────────▶ on_active ▶ Active ────────▶ on_inactive ▶ Inactive
//! ```
//!
//! `ClassToggle` records have no state: the class follows `passes` on every call.

use std::collections::HashMap;

use tracing::{trace, warn};

use crate::config::PercentBasis;
use crate::error::{CqError, Result};
use crate::host::{ClassList, Host, StyleQuery};
use crate::types::{Activation, BoxSize, BreakpointRecord, Element, ResizeEntry};

use super::resolver::{gather_context, parse_px, resolve_threshold};
use super::ContainerQ;

impl<E: Element> ContainerQ<E> {
    /// Observation callback: process one settled batch of resize entries.
    pub fn on_resize<H: Host<E>>(&mut self, host: &mut H, entries: &[ResizeEntry<E>]) {
        let sizes: HashMap<E, BoxSize> = entries
            .iter()
            .map(|entry| (entry.target, entry.border_box))
            .collect();

        for entry in entries {
            self.fan_out(host, entry, &sizes);
            self.evaluate_direct(host, entry, &sizes);
        }
    }

    fn fan_out<H: Host<E>>(
        &mut self,
        host: &mut H,
        entry: &ResizeEntry<E>,
        sizes: &HashMap<E, BoxSize>,
    ) {
        let ancestor = entry.target;
        let basis = self.config.percent_basis;

        for descendant in self.ancestors.descendants_of(ancestor) {
            // The anchor is only bookkeeping; thresholds follow the current parent.
            match host.parent(descendant) {
                Some(parent) if parent == ancestor => {}
                Some(parent) => {
                    trace!(?descendant, ?ancestor, ?parent, "re-parented, left to direct pass");
                    continue;
                }
                None => {
                    warn!(
                        ?descendant,
                        ?ancestor,
                        err = %CqError::MissingParent,
                        "percent breakpoint skipped this cycle"
                    );
                    continue;
                }
            }

            let measured = match sizes.get(&descendant) {
                Some(size) => *size,
                None => match offset_size(&*host, descendant) {
                    Ok(size) => size,
                    Err(err) => {
                        warn!(?descendant, %err, "cannot measure percent descendant, skipping");
                        continue;
                    }
                },
            };

            let anchored: Vec<_> = self
                .registry
                .ids_of(descendant)
                .into_iter()
                .filter(|id| self.ancestors.anchor_of(*id) == Some(ancestor))
                .collect();

            let Some(records) = self.registry.records_mut(descendant) else {
                continue;
            };

            for record in records.iter_mut().filter(|r| anchored.contains(&r.id)) {
                let property = record.property();
                evaluate_record(
                    host,
                    descendant,
                    record,
                    measured.along(property),
                    Some(ancestor),
                    Some(entry.border_box.along(property)),
                    basis,
                );
            }
        }
    }

    fn evaluate_direct<H: Host<E>>(
        &mut self,
        host: &mut H,
        entry: &ResizeEntry<E>,
        sizes: &HashMap<E, BoxSize>,
    ) {
        let target = entry.target;
        let basis = self.config.percent_basis;
        let Some(records) = self.registry.records_mut(target) else {
            return;
        };

        let parent = host.parent(target);
        let parent_size = parent.and_then(|p| sizes.get(&p).copied());

        for record in records.iter_mut() {
            let property = record.property();
            evaluate_record(
                host,
                target,
                record,
                entry.border_box.along(property),
                parent,
                parent_size.map(|size| size.along(property)),
                basis,
            );
        }
    }
}

/// Resolve, compare and apply one record. Failures skip only this record.
fn evaluate_record<E: Element, H: Host<E>>(
    host: &mut H,
    element: E,
    record: &mut BreakpointRecord,
    measured: f64,
    parent: Option<E>,
    parent_outer: Option<f64>,
    basis: PercentBasis,
) {
    let threshold = gather_context(&*host, &record.breakpoint, parent, parent_outer, basis)
        .and_then(|ctx| resolve_threshold(&record.breakpoint, &ctx));

    let threshold = match threshold {
        Ok(threshold) => threshold,
        Err(err) => {
            warn!(
                ?element,
                id = record.id,
                unit = %record.unit(),
                %err,
                "breakpoint skipped this cycle"
            );
            return;
        }
    };

    let passes = record.breakpoint.comparison.test(measured, threshold);
    trace!(?element, id = record.id, measured, threshold, passes, "evaluated");
    apply(host, element, record, passes);
}

/// Drive the activation for one evaluation result.
pub(crate) fn apply<E: Element>(
    classes: &mut impl ClassList<E>,
    element: E,
    record: &mut BreakpointRecord,
    passes: bool,
) {
    match &record.activation {
        Activation::ClassToggle(name) => {
            if passes {
                classes.add_class(element, name);
            } else {
                classes.remove_class(element, name);
            }
        }
        Activation::Callbacks { on_active, on_inactive } => {
            if passes && !record.active {
                trace!(?element, id = record.id, "activated");
                on_active();
                record.active = true;
            } else if !passes && record.active {
                trace!(?element, id = record.id, "deactivated");
                if let Some(on_inactive) = on_inactive {
                    on_inactive();
                }
                record.active = false;
            }
        }
    }
}

/// Current border-box size from the element's offset extents.
fn offset_size<E>(host: &impl StyleQuery<E>, element: E) -> Result<BoxSize> {
    let style = host.computed_style(element)?;
    Ok(BoxSize::new(
        parse_px(&style.offset_width)?,
        parse_px(&style.offset_height)?,
    ))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::host::mock::MockHost;
    use crate::types::{Breakpoint, Comparison, Property, Unit};

    fn record(activation: Activation) -> BreakpointRecord {
        BreakpointRecord {
            id: 0,
            breakpoint: Breakpoint::new(Property::Width, Comparison::Ge, 80.0, Unit::Pixels),
            activation,
            active: false,
        }
    }

    #[test]
    fn test_class_toggle_follows_result() {
        let mut host = MockHost::new();
        let mut rec = record(Activation::class("wide"));

        apply(&mut host, 1, &mut rec, true);
        assert!(host.has_class(1, "wide"));
        apply(&mut host, 1, &mut rec, true);
        assert!(host.has_class(1, "wide"));
        apply(&mut host, 1, &mut rec, false);
        assert!(!host.has_class(1, "wide"));
        assert!(!rec.active);
    }

    #[test]
    fn test_callbacks_are_edge_triggered() {
        let mut host = MockHost::new();
        let on = Rc::new(Cell::new(0));
        let off = Rc::new(Cell::new(0));
        let (on_c, off_c) = (on.clone(), off.clone());
        let mut rec = record(Activation::callbacks(
            move || on_c.set(on_c.get() + 1),
            move || off_c.set(off_c.get() + 1),
        ));

        apply(&mut host, 1, &mut rec, false);
        assert_eq!((on.get(), off.get()), (0, 0));

        apply(&mut host, 1, &mut rec, true);
        apply(&mut host, 1, &mut rec, true);
        assert_eq!((on.get(), off.get()), (1, 0));
        assert!(rec.active);

        apply(&mut host, 1, &mut rec, false);
        apply(&mut host, 1, &mut rec, false);
        assert_eq!((on.get(), off.get()), (1, 1));
        assert!(!rec.active);
    }

    #[test]
    fn test_missing_on_inactive_still_resets_state() {
        let mut host = MockHost::new();
        let on = Rc::new(Cell::new(0));
        let on_c = on.clone();
        let mut rec = record(Activation::callback(move || on_c.set(on_c.get() + 1)));

        apply(&mut host, 1, &mut rec, true);
        apply(&mut host, 1, &mut rec, false);
        assert!(!rec.active);
        apply(&mut host, 1, &mut rec, true);
        assert_eq!(on.get(), 2);
    }
}
