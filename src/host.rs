//! Host collaborators.
//!
//! The engine performs no layout and no measurement of its own. Everything it
//! knows about geometry comes through these three traits:
//!
//! - [`ResizeObserver`] - subscribe elements, deliver resize batches
//! - [`StyleQuery`] - tree structure and computed style strings
//! - [`ClassList`] - class mutation for `ClassToggle` activations
//!
//! A host usually implements all three on one object; [`Host`] is blanket
//! implemented for anything that does.

use crate::error::Result;
use crate::types::ComputedStyle;

/// The observation primitive.
///
/// `observe` must be idempotent. After `observe`, the host is expected to
/// report the element's border-box size in its next batch and again whenever
/// that size changes, by calling `ContainerQ::on_resize`.
pub trait ResizeObserver<E> {
    fn observe(&mut self, element: E);
    fn unobserve(&mut self, element: E);
    /// Drop every observation at once.
    fn disconnect(&mut self);
}

/// Synchronous reads of tree structure and computed style.
pub trait StyleQuery<E> {
    fn parent(&self, element: E) -> Option<E>;

    /// The document's outermost element (source of the root font size).
    fn root(&self) -> E;

    fn computed_style(&self, element: E) -> Result<ComputedStyle>;
}

/// Class set mutation.
pub trait ClassList<E> {
    fn add_class(&mut self, element: E, name: &str);
    fn remove_class(&mut self, element: E, name: &str);
}

/// Everything the engine needs from its environment.
pub trait Host<E>: ResizeObserver<E> + StyleQuery<E> + ClassList<E> {}

impl<E, T> Host<E> for T where T: ResizeObserver<E> + StyleQuery<E> + ClassList<E> {}

/// Format a pixel length the way hosts report computed styles.
pub fn px(value: f64) -> String {
    format!("{value}px")
}

// =============================================================================
// Test Host
// =============================================================================

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::{BTreeSet, HashMap};

    use super::*;
    use crate::error::CqError;
    use crate::types::LogicalEdges;

    /// Subscription traffic recorded by [`MockHost`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Sub {
        Observe(u32),
        Unobserve(u32),
        Disconnect,
    }

    /// In-memory host. Element 0 is the root.
    #[derive(Default)]
    pub struct MockHost {
        pub parents: HashMap<u32, u32>,
        pub styles: HashMap<u32, ComputedStyle>,
        pub classes: HashMap<u32, BTreeSet<String>>,
        pub log: Vec<Sub>,
    }

    impl MockHost {
        pub fn new() -> Self {
            let mut host = Self::default();
            host.set_box(0, 16.0, 0.0, 0.0, 1000.0, 1000.0);
            host
        }

        pub fn set_parent(&mut self, child: u32, parent: u32) {
            self.parents.insert(child, parent);
        }

        pub fn detach(&mut self, child: u32) {
            self.parents.remove(&child);
        }

        /// Uniform padding and border on all edges.
        pub fn set_box(&mut self, el: u32, font: f64, padding: f64, border: f64, w: f64, h: f64) {
            let edges = |v: f64| LogicalEdges {
                block_start: px(v),
                inline_end: px(v),
                block_end: px(v),
                inline_start: px(v),
            };
            self.styles.insert(
                el,
                ComputedStyle {
                    font_size: px(font),
                    padding: edges(padding),
                    border_width: edges(border),
                    offset_width: px(w),
                    offset_height: px(h),
                },
            );
        }

        pub fn has_class(&self, el: u32, name: &str) -> bool {
            self.classes.get(&el).is_some_and(|set| set.contains(name))
        }

        pub fn count(&self, sub: Sub) -> usize {
            self.log.iter().filter(|s| **s == sub).count()
        }
    }

    impl ResizeObserver<u32> for MockHost {
        fn observe(&mut self, element: u32) {
            self.log.push(Sub::Observe(element));
        }

        fn unobserve(&mut self, element: u32) {
            self.log.push(Sub::Unobserve(element));
        }

        fn disconnect(&mut self) {
            self.log.push(Sub::Disconnect);
        }
    }

    impl StyleQuery<u32> for MockHost {
        fn parent(&self, element: u32) -> Option<u32> {
            self.parents.get(&element).copied()
        }

        fn root(&self) -> u32 {
            0
        }

        fn computed_style(&self, element: u32) -> Result<ComputedStyle> {
            self.styles
                .get(&element)
                .cloned()
                .ok_or_else(|| CqError::UnknownElement(element.to_string()))
        }
    }

    impl ClassList<u32> for MockHost {
        fn add_class(&mut self, element: u32, name: &str) {
            self.classes.entry(element).or_default().insert(name.to_string());
        }

        fn remove_class(&mut self, element: u32, name: &str) {
            if let Some(set) = self.classes.get_mut(&element) {
                set.remove(name);
            }
        }
    }
}
