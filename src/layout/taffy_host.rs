//! Taffy Host - a complete engine host over a Taffy layout tree.
//!
//! Implements all three collaborator traits on top of
//! [Taffy](https://github.com/DioxusLabs/taffy):
//!
//! 1. `ResizeObserver` - remembers the last border-box size of each observed
//!    node and reports the ones that changed after every layout pass
//! 2. `StyleQuery` - parent/root from the tree, computed lengths from the
//!    resolved `Layout` (padding, border, size) plus inherited font sizes
//! 3. `ClassList` - a class set per node
//!
//! # Example
//!
//! ```ignore
//! use spark_cq::{Activation, Breakpoint, ContainerQ, TaffyHost};
//! use taffy::prelude::*;
//!
//! let mut host = TaffyHost::new(Style::default())?;
//! let card = host.new_child(host.root_node(), Style::default())?;
//!
//! let mut cq = ContainerQ::new();
//! let wide = Breakpoint::parse("width", ">=", 40.0, "rem")?;
//! cq.query(&mut host, card, wide, Activation::class("wide"))?;
//!
//! host.layout_and_notify(&mut cq, Size::MAX_CONTENT)?;
//! assert!(host.has_class(card, "wide"));
//! ```

use std::collections::{BTreeSet, HashMap};

use taffy::{AvailableSpace, NodeId, Size, Style, TaffyError, TaffyTree};
use tracing::debug;

use crate::engine::ContainerQ;
use crate::error::{CqError, Result};
use crate::host::{px, ClassList, ResizeObserver, StyleQuery};
use crate::types::{BoxSize, ComputedStyle, LogicalEdges, ResizeEntry};

impl From<TaffyError> for CqError {
    fn from(err: TaffyError) -> Self {
        CqError::Layout(err.to_string())
    }
}

// =============================================================================
// Config
// =============================================================================

/// Settings for [`TaffyHost`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostConfig {
    /// Font size of nodes with no explicit or inherited size.
    pub default_font_size: f32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self { default_font_size: 16.0 }
    }
}

// =============================================================================
// Host
// =============================================================================

pub struct TaffyHost {
    tree: TaffyTree<()>,
    root: NodeId,
    font_sizes: HashMap<NodeId, f32>,
    classes: HashMap<NodeId, BTreeSet<String>>,
    /// Observed nodes in observation order, with the last reported size.
    observed: Vec<(NodeId, Option<BoxSize>)>,
    config: HostConfig,
}

impl TaffyHost {
    /// Create a host whose document root has `root_style`.
    pub fn new(root_style: Style) -> Result<Self> {
        Self::with_config(root_style, HostConfig::default())
    }

    pub fn with_config(root_style: Style, config: HostConfig) -> Result<Self> {
        let mut tree = TaffyTree::new();
        let root = tree.new_leaf(root_style)?;
        Ok(Self {
            tree,
            root,
            font_sizes: HashMap::new(),
            classes: HashMap::new(),
            observed: Vec::new(),
            config,
        })
    }

    pub fn root_node(&self) -> NodeId {
        self.root
    }

    // =========================================================================
    // Tree building
    // =========================================================================

    /// Create a detached node.
    pub fn new_leaf(&mut self, style: Style) -> Result<NodeId> {
        Ok(self.tree.new_leaf(style)?)
    }

    /// Create a node and append it to `parent`.
    pub fn new_child(&mut self, parent: NodeId, style: Style) -> Result<NodeId> {
        let node = self.tree.new_leaf(style)?;
        self.tree.add_child(parent, node)?;
        Ok(node)
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        Ok(self.tree.add_child(parent, child)?)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.tree.remove_child(parent, child)?;
        Ok(())
    }

    pub fn set_style(&mut self, node: NodeId, style: Style) -> Result<()> {
        Ok(self.tree.set_style(node, style)?)
    }

    /// Give `node` an explicit font size; descendants inherit it.
    pub fn set_font_size(&mut self, node: NodeId, size: f32) {
        self.font_sizes.insert(node, size);
    }

    pub fn clear_font_size(&mut self, node: NodeId) {
        self.font_sizes.remove(&node);
    }

    /// Inherited font size: nearest explicit size on the ancestor chain.
    pub fn font_size(&self, node: NodeId) -> f32 {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(&size) = self.font_sizes.get(&n) {
                return size;
            }
            current = self.tree.parent(n);
        }
        self.config.default_font_size
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Run layout from the root and collect the resize batch.
    ///
    /// Every observed node whose border box differs from the last reported
    /// one is included; nodes observed since the last pass always are.
    pub fn compute_layout(
        &mut self,
        available: Size<AvailableSpace>,
    ) -> Result<Vec<ResizeEntry<NodeId>>> {
        self.tree.compute_layout(self.root, available)?;

        let mut batch = Vec::new();
        for (node, last) in &mut self.observed {
            let layout = match self.tree.layout(*node) {
                Ok(layout) => layout,
                Err(err) => {
                    debug!(?node, %err, "observed node has no layout");
                    continue;
                }
            };
            let size = BoxSize::new(layout.size.width as f64, layout.size.height as f64);
            if *last != Some(size) {
                *last = Some(size);
                batch.push(ResizeEntry::new(*node, size));
            }
        }
        Ok(batch)
    }

    /// Lay out and deliver the batch to `engine` in one step.
    ///
    /// Returns the number of entries delivered.
    pub fn layout_and_notify(
        &mut self,
        engine: &mut ContainerQ<NodeId>,
        available: Size<AvailableSpace>,
    ) -> Result<usize> {
        let batch = self.compute_layout(available)?;
        if !batch.is_empty() {
            engine.on_resize(self, &batch);
        }
        Ok(batch.len())
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.iter().any(|(n, _)| *n == node)
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub fn has_class(&self, node: NodeId, name: &str) -> bool {
        self.classes.get(&node).is_some_and(|set| set.contains(name))
    }

    /// Classes on `node`, sorted.
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.classes
            .get(&node)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl ResizeObserver<NodeId> for TaffyHost {
    fn observe(&mut self, element: NodeId) {
        if !self.is_observed(element) {
            self.observed.push((element, None));
        }
    }

    fn unobserve(&mut self, element: NodeId) {
        self.observed.retain(|(n, _)| *n != element);
    }

    fn disconnect(&mut self) {
        self.observed.clear();
    }
}

impl StyleQuery<NodeId> for TaffyHost {
    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.tree.parent(element)
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn computed_style(&self, element: NodeId) -> Result<ComputedStyle> {
        let layout = self
            .tree
            .layout(element)
            .map_err(|_| CqError::UnknownElement(format!("{element:?}")))?;

        // Horizontal-tb, left-to-right: inline = left/right, block = top/bottom.
        let edges = |rect: taffy::Rect<f32>| LogicalEdges {
            block_start: px(rect.top as f64),
            inline_end: px(rect.right as f64),
            block_end: px(rect.bottom as f64),
            inline_start: px(rect.left as f64),
        };

        Ok(ComputedStyle {
            font_size: px(self.font_size(element) as f64),
            padding: edges(layout.padding),
            border_width: edges(layout.border),
            offset_width: px(layout.size.width as f64),
            offset_height: px(layout.size.height as f64),
        })
    }
}

impl ClassList<NodeId> for TaffyHost {
    fn add_class(&mut self, element: NodeId, name: &str) {
        self.classes.entry(element).or_default().insert(name.to_string());
    }

    fn remove_class(&mut self, element: NodeId, name: &str) {
        if let Some(set) = self.classes.get_mut(&element) {
            set.remove(name);
            if set.is_empty() {
                self.classes.remove(&element);
            }
        }
    }
}
