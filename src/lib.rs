//! # spark-cq
//!
//! Container queries for reactive UIs.
//!
//! Register geometric breakpoints on arbitrary elements ("when this element's
//! border-box width crosses 40rem, toggle a class or call back") without native
//! support for container-relative queries.
//!
//! ## Architecture
//!
//! spark-cq owns only the query engine. Layout, measurement scheduling and
//! rendering belong to the host, which plugs in through three traits
//! ([`ResizeObserver`], [`StyleQuery`], [`ClassList`]):
//!
//! ```text
//! query() → Registry + Ancestors → host.observe()
//! host resize batch → on_resize() → Resolver → class toggle / edge callback
//! ```
//!
//! Thresholds can be expressed in pixels, root font units (`rem`), parent font
//! units (`em`) or a percentage of the parent's content box (`%`). Percent
//! breakpoints also observe the parent and re-evaluate when it resizes.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Breakpoint, Activation, BreakpointRecord, etc.)
//! - [`engine`] - The [`ContainerQ`] engine: registry, resolver, fan-out, evaluation
//! - [`host`] - Collaborator traits the host implements
//! - [`layout`] - Reference host over a Taffy layout tree
//! - [`primitives`] - Binding adapter for component mount/unmount

pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod layout;
pub mod primitives;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{CqConfig, PercentBasis};

pub use engine::ContainerQ;

pub use error::{CqError, Result};

pub use host::{ClassList, Host, ResizeObserver, StyleQuery};

pub use layout::{HostConfig, TaffyHost};

pub use primitives::{use_cq, Cleanup, Mounted, OnActive, QueryProps, ToggleCallback};
