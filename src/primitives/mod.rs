//! Binding adapter - declarative queries for component mount/unmount.
//!
//! This module provides the bridge between a component and the engine:
//! - [`use_cq`] - register a component's queries, get back a cleanup
//! - [`QueryProps`] - one declarative query (class, callbacks or toggle)
//!
//! # Lifecycle
//!
//! One long-lived engine is shared by every component. Each mount:
//! 1. Resolves every prop's activation
//! 2. Registers the queries against the component's element
//! 3. Returns a cleanup that stops all queries of that element
//!
//! ```ignore
//! // Mount
//! let mounted = use_cq(&engine, &host, element, &[
//!     QueryProps::new(Breakpoint::parse("width", ">=", 600.0, "px")?).class("wide"),
//!     QueryProps::new(Breakpoint::parse("width", "<", 50.0, "%")?)
//!         .toggle_signal(is_narrow.clone()),
//! ])?;
//!
//! // Unmount
//! (mounted.cleanup)();
//! ```

mod types;
mod use_cq;

pub use types::*;
pub use use_cq::{use_cq, Mounted};
