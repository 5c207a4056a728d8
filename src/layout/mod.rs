//! Layout hosts.
//!
//! The engine itself never measures anything. This module provides a
//! ready-made host backed by [Taffy](https://github.com/DioxusLabs/taffy) so
//! queries can run against real flexbox/grid layout:
//!
//! 1. Build a tree of Taffy styles
//! 2. Register queries against its nodes
//! 3. Call `layout_and_notify` after each change; observed nodes whose border
//!    box changed are delivered to the engine as one batch

mod taffy_host;

pub use taffy_host::{HostConfig, TaffyHost};
