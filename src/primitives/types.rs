//! Primitive types - Query props and cleanup.
//!
//! These types define the declarative interface of the binding adapter.
//! A component lists its queries as props; the adapter turns them into
//! engine registrations on mount.

use std::rc::Rc;

use spark_signals::Signal;

use crate::types::{Activation, Breakpoint, Callback};

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by the adapter.
///
/// Call this on unmount to stop every query the mount registered.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Callback Types
// =============================================================================

/// Single callback receiving the new state on every transition.
pub type ToggleCallback = Rc<dyn Fn(bool)>;

/// What to do when a query starts passing.
#[derive(Clone)]
pub enum OnActive {
    /// Toggle a class on the element.
    Class(String),
    /// Call back on the Inactive → Active edge.
    Callback(Callback),
}

// =============================================================================
// Query Props
// =============================================================================

/// One declarative query.
///
/// Precedence when resolving the activation:
/// 1. `on_query_toggle_state` - wrapped into both edges, overrides the rest
/// 2. `on_query_active` as a class - `ClassToggle`
/// 3. `on_query_active` as a callback - `Callbacks` with `on_query_inactive`
///
/// Props with none of these are ignored.
#[derive(Clone, Default)]
pub struct QueryProps {
    pub breakpoint: Breakpoint,
    pub on_query_active: Option<OnActive>,
    pub on_query_inactive: Option<Callback>,
    pub on_query_toggle_state: Option<ToggleCallback>,
}

impl QueryProps {
    pub fn new(breakpoint: Breakpoint) -> Self {
        Self {
            breakpoint,
            ..Default::default()
        }
    }

    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.on_query_active = Some(OnActive::Class(name.into()));
        self
    }

    pub fn on_active(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_query_active = Some(OnActive::Callback(Rc::new(callback)));
        self
    }

    pub fn on_inactive(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_query_inactive = Some(Rc::new(callback));
        self
    }

    pub fn on_toggle(mut self, callback: impl Fn(bool) + 'static) -> Self {
        self.on_query_toggle_state = Some(Rc::new(callback));
        self
    }

    /// Mirror the query's state into a signal.
    pub fn toggle_signal(self, state: Signal<bool>) -> Self {
        self.on_toggle(move |active| {
            state.set(active);
        })
    }

    /// The engine activation these props describe, if any.
    pub fn activation(&self) -> Option<Activation> {
        if let Some(toggle) = &self.on_query_toggle_state {
            let on = toggle.clone();
            let off = toggle.clone();
            return Some(Activation::callbacks(move || on(true), move || off(false)));
        }

        match &self.on_query_active {
            Some(OnActive::Class(name)) => Some(Activation::ClassToggle(name.clone())),
            Some(OnActive::Callback(on_active)) => Some(Activation::Callbacks {
                on_active: on_active.clone(),
                on_inactive: self.on_query_inactive.clone(),
            }),
            None => None,
        }
    }
}
