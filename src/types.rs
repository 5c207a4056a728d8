//! Core types for spark-cq.
//!
//! These types define the foundation that everything builds on.
//! They flow from the public API into the registries and back out as snapshots.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{CqError, Result};

// =============================================================================
// Element Identity
// =============================================================================

/// Anything the host can use to identify an element.
///
/// The engine never dereferences elements; it only stores, compares and hands
/// them back to the host.
pub trait Element: Copy + Eq + Hash + fmt::Debug + 'static {}

impl<T: Copy + Eq + Hash + fmt::Debug + 'static> Element for T {}

/// Identifier issued by `query`.
///
/// Monotonic for the lifetime of an engine, never reused until
/// `stop_querying_all` resets the counter.
pub type QueryId = u64;

// =============================================================================
// Breakpoint Enums
// =============================================================================

/// Which border-box dimension a breakpoint measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Property {
    #[default]
    Width,
    Height,
}

impl FromStr for Property {
    type Err = CqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "width" => Ok(Self::Width),
            "height" => Ok(Self::Height),
            other => Err(CqError::InvalidArgument(format!("unknown property `{other}`"))),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Width => "width",
            Self::Height => "height",
        })
    }
}

bitflags::bitflags! {
    /// Orderings a comparison accepts.
    ///
    /// `measured.partial_cmp(threshold)` yields exactly one of these (or none
    /// for NaN), and a comparison passes when its mask contains it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OrderingMask: u8 {
        const LESS = 1 << 0;
        const EQUAL = 1 << 1;
        const GREATER = 1 << 2;
    }
}

impl OrderingMask {
    /// Classify `lhs` against `rhs` with IEEE-754 semantics.
    pub fn of(lhs: f64, rhs: f64) -> Self {
        match lhs.partial_cmp(&rhs) {
            Some(std::cmp::Ordering::Less) => Self::LESS,
            Some(std::cmp::Ordering::Equal) => Self::EQUAL,
            Some(std::cmp::Ordering::Greater) => Self::GREATER,
            None => Self::empty(),
        }
    }
}

/// Comparison between the measured size and the resolved threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Comparison {
    Eq,
    Lt,
    Le,
    Gt,
    #[default]
    Ge,
}

impl Comparison {
    /// Orderings that satisfy this comparison.
    pub const fn mask(self) -> OrderingMask {
        match self {
            Self::Eq => OrderingMask::EQUAL,
            Self::Lt => OrderingMask::LESS,
            Self::Le => OrderingMask::LESS.union(OrderingMask::EQUAL),
            Self::Gt => OrderingMask::GREATER,
            Self::Ge => OrderingMask::GREATER.union(OrderingMask::EQUAL),
        }
    }

    /// `measured <op> threshold`.
    #[inline]
    pub fn test(self, measured: f64, threshold: f64) -> bool {
        self.mask().intersects(OrderingMask::of(measured, threshold))
    }
}

impl FromStr for Comparison {
    type Err = CqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "=" => Ok(Self::Eq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            other => Err(CqError::InvalidArgument(format!("unknown comparison `{other}`"))),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        })
    }
}

/// Unit the breakpoint value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// Absolute pixels.
    #[default]
    Pixels,
    /// Multiples of the root element's font size (`rem`).
    RootFontRelative,
    /// Multiples of the parent's font size (`em`).
    ParentFontRelative,
    /// Percentage of the parent's content box (`%`).
    ParentPercent,
}

impl Unit {
    /// Whether resolving this unit reads the element's parent.
    pub fn needs_parent(self) -> bool {
        matches!(self, Self::ParentFontRelative | Self::ParentPercent)
    }
}

impl FromStr for Unit {
    type Err = CqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "px" => Ok(Self::Pixels),
            "rem" => Ok(Self::RootFontRelative),
            "em" => Ok(Self::ParentFontRelative),
            "%" => Ok(Self::ParentPercent),
            other => Err(CqError::InvalidArgument(format!("unknown unit `{other}`"))),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pixels => "px",
            Self::RootFontRelative => "rem",
            Self::ParentFontRelative => "em",
            Self::ParentPercent => "%",
        })
    }
}

// =============================================================================
// Breakpoint
// =============================================================================

/// The geometric half of a query: `property comparison value unit`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Breakpoint {
    pub property: Property,
    pub comparison: Comparison,
    pub value: f64,
    pub unit: Unit,
}

impl Breakpoint {
    pub fn new(property: Property, comparison: Comparison, value: f64, unit: Unit) -> Self {
        Self { property, comparison, value, unit }
    }

    /// Build a breakpoint from textual tokens, e.g. `("width", ">=", 40.0, "rem")`.
    pub fn parse(property: &str, comparison: &str, value: f64, unit: &str) -> Result<Self> {
        let breakpoint = Self {
            property: property.parse()?,
            comparison: comparison.parse()?,
            value,
            unit: unit.parse()?,
        };
        breakpoint.validate()?;
        Ok(breakpoint)
    }

    /// Reject values no size can meaningfully be compared against.
    pub fn validate(&self) -> Result<()> {
        if !self.value.is_finite() {
            return Err(CqError::InvalidArgument(format!(
                "breakpoint value must be finite, got {}",
                self.value
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}{}", self.property, self.comparison, self.value, self.unit)
    }
}

// =============================================================================
// Activation
// =============================================================================

/// Side effect invoked on a state transition.
pub type Callback = Rc<dyn Fn()>;

/// What happens when a breakpoint passes or fails.
#[derive(Clone)]
pub enum Activation {
    /// Add the class while passing, remove it otherwise. Applied on every evaluation.
    ClassToggle(String),
    /// Edge-triggered callbacks: `on_active` on Inactive → Active,
    /// `on_inactive` on Active → Inactive.
    Callbacks {
        on_active: Callback,
        on_inactive: Option<Callback>,
    },
}

impl Activation {
    pub fn class(name: impl Into<String>) -> Self {
        Self::ClassToggle(name.into())
    }

    pub fn callback(on_active: impl Fn() + 'static) -> Self {
        Self::Callbacks {
            on_active: Rc::new(on_active),
            on_inactive: None,
        }
    }

    pub fn callbacks(on_active: impl Fn() + 'static, on_inactive: impl Fn() + 'static) -> Self {
        Self::Callbacks {
            on_active: Rc::new(on_active),
            on_inactive: Some(Rc::new(on_inactive)),
        }
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassToggle(name) => f.debug_tuple("ClassToggle").field(name).finish(),
            Self::Callbacks { on_inactive, .. } => f
                .debug_struct("Callbacks")
                .field("on_inactive", &on_inactive.is_some())
                .finish_non_exhaustive(),
        }
    }
}

// =============================================================================
// Breakpoint Record
// =============================================================================

/// One registered rule, as stored by the registry and returned in snapshots.
#[derive(Debug, Clone)]
pub struct BreakpointRecord {
    pub id: QueryId,
    pub breakpoint: Breakpoint,
    pub activation: Activation,
    /// Last pass/fail result communicated through `Callbacks`.
    /// Always false for `ClassToggle` records.
    pub active: bool,
}

impl BreakpointRecord {
    #[inline]
    pub fn property(&self) -> Property {
        self.breakpoint.property
    }

    #[inline]
    pub fn unit(&self) -> Unit {
        self.breakpoint.unit
    }

    #[inline]
    pub fn is_percent(&self) -> bool {
        self.breakpoint.unit == Unit::ParentPercent
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Border-box size split by logical axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxSize {
    /// Width-axis extent.
    pub inline_size: f64,
    /// Height-axis extent.
    pub block_size: f64,
}

impl BoxSize {
    pub const fn new(inline_size: f64, block_size: f64) -> Self {
        Self { inline_size, block_size }
    }

    /// Extent along the axis a property measures.
    #[inline]
    pub fn along(&self, property: Property) -> f64 {
        match property {
            Property::Width => self.inline_size,
            Property::Height => self.block_size,
        }
    }
}

/// One entry of a resize batch delivered by the observation primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEntry<E> {
    pub target: E,
    pub border_box: BoxSize,
}

impl<E> ResizeEntry<E> {
    pub fn new(target: E, border_box: BoxSize) -> Self {
        Self { target, border_box }
    }
}

/// Values on the four logical edges of a box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogicalEdges<T> {
    pub block_start: T,
    pub inline_end: T,
    pub block_end: T,
    pub inline_start: T,
}

impl<T> LogicalEdges<T> {
    /// Start and end edge along the axis a property measures.
    pub fn along(&self, property: Property) -> (&T, &T) {
        match property {
            Property::Width => (&self.inline_start, &self.inline_end),
            Property::Height => (&self.block_start, &self.block_end),
        }
    }
}

/// Computed style of an element, as the host reports it.
///
/// Every length is a pixel-suffixed string (`"16px"`); the resolver parses them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedStyle {
    pub font_size: String,
    pub padding: LogicalEdges<String>,
    pub border_width: LogicalEdges<String>,
    pub offset_width: String,
    pub offset_height: String,
}

impl ComputedStyle {
    /// Offset (outer) extent along the axis a property measures.
    pub fn offset(&self, property: Property) -> &str {
        match property {
            Property::Width => &self.offset_width,
            Property::Height => &self.offset_height,
        }
    }
}
