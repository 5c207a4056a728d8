//! Size Resolver - breakpoint value + unit → pixel threshold.
//!
//! Resolution is split in two:
//!
//! 1. [`gather_context`] reads just the measurements a unit needs from the host
//! 2. [`resolve_threshold`] is a pure function over those measurements
//!
//! Computed lengths arrive as strings with a two-character unit suffix
//! (`"16px"`). The suffix is stripped and the rest parsed as `f64`; no rounding
//! happens anywhere.

use crate::config::PercentBasis;
use crate::error::{CqError, Result};
use crate::host::StyleQuery;
use crate::types::{Breakpoint, ComputedStyle, Property, Unit};

/// Measurements a single threshold depends on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasurementContext {
    pub root_font_size: Option<f64>,
    pub parent_font_size: Option<f64>,
    pub parent_content_extent: Option<f64>,
}

/// Parse a computed length such as `"12.5px"`.
pub fn parse_px(value: &str) -> Result<f64> {
    let value = value.trim();
    let number = value
        .len()
        .checked_sub(2)
        .and_then(|end| value.get(..end))
        .ok_or_else(|| CqError::MalformedLength(value.to_string()))?;

    number
        .trim()
        .parse::<f64>()
        .map_err(|_| CqError::MalformedLength(value.to_string()))
}

/// Offset extent minus the box edges along `property`'s axis.
///
/// `outer` overrides the style's offset extent when a fresher border-box size
/// is at hand (the ancestor's own resize entry).
pub fn content_box_extent(
    style: &ComputedStyle,
    property: Property,
    outer: Option<f64>,
    basis: PercentBasis,
) -> Result<f64> {
    let outer = match outer {
        Some(outer) => outer,
        None => parse_px(style.offset(property))?,
    };

    let (pad_start, pad_end) = style.padding.along(property);
    let mut extent = outer - parse_px(pad_start)? - parse_px(pad_end)?;

    if basis == PercentBasis::PaddingAndBorder {
        let (border_start, border_end) = style.border_width.along(property);
        extent -= parse_px(border_start)? + parse_px(border_end)?;
    }

    Ok(extent)
}

/// Pixel threshold for `breakpoint` given its measurements.
pub fn resolve_threshold(breakpoint: &Breakpoint, ctx: &MeasurementContext) -> Result<f64> {
    let value = breakpoint.value;
    match breakpoint.unit {
        Unit::Pixels => Ok(value),
        Unit::RootFontRelative => ctx
            .root_font_size
            .map(|font| value * font)
            .ok_or(CqError::MissingParent),
        Unit::ParentFontRelative => ctx
            .parent_font_size
            .or(ctx.root_font_size)
            .map(|font| value * font)
            .ok_or(CqError::MissingParent),
        Unit::ParentPercent => ctx
            .parent_content_extent
            .map(|extent| value / 100.0 * extent)
            .ok_or(CqError::MissingParent),
    }
}

/// Read from the host only what `breakpoint.unit` needs.
///
/// `parent` is the element the unit is relative to (the element's parent, or
/// the tracked ancestor during fan-out). `parent_outer` is that parent's fresh
/// border-box extent along the breakpoint's axis, when known.
pub fn gather_context<E: Copy>(
    host: &impl StyleQuery<E>,
    breakpoint: &Breakpoint,
    parent: Option<E>,
    parent_outer: Option<f64>,
    basis: PercentBasis,
) -> Result<MeasurementContext> {
    let mut ctx = MeasurementContext::default();

    match breakpoint.unit {
        Unit::Pixels => {}
        Unit::RootFontRelative => {
            ctx.root_font_size = Some(root_font_size(host)?);
        }
        Unit::ParentFontRelative => match parent {
            Some(parent) => {
                ctx.parent_font_size = Some(parse_px(&host.computed_style(parent)?.font_size)?);
            }
            None => {
                ctx.root_font_size = Some(root_font_size(host)?);
            }
        },
        Unit::ParentPercent => {
            let parent = parent.ok_or(CqError::MissingParent)?;
            let style = host.computed_style(parent)?;
            ctx.parent_content_extent = Some(content_box_extent(
                &style,
                breakpoint.property,
                parent_outer,
                basis,
            )?);
        }
    }

    Ok(ctx)
}

fn root_font_size<E>(host: &impl StyleQuery<E>) -> Result<f64> {
    parse_px(&host.computed_style(host.root())?.font_size)
}
