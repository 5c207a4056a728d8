//! Engine configuration.

/// What the percent unit subtracts from the parent's offset extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PercentBasis {
    /// Offset extent minus padding and border on both edges of the axis.
    #[default]
    PaddingAndBorder,
    /// Offset extent minus padding only; borders count toward the basis.
    PaddingOnly,
}

/// Engine-wide settings, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CqConfig {
    pub percent_basis: PercentBasis,
}

impl CqConfig {
    pub fn with_percent_basis(mut self, basis: PercentBasis) -> Self {
        self.percent_basis = basis;
        self
    }
}
