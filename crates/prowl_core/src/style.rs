//! Stroke and fill style enums

/// Geometry joining two consecutive stroke segments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineJoin {
    /// Sharp corner, falls back to bevel past the miter limit
    #[default]
    Miter,
    /// Arc swept around the outer corner
    Round,
    /// Single triangle across the outer corner
    Bevel,
}

/// Geometry terminating a free end of an open stroke
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    /// Flat cap at the endpoint
    #[default]
    Butt,
    /// Half-circle past the endpoint
    Round,
    /// Rectangle extending half the width past the endpoint
    Square,
    /// Two-segment point past the endpoint
    Bevel,
}

/// Rule deciding which regions of a self-intersecting or multi-contour path
/// count as inside
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
}
