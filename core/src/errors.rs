//! Typed failures of shape inference.
//!
//! They travel inside `ShapeError` (an `anyhow::Error`) and can be recovered
//! with `downcast_ref::<SliceError>()`, context layers included.
use std::fmt;

/// Strided slice masks that can be rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MaskKind {
    Ellipsis,
    NewAxis,
}

impl fmt::Display for MaskKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            MaskKind::Ellipsis => "ellipsis",
            MaskKind::NewAxis => "new_axis",
        };
        f.write_str(s)
    }
}

/// Fatal errors: shape inference can not produce a shape for the node, and
/// the graph compilation must stop.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SliceError {
    #[error("unsupported input rank {rank}, expected 1 to 4")]
    UnsupportedRank { rank: usize },

    #[error("{mask} mask {value:#b} is not supported (first bit set on axis {axis})")]
    UnsupportedMask { mask: MaskKind, value: i64, axis: usize },

    #[error("malformed slice specification: {reason}")]
    MalformedSliceSpec { reason: String },

    #[error("zero stride on axis {axis}")]
    ZeroStride { axis: usize },

    #[error("reversed range on axis {axis}: end {end} is before begin {begin} with stride {stride}")]
    ReversedRange { axis: usize, begin: i64, end: i64, stride: i64 },

    /// Negative stride on an ascending range, including a full reversal
    /// written with begin and end masks.
    #[error("negative stride {stride} on axis {axis} walks away from {begin}..{end}")]
    StrideDirection { axis: usize, begin: i64, end: i64, stride: i64 },
}

impl SliceError {
    pub fn malformed(reason: impl Into<String>) -> SliceError {
        SliceError::MalformedSliceSpec { reason: reason.into() }
    }

    /// Axis the error is about, if any.
    pub fn axis(&self) -> Option<usize> {
        match self {
            SliceError::UnsupportedMask { axis, .. }
            | SliceError::ZeroStride { axis }
            | SliceError::ReversedRange { axis, .. }
            | SliceError::StrideDirection { axis, .. } => Some(*axis),
            _ => None,
        }
    }
}
