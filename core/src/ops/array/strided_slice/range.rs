use super::StridedSlice;
use super::mask::AxisFlags;
use crate::errors::SliceError;

/// Resolved range of one sliced axis.
///
/// `begin` and `end` lie in `0..=extent`, except for `begin` being `-1`
/// after a descending slice running past the first element got flipped.
/// `stride` is positive whenever `end > begin` on a kept axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dim {
    pub begin: i64,
    pub end: i64,
    pub stride: i64,
    pub shrink: bool,
}

impl Dim {
    /// Number of elements visited on this axis.
    ///
    /// Shrunk axes and degenerate ranges (`begin == end`) keep one element.
    pub fn output_len(&self) -> usize {
        if self.shrink || self.end <= self.begin {
            1
        } else {
            debug_assert!(self.stride > 0);
            ((self.end - self.begin - 1) / self.stride + 1) as usize
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Bound {
    /// Begin: must point to an actual element.
    Inclusive,
    /// End: may point one past the last element.
    Exclusive,
}

/// Clamp a raw index to what `extent` allows, then resolve negative indices
/// from the end. Maximum first: on an empty axis `min > max`.
fn limit(value: i64, extent: i64, bound: Bound) -> i64 {
    let (min, max) = match bound {
        Bound::Inclusive => (-extent, extent - 1),
        Bound::Exclusive => (-extent - 1, extent),
    };
    let value = value.min(max).max(min);
    if value < 0 { value + extent } else { value }
}

impl StridedSlice {
    /// Resolve the raw `begin`, `end` and `stride` of one axis.
    ///
    /// Begin and end masks always select `0..extent`, whatever the stride
    /// sign. So a full reversal (`x[::-1]`, both masks and a negative stride)
    /// is rejected with `SliceError::StrideDirection`. Reversals must spell
    /// out their bounds, as in `begin = -1, end = -extent - 1`.
    pub fn prepare_one_dim(
        &self,
        axis: usize,
        flags: &AxisFlags,
        extent: usize,
        begin: i64,
        end: i64,
        stride: i64,
    ) -> Result<Dim, SliceError> {
        if stride == 0 {
            return Err(SliceError::ZeroStride { axis });
        }
        let extent = extent as i64;
        let mut begin = if flags.begin { 0 } else { limit(begin, extent, Bound::Inclusive) };
        let mut end = if flags.end { extent } else { limit(end, extent, Bound::Exclusive) };
        let mut stride = if flags.shrink { 1 } else { stride };

        if end < begin {
            if stride < 0 {
                std::mem::swap(&mut begin, &mut end);
                stride = stride.saturating_neg();
            } else if self.strict && !flags.shrink {
                return Err(SliceError::ReversedRange { axis, begin, end, stride });
            } else {
                if !flags.shrink {
                    warn!(
                        "StridedSlice axis {axis}: end {end} before begin {begin} with stride {stride}, keeping one element"
                    );
                }
                // swap then collapse begin onto end: both land on the former begin
                end = begin;
            }
        }

        if !flags.shrink && end > begin && stride < 0 {
            return Err(SliceError::StrideDirection { axis, begin, end, stride });
        }

        let dim = Dim { begin, end, stride, shrink: flags.shrink };
        trace!("StridedSlice axis {axis} (extent {extent}): {dim:?}");
        Ok(dim)
    }
}
