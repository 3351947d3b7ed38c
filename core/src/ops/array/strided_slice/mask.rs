use crate::errors::{MaskKind, SliceError};
use shapeinf_data::internal::*;

/// Slicing mode of one axis, decoded from the masks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AxisFlags {
    /// Ignore the begin value, start from the first element.
    pub begin: bool,
    /// Ignore the end value, stop after the last element.
    pub end: bool,
    /// Take exactly one element and drop the axis.
    pub shrink: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SliceMasks {
    pub begin: i64,
    pub end: i64,
    pub shrink_axis: i64,
    pub ellipsis: i64,
    pub new_axis: i64,
}

impl SliceMasks {
    pub fn new(begin: i64, end: i64, shrink_axis: i64) -> SliceMasks {
        SliceMasks { begin, end, shrink_axis, ..SliceMasks::default() }
    }

    /// Flags for axes `0..axes`. Bits above `axes` are ignored.
    pub fn decode(&self, axes: usize) -> Result<TVec<AxisFlags>, SliceError> {
        let unsupported = [(MaskKind::Ellipsis, self.ellipsis), (MaskKind::NewAxis, self.new_axis)];
        for (mask, value) in unsupported {
            if value != 0 {
                return Err(SliceError::UnsupportedMask {
                    mask,
                    value,
                    axis: value.trailing_zeros() as usize,
                });
            }
        }
        Ok((0..axes)
            .map(|axis| AxisFlags {
                begin: bit(self.begin, axis),
                end: bit(self.end, axis),
                shrink: bit(self.shrink_axis, axis),
            })
            .collect())
    }

    pub fn shrunk_count(&self, axes: usize) -> usize {
        (0..axes).filter(|&axis| bit(self.shrink_axis, axis)).count()
    }
}

fn bit(mask: i64, axis: usize) -> bool {
    axis < 64 && (mask >> axis) & 1 == 1
}
