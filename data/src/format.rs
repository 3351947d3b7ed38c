use std::fmt;

/// Physical layout tag of a tensor.
///
/// Shape-only operators never interpret it: they copy it from their input
/// to their output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataFormat {
    NCHW,
    NHWC,
    /// Channels packed by four, as produced by packing backends.
    NC4HW4,
}

impl Default for DataFormat {
    fn default() -> DataFormat {
        DataFormat::NCHW
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
