#[macro_use]
mod macros;

/// A Smallvec instantiation with 4 embeddable values.
///
/// Used for tensor dimensions and per-axis data: the inputs shape inference
/// deals with are at most rank 4, so they never spill to the heap.
pub type TVec<T> = smallvec::SmallVec<[T; 4]>;

pub type ShapeError = anyhow::Error;
pub type ShapeResult<T> = anyhow::Result<T>;

pub mod prelude {
    pub use crate::datum::DatumType;
    pub use crate::format::DataFormat;
    pub use crate::tensor::{DeviceBuffer, HostOnly, Materialize, Storage, TensorDesc};
    pub use crate::tvec;
    pub use crate::{ShapeError, ShapeResult, TVec};
}

pub mod internal {
    pub use crate::prelude::*;
    pub use anyhow::{Context as ShapeErrorContext, bail, ensure, format_err};
    pub use smallvec as shapeinf_smallvec;
    pub use std::borrow::Cow;
}

pub use anyhow;

mod datum;
mod format;
mod tensor;
