//! # Shape inference for strided slices
//!
//! Before any data moves, a graph compiler needs the output shape of every
//! operator to plan buffers. This crate computes it for `StridedSlice`
//! nodes: per-axis begin/end/stride with begin, end and shrink masks, on
//! inputs of rank 1 to 4.
//!
//! ```
//! use shapeinf_core::prelude::*;
//!
//! let registry = ShapeRegistry::with_all_ops(InferenceConfig::default());
//! let node = Node::new("slice".into(), "StridedSlice".into(), NodeAttrs::default());
//! let input = TensorDesc::dt_shape(DatumType::F32, &[10, 3]);
//! let begin = TensorDesc::ints(&[2]);
//! let end = TensorDesc::ints(&[8]);
//! let strides = TensorDesc::ints(&[2]);
//! let inferred = registry
//!     .infer_node(&node, &[&input, &begin, &end, &strides], &HostOnly)
//!     .unwrap();
//! let outputs = inferred.resolved().unwrap();
//! assert_eq!(&*outputs[0].shape, &[3, 3]);
//! ```

#[macro_use]
extern crate derive_new;
#[macro_use]
extern crate log;

pub extern crate shapeinf_data;

pub mod config;
pub mod errors;
pub mod ops;
pub mod registry;

pub mod prelude {
    pub use crate::config::InferenceConfig;
    pub use crate::errors::{MaskKind, SliceError};
    pub use crate::ops::{Inference, ShapeOp};
    pub use crate::registry::{AttrValue, Node, NodeAttrs, ShapeRegistry};
    pub use shapeinf_data::prelude::*;
}

pub mod internal {
    pub use crate::ops::check_input_arity;
    pub use crate::prelude::*;
    pub use crate::registry::ShapeOpBuilder;
    pub use shapeinf_data::internal::*;
}

#[cfg(test)]
#[allow(dead_code)]
fn setup_test_logger() {
    let _ = env_logger::Builder::from_env("SHAPEINF_LOG").try_init();
}
