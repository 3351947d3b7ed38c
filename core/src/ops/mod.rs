//! Ops
use std::fmt;

use downcast_rs::{Downcast, impl_downcast};

use crate::internal::*;

pub mod array;

pub fn check_input_arity(inputs: &[&TensorDesc], expected: usize) -> ShapeResult<()> {
    if inputs.len() != expected {
        bail!("Wrong input number. Rules expect {}, node has {}.", expected, inputs.len())
    } else {
        Ok(())
    }
}

/// Outcome of a shape inference call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inference {
    /// Output descriptors, one per operator output.
    Resolved(TVec<TensorDesc>),
    /// Some input is not known well enough yet. The caller should retry once
    /// upstream shapes are resolved.
    Deferred,
}

impl Inference {
    pub fn resolved(self) -> Option<TVec<TensorDesc>> {
        match self {
            Inference::Resolved(outputs) => Some(outputs),
            Inference::Deferred => None,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Inference::Deferred)
    }
}

/// Shape inference behaviour of an operator kind.
pub trait ShapeOp: fmt::Debug + Downcast + dyn_clone::DynClone + Send + Sync + 'static {
    fn name(&self) -> Cow<'_, str>;

    /// Input positions whose values, not only their shapes, must be readable
    /// from the host when `infer` is called.
    fn value_inputs(&self) -> TVec<usize> {
        tvec!()
    }

    /// Compute output descriptors from input descriptors.
    fn infer(&self, inputs: &[&TensorDesc]) -> ShapeResult<Inference>;
}

impl_downcast!(ShapeOp);
dyn_clone::clone_trait_object!(ShapeOp);

pub fn register_all_ops(reg: &mut crate::registry::ShapeRegistry) {
    array::register_all_ops(reg);
}
