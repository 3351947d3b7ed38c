use crate::internal::*;
use itertools::Itertools;

mod mask;
mod range;

pub use mask::{AxisFlags, SliceMasks};
pub use range::Dim;

/// Highest input rank the op accepts.
pub const MAX_RANK: usize = 4;

const PARAMS: [&str; 3] = ["begin", "end", "strides"];

pub fn build(config: &InferenceConfig, attrs: &NodeAttrs) -> ShapeResult<Box<dyn ShapeOp>> {
    let masks = SliceMasks {
        begin: attrs.get_attr_opt_int("begin_mask")?.unwrap_or(0),
        end: attrs.get_attr_opt_int("end_mask")?.unwrap_or(0),
        shrink_axis: attrs.get_attr_opt_int("shrink_axis_mask")?.unwrap_or(0),
        ellipsis: attrs.get_attr_opt_int("ellipsis_mask")?.unwrap_or(0),
        new_axis: attrs.get_attr_opt_int("new_axis_mask")?.unwrap_or(0),
    };
    Ok(Box::new(StridedSlice::new(masks, config.strict_slices)))
}

/// Tensorflow-style strided slice, with begin, end and strides given as
/// inputs 1, 2 and 3.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, new)]
pub struct StridedSlice {
    pub masks: SliceMasks,
    /// Fail on reversed ranges with a non-negative stride.
    pub strict: bool,
}

impl StridedSlice {
    /// Output shape for an input of shape `input_shape`.
    ///
    /// Axes past the slice specification are kept as they are, shrunk axes
    /// are dropped.
    pub fn output_shape(
        &self,
        input_shape: &[usize],
        begin: &[i64],
        end: &[i64],
        strides: &[i64],
    ) -> Result<TVec<usize>, SliceError> {
        let rank = input_shape.len();
        if rank > MAX_RANK {
            return Err(SliceError::UnsupportedRank { rank });
        }
        let axes = begin.len();
        if end.len() != axes || strides.len() != axes {
            return Err(SliceError::malformed(format!(
                "begin, end and strides have {}, {} and {} values",
                axes,
                end.len(),
                strides.len()
            )));
        }
        if axes > rank {
            return Err(SliceError::malformed(format!(
                "{axes} sliced axes on an input of rank {rank}"
            )));
        }
        let flags = self.masks.decode(axes)?;
        let mut shape = tvec!();
        for (axis, flags) in flags.iter().enumerate() {
            let dim = self.prepare_one_dim(
                axis,
                flags,
                input_shape[axis],
                begin[axis],
                end[axis],
                strides[axis],
            )?;
            if !dim.shrink {
                shape.push(dim.output_len());
            }
        }
        shape.extend(input_shape[axes..].iter().copied());
        Ok(shape)
    }

    fn check_params(params: &[&TensorDesc], rank: usize) -> Result<usize, SliceError> {
        if !params.iter().map(|p| p.rank()).all_equal() {
            return Err(SliceError::malformed(format!(
                "begin, end and strides have ranks {}",
                params.iter().map(|p| p.rank()).join(", ")
            )));
        }
        for (name, param) in PARAMS.iter().zip(params) {
            if param.rank() != 1 {
                return Err(SliceError::malformed(format!("{name} must be rank 1, got {param}")));
            }
            if !param.datum_type.is_integer() {
                return Err(SliceError::malformed(format!("{name} must be integers, got {param}")));
            }
        }
        if !params.iter().map(|p| p.shape[0]).all_equal() {
            return Err(SliceError::malformed(format!(
                "begin, end and strides have lengths {}",
                params.iter().map(|p| p.shape[0]).join(", ")
            )));
        }
        let axes = params[0].shape[0];
        if axes > rank {
            return Err(SliceError::malformed(format!(
                "{axes} sliced axes on an input of rank {rank}"
            )));
        }
        Ok(axes)
    }

    fn param_values<'a>(name: &str, param: &'a TensorDesc) -> ShapeResult<Option<&'a [i64]>> {
        match &param.storage {
            Storage::Host(values) => {
                if values.len() != param.len() {
                    bail!(SliceError::malformed(format!(
                        "{name} has {} values for shape {param}",
                        values.len()
                    )));
                }
                Ok(Some(values))
            }
            Storage::Absent => Ok(None),
            Storage::Device(buffer) => bail!(
                "StridedSlice {} is still on device #{}, it must be materialized first",
                name,
                buffer.device_id
            ),
        }
    }
}

impl ShapeOp for StridedSlice {
    fn name(&self) -> Cow<'_, str> {
        "StridedSlice".into()
    }

    fn value_inputs(&self) -> TVec<usize> {
        tvec!(1, 2, 3)
    }

    fn infer(&self, inputs: &[&TensorDesc]) -> ShapeResult<Inference> {
        check_input_arity(inputs, 4)?;
        let input = inputs[0];
        let rank = input.rank();
        if rank == 0 {
            debug!("StridedSlice: input shape is not known yet");
            return Ok(Inference::Deferred);
        }
        if rank > MAX_RANK {
            bail!(SliceError::UnsupportedRank { rank });
        }
        let params = &inputs[1..];
        let axes = Self::check_params(params, rank)?;

        let mut values: TVec<&[i64]> = tvec!();
        for (name, param) in PARAMS.iter().zip(params) {
            let Some(v) = Self::param_values(name, param)? else {
                debug!("StridedSlice: {name} value is not known yet");
                return Ok(Inference::Deferred);
            };
            values.push(v);
        }

        let shape = self.output_shape(&input.shape, values[0], values[1], values[2])?;
        debug_assert_eq!(shape.len(), rank - self.masks.shrunk_count(axes));
        Ok(Inference::Resolved(tvec!(TensorDesc {
            datum_type: input.datum_type,
            shape,
            format: input.format,
            storage: Storage::Absent,
        })))
    }
}
