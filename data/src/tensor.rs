//! Tensor descriptors, as seen by shape inference.
use crate::datum::DatumType;
use crate::format::DataFormat;
use crate::{ShapeResult, TVec};
use anyhow::{bail, ensure};
use itertools::Itertools;
use std::borrow::Cow;
use std::fmt;

/// Handle to a buffer living in some compute device memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceBuffer {
    pub device_id: usize,
    pub handle: usize,
}

/// Where (and if) the values of a tensor can be found.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Only the type and shape are known.
    #[default]
    Absent,
    /// Values are readable from the host, widened to i64.
    Host(Vec<i64>),
    /// Values live on a device and must be materialized before being read.
    Device(DeviceBuffer),
}

/// Transfers integer tensor values from device memory to the host.
pub trait Materialize: Send + Sync {
    /// Copy the values of `tensor`, stored in `buffer`, to a freshly owned host buffer.
    ///
    /// Implementations must be idempotent.
    fn materialize(&self, tensor: &TensorDesc, buffer: &DeviceBuffer) -> ShapeResult<Vec<i64>>;
}

/// Adapter for engines without devices: any device tensor is an error.
#[derive(Copy, Clone, Debug, Default)]
pub struct HostOnly;

impl Materialize for HostOnly {
    fn materialize(&self, tensor: &TensorDesc, buffer: &DeviceBuffer) -> ShapeResult<Vec<i64>> {
        bail!("No device adapter available to read {} from device #{}", tensor, buffer.device_id)
    }
}

/// Type, shape, layout and (optionally) values of a tensor.
///
/// A rank 0 descriptor stands for a tensor whose shape is not known yet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TensorDesc {
    pub datum_type: DatumType,
    pub shape: TVec<usize>,
    pub format: DataFormat,
    pub storage: Storage,
}

impl TensorDesc {
    pub fn dt_shape(datum_type: DatumType, shape: &[usize]) -> TensorDesc {
        TensorDesc {
            datum_type,
            shape: shape.into(),
            format: DataFormat::default(),
            storage: Storage::Absent,
        }
    }

    pub fn unresolved(datum_type: DatumType) -> TensorDesc {
        TensorDesc::dt_shape(datum_type, &[])
    }

    /// Rank 1 i32 tensor with host values.
    pub fn ints(values: &[i64]) -> TensorDesc {
        TensorDesc {
            datum_type: DatumType::I32,
            shape: tvec!(values.len()),
            format: DataFormat::default(),
            storage: Storage::Host(values.to_vec()),
        }
    }

    pub fn on_device(datum_type: DatumType, shape: &[usize], buffer: DeviceBuffer) -> TensorDesc {
        TensorDesc { storage: Storage::Device(buffer), ..TensorDesc::dt_shape(datum_type, shape) }
    }

    pub fn with_format(self, format: DataFormat) -> TensorDesc {
        TensorDesc { format, ..self }
    }

    pub fn with_datum_type(self, datum_type: DatumType) -> TensorDesc {
        TensorDesc { datum_type, ..self }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn host_ints(&self) -> Option<&[i64]> {
        match &self.storage {
            Storage::Host(values) => Some(values),
            _ => None,
        }
    }

    /// Integer values of the tensor, transferred from the device if needed.
    ///
    /// Host values are borrowed. Device values go through a single
    /// `materialize` call, and the result is owned by the caller. The
    /// registry transfers whole descriptors with `to_host` instead; this is
    /// for callers that only need the values.
    pub fn read_host_ints<'a>(&'a self, adapter: &dyn Materialize) -> ShapeResult<Cow<'a, [i64]>> {
        match &self.storage {
            Storage::Host(values) => Ok(Cow::Borrowed(values)),
            Storage::Device(buffer) => Ok(Cow::Owned(self.materialize_with(adapter, buffer)?)),
            Storage::Absent => bail!("{} carries no value", self),
        }
    }

    /// Same as `read_host_ints`, but for the whole descriptor. Tensors
    /// without values go through untouched.
    pub fn to_host<'a>(&'a self, adapter: &dyn Materialize) -> ShapeResult<Cow<'a, TensorDesc>> {
        match &self.storage {
            Storage::Device(buffer) => {
                let values = self.materialize_with(adapter, buffer)?;
                Ok(Cow::Owned(TensorDesc { storage: Storage::Host(values), ..self.clone() }))
            }
            _ => Ok(Cow::Borrowed(self)),
        }
    }

    fn materialize_with(
        &self,
        adapter: &dyn Materialize,
        buffer: &DeviceBuffer,
    ) -> ShapeResult<Vec<i64>> {
        ensure!(self.datum_type.is_integer(), "Can not read {} as integers", self);
        let values = adapter.materialize(self, buffer)?;
        ensure!(
            values.len() == self.len(),
            "Device #{} returned {} values for {}",
            buffer.device_id,
            values.len(),
            self
        );
        Ok(values)
    }
}

impl fmt::Display for TensorDesc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.rank() > 0 {
            write!(f, "{},", self.shape.iter().join(","))?;
        }
        write!(f, "{}", self.datum_type)?;
        if self.format != DataFormat::default() {
            write!(f, " ({})", self.format)?;
        }
        if let Storage::Host(values) = &self.storage {
            write!(f, " {:?}", values)?;
        }
        Ok(())
    }
}
