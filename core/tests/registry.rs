use std::sync::Mutex;

use shapeinf_core::prelude::*;

/// Fake device memory: buffers are indexed by handle, transfers are recorded.
#[derive(Default)]
struct FakeDevice {
    buffers: Vec<Vec<i64>>,
    transfers: Mutex<Vec<usize>>,
}

impl FakeDevice {
    fn upload(&mut self, values: &[i64]) -> TensorDesc {
        self.buffers.push(values.to_vec());
        let buffer = DeviceBuffer { device_id: 1, handle: self.buffers.len() - 1 };
        TensorDesc::on_device(DatumType::I32, &[values.len()], buffer)
    }

    fn transfers(&self) -> Vec<usize> {
        self.transfers.lock().unwrap().clone()
    }
}

impl Materialize for FakeDevice {
    fn materialize(&self, _tensor: &TensorDesc, buffer: &DeviceBuffer) -> ShapeResult<Vec<i64>> {
        self.transfers.lock().unwrap().push(buffer.handle);
        Ok(self.buffers[buffer.handle].clone())
    }
}

fn registry() -> ShapeRegistry {
    ShapeRegistry::with_all_ops(InferenceConfig::default())
}

fn slice_node(attrs: NodeAttrs) -> Node {
    Node::new("slice".into(), "StridedSlice".into(), attrs)
}

fn infer(
    reg: &ShapeRegistry,
    attrs: NodeAttrs,
    input: &[usize],
    begin: &[i64],
    end: &[i64],
    strides: &[i64],
) -> ShapeResult<Inference> {
    let input = TensorDesc::dt_shape(DatumType::F32, input);
    let (begin, end, strides) =
        (TensorDesc::ints(begin), TensorDesc::ints(end), TensorDesc::ints(strides));
    reg.infer_node(&slice_node(attrs), &[&input, &begin, &end, &strides], &HostOnly)
}

fn output_shape(inferred: Inference) -> Vec<usize> {
    inferred.resolved().unwrap()[0].shape.to_vec()
}

#[test]
fn scenario_a_step_of_two() {
    let inferred = infer(&registry(), NodeAttrs::default(), &[10], &[2], &[8], &[2]).unwrap();
    assert_eq!(output_shape(inferred), vec![3]);
}

#[test]
fn scenario_b_negative_indices() {
    let inferred = infer(&registry(), NodeAttrs::default(), &[10], &[-3], &[-1], &[1]).unwrap();
    assert_eq!(output_shape(inferred), vec![2]);
}

#[test]
fn scenario_c_shrink() {
    let attrs = NodeAttrs::default().with_int("shrink_axis_mask", 1);
    let inferred = infer(&registry(), attrs, &[4, 5], &[0], &[0], &[1]).unwrap();
    assert_eq!(output_shape(inferred), vec![5]);
}

#[test]
fn scenario_d_descending() {
    let inferred = infer(&registry(), NodeAttrs::default(), &[6], &[5], &[1], &[-1]).unwrap();
    assert_eq!(output_shape(inferred), vec![4]);
}

#[test]
fn scenario_e_rank_five() {
    let err = infer(&registry(), NodeAttrs::default(), &[1, 1, 1, 1, 1], &[0], &[1], &[1])
        .unwrap_err();
    assert_eq!(err.downcast_ref::<SliceError>(), Some(&SliceError::UnsupportedRank { rank: 5 }));
}

#[test]
fn scenario_f_ellipsis() {
    let attrs = NodeAttrs::default().with_int("ellipsis_mask", 1);
    let err = infer(&registry(), attrs, &[4], &[0], &[1], &[1]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SliceError>(),
        Some(SliceError::UnsupportedMask { mask: MaskKind::Ellipsis, axis: 0, .. })
    ));
}

#[test]
fn new_axis_is_unsupported() {
    let attrs = NodeAttrs::default().with_int("new_axis_mask", 2);
    let err = infer(&registry(), attrs, &[4, 4], &[0, 0], &[1, 1], &[1, 1]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SliceError>(),
        Some(SliceError::UnsupportedMask { mask: MaskKind::NewAxis, axis: 1, .. })
    ));
}

#[test]
fn errors_name_the_node() {
    let err = infer(&registry(), NodeAttrs::default(), &[4], &[0], &[4], &[0]).unwrap_err();
    assert!(format!("{err:?}").contains("\"slice\""));
    assert_eq!(err.downcast_ref::<SliceError>(), Some(&SliceError::ZeroStride { axis: 0 }));
    assert_eq!(err.downcast_ref::<SliceError>().and_then(|e| e.axis()), Some(0));
}

#[test]
fn unresolved_input_defers() {
    let input = TensorDesc::unresolved(DatumType::F32);
    let (begin, end, strides) =
        (TensorDesc::ints(&[0]), TensorDesc::ints(&[1]), TensorDesc::ints(&[1]));
    let inferred = registry()
        .infer_node(&slice_node(NodeAttrs::default()), &[&input, &begin, &end, &strides], &HostOnly)
        .unwrap();
    assert!(inferred.is_deferred());
}

#[test]
fn device_params_are_materialized_once_each() {
    let mut device = FakeDevice::default();
    let begin = device.upload(&[1, 0]);
    let end = device.upload(&[3, 4]);
    let strides = device.upload(&[1, 2]);
    let input = TensorDesc::dt_shape(DatumType::F32, &[4, 4, 2]);
    let inferred = registry()
        .infer_node(&slice_node(NodeAttrs::default()), &[&input, &begin, &end, &strides], &device)
        .unwrap();
    assert_eq!(output_shape(inferred), vec![2, 2, 2]);
    assert_eq!(device.transfers(), vec![0, 1, 2]);
}

#[test]
fn host_params_are_not_transferred() {
    let mut device = FakeDevice::default();
    let begin = TensorDesc::ints(&[0]);
    let end = device.upload(&[2]);
    let strides = TensorDesc::ints(&[1]);
    let input = TensorDesc::dt_shape(DatumType::F32, &[4]);
    registry()
        .infer_node(&slice_node(NodeAttrs::default()), &[&input, &begin, &end, &strides], &device)
        .unwrap();
    assert_eq!(device.transfers(), vec![0]);
}

#[test]
fn data_input_is_never_transferred() {
    let mut device = FakeDevice::default();
    let buffer = DeviceBuffer { device_id: 1, handle: 99 };
    let input = TensorDesc::on_device(DatumType::I32, &[6], buffer);
    let (begin, end, strides) = (device.upload(&[0]), device.upload(&[6]), device.upload(&[3]));
    let inferred = registry()
        .infer_node(&slice_node(NodeAttrs::default()), &[&input, &begin, &end, &strides], &device)
        .unwrap();
    assert_eq!(output_shape(inferred), vec![2]);
    assert!(!device.transfers().contains(&99));
}

#[test]
fn device_params_without_adapter() {
    let mut device = FakeDevice::default();
    let end = device.upload(&[2]);
    let (input, begin, strides) = (
        TensorDesc::dt_shape(DatumType::F32, &[4]),
        TensorDesc::ints(&[0]),
        TensorDesc::ints(&[1]),
    );
    let err = registry()
        .infer_node(&slice_node(NodeAttrs::default()), &[&input, &begin, &end, &strides], &HostOnly)
        .unwrap_err();
    assert!(err.downcast_ref::<SliceError>().is_none());
}

#[test]
fn strict_config_rejects_reversed_ranges() {
    let lenient = infer(&registry(), NodeAttrs::default(), &[6], &[5], &[1], &[1]).unwrap();
    assert_eq!(output_shape(lenient), vec![1]);

    let strict = ShapeRegistry::with_all_ops(InferenceConfig::default().with_strict_slices(true));
    let err = infer(&strict, NodeAttrs::default(), &[6], &[5], &[1], &[1]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SliceError>(),
        Some(SliceError::ReversedRange { axis: 0, .. })
    ));
}

#[test]
fn format_tag_propagates() {
    let input = TensorDesc::dt_shape(DatumType::F32, &[1, 4, 6, 6]).with_format(DataFormat::NC4HW4);
    let (begin, end, strides) =
        (TensorDesc::ints(&[0, 0]), TensorDesc::ints(&[1, 4]), TensorDesc::ints(&[1, 2]));
    let outputs = registry()
        .infer_node(&slice_node(NodeAttrs::default()), &[&input, &begin, &end, &strides], &HostOnly)
        .unwrap()
        .resolved()
        .unwrap();
    assert_eq!(outputs[0].format, DataFormat::NC4HW4);
    assert_eq!(outputs[0].datum_type, DatumType::F32);
    assert_eq!(&*outputs[0].shape, &[1, 2, 6, 6]);
}

#[test]
fn independent_nodes_infer_concurrently() {
    let reg = registry();
    let cases: Vec<(Vec<usize>, i64, Vec<usize>)> = (1..=8)
        .map(|n| (vec![n * 2, 3], 2, vec![n, 3]))
        .collect();
    std::thread::scope(|s| {
        for (input, stride, expected) in &cases {
            let reg = &reg;
            s.spawn(move || {
                let n = input[0] as i64;
                let inferred =
                    infer(reg, NodeAttrs::default(), input, &[0], &[n], &[*stride]).unwrap();
                assert_eq!(&output_shape(inferred), expected);
            });
        }
    });
}
