use crate::registry::ShapeRegistry;

pub mod strided_slice;

pub use strided_slice::StridedSlice;

pub fn register_all_ops(reg: &mut ShapeRegistry) {
    reg.insert("StridedSlice", strided_slice::build);
}
