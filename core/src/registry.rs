//! Mapping from operator kinds to their shape inference.
//!
//! The graph compiler owns a `ShapeRegistry`, fills it at startup and asks it
//! to infer the outputs of each node.
use std::collections::HashMap;
use std::fmt;

use crate::internal::*;

/// Value of a node attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttrValue {
    Int(i64),
    String(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Decoded attributes of a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeAttrs(HashMap<String, AttrValue>);

impl NodeAttrs {
    pub fn with_int(mut self, name: &str, value: i64) -> NodeAttrs {
        self.0.insert(name.to_string(), AttrValue::Int(value));
        self
    }

    pub fn with_string(mut self, name: &str, value: impl Into<String>) -> NodeAttrs {
        self.0.insert(name.to_string(), AttrValue::String(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn get_attr_opt_int(&self, name: &str) -> ShapeResult<Option<i64>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(AttrValue::Int(i)) => Ok(Some(*i)),
            Some(other) => bail!("Expected attribute {} to be an integer, got {}", name, other),
        }
    }

    pub fn get_attr_int(&self, name: &str) -> ShapeResult<i64> {
        self.get_attr_opt_int(name)?.with_context(|| format!("Missing attribute {name}"))
    }
}

/// A node as the graph compiler hands it to shape inference.
#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct Node {
    pub name: String,
    pub op_type: String,
    pub attrs: NodeAttrs,
}

pub type ShapeOpBuilder = fn(&InferenceConfig, &NodeAttrs) -> ShapeResult<Box<dyn ShapeOp>>;

#[derive(Clone, Default)]
pub struct ShapeRegistry {
    pub config: InferenceConfig,
    builders: HashMap<String, ShapeOpBuilder>,
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut ops: Vec<&String> = self.builders.keys().collect();
        ops.sort();
        f.debug_struct("ShapeRegistry").field("config", &self.config).field("ops", &ops).finish()
    }
}

impl ShapeRegistry {
    pub fn new(config: InferenceConfig) -> ShapeRegistry {
        ShapeRegistry { config, builders: HashMap::new() }
    }

    /// A registry knowing every op of this crate.
    pub fn with_all_ops(config: InferenceConfig) -> ShapeRegistry {
        let mut reg = ShapeRegistry::new(config);
        crate::ops::register_all_ops(&mut reg);
        reg
    }

    pub fn insert(&mut self, op_type: &str, builder: ShapeOpBuilder) {
        self.builders.insert(op_type.to_string(), builder);
    }

    pub fn contains(&self, op_type: &str) -> bool {
        self.builders.contains_key(op_type)
    }

    pub fn build(&self, node: &Node) -> ShapeResult<Box<dyn ShapeOp>> {
        let builder = self.builders.get(&node.op_type).with_context(|| {
            format!("No shape inference for {} (node {:?})", node.op_type, node.name)
        })?;
        builder(&self.config, &node.attrs)
            .with_context(|| format!("While building node {:?} ({})", node.name, node.op_type))
    }

    /// Infer the outputs of `node`.
    ///
    /// Inputs the op declares in `value_inputs` are brought to the host
    /// first, through `adapter` when they live on a device. Transferred
    /// values only live for the duration of the call.
    pub fn infer_node(
        &self,
        node: &Node,
        inputs: &[&TensorDesc],
        adapter: &dyn Materialize,
    ) -> ShapeResult<Inference> {
        let op = self.build(node)?;
        let value_inputs = op.value_inputs();
        let hosted = inputs
            .iter()
            .enumerate()
            .map(|(ix, input)| {
                if value_inputs.contains(&ix) {
                    if matches!(input.storage, Storage::Device(_)) {
                        debug!("{}: materializing input #{} ({})", node.name, ix, input);
                    }
                    input.to_host(adapter)
                } else {
                    Ok(Cow::Borrowed(*input))
                }
            })
            .collect::<ShapeResult<TVec<Cow<TensorDesc>>>>()
            .with_context(|| format!("Materializing inputs of node {:?}", node.name))?;
        let hosted: TVec<&TensorDesc> = hosted.iter().map(|t| &**t).collect();
        let inferred = op
            .infer(&hosted)
            .with_context(|| format!("Inferring shape of node {:?} ({})", node.name, op.name()))?;
        if inferred.is_deferred() {
            debug!("{}: shape inference deferred", node.name);
        }
        Ok(inferred)
    }
}
