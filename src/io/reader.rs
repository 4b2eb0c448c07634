//! ONNX model loading
//!
//! Models are decoded in full; initializer payloads are needed for the
//! weights anyway.

use std::path::Path;

use prost::Message;

use crate::error::{ConvertError, ConvertResult};
use crate::proto::{GraphProto, ModelProto};

/// Load an ONNX model from a file path
///
/// # Example
///
/// ```ignore
/// use onnx2nnet::io::load_model;
///
/// let model = load_model("acas_1_1.onnx")?;
/// println!("{} nodes", model.graph.map(|g| g.node.len()).unwrap_or(0));
/// ```
pub fn load_model<P: AsRef<Path>>(path: P) -> ConvertResult<ModelProto> {
    let path = path.as_ref();

    let bytes = std::fs::read(path).map_err(|e| {
        ConvertError::InvalidModel(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    load_model_from_bytes(&bytes)
}

/// Decode an ONNX model from bytes
pub fn load_model_from_bytes(bytes: &[u8]) -> ConvertResult<ModelProto> {
    Ok(ModelProto::decode(bytes)?)
}

/// Load a model file and keep only its graph
pub fn load_graph<P: AsRef<Path>>(path: P) -> ConvertResult<GraphProto> {
    load_model(path)?
        .graph
        .ok_or_else(|| ConvertError::InvalidModel("Model does not contain a graph".to_string()))
}

/// Summary of a loaded model, logged before conversion
#[derive(Debug, Clone, Default)]
pub struct ModelInfo {
    /// IR version
    pub ir_version: i64,
    /// Exporting tool
    pub producer_name: String,
    /// Default-domain opset, if imported
    pub opset_version: Option<i64>,
    /// Number of nodes
    pub node_count: usize,
    /// Number of initializers
    pub initializer_count: usize,
    /// Declared graph inputs
    pub inputs: Vec<String>,
    /// Declared graph outputs
    pub outputs: Vec<String>,
}

impl ModelInfo {
    /// Summarize `model`
    pub fn from_model(model: &ModelProto) -> Self {
        let mut info = Self {
            ir_version: model.ir_version,
            producer_name: model.producer_name.clone(),
            opset_version: model.get_opset_version(),
            ..Default::default()
        };

        if let Some(graph) = &model.graph {
            info.node_count = graph.node.len();
            info.initializer_count = graph.initializer.len();
            info.inputs = graph.input.iter().map(|v| v.name.clone()).collect();
            info.outputs = graph.output.iter().map(|v| v.name.clone()).collect();
        }

        info
    }
}
