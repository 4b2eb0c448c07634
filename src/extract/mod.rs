//! Feed-forward network extraction
//!
//! Walks an ONNX graph from an input tensor to an output tensor through
//! `MatMul`, `Add`, `Gemm` and `Relu` nodes and returns the affine layers in
//! chain order.
//!
//! # Example
//!
//! ```ignore
//! use onnx2nnet::extract::{extract_from_graph, ExtractOptions};
//!
//! let network = extract_from_graph(&graph, &ExtractOptions::default())?;
//! println!("{} layers, {} inputs", network.num_layers(), network.input_size());
//! ```
//!
//! # Walk
//!
//! Nodes are considered in declaration order in a single pass: the next node
//! is the first reader of the cursor tensor declared after the previously
//! consumed node. A chain whose nodes are declared out of execution order is
//! therefore not followed. Any tensor on the chain with more than one reader
//! is rejected, as is any operator other than the four above.

pub mod accumulator;
pub mod layer;
pub mod op;

pub use accumulator::LayerAccumulator;
pub use layer::{Layer, Network};
pub use op::{GemmParams, LayerOp};

use crate::error::{ConvertError, ConvertResult};
use crate::graph::GraphContext;
use crate::proto::{GraphProto, ModelProto};

/// How to treat `transB` on `Gemm` nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransBMode {
    /// Record the attribute but leave the weight as stored
    #[default]
    Ignore,
    /// Transpose the weight when `transB` is set
    Strict,
}

/// Extraction options
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Input tensor; inferred from the graph when `None`
    pub input_name: Option<String>,
    /// Output tensor; inferred from the graph when `None`
    pub output_name: Option<String>,
    /// Transpose every weight after extraction (legacy MatMul models)
    pub force_transpose: bool,
    /// `Gemm` `transB` handling
    pub gemm_trans_b: TransBMode,
}

/// Walk `ctx` from `input` to `output`
pub fn extract(
    ctx: &GraphContext<'_>,
    input: &str,
    output: &str,
    options: &ExtractOptions,
) -> ConvertResult<Network> {
    let mut acc = LayerAccumulator::new(input);

    while acc.cursor() != output {
        ctx.ensure_single_consumer(acc.cursor())?;

        let Some(idx) = ctx.next_consumer_after(acc.cursor(), acc.last_consumed()) else {
            break;
        };
        let node = ctx
            .node(idx)
            .ok_or_else(|| ConvertError::InvalidModel(format!("node index {} out of range", idx)))?;

        let op = LayerOp::parse(node, acc.cursor())?;
        acc.apply(ctx, idx, node, op, options)?;
    }

    let network = acc.finish(output, options.force_transpose)?;

    tracing::debug!(
        layers = network.num_layers(),
        sizes = ?network.layer_sizes(),
        "extracted network"
    );

    Ok(network)
}

/// Resolve endpoints from `options` and extract
pub fn extract_from_graph(graph: &GraphProto, options: &ExtractOptions) -> ConvertResult<Network> {
    let ctx = GraphContext::new(graph);
    let input = ctx.resolve_input(options.input_name.as_deref())?;
    let output = ctx.resolve_output(options.output_name.as_deref())?;

    tracing::info!(input = %input, output = %output, nodes = ctx.node_count(), "extracting");

    if !ctx.is_graph_input(&input) && ctx.get_producer(&input).is_none() {
        tracing::warn!(input = %input, "input tensor is neither a graph input nor a node output");
    }
    if ctx.get_producer(&output).is_none() && input != output {
        tracing::warn!(output = %output, "output tensor is not produced by any node");
    }

    let network = extract(&ctx, &input, &output, options)?;

    let declared = ctx
        .graph_input(&input)
        .and_then(|vi| vi.get_shape())
        .and_then(|dims| dims.last().copied());
    if let Some(width) = declared.filter(|&w| w > 0) {
        if width as usize != network.input_size() {
            tracing::warn!(
                declared = width,
                extracted = network.input_size(),
                "declared input width differs from the first layer"
            );
        }
    }

    Ok(network)
}

/// Extract from the graph of `model`
pub fn extract_from_model(model: &ModelProto, options: &ExtractOptions) -> ConvertResult<Network> {
    let graph = model
        .graph
        .as_ref()
        .ok_or_else(|| ConvertError::InvalidModel("Model does not contain a graph".into()))?;

    extract_from_graph(graph, options)
}
