//! Per-extraction state
//!
//! The cursor, the position of the last consumed node and the collected
//! weights and biases live in one owned value per extraction call.

use ndarray::{Array1, Array2};

use crate::error::{ConvertError, ConvertResult};
use crate::graph::GraphContext;
use crate::proto::NodeProto;
use crate::tensor::{tensor_to_matrix, tensor_to_vector};

use super::layer::Network;
use super::op::{GemmParams, LayerOp};
use super::{ExtractOptions, TransBMode};

/// Builder threaded through one walk of the graph
#[derive(Debug)]
pub struct LayerAccumulator {
    cursor: String,
    last_consumed: Option<usize>,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
}

impl LayerAccumulator {
    /// Start a walk at `input`
    pub fn new(input: &str) -> Self {
        Self {
            cursor: input.to_string(),
            last_consumed: None,
            weights: Vec::new(),
            biases: Vec::new(),
        }
    }

    /// Current frontier tensor
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    /// Declaration index of the last consumed node
    pub fn last_consumed(&self) -> Option<usize> {
        self.last_consumed
    }

    /// Collected weight matrices so far
    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    /// Collected bias vectors so far
    pub fn bias_count(&self) -> usize {
        self.biases.len()
    }

    /// Consume the node at `idx` and advance the cursor to its output
    pub fn apply(
        &mut self,
        ctx: &GraphContext<'_>,
        idx: usize,
        node: &NodeProto,
        op: LayerOp,
        options: &ExtractOptions,
    ) -> ConvertResult<()> {
        match op {
            LayerOp::AffineMultiply { weight } => {
                let tensor = ctx.get_initializer(&weight).ok_or_else(|| {
                    ConvertError::MissingInitializer {
                        node: node.display_name().to_string(),
                        tensor: weight.clone(),
                    }
                })?;
                self.weights.push(tensor_to_matrix(tensor)?);
            }
            LayerOp::BiasAdd { bias } => match ctx.get_initializer(&bias) {
                Some(tensor) => self.biases.push(tensor_to_vector(tensor)?),
                None => tracing::warn!(
                    node = node.display_name(),
                    bias = %bias,
                    "Add operand has no initializer; no bias recorded"
                ),
            },
            LayerOp::FusedAffine(params) => {
                let (weight, bias) = self.fused_layer(ctx, node, &params, options)?;
                self.weights.push(weight);
                self.biases.push(bias);
            }
            LayerOp::Activation => {}
        }

        self.cursor = node.output[0].clone();
        self.last_consumed = Some(idx);

        tracing::debug!(
            node = node.display_name(),
            op = node.op_type.as_str(),
            cursor = %self.cursor,
            weights = self.weights.len(),
            biases = self.biases.len(),
            "consumed node"
        );

        Ok(())
    }

    fn fused_layer(
        &self,
        ctx: &GraphContext<'_>,
        node: &NodeProto,
        params: &GemmParams,
        options: &ExtractOptions,
    ) -> ConvertResult<(Array2<f64>, Array1<f64>)> {
        let stored = ctx.get_initializer(&params.weight).ok_or_else(|| {
            ConvertError::MissingInitializer {
                node: node.display_name().to_string(),
                tensor: params.weight.clone(),
            }
        })?;

        let mut weight = tensor_to_matrix(stored)?;
        if params.trans_a {
            weight = weight.reversed_axes();
        }
        if params.trans_b {
            match options.gemm_trans_b {
                TransBMode::Strict => weight = weight.reversed_axes(),
                TransBMode::Ignore => tracing::warn!(
                    node = node.display_name(),
                    "Gemm transB=1 left unapplied; use strict Gemm semantics to transpose"
                ),
            }
        }
        weight *= params.alpha;

        let stored_bias = if params.bias.is_empty() {
            None
        } else {
            ctx.get_initializer(&params.bias)
        };
        let mut bias = match stored_bias {
            Some(tensor) => tensor_to_vector(tensor)?,
            None => Array1::zeros(weight.nrows()),
        };
        bias *= params.beta;

        Ok((weight, bias))
    }

    /// Validate the walk and pair up the collected parameters
    pub fn finish(self, output: &str, force_transpose: bool) -> ConvertResult<Network> {
        let Self {
            cursor,
            mut weights,
            biases,
            ..
        } = self;

        if force_transpose {
            tracing::info!("taking transpose of {} weight matrices", weights.len());
            weights = weights.into_iter().map(|w| w.reversed_axes()).collect();
        }

        if cursor != output || weights.is_empty() || weights.len() != biases.len() {
            return Err(ConvertError::IncompleteChain {
                cursor,
                output: output.to_string(),
                weights: weights.len(),
                biases: biases.len(),
            });
        }

        Network::from_parts(weights, biases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::make_node;
    use crate::proto::GraphProto;
    use crate::tensor::{matrix_to_tensor_f32, vec_to_tensor_f32};

    #[test]
    fn test_activation_only_advances_cursor() {
        let graph = GraphProto {
            node: vec![make_node("Relu", &["X"], &["Y"], "relu")],
            ..Default::default()
        };
        let ctx = GraphContext::new(&graph);
        let node = &graph.node[0];

        let mut acc = LayerAccumulator::new("X");
        acc.apply(&ctx, 0, node, LayerOp::Activation, &ExtractOptions::default())
            .unwrap();

        assert_eq!(acc.cursor(), "Y");
        assert_eq!(acc.last_consumed(), Some(0));
        assert_eq!(acc.weight_count(), 0);
        assert_eq!(acc.bias_count(), 0);
    }

    #[test]
    fn test_missing_add_bias_is_not_fatal() {
        let graph = GraphProto {
            node: vec![make_node("Add", &["X", "B"], &["Y"], "add")],
            ..Default::default()
        };
        let ctx = GraphContext::new(&graph);
        let node = &graph.node[0];

        let mut acc = LayerAccumulator::new("X");
        let op = LayerOp::BiasAdd {
            bias: "B".to_string(),
        };
        acc.apply(&ctx, 0, node, op, &ExtractOptions::default())
            .unwrap();

        assert_eq!(acc.cursor(), "Y");
        assert_eq!(acc.bias_count(), 0);
    }

    #[test]
    fn test_finish_reports_counts() {
        let graph = GraphProto {
            node: vec![make_node("MatMul", &["X", "W"], &["Y"], "mm")],
            initializer: vec![matrix_to_tensor_f32(&[1.0, 2.0], 1, 2, "W")],
            ..Default::default()
        };
        let ctx = GraphContext::new(&graph);
        let node = &graph.node[0];

        let mut acc = LayerAccumulator::new("X");
        let op = LayerOp::AffineMultiply {
            weight: "W".to_string(),
        };
        acc.apply(&ctx, 0, node, op, &ExtractOptions::default())
            .unwrap();

        match acc.finish("Y", false) {
            Err(ConvertError::IncompleteChain {
                cursor,
                weights,
                biases,
                ..
            }) => {
                assert_eq!(cursor, "Y");
                assert_eq!(weights, 1);
                assert_eq!(biases, 0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_finish_force_transpose() {
        let graph = GraphProto {
            node: vec![
                make_node("MatMul", &["X", "W"], &["h"], "mm"),
                make_node("Add", &["h", "B"], &["Y"], "add"),
            ],
            // stored as (inputs, outputs) = (3, 2)
            initializer: vec![
                matrix_to_tensor_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2, "W"),
                vec_to_tensor_f32(&[0.5, -0.5], "B"),
            ],
            ..Default::default()
        };
        let ctx = GraphContext::new(&graph);
        let options = ExtractOptions::default();

        let mut acc = LayerAccumulator::new("X");
        for (idx, node) in graph.node.iter().enumerate() {
            let op = LayerOp::parse(node, acc.cursor()).unwrap();
            acc.apply(&ctx, idx, node, op, &options).unwrap();
        }

        let network = acc.finish("Y", true).unwrap();
        let layer = &network.layers()[0];
        assert_eq!(layer.weight.dim(), (2, 3));
        assert_eq!(layer.weight[[0, 1]], 3.0);
        assert_eq!(layer.weight[[1, 2]], 6.0);
    }
}
