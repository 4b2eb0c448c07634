//! Supported operators on the extraction chain
//!
//! A matched node is turned into a [`LayerOp`] before anything is accumulated.
//! Arity is checked here, so an operator the NNet format cannot express is a
//! construction failure rather than a branch in the walk.

use crate::error::{ConvertError, ConvertResult};
use crate::proto::NodeProto;

/// `Gemm` attributes and operand names
#[derive(Debug, Clone, PartialEq)]
pub struct GemmParams {
    /// Weight initializer name (second input)
    pub weight: String,
    /// Bias initializer name (third input, may be empty)
    pub bias: String,
    /// Weight scale
    pub alpha: f64,
    /// Bias scale
    pub beta: f64,
    /// Transpose the stored weight
    pub trans_a: bool,
    /// Recorded; applied only in [`TransBMode::Strict`](super::TransBMode::Strict)
    pub trans_b: bool,
}

/// One node on the chain
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOp {
    /// `MatMul`: contributes a weight matrix
    AffineMultiply {
        /// Weight initializer name
        weight: String,
    },
    /// `Add`: contributes a bias vector
    BiasAdd {
        /// Bias initializer name
        bias: String,
    },
    /// `Gemm`: contributes a complete layer
    FusedAffine(GemmParams),
    /// `Relu`: implicit between layers, contributes nothing
    Activation,
}

impl LayerOp {
    /// Interpret `node`, reached through the tensor `cursor`
    pub fn parse(node: &NodeProto, cursor: &str) -> ConvertResult<Self> {
        let op = match node.op_type.as_str() {
            "MatMul" => {
                expect_arity(node, 2)?;
                LayerOp::AffineMultiply {
                    weight: other_operand(node, cursor).to_string(),
                }
            }
            "Add" => {
                expect_arity(node, 2)?;
                LayerOp::BiasAdd {
                    bias: other_operand(node, cursor).to_string(),
                }
            }
            "Gemm" => {
                expect_arity(node, 3)?;
                LayerOp::FusedAffine(GemmParams {
                    weight: node.input[1].clone(),
                    bias: node.input[2].clone(),
                    alpha: node.get_attribute_float("alpha", 1.0) as f64,
                    beta: node.get_attribute_float("beta", 1.0) as f64,
                    trans_a: node.get_attribute_int("transA", 0) != 0,
                    trans_b: node.get_attribute_int("transB", 0) != 0,
                })
            }
            "Relu" => LayerOp::Activation,
            other => {
                return Err(ConvertError::UnsupportedOperator {
                    node: node.display_name().to_string(),
                    op_type: other.to_string(),
                })
            }
        };

        if node.output.len() != 1 || node.output[0].is_empty() {
            return Err(malformed(
                node,
                format!("expected exactly one output, found {:?}", node.output),
            ));
        }

        Ok(op)
    }

    /// Operator kind as it appears in ONNX
    pub fn op_type(&self) -> &'static str {
        match self {
            LayerOp::AffineMultiply { .. } => "MatMul",
            LayerOp::BiasAdd { .. } => "Add",
            LayerOp::FusedAffine(_) => "Gemm",
            LayerOp::Activation => "Relu",
        }
    }
}

fn expect_arity(node: &NodeProto, expected: usize) -> ConvertResult<()> {
    if node.input.len() != expected {
        return Err(malformed(
            node,
            format!("expected {} inputs, found {}", expected, node.input.len()),
        ));
    }
    Ok(())
}

/// The operand of a binary node that is not the chain tensor
fn other_operand<'n>(node: &'n NodeProto, cursor: &str) -> &'n str {
    if node.input[0] == cursor {
        &node.input[1]
    } else {
        &node.input[0]
    }
}

fn malformed(node: &NodeProto, detail: String) -> ConvertError {
    ConvertError::MalformedNode {
        node: node.display_name().to_string(),
        op_type: node.op_type.clone(),
        detail,
    }
}
