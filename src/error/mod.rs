//! Error types for onnx2nnet
//!
//! Every failure is terminal for the conversion call: nothing is written and no
//! partially extracted layers are returned.

use thiserror::Error;

/// Main error type for ONNX to NNet conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input or output tensor name omitted and not uniquely inferable
    #[error("Cannot infer {which} tensor name: graph declares {candidates:?}")]
    AmbiguousEndpoint {
        /// "input" or "output"
        which: &'static str,
        /// Candidate names declared by the graph
        candidates: Vec<String>,
    },

    /// A supported operator with the wrong arity or output count
    #[error("Malformed {op_type} node '{node}': {detail}")]
    MalformedNode {
        /// Node name
        node: String,
        /// Operator kind
        op_type: String,
        /// What is wrong with it
        detail: String,
    },

    /// Weight tensor has no initializer
    #[error("Node '{node}' references weight '{tensor}' which has no initializer")]
    MissingInitializer {
        /// Node name
        node: String,
        /// Weight tensor name
        tensor: String,
    },

    /// Operator outside {MatMul, Add, Gemm, Relu} on the chain
    #[error("Node '{node}': operator {op_type} is not supported by the NNet format")]
    UnsupportedOperator {
        /// Node name
        node: String,
        /// Operator kind
        op_type: String,
    },

    /// The walk did not reach the output, or weights/biases do not pair up
    #[error(
        "Incomplete chain: stopped at '{cursor}' (expected '{output}'), \
         {weights} weight(s), {biases} bias(es)"
    )]
    IncompleteChain {
        /// Final cursor value
        cursor: String,
        /// Designated output tensor
        output: String,
        /// Collected weight matrices
        weights: usize,
        /// Collected bias vectors
        biases: usize,
    },

    /// A tensor on the chain feeds more than one node
    #[error("Tensor '{tensor}' fans out to {consumers:?}; only linear chains are supported")]
    AmbiguousFanOut {
        /// Tensor name
        tensor: String,
        /// Consuming node names
        consumers: Vec<String>,
    },

    /// Layer shapes do not chain
    #[error("Shape mismatch in layer {layer}: {detail}")]
    ShapeMismatch {
        /// Zero-based layer index
        layer: usize,
        /// Offending shapes
        detail: String,
    },

    /// Initializer that cannot be used as a weight or bias
    #[error("Invalid initializer '{tensor}': {detail}")]
    InvalidInitializer {
        /// Tensor name
        tensor: String,
        /// Reason
        detail: String,
    },

    /// Invalid tensor data type
    #[error("Invalid data type: {0}")]
    InvalidDataType(i32),

    /// Invalid model
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Malformed NNet text
    #[error("Invalid NNet file: {0}")]
    InvalidNNet(String),

    /// Bad normalization configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The format writer could not produce the output file
    #[error("Failed to write '{path}': {reason}")]
    WriteFailure {
        /// Destination path
        path: String,
        /// Reason
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf decode error
    #[error("Protobuf decode error: {0}")]
    ProtoDecode(#[from] prost::DecodeError),
}

/// Result type alias for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;
