//! Tensor utilities for ONNX initializers
//!
//! This module provides utilities for working with ONNX tensors:
//! - Data type mappings (`dtype`)
//! - Shape utilities (`shape`)
//! - Conversion between TensorProto and ndarray (`convert`)
//!
//! # Example
//!
//! ```ignore
//! use onnx2nnet::tensor::{tensor_to_matrix, tensor_to_vector};
//!
//! let weight = tensor_to_matrix(&weight_proto)?;
//! let bias = tensor_to_vector(&bias_proto)?;
//! assert_eq!(weight.nrows(), bias.len());
//! ```

pub mod convert;
pub mod dtype;
pub mod shape;

// Re-export commonly used items
pub use convert::{
    matrix_to_tensor_f32, tensor_to_array_f64, tensor_to_matrix, tensor_to_vector,
    vec_to_tensor_f32,
};
pub use dtype::{dtype_size, i32_to_dtype, is_float_type};
pub use shape::{dims_to_shape, numel};
