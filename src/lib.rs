//! # onnx2nnet
//!
//! Convert feed-forward ReLU networks stored as ONNX graphs into the NNet
//! text format used by neural network verification tools.
//!
//! ## Features
//!
//! - **Extraction**: Walk `MatMul`/`Add`/`Gemm`/`Relu` chains into affine layers
//! - **Endpoint inference**: Input and output tensors default to the graph's own
//! - **NNet I/O**: Write and read NNet files with bounds and normalization
//!
//! ## Example
//!
//! ```ignore
//! use onnx2nnet::prelude::*;
//!
//! let model = load_model("model.onnx")?;
//! let conversion = convert_model(&model, &ConvertOptions::default())?;
//! write_nnet(&conversion.network, &conversion.normalization, Path::new("model.nnet"))?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod extract;
pub mod graph;
pub mod io;
pub mod nnet;
pub mod proto;
pub mod tensor;
pub mod traits;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use onnx2nnet::prelude::*`
pub mod prelude {
    pub use crate::error::{ConvertError, ConvertResult};
    pub use crate::extract::{extract_from_graph, ExtractOptions, Layer, Network, TransBMode};
    pub use crate::graph::GraphContext;
    pub use crate::io::{
        convert_file, convert_model, convert_model_to, load_model, Conversion, ConvertOptions,
        ConvertStats,
    };
    pub use crate::nnet::{read_nnet, write_nnet, NNetWriter, Normalization, NormalizationOverrides};
    pub use crate::proto::onnx::*;
    pub use crate::traits::FormatWriter;
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{ConvertError, ConvertResult};
pub use traits::FormatWriter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
