//! NNet format support
//!
//! The NNet text format stores a fully connected ReLU network together with
//! input bounds and normalization constants.
//!
//! # Example
//!
//! ```ignore
//! use onnx2nnet::nnet::{read_nnet, write_nnet, Normalization};
//!
//! write_nnet(&network, &Normalization::defaults(network.input_size()), path)?;
//! let model = read_nnet(path)?;
//! assert_eq!(model.num_layers, network.num_layers());
//! ```

pub mod normalization;
pub mod reader;
pub mod writer;

pub use normalization::{Normalization, NormalizationOverrides};
pub use reader::{read_nnet, NNetModel};
pub use writer::{format_plain, format_sci, to_nnet_string, write_nnet, NNetWriter, NNET_HEADER};
