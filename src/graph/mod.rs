//! Graph indexing for ONNX models
//!
//! This module provides the lookup structure the extractor walks:
//!
//! - [`GraphContext`]: borrowed view of a graph with O(1) tensor lookups
//! - [`maps`]: Type definitions and builders for graph maps
//!
//! # Example
//!
//! ```ignore
//! use onnx2nnet::graph::GraphContext;
//!
//! let ctx = GraphContext::new(&graph);
//! let input = ctx.resolve_input(None)?;
//! let first = ctx.next_consumer_after(&input, None);
//! ```
//!
//! # Maps
//!
//! | Map | Description |
//! |-----|-------------|
//! | `producer_map` | output_name → producer node index |
//! | `consumer_map` | tensor_name → consumer node indices |
//! | `initializer_map` | name → TensorProto |
//! | `graph_input_map` | graph input name → ValueInfoProto |
//! | `graph_output_map` | graph output name → ValueInfoProto |

pub mod accessors;
pub mod context;
pub mod maps;

// Re-export main types
pub use context::GraphContext;
pub use maps::{ConsumerMap, InitializerMap, ProducerMap, ValueInfoMap};
