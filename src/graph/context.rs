//! Indexed view of an ONNX graph
//!
//! `GraphContext` borrows a `GraphProto` and keeps name-based indices over it,
//! so the extractor never rescans the node list to follow a tensor. It is
//! never mutated after construction and can be shared across threads.

use crate::error::{ConvertError, ConvertResult};
use crate::proto::{GraphProto, ModelProto, NodeProto, TensorProto, ValueInfoProto};

use super::maps::{
    build_consumer_map, build_graph_input_map, build_graph_output_map, build_initializer_map,
    build_producer_map, ConsumerMap, InitializerMap, ProducerMap, ValueInfoMap,
};

/// Read-only graph context with O(1) tensor lookups
#[derive(Debug)]
pub struct GraphContext<'a> {
    /// The underlying graph
    pub graph: &'a GraphProto,

    /// Output tensor name → index of the producing node
    pub producer_map: ProducerMap<'a>,

    /// Tensor name → indices of reading nodes
    pub consumer_map: ConsumerMap<'a>,

    /// Initializer name → TensorProto
    pub initializer_map: InitializerMap<'a>,

    /// Declared graph inputs, in declaration order
    pub graph_input_map: ValueInfoMap<'a>,

    /// Declared graph outputs, in declaration order
    pub graph_output_map: ValueInfoMap<'a>,
}

impl<'a> GraphContext<'a> {
    /// Index `graph`
    pub fn new(graph: &'a GraphProto) -> Self {
        Self {
            graph,
            producer_map: build_producer_map(graph),
            consumer_map: build_consumer_map(graph),
            initializer_map: build_initializer_map(graph),
            graph_input_map: build_graph_input_map(graph),
            graph_output_map: build_graph_output_map(graph),
        }
    }

    /// Index the graph of `model`
    pub fn from_model(model: &'a ModelProto) -> ConvertResult<Self> {
        model
            .graph
            .as_ref()
            .map(Self::new)
            .ok_or_else(|| ConvertError::InvalidModel("Model does not contain a graph".into()))
    }

    /// Node at declaration index `idx`
    pub fn node(&self, idx: usize) -> Option<&'a NodeProto> {
        self.graph.node.get(idx)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node.len()
    }

    /// Node that writes `tensor`
    pub fn get_producer(&self, tensor: &str) -> Option<&'a NodeProto> {
        self.producer_map.get(tensor).and_then(|&idx| self.node(idx))
    }

    /// Indices of the nodes reading `tensor`, ascending
    pub fn get_consumer_indices(&self, tensor: &str) -> &[usize] {
        self.consumer_map
            .get(tensor)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Declared graph input named `name`
    pub fn graph_input(&self, name: &str) -> Option<&'a ValueInfoProto> {
        self.graph_input_map.get(name).copied()
    }

    /// Check if `name` is a declared graph input
    pub fn is_graph_input(&self, name: &str) -> bool {
        self.graph_input_map.contains_key(name)
    }

    /// Check if `name` has an initializer
    pub fn is_initializer(&self, name: &str) -> bool {
        self.initializer_map.contains_key(name)
    }

    /// Initializer named `name`
    pub fn get_initializer(&self, name: &str) -> Option<&'a TensorProto> {
        self.initializer_map.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::make_node;

    fn value_info(name: &str) -> ValueInfoProto {
        ValueInfoProto {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn gemm_relu() -> GraphProto {
        GraphProto {
            node: vec![
                make_node("Gemm", &["X", "W", "B"], &["gemm_out"], "gemm_0"),
                make_node("Relu", &["gemm_out"], &["Y"], "relu_0"),
            ],
            input: vec![value_info("X")],
            output: vec![value_info("Y")],
            initializer: vec![TensorProto {
                name: "W".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_node_lookup() {
        let graph = gemm_relu();
        let ctx = GraphContext::new(&graph);

        assert_eq!(ctx.node_count(), 2);
        assert_eq!(ctx.node(0).map(|n| n.op_type.as_str()), Some("Gemm"));
        assert!(ctx.node(2).is_none());
    }

    #[test]
    fn test_from_model_requires_graph() {
        assert!(matches!(
            GraphContext::from_model(&ModelProto::default()),
            Err(ConvertError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_producer_and_consumers() {
        let graph = gemm_relu();
        let ctx = GraphContext::new(&graph);

        assert_eq!(ctx.get_producer("gemm_out").unwrap().name, "gemm_0");
        assert!(ctx.get_producer("X").is_none());
        assert_eq!(ctx.get_consumer_indices("gemm_out"), &[1]);
        assert!(ctx.get_consumer_indices("Y").is_empty());
    }

    #[test]
    fn test_inputs_and_initializers() {
        let graph = gemm_relu();
        let ctx = GraphContext::new(&graph);

        assert!(ctx.is_graph_input("X"));
        assert!(!ctx.is_graph_input("gemm_out"));
        assert_eq!(ctx.graph_input("X").map(|v| v.name.as_str()), Some("X"));
        assert!(ctx.is_initializer("W"));
        assert!(!ctx.is_initializer("B"));
        assert!(ctx.get_initializer("X").is_none());
    }

    #[test]
    fn test_context_is_shareable() {
        fn assert_sync<T: Sync>(_: &T) {}
        let graph = gemm_relu();
        assert_sync(&GraphContext::new(&graph));
    }
}
