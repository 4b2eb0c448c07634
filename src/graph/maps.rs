//! Graph map types and builders
//!
//! Tensors are connected purely by name, so these maps are built once per
//! graph and turn "who produces / who consumes this tensor" into lookups.
//! Nodes are addressed by declaration index, which stays unique even when
//! exporters leave node names empty.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::proto::{GraphProto, TensorProto, ValueInfoProto};

/// Type alias for producer map: output_name → declaration index
pub type ProducerMap<'a> = FxHashMap<&'a str, usize>;

/// Type alias for consumer map: tensor_name → ascending declaration indices
/// SmallVec optimized for common case of 1-4 consumers
pub type ConsumerMap<'a> = FxHashMap<&'a str, SmallVec<[usize; 4]>>;

/// Type alias for initializer map: name → TensorProto
pub type InitializerMap<'a> = FxHashMap<&'a str, &'a TensorProto>;

/// Type alias for graph input/output maps: name → ValueInfoProto (order preserved)
pub type ValueInfoMap<'a> = IndexMap<&'a str, &'a ValueInfoProto>;

/// Build producer map from graph nodes
///
/// Maps each output tensor name to the node that produces it.
pub fn build_producer_map(graph: &GraphProto) -> ProducerMap<'_> {
    let mut map = FxHashMap::default();

    for (idx, node) in graph.node.iter().enumerate() {
        for output in &node.output {
            if !output.is_empty() {
                map.insert(output.as_str(), idx);
            }
        }
    }

    map
}

/// Build consumer map from graph nodes
///
/// Maps each tensor name to the nodes that read it. A node listing the same
/// tensor twice is recorded once.
pub fn build_consumer_map(graph: &GraphProto) -> ConsumerMap<'_> {
    let mut map: ConsumerMap<'_> = FxHashMap::default();

    for (idx, node) in graph.node.iter().enumerate() {
        for input in &node.input {
            if input.is_empty() {
                continue;
            }
            let consumers = map.entry(input.as_str()).or_default();
            if consumers.last() != Some(&idx) {
                consumers.push(idx);
            }
        }
    }

    map
}

/// Build initializer map from graph
///
/// Later duplicates win, matching how runtimes resolve repeated names.
pub fn build_initializer_map(graph: &GraphProto) -> InitializerMap<'_> {
    graph
        .initializer
        .iter()
        .map(|t| (t.name.as_str(), t))
        .collect()
}

/// Build graph input map
pub fn build_graph_input_map(graph: &GraphProto) -> ValueInfoMap<'_> {
    graph
        .input
        .iter()
        .map(|vi| (vi.name.as_str(), vi))
        .collect()
}

/// Build graph output map
pub fn build_graph_output_map(graph: &GraphProto) -> ValueInfoMap<'_> {
    graph
        .output
        .iter()
        .map(|vi| (vi.name.as_str(), vi))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::extensions::make_node;

    fn make_test_graph() -> GraphProto {
        GraphProto {
            node: vec![
                make_node("MatMul", &["X", "W0"], &["mm_out"], "matmul_0"),
                make_node("Add", &["mm_out", "B0"], &["add_out"], "add_0"),
                make_node("Relu", &["add_out"], &["Y"], "relu_0"),
            ],
            input: vec![ValueInfoProto {
                name: "X".to_string(),
                ..Default::default()
            }],
            output: vec![ValueInfoProto {
                name: "Y".to_string(),
                ..Default::default()
            }],
            initializer: vec![
                TensorProto {
                    name: "W0".to_string(),
                    ..Default::default()
                },
                TensorProto {
                    name: "B0".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_build_producer_map() {
        let graph = make_test_graph();
        let map = build_producer_map(&graph);

        assert_eq!(map.get("mm_out"), Some(&0));
        assert_eq!(map.get("add_out"), Some(&1));
        assert_eq!(map.get("Y"), Some(&2));
        assert!(map.get("X").is_none()); // input, not produced by node
    }

    #[test]
    fn test_build_consumer_map() {
        let graph = make_test_graph();
        let map = build_consumer_map(&graph);

        assert_eq!(map.get("X").map(|v| v.as_slice()), Some(&[0][..]));
        assert_eq!(map.get("mm_out").map(|v| v.as_slice()), Some(&[1][..]));
        assert_eq!(map.get("B0").map(|v| v.as_slice()), Some(&[1][..]));
        assert!(map.get("Y").is_none());
    }

    #[test]
    fn test_consumer_map_dedupes_repeated_input() {
        let graph = GraphProto {
            node: vec![make_node("Add", &["X", "X"], &["Y"], "add_0")],
            ..Default::default()
        };
        let map = build_consumer_map(&graph);

        assert_eq!(map.get("X").map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_build_initializer_map() {
        let graph = make_test_graph();
        let map = build_initializer_map(&graph);

        assert!(map.contains_key("W0"));
        assert!(map.contains_key("B0"));
        assert!(!map.contains_key("X"));
    }

    #[test]
    fn test_graph_io_maps_preserve_order() {
        let mut graph = make_test_graph();
        graph.input.push(ValueInfoProto {
            name: "X2".to_string(),
            ..Default::default()
        });

        let inputs = build_graph_input_map(&graph);
        let keys: Vec<_> = inputs.keys().copied().collect();
        assert_eq!(keys, vec!["X", "X2"]);

        let outputs = build_graph_output_map(&graph);
        assert!(outputs.contains_key("Y"));
    }
}
