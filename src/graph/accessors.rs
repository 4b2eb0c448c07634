//! Chain-walking accessors
//!
//! Endpoint inference and the "next node on the chain" lookup used by the
//! extractor.

use crate::error::{ConvertError, ConvertResult};

use super::context::GraphContext;

impl<'a> GraphContext<'a> {
    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Graph inputs that are not initializers
    ///
    /// Older exporters list every weight as a graph input as well; those are
    /// constants, not network inputs.
    pub fn input_candidates(&self) -> Vec<&'a str> {
        self.graph_input_map
            .keys()
            .copied()
            .filter(|name| !self.is_initializer(name))
            .collect()
    }

    /// Declared graph outputs
    pub fn output_candidates(&self) -> Vec<&'a str> {
        self.graph_output_map.keys().copied().collect()
    }

    /// Use `explicit` if given, otherwise the single declared network input
    pub fn resolve_input(&self, explicit: Option<&str>) -> ConvertResult<String> {
        resolve_endpoint("input", explicit, self.input_candidates())
    }

    /// Use `explicit` if given, otherwise the single declared graph output
    pub fn resolve_output(&self, explicit: Option<&str>) -> ConvertResult<String> {
        resolve_endpoint("output", explicit, self.output_candidates())
    }

    // ========================================================================
    // Chain traversal
    // ========================================================================

    /// Next node reading `tensor` that is declared after `after`
    ///
    /// This reproduces a single in-order pass over the node list: a consumer
    /// declared before the previously consumed node is never revisited.
    pub fn next_consumer_after(&self, tensor: &str, after: Option<usize>) -> Option<usize> {
        self.get_consumer_indices(tensor)
            .iter()
            .copied()
            .find(|&idx| after.map_or(true, |prev| idx > prev))
    }

    /// Fail if more than one node reads `tensor`
    pub fn ensure_single_consumer(&self, tensor: &str) -> ConvertResult<()> {
        let consumers = self.get_consumer_indices(tensor);
        if consumers.len() > 1 {
            return Err(ConvertError::AmbiguousFanOut {
                tensor: tensor.to_string(),
                consumers: consumers
                    .iter()
                    .filter_map(|&idx| self.node(idx))
                    .map(|n| n.display_name().to_string())
                    .collect(),
            });
        }
        Ok(())
    }
}

fn resolve_endpoint(
    which: &'static str,
    explicit: Option<&str>,
    candidates: Vec<&str>,
) -> ConvertResult<String> {
    if let Some(name) = explicit.filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }

    match candidates.as_slice() {
        [single] => Ok(single.to_string()),
        _ => Err(ConvertError::AmbiguousEndpoint {
            which,
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
        }),
    }
}
