//! Extracted layer sequence
//!
//! A [`Network`] is a non-empty chain of affine [`Layer`]s with ReLU applied
//! between consecutive layers (never before the first or after the last).

use ndarray::{Array1, Array2};

use crate::error::{ConvertError, ConvertResult};

/// One affine layer `y = W x + b`
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Weight matrix, shape `(outputs, inputs)`
    pub weight: Array2<f64>,
    /// Bias vector, length `outputs`
    pub bias: Array1<f64>,
}

impl Layer {
    /// Pair a weight with its bias; the row count must match the bias length
    pub fn new(weight: Array2<f64>, bias: Array1<f64>) -> ConvertResult<Self> {
        if weight.nrows() != bias.len() {
            return Err(ConvertError::ShapeMismatch {
                layer: 0,
                detail: format!(
                    "weight shape {:?} has {} rows but bias has length {}",
                    weight.shape(),
                    weight.nrows(),
                    bias.len()
                ),
            });
        }
        Ok(Self { weight, bias })
    }

    /// Number of inputs (weight columns)
    pub fn input_size(&self) -> usize {
        self.weight.ncols()
    }

    /// Number of outputs (weight rows)
    pub fn output_size(&self) -> usize {
        self.weight.nrows()
    }

    /// Apply the affine transform
    pub fn apply(&self, input: &Array1<f64>) -> Array1<f64> {
        self.weight.dot(input) + &self.bias
    }
}

/// Validated chain of affine layers
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Build a network, checking that layer shapes chain
    pub fn new(layers: Vec<Layer>) -> ConvertResult<Self> {
        if layers.is_empty() {
            return Err(ConvertError::ShapeMismatch {
                layer: 0,
                detail: "network has no layers".to_string(),
            });
        }

        for (idx, pair) in layers.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.input_size() != prev.output_size() {
                return Err(ConvertError::ShapeMismatch {
                    layer: idx + 1,
                    detail: format!(
                        "weight shape {:?} expects {} inputs but layer {} produces {}; \
                         MatMul-based models may need force_transpose",
                        next.weight.shape(),
                        next.input_size(),
                        idx,
                        prev.output_size()
                    ),
                });
            }
        }

        Ok(Self { layers })
    }

    /// Pair weights and biases positionally
    pub fn from_parts(weights: Vec<Array2<f64>>, biases: Vec<Array1<f64>>) -> ConvertResult<Self> {
        if weights.len() != biases.len() {
            return Err(ConvertError::ShapeMismatch {
                layer: weights.len().min(biases.len()),
                detail: format!(
                    "{} weight matrices but {} bias vectors",
                    weights.len(),
                    biases.len()
                ),
            });
        }

        let layers = weights
            .into_iter()
            .zip(biases)
            .enumerate()
            .map(|(idx, (w, b))| {
                Layer::new(w, b).map_err(|e| match e {
                    ConvertError::ShapeMismatch { detail, .. } => {
                        let hint = if idx == 0 {
                            "; MatMul-based models may need force_transpose"
                        } else {
                            ""
                        };
                        ConvertError::ShapeMismatch {
                            layer: idx,
                            detail: format!("{}{}", detail, hint),
                        }
                    }
                    other => other,
                })
            })
            .collect::<ConvertResult<Vec<_>>>()?;

        Self::new(layers)
    }

    /// Layers in chain order
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Consume the network, returning its layers
    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }

    /// Number of affine layers
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Number of network inputs
    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    /// Number of network outputs
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    /// `[inputs, layer1 outputs, ..., outputs]`
    pub fn layer_sizes(&self) -> Vec<usize> {
        std::iter::once(self.input_size())
            .chain(self.layers.iter().map(Layer::output_size))
            .collect()
    }

    /// Widest layer, counting the input layer
    pub fn max_layer_size(&self) -> usize {
        self.layer_sizes().into_iter().max().unwrap_or(0)
    }

    /// Total weights and biases
    pub fn param_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weight.len() + l.bias.len())
            .sum()
    }

    /// Evaluate the raw (unnormalized) network on one input
    pub fn evaluate(&self, input: &[f64]) -> ConvertResult<Array1<f64>> {
        if input.len() != self.input_size() {
            return Err(ConvertError::ShapeMismatch {
                layer: 0,
                detail: format!(
                    "input has length {} but the network expects {}",
                    input.len(),
                    self.input_size()
                ),
            });
        }

        let last = self.layers.len() - 1;
        let mut x = Array1::from_vec(input.to_vec());
        for (idx, layer) in self.layers.iter().enumerate() {
            x = layer.apply(&x);
            if idx != last {
                x.mapv_inplace(|v| v.max(0.0));
            }
        }
        Ok(x)
    }
}
