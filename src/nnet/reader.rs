//! NNet text reader
//!
//! Parses files produced by [`write_nnet`](super::write_nnet) and by the
//! reference NNet tooling. Comment lines start with `//`. The first seven data
//! lines hold the header, layer sizes, an unused flag and the four
//! normalization arrays; all remaining values are read as one flat stream of
//! weights and biases, layer by layer.

use std::path::Path;

use ndarray::{Array1, Array2};

use crate::error::{ConvertError, ConvertResult};
use crate::extract::{Layer, Network};

use super::Normalization;

/// Parsed NNet file
#[derive(Debug, Clone, PartialEq)]
pub struct NNetModel {
    /// Number of affine layers
    pub num_layers: usize,
    /// Number of inputs
    pub input_size: usize,
    /// Number of outputs
    pub output_size: usize,
    /// Widest layer as declared in the header
    pub max_layer_size: usize,
    /// `[inputs, layer1 outputs, ..., outputs]`
    pub layer_sizes: Vec<usize>,
    /// Bounds and normalization
    pub normalization: Normalization,
    /// Weight matrices, shape `(outputs, inputs)` per layer
    pub weights: Vec<Array2<f64>>,
    /// Bias vectors per layer
    pub biases: Vec<Array1<f64>>,
}

impl NNetModel {
    /// Parse NNet text
    pub fn parse(text: &str) -> ConvertResult<Self> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("//"));

        let mut next_line = |what: &str| {
            lines
                .next()
                .ok_or_else(|| invalid(format!("unexpected end of file before {}", what)))
        };

        let header: Vec<usize> = parse_values(next_line("header")?, "header")?;
        let [num_layers, input_size, output_size, max_layer_size] = header[..] else {
            return Err(invalid(format!(
                "header needs 4 values, found {}",
                header.len()
            )));
        };
        if num_layers == 0 {
            return Err(invalid("network has no layers".to_string()));
        }

        let layer_sizes: Vec<usize> = parse_values(next_line("layer sizes")?, "layer sizes")?;
        if layer_sizes.len().checked_sub(1) != Some(num_layers) {
            return Err(invalid(format!(
                "{} layers need one more layer size, found {}",
                num_layers,
                layer_sizes.len()
            )));
        }
        if layer_sizes[0] != input_size || layer_sizes[num_layers] != output_size {
            return Err(invalid(format!(
                "layer sizes {:?} disagree with header ({} inputs, {} outputs)",
                layer_sizes, input_size, output_size
            )));
        }

        // unused flag
        next_line("flag")?;

        let normalization = Normalization {
            input_mins: parse_values(next_line("input mins")?, "input mins")?,
            input_maxes: parse_values(next_line("input maxes")?, "input maxes")?,
            means: parse_values(next_line("means")?, "means")?,
            ranges: parse_values(next_line("ranges")?, "ranges")?,
        };
        normalization
            .validate(input_size)
            .map_err(|e| invalid(e.to_string()))?;

        let mut values = Vec::new();
        for line in lines {
            values.extend(parse_values::<f64>(line, "parameters")?);
        }

        let expected = layer_sizes
            .windows(2)
            .try_fold(0usize, |acc, pair| {
                pair[0]
                    .checked_mul(pair[1])
                    .and_then(|w| w.checked_add(pair[1]))
                    .and_then(|n| acc.checked_add(n))
            })
            .ok_or_else(|| invalid(format!("layer sizes {:?} are too large", layer_sizes)))?;
        if values.len() != expected {
            return Err(invalid(format!(
                "expected {} parameters, found {}",
                expected,
                values.len()
            )));
        }

        let mut weights = Vec::with_capacity(num_layers);
        let mut biases = Vec::with_capacity(num_layers);
        let mut rest = values.as_slice();
        for pair in layer_sizes.windows(2) {
            let (inputs, outputs) = (pair[0], pair[1]);

            // bounded by `expected`, which did not overflow
            let (w, tail) = rest.split_at(inputs * outputs);
            let (b, tail) = tail.split_at(outputs);
            rest = tail;

            let weight = Array2::from_shape_vec((outputs, inputs), w.to_vec())
                .map_err(|e| invalid(e.to_string()))?;
            weights.push(weight);
            biases.push(Array1::from_vec(b.to_vec()));
        }

        Ok(Self {
            num_layers,
            input_size,
            output_size,
            max_layer_size,
            layer_sizes,
            normalization,
            weights,
            biases,
        })
    }

    /// Total weights and biases
    pub fn param_count(&self) -> usize {
        self.weights.iter().map(|w| w.len()).sum::<usize>()
            + self.biases.iter().map(|b| b.len()).sum::<usize>()
    }

    /// Rebuild the layer chain
    pub fn to_network(&self) -> ConvertResult<Network> {
        let layers = self
            .weights
            .iter()
            .zip(&self.biases)
            .map(|(w, b)| Layer::new(w.clone(), b.clone()))
            .collect::<ConvertResult<Vec<_>>>()?;
        Network::new(layers)
    }
}

/// Read and parse an NNet file
pub fn read_nnet(path: &Path) -> ConvertResult<NNetModel> {
    let text = std::fs::read_to_string(path)?;
    NNetModel::parse(&text)
}

fn parse_values<T: std::str::FromStr>(line: &str, what: &str) -> ConvertResult<Vec<T>>
where
    T::Err: std::fmt::Display,
{
    line.split(',')
        .map(str::trim)
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<T>()
                .map_err(|e| invalid(format!("bad value '{}' in {}: {}", tok, what, e)))
        })
        .collect()
}

fn invalid(msg: String) -> ConvertError {
    ConvertError::InvalidNNet(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nnet::to_nnet_string;
    use ndarray::{arr1, arr2};

    const SMALL: &str = "\
// Neural Network File Format by Kyle Julian, Stanford 2016
// extra comment
2,2,1,3,
2,3,1,
0,
-1.0,-2.0,
1.0,2.0,
0.0,0.0,0.0,
1.0,1.0,1.0,
1.00000e+00,-2.00000e+00,
5.00000e-01,2.50000e-01,
0.00000e+00,3.00000e+00,
1.00000e-01,
2.00000e-01,
3.00000e-01,
1.00000e+00,1.00000e+00,1.00000e+00,
-1.00000e+00,
";

    #[test]
    fn test_parse_small() {
        let model = NNetModel::parse(SMALL).unwrap();

        assert_eq!(model.num_layers, 2);
        assert_eq!(model.input_size, 2);
        assert_eq!(model.output_size, 1);
        assert_eq!(model.max_layer_size, 3);
        assert_eq!(model.layer_sizes, vec![2, 3, 1]);
        assert_eq!(model.normalization.input_mins, vec![-1.0, -2.0]);
        assert_eq!(model.weights[0], arr2(&[[1.0, -2.0], [0.5, 0.25], [0.0, 3.0]]));
        assert_eq!(model.biases[0], arr1(&[0.1, 0.2, 0.3]));
        assert_eq!(model.weights[1], arr2(&[[1.0, 1.0, 1.0]]));
        assert_eq!(model.param_count(), 6 + 3 + 3 + 1);
    }

    #[test]
    fn test_to_network() {
        let net = NNetModel::parse(SMALL).unwrap().to_network().unwrap();

        assert_eq!(net.layer_sizes(), vec![2, 3, 1]);
        // hidden = relu([1 - 2 + 0.1, 0.5 + 0.25 + 0.2, 3 + 0.3]) = [0, 0.95, 3.3]
        let out = net.evaluate(&[1.0, 1.0]).unwrap();
        assert!((out[0] - (0.95 + 3.3 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_parse_written_text() {
        let model = NNetModel::parse(SMALL).unwrap();
        let net = model.to_network().unwrap();

        let text = to_nnet_string(&net, &model.normalization).unwrap();
        let reparsed = NNetModel::parse(&text).unwrap();

        assert_eq!(reparsed, model);
    }

    #[test]
    fn test_truncated_parameters() {
        let truncated: String = SMALL.lines().take(14).map(|l| format!("{}\n", l)).collect();
        match NNetModel::parse(&truncated) {
            Err(ConvertError::InvalidNNet(msg)) => assert!(msg.contains("parameters")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_bad_header() {
        assert!(NNetModel::parse("2,2,1,\n").is_err());
        assert!(NNetModel::parse("").is_err());
        assert!(NNetModel::parse("0,2,1,2,\n2,\n0,\n").is_err());
    }

    #[test]
    fn test_oversized_header() {
        let huge = usize::MAX;

        let text = format!("{},1,1,1,\n1,1,\n0,\n", huge);
        assert!(matches!(
            NNetModel::parse(&text),
            Err(ConvertError::InvalidNNet(_))
        ));

        let text = format!(
            "1,{h},1,{h},\n{h},1,\n0,\n0,\n0,\n0,\n1,\n",
            h = huge
        );
        assert!(matches!(
            NNetModel::parse(&text),
            Err(ConvertError::InvalidNNet(_))
        ));

        let text = format!(
            "2,1,1,{h},\n1,{h},1,\n0,\n0,\n0,\n0,0,\n1,1,\n",
            h = huge
        );
        match NNetModel::parse(&text) {
            Err(ConvertError::InvalidNNet(msg)) => assert!(msg.contains("too large")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_bad_number() {
        let text = SMALL.replace("-1.0,-2.0,", "-1.0,abc,");
        match NNetModel::parse(&text) {
            Err(ConvertError::InvalidNNet(msg)) => assert!(msg.contains("abc")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_layer_sizes_disagree_with_header() {
        let text = SMALL.replace("\n2,3,1,\n", "\n2,3,2,\n");
        assert!(NNetModel::parse(&text).is_err());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_nnet(Path::new("/nonexistent/model.nnet")).unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }
}
