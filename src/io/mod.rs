//! ONNX I/O and the conversion pipeline
//!
//! This module loads ONNX models and drives extraction and writing.
//!
//! # Example
//!
//! ```ignore
//! use onnx2nnet::io::{convert_file, ConvertOptions};
//!
//! // Writes model.nnet next to model.onnx
//! let stats = convert_file("model.onnx", None, &ConvertOptions::default())?;
//! println!("{} layers written to {}", stats.num_layers, stats.output_path.display());
//! ```

pub mod reader;

// Re-exports
pub use reader::{load_graph, load_model, load_model_from_bytes, ModelInfo};

use std::path::{Path, PathBuf};

use crate::error::ConvertResult;
use crate::extract::{extract_from_model, ExtractOptions, Network};
use crate::nnet::{NNetWriter, Normalization, NormalizationOverrides};
use crate::proto::ModelProto;
use crate::traits::FormatWriter;

/// Conversion options
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Endpoint names and weight handling
    pub extract: ExtractOptions,
    /// Caller-supplied bounds and normalization
    pub normalization: NormalizationOverrides,
}

/// Result of an in-memory conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Extracted layers
    pub network: Network,
    /// Bounds and normalization with defaults filled in
    pub normalization: Normalization,
}

/// Conversion statistics
#[derive(Debug, Clone, Default)]
pub struct ConvertStats {
    /// Where the network was written
    pub output_path: PathBuf,
    /// Number of affine layers
    pub num_layers: usize,
    /// Number of inputs
    pub input_size: usize,
    /// Number of outputs
    pub output_size: usize,
    /// Total weights and biases
    pub param_count: usize,
}

impl ConvertStats {
    fn new(network: &Network, output_path: &Path) -> Self {
        Self {
            output_path: output_path.to_path_buf(),
            num_layers: network.num_layers(),
            input_size: network.input_size(),
            output_size: network.output_size(),
            param_count: network.param_count(),
        }
    }
}

/// Extract the network of `model` and resolve its normalization
///
/// Nothing is written.
pub fn convert_model(model: &ModelProto, options: &ConvertOptions) -> ConvertResult<Conversion> {
    let network = extract_from_model(model, &options.extract)?;

    if options.normalization.is_empty() {
        tracing::warn!("using the default values of input bounds and normalization constants");
    }
    let normalization = Normalization::resolve(network.input_size(), &options.normalization);

    tracing::debug!(
        input_mins = ?normalization.input_mins,
        input_maxes = ?normalization.input_maxes,
        "resolved normalization"
    );

    Ok(Conversion {
        network,
        normalization,
    })
}

/// Convert `model` and hand the result to `writer`
pub fn convert_model_to<W: FormatWriter>(
    model: &ModelProto,
    options: &ConvertOptions,
    writer: &W,
    path: &Path,
) -> ConvertResult<ConvertStats> {
    let Conversion {
        network,
        normalization,
    } = convert_model(model, options)?;

    writer.write(&network, &normalization, path)?;

    Ok(ConvertStats::new(&network, path))
}

/// Convert an ONNX file to an NNet file
///
/// When `output` is `None` the input path with its extension replaced by
/// `nnet` is used.
///
/// # Example
///
/// ```ignore
/// use onnx2nnet::io::{convert_file, ConvertOptions};
///
/// let stats = convert_file("acas.onnx", Some(Path::new("acas.nnet")), &ConvertOptions::default())?;
/// ```
pub fn convert_file<P: AsRef<Path>>(
    input: P,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> ConvertResult<ConvertStats> {
    let input = input.as_ref();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_nnet_path(input));

    let model = load_model(input)?;
    let info = ModelInfo::from_model(&model);
    tracing::debug!(
        producer = %info.producer_name,
        ir_version = info.ir_version,
        nodes = info.node_count,
        initializers = info.initializer_count,
        inputs = ?info.inputs,
        outputs = ?info.outputs,
        "loaded model"
    );

    let stats = convert_model_to(&model, options, &NNetWriter, &output)?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        layers = stats.num_layers,
        params = stats.param_count,
        "converted ONNX model to NNet"
    );

    Ok(stats)
}

/// `model.onnx` -> `model.nnet`
pub fn default_nnet_path(input: &Path) -> PathBuf {
    input.with_extension(NNetWriter.extension())
}
