//! NNet text writer
//!
//! Renders a [`Network`] and its [`Normalization`] into the NNet text format:
//!
//! ```text
//! // Neural Network File Format by Kyle Julian, Stanford 2016
//! numLayers,inputSize,outputSize,maxLayerSize,
//! inputSize,layer1Size,...,outputSize,
//! 0,
//! input mins,
//! input maxes,
//! means,
//! ranges,
//! weight rows, then biases one per line, for each layer
//! ```
//!
//! Every line ends with a trailing comma. Parameters are written in `%.5e`
//! notation. The whole file is rendered in memory before anything touches the
//! filesystem, so a validation failure never leaves a partial file behind.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{ConvertError, ConvertResult};
use crate::extract::Network;
use crate::traits::FormatWriter;

use super::Normalization;

/// First line of every NNet file
pub const NNET_HEADER: &str = "// Neural Network File Format by Kyle Julian, Stanford 2016";

/// Writer for the NNet text format
#[derive(Debug, Clone, Copy, Default)]
pub struct NNetWriter;

impl FormatWriter for NNetWriter {
    fn write(
        &self,
        network: &Network,
        normalization: &Normalization,
        path: &Path,
    ) -> ConvertResult<()> {
        write_nnet(network, normalization, path)
    }

    fn extension(&self) -> &'static str {
        "nnet"
    }
}

/// Write `network` to `path` in NNet format
///
/// # Example
///
/// ```ignore
/// use onnx2nnet::nnet::{write_nnet, Normalization};
///
/// let norm = Normalization::defaults(network.input_size());
/// write_nnet(&network, &norm, Path::new("model.nnet"))?;
/// ```
pub fn write_nnet(
    network: &Network,
    normalization: &Normalization,
    path: &Path,
) -> ConvertResult<()> {
    let failure = |reason: String| ConvertError::WriteFailure {
        path: path.display().to_string(),
        reason,
    };

    let text = to_nnet_string(network, normalization).map_err(|e| failure(e.to_string()))?;

    let file = File::create(path).map_err(|e| failure(format!("cannot create file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(text.as_bytes())
        .map_err(|e| failure(format!("write failed: {}", e)))?;
    writer
        .flush()
        .map_err(|e| failure(format!("flush failed: {}", e)))?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote NNet file");

    Ok(())
}

/// Render `network` as NNet text
pub fn to_nnet_string(network: &Network, normalization: &Normalization) -> ConvertResult<String> {
    normalization.validate(network.input_size())?;

    let mut out = String::with_capacity(estimate_len(network));

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", NNET_HEADER);
    let _ = writeln!(
        out,
        "{},{},{},{},",
        network.num_layers(),
        network.input_size(),
        network.output_size(),
        network.max_layer_size()
    );
    for size in network.layer_sizes() {
        let _ = write!(out, "{},", size);
    }
    out.push('\n');
    out.push_str("0,\n");

    for values in [
        &normalization.input_mins,
        &normalization.input_maxes,
        &normalization.means,
        &normalization.ranges,
    ] {
        push_plain_line(&mut out, values);
    }

    for layer in network.layers() {
        for row in layer.weight.rows() {
            for &w in row {
                out.push_str(&format_sci(w));
                out.push(',');
            }
            out.push('\n');
        }
        for &b in &layer.bias {
            out.push_str(&format_sci(b));
            out.push_str(",\n");
        }
    }

    Ok(out)
}

fn push_plain_line(out: &mut String, values: &[f64]) {
    for v in values {
        let _ = write!(out, "{},", format_plain(*v));
    }
    out.push('\n');
}

fn estimate_len(network: &Network) -> usize {
    // "-1.23450e-01," is 13 bytes
    256 + network.param_count() * 13 + network.max_layer_size() * 4 * 24
}

/// Shortest round-trip text, with the exponent written the way Python's
/// `str(float)` writes it (`3.4028234663852886e+38`, `1e-07`)
pub fn format_plain(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }

    let rendered = format!("{:?}", value);
    match rendered.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => rendered,
    }
}

/// Format like C's `%.5e`: five fractional digits, signed exponent of at least
/// two digits
pub fn format_sci(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let rendered = format!("{:.5e}", value);
    match rendered.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => rendered,
    }
}
