//! Core traits for onnx2nnet
//!
//! Defines the interface between extraction and on-disk formats.

use std::path::Path;

use crate::error::ConvertResult;
use crate::extract::Network;
use crate::nnet::Normalization;

/// Serializes an extracted network to a file
///
/// The conversion pipeline only needs this one operation, so alternative
/// output formats plug in without touching extraction.
///
/// # Example
///
/// ```ignore
/// struct Summary;
///
/// impl FormatWriter for Summary {
///     fn write(&self, network: &Network, _: &Normalization, path: &Path) -> ConvertResult<()> {
///         std::fs::write(path, format!("{:?}", network.layer_sizes()))?;
///         Ok(())
///     }
/// }
/// ```
pub trait FormatWriter {
    /// Write `network` and its `normalization` to `path`
    ///
    /// Fails with [`ConvertError::WriteFailure`](crate::error::ConvertError::WriteFailure)
    /// when the destination cannot be produced.
    fn write(
        &self,
        network: &Network,
        normalization: &Normalization,
        path: &Path,
    ) -> ConvertResult<()>;

    /// File extension used for derived output paths
    fn extension(&self) -> &'static str {
        "nnet"
    }
}

impl<W: FormatWriter + ?Sized> FormatWriter for &W {
    fn write(
        &self,
        network: &Network,
        normalization: &Normalization,
        path: &Path,
    ) -> ConvertResult<()> {
        (**self).write(network, normalization, path)
    }

    fn extension(&self) -> &'static str {
        (**self).extension()
    }
}
