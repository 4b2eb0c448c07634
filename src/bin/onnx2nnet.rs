//! # onnx2nnet
//!
//! Command-line converter from ONNX to NNet.
//!
//! ## Usage
//! ```bash
//! # Write model.nnet next to model.onnx with default bounds
//! onnx2nnet model.onnx
//!
//! # Explicit endpoints and normalization
//! onnx2nnet model.onnx out.nnet --input-name X --output-name Y --normalization norm.toml
//!
//! # Older MatMul exports
//! onnx2nnet legacy.onnx --force-transpose -vv
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use onnx2nnet::extract::{ExtractOptions, TransBMode};
use onnx2nnet::io::{convert_file, ConvertOptions};
use onnx2nnet::nnet::NormalizationOverrides;

#[derive(Parser)]
#[command(
    name = "onnx2nnet",
    about = "Convert a feed-forward ReLU network from ONNX to NNet",
    version
)]
struct Cli {
    /// ONNX model to convert.
    input: PathBuf,

    /// Destination NNet file (defaults to the input with a .nnet extension).
    output: Option<PathBuf>,

    /// Tensor where the chain starts (defaults to the single graph input).
    #[arg(long)]
    input_name: Option<String>,

    /// Tensor where the chain ends (defaults to the single graph output).
    #[arg(long)]
    output_name: Option<String>,

    /// Transpose every weight matrix (older networks without Gemm).
    #[arg(long)]
    force_transpose: bool,

    /// Apply the Gemm transB attribute instead of ignoring it.
    #[arg(long)]
    strict_gemm: bool,

    /// TOML file with input_mins, input_maxes, means and ranges.
    #[arg(short, long)]
    normalization: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let normalization = match &cli.normalization {
        Some(path) => NormalizationOverrides::from_file(path)
            .with_context(|| format!("loading normalization from {}", path.display()))?,
        None => NormalizationOverrides::default(),
    };

    let options = ConvertOptions {
        extract: ExtractOptions {
            input_name: cli.input_name,
            output_name: cli.output_name,
            force_transpose: cli.force_transpose,
            gemm_trans_b: if cli.strict_gemm {
                TransBMode::Strict
            } else {
                TransBMode::Ignore
            },
        },
        normalization,
    };

    let stats = convert_file(&cli.input, cli.output.as_deref(), &options)
        .with_context(|| format!("could not convert {}", cli.input.display()))?;

    println!(
        "Converted ONNX model at {}\n    to an NNet model at {} ({} layers, {} inputs, {} outputs, {} params)",
        cli.input.display(),
        stats.output_path.display(),
        stats.num_layers,
        stats.input_size,
        stats.output_size,
        stats.param_count
    );

    Ok(())
}
