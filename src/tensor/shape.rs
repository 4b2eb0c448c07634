//! Shape utilities for ONNX tensors

use crate::error::{ConvertError, ConvertResult};

/// Total number of elements; a scalar has one
///
/// Negative extents count as zero. Fails when the product overflows `usize`.
pub fn numel(tensor: &str, dims: &[i64]) -> ConvertResult<usize> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d.max(0) as usize))
        .ok_or_else(|| ConvertError::InvalidInitializer {
            tensor: tensor.to_string(),
            detail: format!("element count of shape {:?} overflows", dims),
        })
}

/// Convert ONNX dims into an ndarray shape, rejecting negative extents
pub fn dims_to_shape(tensor: &str, dims: &[i64]) -> ConvertResult<Vec<usize>> {
    dims.iter()
        .map(|&d| {
            usize::try_from(d).map_err(|_| ConvertError::InvalidInitializer {
                tensor: tensor.to_string(),
                detail: format!("negative dimension in {:?}", dims),
            })
        })
        .collect()
}
