//! Tensor conversion utilities
//!
//! Convert between ONNX TensorProto and ndarray types. Layer parameters are
//! carried as `f64` regardless of the stored element type.

use ndarray::{Array, Array1, Array2, ArrayD, Ix2, IxDyn};

use crate::error::{ConvertError, ConvertResult};
use crate::proto::tensor_proto::DataType;
use crate::proto::TensorProto;

use super::dtype::{dtype_size, i32_to_dtype, is_float_type};
use super::shape::{dims_to_shape, numel};

/// Convert TensorProto to f64 ndarray
///
/// This handles both raw_data and typed data formats.
pub fn tensor_to_array_f64(tensor: &TensorProto) -> ConvertResult<ArrayD<f64>> {
    if tensor.is_external() {
        return Err(invalid(tensor, "external tensor data is not supported"));
    }

    let dtype = i32_to_dtype(tensor.data_type)?;
    if !is_float_type(dtype) {
        tracing::debug!(tensor = %tensor.name, ?dtype, "widening integer initializer to f64");
    }
    let shape = dims_to_shape(&tensor.name, &tensor.dims)?;
    let expected_len = numel(&tensor.name, &tensor.dims)?;

    let data: Vec<f64> = if tensor.has_raw_data() {
        decode_raw_to_f64(tensor, dtype, expected_len)?
    } else {
        match dtype {
            DataType::Float => tensor.float_data.iter().map(|&v| v as f64).collect(),
            DataType::Double => tensor.double_data.clone(),
            DataType::Int32 | DataType::Int8 | DataType::Uint8 | DataType::Int16 => {
                tensor.int32_data.iter().map(|&v| v as f64).collect()
            }
            DataType::Int64 => tensor.int64_data.iter().map(|&v| v as f64).collect(),
            DataType::Uint64 => tensor.uint64_data.iter().map(|&v| v as f64).collect(),
            _ => {
                return Err(ConvertError::InvalidDataType(tensor.data_type));
            }
        }
    };

    if data.len() != expected_len {
        return Err(invalid(
            tensor,
            format!(
                "data length {} does not match shape {:?} (expected {})",
                data.len(),
                tensor.dims,
                expected_len
            ),
        ));
    }

    Array::from_shape_vec(IxDyn(&shape), data).map_err(|e| invalid(tensor, e.to_string()))
}

/// Convert a rank-2 initializer into a weight matrix
pub fn tensor_to_matrix(tensor: &TensorProto) -> ConvertResult<Array2<f64>> {
    let array = tensor_to_array_f64(tensor)?;
    let ndim = array.ndim();

    array
        .into_dimensionality::<Ix2>()
        .map_err(|_| invalid(tensor, format!("expected a 2-D weight, found rank {}", ndim)))
}

/// Convert an initializer into a bias vector
///
/// Rank-1 tensors are taken as-is; higher ranks are accepted when every extent
/// but one is 1 (e.g. a `(1, n)` row bias).
pub fn tensor_to_vector(tensor: &TensorProto) -> ConvertResult<Array1<f64>> {
    let array = tensor_to_array_f64(tensor)?;

    let non_unit = array.shape().iter().filter(|&&d| d != 1).count();
    if array.ndim() == 0 || (array.ndim() > 1 && non_unit > 1) {
        return Err(invalid(
            tensor,
            format!("expected a 1-D bias, found shape {:?}", array.shape()),
        ));
    }

    Ok(Array1::from_iter(array.iter().copied()))
}

/// Create a 2-D TensorProto from a row-major f32 slice
pub fn matrix_to_tensor_f32(data: &[f32], rows: usize, cols: usize, name: &str) -> TensorProto {
    TensorProto {
        dims: vec![rows as i64, cols as i64],
        data_type: DataType::Float as i32,
        float_data: data.to_vec(),
        name: name.to_string(),
        ..Default::default()
    }
}

/// Create 1D TensorProto from f32 slice
pub fn vec_to_tensor_f32(data: &[f32], name: &str) -> TensorProto {
    TensorProto {
        dims: vec![data.len() as i64],
        data_type: DataType::Float as i32,
        float_data: data.to_vec(),
        name: name.to_string(),
        ..Default::default()
    }
}

// ============================================================================
// Internal helpers
// ============================================================================

fn invalid(tensor: &TensorProto, detail: impl Into<String>) -> ConvertError {
    ConvertError::InvalidInitializer {
        tensor: tensor.name.clone(),
        detail: detail.into(),
    }
}

fn decode_raw_to_f64(
    tensor: &TensorProto,
    dtype: DataType,
    expected: usize,
) -> ConvertResult<Vec<f64>> {
    let raw = &tensor.raw_data;
    let elem_size = dtype_size(dtype)?;
    let expected_bytes = expected
        .checked_mul(elem_size)
        .ok_or_else(|| invalid(tensor, format!("raw size of {} elements overflows", expected)))?;
    if raw.len() != expected_bytes {
        return Err(invalid(
            tensor,
            format!(
                "raw data size {} does not match expected {} * {}",
                raw.len(),
                expected,
                elem_size
            ),
        ));
    }

    match dtype {
        DataType::Float => Ok(raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect()),
        DataType::Double => Ok(raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            .collect()),
        DataType::Int32 => Ok(raw
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect()),
        DataType::Int64 => Ok(raw
            .chunks_exact(8)
            .map(|b| i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f64)
            .collect()),
        DataType::Uint8 => Ok(raw.iter().map(|&b| b as f64).collect()),
        DataType::Int8 => Ok(raw.iter().map(|&b| b as i8 as f64).collect()),
        _ => Err(ConvertError::InvalidDataType(dtype as i32)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_to_matrix_float_data() {
        let tensor = matrix_to_tensor_f32(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3, "W");

        let matrix = tensor_to_matrix(&tensor).unwrap();
        assert_eq!(matrix.dim(), (2, 3));
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[1, 2]], 6.0);
    }

    #[test]
    fn test_tensor_to_array_raw_double() {
        let raw: Vec<u8> = [0.5f64, -1.25f64]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect();

        let tensor = TensorProto {
            name: "b".to_string(),
            dims: vec![2],
            data_type: DataType::Double as i32,
            raw_data: raw,
            ..Default::default()
        };

        let array = tensor_to_array_f64(&tensor).unwrap();
        assert_eq!(array.shape(), &[2]);
        assert_eq!(array[[0]], 0.5);
        assert_eq!(array[[1]], -1.25);
    }

    #[test]
    fn test_tensor_to_array_raw_float() {
        let raw: Vec<u8> = [1.0f32, 2.0f32]
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect();

        let tensor = TensorProto {
            dims: vec![2],
            data_type: DataType::Float as i32,
            raw_data: raw,
            ..Default::default()
        };

        let array = tensor_to_array_f64(&tensor).unwrap();
        assert_eq!(array[[1]], 2.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let tensor = TensorProto {
            name: "W".to_string(),
            dims: vec![2, 2],
            data_type: DataType::Float as i32,
            float_data: vec![1.0, 2.0, 3.0],
            ..Default::default()
        };

        let err = tensor_to_array_f64(&tensor).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidInitializer { .. }));
    }

    #[test]
    fn test_huge_dims_rejected() {
        let typed = TensorProto {
            name: "W".to_string(),
            dims: vec![1 << 33, 1 << 33],
            data_type: DataType::Float as i32,
            float_data: vec![1.0],
            ..Default::default()
        };
        assert!(matches!(
            tensor_to_matrix(&typed),
            Err(ConvertError::InvalidInitializer { .. })
        ));

        // fits in usize, but not once multiplied by the element size
        let raw = TensorProto {
            name: "W".to_string(),
            dims: vec![1 << 31, 1 << 31, 1 << 1],
            data_type: DataType::Double as i32,
            raw_data: vec![0; 8],
            ..Default::default()
        };
        match tensor_to_array_f64(&raw) {
            Err(ConvertError::InvalidInitializer { tensor, detail }) => {
                assert_eq!(tensor, "W");
                assert!(detail.contains("overflows"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_matrix_requires_rank_two() {
        let tensor = vec_to_tensor_f32(&[1.0, 2.0], "W");
        let err = tensor_to_matrix(&tensor).unwrap_err();
        assert!(err.to_string().contains("2-D"));
    }

    #[test]
    fn test_vector_accepts_row_bias() {
        let tensor = matrix_to_tensor_f32(&[1.0, 2.0, 3.0], 1, 3, "b");
        let bias = tensor_to_vector(&tensor).unwrap();
        assert_eq!(bias.to_vec(), vec![1.0, 2.0, 3.0]);

        let square = matrix_to_tensor_f32(&[1.0, 2.0, 3.0, 4.0], 2, 2, "b");
        assert!(tensor_to_vector(&square).is_err());
    }

    #[test]
    fn test_unsupported_dtype() {
        let tensor = TensorProto {
            dims: vec![1],
            data_type: DataType::String as i32,
            ..Default::default()
        };
        assert!(matches!(
            tensor_to_array_f64(&tensor),
            Err(ConvertError::InvalidDataType(8))
        ));
    }
}
