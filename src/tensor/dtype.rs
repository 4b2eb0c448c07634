//! ONNX element types accepted for layer parameters

use crate::error::{ConvertError, ConvertResult};
use crate::proto::tensor_proto::DataType;

/// Bytes per element in `raw_data`, for the types that can be decoded
pub fn dtype_size(dtype: DataType) -> ConvertResult<usize> {
    let size = match dtype {
        DataType::Uint8 | DataType::Int8 => 1,
        DataType::Float | DataType::Int32 => 4,
        DataType::Double | DataType::Int64 => 8,
        other => return Err(ConvertError::InvalidDataType(other as i32)),
    };
    Ok(size)
}

/// Parse the `data_type` field
pub fn i32_to_dtype(value: i32) -> ConvertResult<DataType> {
    match DataType::try_from(value) {
        Ok(DataType::Undefined) | Err(_) => Err(ConvertError::InvalidDataType(value)),
        Ok(dtype) => Ok(dtype),
    }
}

/// Floating point element type
pub fn is_float_type(dtype: DataType) -> bool {
    matches!(
        dtype,
        DataType::Float | DataType::Double | DataType::Float16 | DataType::Bfloat16
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_size() {
        assert_eq!(dtype_size(DataType::Float).unwrap(), 4);
        assert_eq!(dtype_size(DataType::Double).unwrap(), 8);
        assert_eq!(dtype_size(DataType::Int8).unwrap(), 1);
        // half precision has no raw decoder
        assert!(dtype_size(DataType::Float16).is_err());
    }

    #[test]
    fn test_i32_to_dtype() {
        assert_eq!(i32_to_dtype(1).unwrap(), DataType::Float);
        assert_eq!(i32_to_dtype(11).unwrap(), DataType::Double);
        assert!(matches!(i32_to_dtype(0), Err(ConvertError::InvalidDataType(0))));
        assert!(i32_to_dtype(999).is_err());
    }

    #[test]
    fn test_is_float_type() {
        assert!(is_float_type(DataType::Double));
        assert!(!is_float_type(DataType::Int64));
    }
}
