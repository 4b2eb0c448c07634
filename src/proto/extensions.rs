//! Extension methods for ONNX protobuf types

use super::onnx::*;

// ============================================================================
// ModelProto extensions
// ============================================================================

impl ModelProto {
    /// Opset version of the default domain
    pub fn get_opset_version(&self) -> Option<i64> {
        self.opset_import
            .iter()
            .find(|op| op.domain.is_empty() || op.domain == "ai.onnx")
            .map(|op| op.version)
    }
}

// ============================================================================
// NodeProto extensions
// ============================================================================

impl NodeProto {
    /// Attribute by name
    pub fn get_attribute(&self, name: &str) -> Option<&AttributeProto> {
        self.attribute.iter().find(|attr| attr.name == name)
    }

    /// Integer attribute, or `default` when absent
    pub fn get_attribute_int(&self, name: &str, default: i64) -> i64 {
        self.get_attribute(name).map_or(default, |a| a.i)
    }

    /// Float attribute, or `default` when absent
    pub fn get_attribute_float(&self, name: &str, default: f32) -> f32 {
        self.get_attribute(name).map_or(default, |a| a.f)
    }

    /// Name used in diagnostics; falls back to the first output for unnamed nodes
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.output.first().map(String::as_str).unwrap_or("<unnamed>")
        }
    }
}

// ============================================================================
// ValueInfoProto extensions
// ============================================================================

impl ValueInfoProto {
    /// Tensor dimensions; symbolic or missing extents are `-1`
    pub fn get_shape(&self) -> Option<Vec<i64>> {
        use tensor_shape_proto::dimension::Value as Dim;

        let type_proto::Value::TensorType(tensor) = self.r#type.as_ref()?.value.as_ref()?;
        let shape = tensor.shape.as_ref()?;

        Some(
            shape
                .dim
                .iter()
                .map(|d| match d.value {
                    Some(Dim::DimValue(v)) => v,
                    _ => -1,
                })
                .collect(),
        )
    }
}

// ============================================================================
// TensorProto extensions
// ============================================================================

impl TensorProto {
    /// Payload is stored in `raw_data`
    pub fn has_raw_data(&self) -> bool {
        !self.raw_data.is_empty()
    }

    /// Payload lives outside the model file
    pub fn is_external(&self) -> bool {
        self.data_location == tensor_proto::DataLocation::External as i32
    }
}

// ============================================================================
// AttributeProto extensions
// ============================================================================

impl AttributeProto {
    /// Integer attribute
    pub fn new_int(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            i: value,
            r#type: attribute_proto::AttributeType::Int as i32,
            ..Default::default()
        }
    }

    /// Float attribute
    pub fn new_float(name: &str, value: f32) -> Self {
        Self {
            name: name.to_string(),
            f: value,
            r#type: attribute_proto::AttributeType::Float as i32,
            ..Default::default()
        }
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Tensor-typed ValueInfoProto with a static shape
pub fn make_tensor_value_info(name: &str, elem_type: i32, shape: &[i64]) -> ValueInfoProto {
    let dim = shape
        .iter()
        .map(|&d| tensor_shape_proto::Dimension {
            value: Some(tensor_shape_proto::dimension::Value::DimValue(d)),
            ..Default::default()
        })
        .collect();

    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type,
                shape: Some(TensorShapeProto { dim }),
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Node with the given operator, inputs, outputs and name
pub fn make_node(op_type: &str, inputs: &[&str], outputs: &[&str], name: &str) -> NodeProto {
    NodeProto {
        op_type: op_type.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        output: outputs.iter().map(|s| s.to_string()).collect(),
        name: name.to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_get_attribute() {
        let mut node = NodeProto::default();
        node.attribute.push(AttributeProto::new_int("transA", 1));
        node.attribute.push(AttributeProto::new_float("alpha", 0.5));

        assert_eq!(node.get_attribute_int("transA", 0), 1);
        assert_eq!(node.get_attribute_int("transB", 0), 0);
        assert_eq!(node.get_attribute_float("alpha", 1.0), 0.5);
        assert_eq!(node.get_attribute_float("beta", 1.0), 1.0);
    }

    #[test]
    fn test_display_name_falls_back_to_output() {
        let named = make_node("Relu", &["X"], &["Y"], "relu_0");
        assert_eq!(named.display_name(), "relu_0");

        let unnamed = make_node("Relu", &["X"], &["Y"], "");
        assert_eq!(unnamed.display_name(), "Y");

        let bare = make_node("Relu", &["X"], &[], "");
        assert_eq!(bare.display_name(), "<unnamed>");
    }

    #[test]
    fn test_value_info_shape() {
        let vi = make_tensor_value_info("X", 1, &[1, 5]);
        assert_eq!(vi.name, "X");
        assert_eq!(vi.get_shape(), Some(vec![1, 5]));

        let untyped = ValueInfoProto::default();
        assert_eq!(untyped.get_shape(), None);
    }

    #[test]
    fn test_opset_version() {
        let model = ModelProto {
            opset_import: vec![
                OperatorSetIdProto {
                    domain: "com.microsoft".to_string(),
                    version: 1,
                },
                OperatorSetIdProto {
                    domain: String::new(),
                    version: 13,
                },
            ],
            ..Default::default()
        };
        assert_eq!(model.get_opset_version(), Some(13));
    }
}
