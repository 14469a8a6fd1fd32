//! Raw execution records as reported by the execution worker
//!
//! The worker writes one JSON record per execution:
//!
//! ```json
//! {
//!   "timeoutExceeded": false,
//!   "rawResultValues": [{"type": "int", "value": "42"}, null],
//!   "panicMessage": null,
//!   "trace": [1, 4, 7]
//! }
//! ```
//!
//! Raw values carry their runtime type name in `type`, which also selects
//! their shape: `[N]T` is an array, a primitive name a primitive, and any
//! other name a struct. Map and slice results are not supported.

use crate::model::{PrimitiveType, TypeId};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrimitive {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(deserialize_with = "scalar_text")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub name: String,
    pub value: RawValue,
    pub is_exported: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStruct {
    #[serde(rename = "type")]
    pub ty: String,
    pub value: Vec<RawField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArray {
    #[serde(rename = "type")]
    pub ty: String,
    pub element_type: String,
    pub length: usize,
    pub value: Vec<RawValue>,
}

/// One value produced by an execution, before type checking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Primitive(RawPrimitive),
    Struct(RawStruct),
    Array(RawArray),
}

impl RawValue {
    pub fn primitive(ty: impl Into<String>, value: impl Into<String>) -> Self {
        RawValue::Primitive(RawPrimitive {
            ty: ty.into(),
            value: value.into(),
        })
    }

    pub fn type_name(&self) -> &str {
        match self {
            RawValue::Primitive(primitive) => &primitive.ty,
            RawValue::Struct(structure) => &structure.ty,
            RawValue::Array(array) => &array.ty,
        }
    }

    /// Whether this value has exactly the shape of `declared`.
    ///
    /// `uint8` values also match `byte`, `int32` values also match `char`,
    /// and `string` values match error interfaces (they carry the message).
    pub fn matches(&self, declared: &TypeId) -> bool {
        match (self, declared) {
            (RawValue::Primitive(raw), TypeId::Primitive(primitive)) => {
                raw.ty == primitive.simple_name()
                    || (raw.ty == "uint8" && *primitive == PrimitiveType::Byte)
                    || (raw.ty == "int32" && *primitive == PrimitiveType::Char)
            }
            (RawValue::Primitive(raw), TypeId::Interface(interface)) => {
                interface.implements_error && raw.ty == "string"
            }
            (RawValue::Struct(raw), TypeId::Struct(structure)) => {
                raw.ty == structure.name
                    && raw.value.len() == structure.fields.len()
                    && raw.value.iter().zip(&structure.fields).all(|(field, declared)| {
                        field.name == declared.name
                            && field.is_exported == declared.exported
                            && field.value.matches(&declared.ty)
                    })
            }
            (RawValue::Array(raw), TypeId::Array(array)) => {
                array.length == Some(raw.length)
                    && raw.value.len() == raw.length
                    && raw.element_type == array.element.canonical_name()
                    && raw.value.iter().all(|element| element.matches(&array.element))
            }
            _ => false,
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let ty = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| D::Error::missing_field("type"))?;

        if ty.starts_with("map[") {
            return Err(D::Error::custom(format!("map result type {} is not supported", ty)));
        }
        if ty.starts_with("[]") {
            return Err(D::Error::custom(format!("slice result type {} is not supported", ty)));
        }
        let parsed = if ty.starts_with('[') {
            serde_json::from_value(value).map(RawValue::Array)
        } else if PrimitiveType::from_simple_name(&ty).is_some() {
            serde_json::from_value(value).map(RawValue::Primitive)
        } else {
            serde_json::from_value(value).map(RawValue::Struct)
        };
        parsed.map_err(D::Error::custom)
    }
}

/// Primitive payloads are normally strings, but bare JSON scalars are accepted too
fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Bool(flag) => Ok(flag.to_string()),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(format!("expected a scalar, found {}", other))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPanic {
    pub raw_result_value: RawValue,
    pub implements_error: bool,
}

/// Everything the worker reports about one execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExecutionRecord {
    pub timeout_exceeded: bool,
    #[serde(default)]
    pub raw_result_values: Vec<Option<RawValue>>,
    #[serde(default)]
    pub panic_message: Option<RawPanic>,
    #[serde(default)]
    pub trace: Vec<u64>,
}

impl RawExecutionRecord {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{StructField, StructType};

    #[test]
    fn test_record_shape_from_worker_json() {
        let record = RawExecutionRecord::from_json(
            r#"{
                "timeoutExceeded": false,
                "rawResultValues": [
                    {"type": "int", "value": "42"},
                    null,
                    {"type": "[2]bool", "elementType": "bool", "length": 2,
                     "value": [{"type": "bool", "value": "true"}, {"type": "bool", "value": "false"}]},
                    {"type": "geo.Point", "value": [
                        {"name": "X", "value": {"type": "float64", "value": "+Inf"}, "isExported": true}
                    ]}
                ],
                "panicMessage": null,
                "trace": [3, 1, 4]
            }"#,
        )
        .unwrap();

        assert_eq!(record.raw_result_values.len(), 4);
        assert_eq!(record.raw_result_values[0], Some(RawValue::primitive("int", "42")));
        assert!(record.raw_result_values[1].is_none());
        assert!(matches!(&record.raw_result_values[2], Some(RawValue::Array(array)) if array.length == 2));
        assert!(matches!(&record.raw_result_values[3], Some(RawValue::Struct(s)) if s.value[0].is_exported));
        assert_eq!(record.trace, vec![3, 1, 4]);
    }

    #[test]
    fn test_maps_and_slices_are_rejected() {
        let map = r#"{"timeoutExceeded": false, "rawResultValues": [{"type": "map[string]int", "value": []}], "trace": []}"#;
        let slice = r#"{"timeoutExceeded": false, "rawResultValues": [{"type": "[]int", "value": []}], "trace": []}"#;
        assert!(RawExecutionRecord::from_json(map).is_err());
        assert!(RawExecutionRecord::from_json(slice).is_err());
    }

    #[test]
    fn test_primitive_aliases() {
        assert!(RawValue::primitive("uint8", "7").matches(&PrimitiveType::Byte.into()));
        assert!(RawValue::primitive("int32", "97").matches(&PrimitiveType::Char.into()));
        assert!(RawValue::primitive("string", "boom").matches(&TypeId::error_interface("error")));
        assert!(!RawValue::primitive("int64", "7").matches(&PrimitiveType::Int32.into()));
    }

    #[test]
    fn test_struct_match_is_order_sensitive() {
        let declared = TypeId::Struct(StructType {
            name: "geo.Point".to_string(),
            fields: vec![
                StructField { name: "X".to_string(), ty: PrimitiveType::Int.into(), exported: true },
                StructField { name: "y".to_string(), ty: PrimitiveType::Int.into(), exported: false },
            ],
        });
        let field = |name: &str, exported: bool| RawField {
            name: name.to_string(),
            value: RawValue::primitive("int", "1"),
            is_exported: exported,
        };
        let raw = |fields: Vec<RawField>| RawValue::Struct(RawStruct { ty: "geo.Point".to_string(), value: fields });

        assert!(raw(vec![field("X", true), field("y", false)]).matches(&declared));
        assert!(!raw(vec![field("y", false), field("X", true)]).matches(&declared));
        assert!(!raw(vec![field("X", false), field("y", false)]).matches(&declared));
    }

    #[test]
    fn test_numeric_payloads_are_accepted() {
        let value: RawValue = serde_json::from_str(r#"{"type": "int", "value": 5}"#).unwrap();
        assert_eq!(value, RawValue::primitive("int", "5"));
    }
}
