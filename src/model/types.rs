//! Declared types for value models
//!
//! A `TypeId` is the declared type carried by every value model. Primitive
//! types are closed and known to the crate; object and enum types are only
//! names here and are resolved through a [`TypeCatalog`](crate::catalog::TypeCatalog)
//! during generation. Struct, array and interface types carry their full
//! structure because the result decoder type-checks against them directly.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Primitive (scalar) types, including strings and complex numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Int,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt,
    UIntPtr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Unsigned 8-bit byte
    Byte,
    /// Unicode scalar value
    Char,
    String,
}

static BY_SIMPLE_NAME: Lazy<HashMap<&'static str, PrimitiveType>> = Lazy::new(|| {
    PrimitiveType::ALL
        .iter()
        .map(|primitive| (primitive.simple_name(), *primitive))
        .collect()
});

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 19] = [
        PrimitiveType::Bool,
        PrimitiveType::Int8,
        PrimitiveType::Int16,
        PrimitiveType::Int32,
        PrimitiveType::Int64,
        PrimitiveType::Int,
        PrimitiveType::UInt8,
        PrimitiveType::UInt16,
        PrimitiveType::UInt32,
        PrimitiveType::UInt64,
        PrimitiveType::UInt,
        PrimitiveType::UIntPtr,
        PrimitiveType::Float32,
        PrimitiveType::Float64,
        PrimitiveType::Complex64,
        PrimitiveType::Complex128,
        PrimitiveType::Byte,
        PrimitiveType::Char,
        PrimitiveType::String,
    ];

    /// Name used by raw execution records and canonical type names
    pub fn simple_name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Int => "int",
            PrimitiveType::UInt8 => "uint8",
            PrimitiveType::UInt16 => "uint16",
            PrimitiveType::UInt32 => "uint32",
            PrimitiveType::UInt64 => "uint64",
            PrimitiveType::UInt => "uint",
            PrimitiveType::UIntPtr => "uintptr",
            PrimitiveType::Float32 => "float32",
            PrimitiveType::Float64 => "float64",
            PrimitiveType::Complex64 => "complex64",
            PrimitiveType::Complex128 => "complex128",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::String => "string",
        }
    }

    pub fn from_simple_name(name: &str) -> Option<PrimitiveType> {
        BY_SIMPLE_NAME.get(name).copied()
    }

    pub fn is_integral(self) -> bool {
        self.integral_range().is_some()
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimitiveType::Float32 | PrimitiveType::Float64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, PrimitiveType::Complex64 | PrimitiveType::Complex128)
    }

    /// Inclusive value range of integral types; platform-sized integers are 64-bit
    pub fn integral_range(self) -> Option<(i128, i128)> {
        let range = match self {
            PrimitiveType::Int8 => (i8::MIN as i128, i8::MAX as i128),
            PrimitiveType::Int16 => (i16::MIN as i128, i16::MAX as i128),
            PrimitiveType::Int32 => (i32::MIN as i128, i32::MAX as i128),
            PrimitiveType::Int64 | PrimitiveType::Int => (i64::MIN as i128, i64::MAX as i128),
            PrimitiveType::UInt8 | PrimitiveType::Byte => (0, u8::MAX as i128),
            PrimitiveType::UInt16 => (0, u16::MAX as i128),
            PrimitiveType::UInt32 => (0, u32::MAX as i128),
            PrimitiveType::UInt64 | PrimitiveType::UInt | PrimitiveType::UIntPtr => {
                (0, u64::MAX as i128)
            }
            _ => return None,
        };
        Some(range)
    }

    /// Float type of each component of a complex type
    pub fn complex_component(self) -> Option<PrimitiveType> {
        match self {
            PrimitiveType::Complex64 => Some(PrimitiveType::Float32),
            PrimitiveType::Complex128 => Some(PrimitiveType::Float64),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// A named field of a struct type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: TypeId,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<StructField>,
}

/// Array type; `length` is `None` for arrays whose length is chosen per value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayType {
    pub element: Box<TypeId>,
    pub length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceType {
    pub name: String,
    pub implements_error: bool,
}

/// Declared type of a value model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum TypeId {
    Void,
    Primitive(PrimitiveType),
    /// Class-like reference type described by the type catalog
    Object(String),
    Enum(String),
    /// The reflective "type object" type
    ClassRef,
    Struct(StructType),
    Array(ArrayType),
    Interface(InterfaceType),
}

impl TypeId {
    pub fn object(name: impl Into<String>) -> Self {
        TypeId::Object(name.into())
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        TypeId::Enum(name.into())
    }

    pub fn array_of(element: TypeId, length: Option<usize>) -> Self {
        TypeId::Array(ArrayType {
            element: Box::new(element),
            length,
        })
    }

    pub fn error_interface(name: impl Into<String>) -> Self {
        TypeId::Interface(InterfaceType {
            name: name.into(),
            implements_error: true,
        })
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            TypeId::Primitive(primitive) => Some(*primitive),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeId::Primitive(_))
    }

    /// Interface-like types are the only ones a missing raw value may stand for
    pub fn is_interface_like(&self) -> bool {
        matches!(self, TypeId::Interface(_))
    }

    pub fn is_error_like(&self) -> bool {
        matches!(self, TypeId::Interface(interface) if interface.implements_error)
    }

    /// Whether a `Null` model is a valid value of this type.
    ///
    /// Scalars (strings excepted), structs and `void` never accept null.
    pub fn accepts_null(&self) -> bool {
        match self {
            TypeId::Primitive(PrimitiveType::String) => true,
            TypeId::Primitive(_) | TypeId::Struct(_) | TypeId::Void => false,
            TypeId::Object(_)
            | TypeId::Enum(_)
            | TypeId::ClassRef
            | TypeId::Array(_)
            | TypeId::Interface(_) => true,
        }
    }

    pub fn canonical_name(&self) -> String {
        match self {
            TypeId::Void => "void".to_string(),
            TypeId::Primitive(primitive) => primitive.simple_name().to_string(),
            TypeId::Object(name) | TypeId::Enum(name) => name.clone(),
            TypeId::ClassRef => "class".to_string(),
            TypeId::Struct(structure) => structure.name.clone(),
            TypeId::Array(array) => match array.length {
                Some(length) => format!("[{}]{}", length, array.element.canonical_name()),
                None => format!("[]{}", array.element.canonical_name()),
            },
            TypeId::Interface(interface) => interface.name.clone(),
        }
    }
}

impl From<PrimitiveType> for TypeId {
    fn from(primitive: PrimitiveType) -> Self {
        TypeId::Primitive(primitive)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_names_round_trip_for_every_primitive() {
        for primitive in PrimitiveType::ALL {
            assert_eq!(PrimitiveType::from_simple_name(primitive.simple_name()), Some(primitive));
        }
        assert_eq!(PrimitiveType::from_simple_name("pkg.Struct"), None);
    }

    #[test]
    fn test_canonical_array_name() {
        let ty = TypeId::array_of(TypeId::array_of(PrimitiveType::Int.into(), Some(2)), Some(3));
        assert_eq!(ty.canonical_name(), "[3][2]int");
    }

    #[test]
    fn test_null_acceptance() {
        assert!(!TypeId::Primitive(PrimitiveType::Int32).accepts_null());
        assert!(TypeId::Primitive(PrimitiveType::String).accepts_null());
        assert!(TypeId::object("A").accepts_null());
        assert!(TypeId::error_interface("error").accepts_null());
        assert!(!TypeId::Void.accepts_null());
    }

    #[test]
    fn test_complex_components() {
        assert_eq!(PrimitiveType::Complex64.complex_component(), Some(PrimitiveType::Float32));
        assert_eq!(PrimitiveType::Complex128.complex_component(), Some(PrimitiveType::Float64));
        assert_eq!(PrimitiveType::Float64.complex_component(), None);
    }
}
