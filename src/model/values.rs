//! The value model tree
//!
//! Value models are immutable once built. Every variant carries its declared
//! type; the builders on [`Call`] and [`IndexedCollectionModel`] enforce the
//! structural invariants that cannot be expressed in the types themselves.

use super::types::{PrimitiveType, TypeId};
use crate::error::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const VOID_TYPE: &TypeId = &TypeId::Void;
const CLASS_REF_TYPE: &TypeId = &TypeId::ClassRef;

/// Stable integer identity assigned by an identity generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(pub u64);

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar payload of a primitive model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    Integer(i128),
    Float(f64),
    Char(char),
    String(String),
}

// Floats compare bitwise so that -0.0 and 0.0 stay distinct and hashing is total.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::Bool(a), Literal::Bool(b)) => a == b,
            (Literal::Integer(a), Literal::Integer(b)) => a == b,
            (Literal::Float(a), Literal::Float(b)) => a.to_bits() == b.to_bits(),
            (Literal::Char(a), Literal::Char(b)) => a == b,
            (Literal::String(a), Literal::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl std::hash::Hash for Literal {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Literal::Bool(b) => {
                0u8.hash(state);
                b.hash(state);
            }
            Literal::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Literal::Float(f) => {
                2u8.hash(state);
                f.to_bits().hash(state);
            }
            Literal::Char(c) => {
                3u8.hash(state);
                c.hash(state);
            }
            Literal::String(s) => {
                4u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl Literal {
    /// Whether this literal is a valid representation of `primitive`
    pub fn fits(&self, primitive: PrimitiveType) -> bool {
        match self {
            Literal::Bool(_) => primitive == PrimitiveType::Bool,
            Literal::Integer(value) => match primitive.integral_range() {
                Some((min, max)) => (min..=max).contains(value),
                None => false,
            },
            Literal::Float(_) => primitive.is_floating(),
            Literal::Char(_) => primitive == PrimitiveType::Char,
            Literal::String(_) => primitive == PrimitiveType::String,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Char(c) => write!(f, "{:?}", c),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// Whether emitted code must convert a literal to its exact width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CastMode {
    #[default]
    Implicit,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutableKind {
    Constructor,
    Method,
}

/// Constructor or method identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutableId {
    pub declaring_type: String,
    pub name: String,
    pub kind: ExecutableKind,
    pub parameters: Vec<TypeId>,
}

impl ExecutableId {
    pub const CONSTRUCTOR_NAME: &'static str = "<init>";

    pub fn constructor(declaring_type: impl Into<String>, parameters: Vec<TypeId>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: Self::CONSTRUCTOR_NAME.to_string(),
            kind: ExecutableKind::Constructor,
            parameters,
        }
    }

    pub fn method(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<TypeId>,
    ) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            kind: ExecutableKind::Method,
            parameters,
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.kind == ExecutableKind::Constructor
    }
}

impl fmt::Display for ExecutableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters: Vec<String> = self.parameters.iter().map(TypeId::canonical_name).collect();
        write!(f, "{}.{}({})", self.declaring_type, self.name, parameters.join(", "))
    }
}

/// An executable together with the argument models it is invoked with
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Call {
    executable: ExecutableId,
    arguments: Vec<ValueModel>,
}

impl Call {
    /// Build a call, checking argument count and argument types against the
    /// executable's declared parameters.
    pub fn new(executable: ExecutableId, arguments: Vec<ValueModel>) -> ModelResult<Self> {
        if executable.parameters.len() != arguments.len() {
            return Err(ModelError::ArgumentCount {
                executable: executable.to_string(),
                expected: executable.parameters.len(),
                actual: arguments.len(),
            });
        }
        for (position, (parameter, argument)) in
            executable.parameters.iter().zip(&arguments).enumerate()
        {
            if !argument.is_assignable_to(parameter) {
                return Err(ModelError::ArgumentType {
                    executable: executable.to_string(),
                    position,
                    expected: parameter.canonical_name(),
                    actual: argument.declared_type().canonical_name(),
                });
            }
        }
        Ok(Self { executable, arguments })
    }

    pub fn executable(&self) -> &ExecutableId {
        &self.executable
    }

    pub fn arguments(&self) -> &[ValueModel] {
        &self.arguments
    }
}

/// Field identity used by direct field assignments
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldId {
    pub declaring_type: String,
    pub name: String,
    pub ty: TypeId,
}

/// A post-construction step of a constructed object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Modification {
    SetField { field: FieldId, value: ValueModel },
    Invoke(Call),
}

impl Modification {
    /// Name of the field or setter this modification targets
    pub fn target_name(&self) -> &str {
        match self {
            Modification::SetField { field, .. } => &field.name,
            Modification::Invoke(call) => &call.executable().name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrimitiveModel {
    pub value: Literal,
    pub ty: TypeId,
    pub cast: CastMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumConstantModel {
    pub ty: TypeId,
    pub name: String,
    pub ordinal: u32,
    pub id: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldModel {
    pub name: String,
    pub value: ValueModel,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateModel {
    pub ty: TypeId,
    pub fields: Vec<FieldModel>,
}

impl AggregateModel {
    pub fn field(&self, name: &str) -> Option<&ValueModel> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }
}

/// Sparse indexed collection; indices without a store take `default`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexedCollectionModel {
    ty: TypeId,
    length: usize,
    stores: BTreeMap<usize, ValueModel>,
    default: Box<ValueModel>,
}

impl IndexedCollectionModel {
    pub fn new(
        ty: TypeId,
        length: usize,
        stores: BTreeMap<usize, ValueModel>,
        default: ValueModel,
    ) -> ModelResult<Self> {
        if let TypeId::Array(array) = &ty {
            if let Some(declared) = array.length {
                if declared != length {
                    return Err(ModelError::LengthMismatch { declared, actual: length });
                }
            }
        }
        if let Some((&index, _)) = stores.range(length..).next() {
            return Err(ModelError::StoreOutOfBounds { index, length });
        }
        Ok(Self {
            ty,
            length,
            stores,
            default: Box::new(default),
        })
    }

    pub fn ty(&self) -> &TypeId {
        &self.ty
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn stores(&self) -> &BTreeMap<usize, ValueModel> {
        &self.stores
    }

    pub fn default_value(&self) -> &ValueModel {
        &self.default
    }

    /// Element at `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<&ValueModel> {
        if index >= self.length {
            return None;
        }
        Some(self.stores.get(&index).unwrap_or(&self.default))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructedModel {
    pub ty: TypeId,
    pub id: Identity,
    pub instantiation: Call,
    pub modifications: Vec<Modification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn as_i8(self) -> i8 {
        match self {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComplexModel {
    pub real: Box<ValueModel>,
    pub imaginary: Box<ValueModel>,
    pub ty: TypeId,
}

/// One concrete value for test generation purposes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueModel {
    Primitive(PrimitiveModel),
    Null(TypeId),
    Void,
    EnumConstant(EnumConstantModel),
    ClassReference(TypeId),
    Aggregate(AggregateModel),
    IndexedCollection(IndexedCollectionModel),
    Constructed(ConstructedModel),
    FloatNaN(TypeId),
    FloatInfinity { sign: Sign, ty: TypeId },
    Complex(ComplexModel),
}

impl ValueModel {
    pub fn primitive(value: Literal, primitive: PrimitiveType) -> Self {
        ValueModel::Primitive(PrimitiveModel {
            value,
            ty: TypeId::Primitive(primitive),
            cast: CastMode::Implicit,
        })
    }

    pub fn bool(value: bool) -> Self {
        Self::primitive(Literal::Bool(value), PrimitiveType::Bool)
    }

    pub fn int(value: i128, primitive: PrimitiveType) -> Self {
        Self::primitive(Literal::Integer(value), primitive)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::primitive(Literal::String(value.into()), PrimitiveType::String)
    }

    pub fn declared_type(&self) -> &TypeId {
        match self {
            ValueModel::Primitive(model) => &model.ty,
            ValueModel::Null(ty) => ty,
            ValueModel::Void => VOID_TYPE,
            ValueModel::EnumConstant(model) => &model.ty,
            ValueModel::ClassReference(_) => CLASS_REF_TYPE,
            ValueModel::Aggregate(model) => &model.ty,
            ValueModel::IndexedCollection(model) => model.ty(),
            ValueModel::Constructed(model) => &model.ty,
            ValueModel::FloatNaN(ty) => ty,
            ValueModel::FloatInfinity { ty, .. } => ty,
            ValueModel::Complex(model) => &model.ty,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ValueModel::Null(_))
    }

    pub fn as_primitive(&self) -> Option<&Literal> {
        match self {
            ValueModel::Primitive(model) => Some(&model.value),
            _ => None,
        }
    }

    pub fn as_constructed(&self) -> Option<&ConstructedModel> {
        match self {
            ValueModel::Constructed(model) => Some(model),
            _ => None,
        }
    }

    /// Whether this model may be passed where `parameter` is declared.
    ///
    /// Types must match exactly; `Null` models are also accepted by any
    /// parameter type that accepts null.
    pub fn is_assignable_to(&self, parameter: &TypeId) -> bool {
        match self {
            ValueModel::Null(_) => parameter.accepts_null(),
            _ => self.declared_type() == parameter,
        }
    }

    /// The zero value of `ty`: the primitive default, `Null` for nullable
    /// types, and `None` for types that have neither.
    pub fn zero_of(ty: &TypeId) -> Option<ValueModel> {
        let primitive = match ty {
            TypeId::Primitive(primitive) => *primitive,
            TypeId::Void => return Some(ValueModel::Void),
            other if other.accepts_null() => return Some(ValueModel::Null(other.clone())),
            _ => return None,
        };
        let model = match primitive {
            PrimitiveType::Bool => ValueModel::bool(false),
            PrimitiveType::Float32 | PrimitiveType::Float64 => {
                ValueModel::primitive(Literal::Float(0.0), primitive)
            }
            PrimitiveType::Complex64 | PrimitiveType::Complex128 => {
                let component = primitive.complex_component()?;
                ValueModel::Complex(ComplexModel {
                    real: Box::new(ValueModel::primitive(Literal::Float(0.0), component)),
                    imaginary: Box::new(ValueModel::primitive(Literal::Float(0.0), component)),
                    ty: TypeId::Primitive(primitive),
                })
            }
            PrimitiveType::Char => ValueModel::primitive(Literal::Char('\0'), primitive),
            PrimitiveType::String => ValueModel::string(""),
            integral => ValueModel::int(0, integral),
        };
        Some(model)
    }
}

impl fmt::Display for ValueModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueModel::Primitive(model) => write!(f, "{}", model.value),
            ValueModel::Null(_) => write!(f, "null"),
            ValueModel::Void => write!(f, "void"),
            ValueModel::EnumConstant(model) => write!(f, "{}.{}", model.ty, model.name),
            ValueModel::ClassReference(target) => write!(f, "{}.class", target),
            ValueModel::Aggregate(model) => {
                let fields: Vec<String> = model
                    .fields
                    .iter()
                    .map(|field| format!("{}: {}", field.name, field.value))
                    .collect();
                write!(f, "{}{{{}}}", model.ty, fields.join(", "))
            }
            ValueModel::IndexedCollection(model) => {
                write!(f, "{}(len {}, default {})", model.ty(), model.length(), model.default_value())
            }
            ValueModel::Constructed(model) => {
                let arguments: Vec<String> =
                    model.instantiation.arguments().iter().map(ToString::to_string).collect();
                write!(f, "new {}({})", model.instantiation.executable().declaring_type, arguments.join(", "))?;
                for modification in &model.modifications {
                    write!(f, ".{}", modification.target_name())?;
                }
                Ok(())
            }
            ValueModel::FloatNaN(_) => write!(f, "NaN"),
            ValueModel::FloatInfinity { sign: Sign::Positive, .. } => write!(f, "+Inf"),
            ValueModel::FloatInfinity { sign: Sign::Negative, .. } => write!(f, "-Inf"),
            ValueModel::Complex(model) => write!(f, "complex({}, {})", model.real, model.imaginary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_ctor(arity: usize) -> ExecutableId {
        ExecutableId::constructor("A", vec![PrimitiveType::Int32.into(); arity])
    }

    #[test]
    fn test_call_rejects_wrong_argument_count() {
        let err = Call::new(int_ctor(2), vec![ValueModel::int(1, PrimitiveType::Int32)]).unwrap_err();
        assert!(matches!(err, ModelError::ArgumentCount { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_call_rejects_null_for_primitive_parameter() {
        let err = Call::new(int_ctor(1), vec![ValueModel::Null(TypeId::object("A"))]).unwrap_err();
        assert!(matches!(err, ModelError::ArgumentType { position: 0, .. }));
    }

    #[test]
    fn test_call_accepts_null_for_reference_parameter() {
        let ctor = ExecutableId::constructor("A", vec![TypeId::object("A")]);
        let call = Call::new(ctor, vec![ValueModel::Null(TypeId::object("A"))]).unwrap();
        assert_eq!(call.arguments().len(), 1);
    }

    #[test]
    fn test_indexed_collection_reads_default_for_missing_stores() {
        let ty = TypeId::array_of(PrimitiveType::Int.into(), Some(3));
        let mut stores = BTreeMap::new();
        stores.insert(1, ValueModel::int(7, PrimitiveType::Int));
        let model = IndexedCollectionModel::new(ty, 3, stores, ValueModel::int(0, PrimitiveType::Int)).unwrap();

        assert_eq!(model.get(0), Some(&ValueModel::int(0, PrimitiveType::Int)));
        assert_eq!(model.get(1), Some(&ValueModel::int(7, PrimitiveType::Int)));
        assert_eq!(model.get(3), None);
    }

    #[test]
    fn test_indexed_collection_rejects_out_of_bounds_store() {
        let ty = TypeId::array_of(PrimitiveType::Int.into(), None);
        let mut stores = BTreeMap::new();
        stores.insert(2, ValueModel::int(7, PrimitiveType::Int));
        let err = IndexedCollectionModel::new(ty, 2, stores, ValueModel::int(0, PrimitiveType::Int)).unwrap_err();
        assert!(matches!(err, ModelError::StoreOutOfBounds { index: 2, length: 2 }));
    }

    #[test]
    fn test_float_literals_compare_bitwise() {
        assert_ne!(Literal::Float(0.0), Literal::Float(-0.0));
        assert_eq!(Literal::Float(1.5), Literal::Float(1.5));
    }

    #[test]
    fn test_integer_literal_range_check() {
        assert!(Literal::Integer(255).fits(PrimitiveType::Byte));
        assert!(!Literal::Integer(256).fits(PrimitiveType::Byte));
        assert!(!Literal::Integer(-1).fits(PrimitiveType::UInt64));
    }
}
