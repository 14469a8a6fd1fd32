//! Traversal over value model trees
//!
//! Dispatch is an exhaustive `match` in [`ValueModel::accept`], so adding a
//! variant forces every visitor to handle it.

use super::types::{PrimitiveType, TypeId};
use super::values::{
    AggregateModel, ComplexModel, ConstructedModel, EnumConstantModel, Identity,
    IndexedCollectionModel, Modification, PrimitiveModel, Sign, ValueModel,
};
use crate::error::{ModelError, ModelResult};
use std::collections::BTreeSet;

pub trait ModelVisitor {
    type Output;

    fn visit_primitive(&mut self, model: &PrimitiveModel) -> Self::Output;
    fn visit_null(&mut self, ty: &TypeId) -> Self::Output;
    fn visit_void(&mut self) -> Self::Output;
    fn visit_enum_constant(&mut self, model: &EnumConstantModel) -> Self::Output;
    fn visit_class_reference(&mut self, target: &TypeId) -> Self::Output;
    fn visit_aggregate(&mut self, model: &AggregateModel) -> Self::Output;
    fn visit_indexed_collection(&mut self, model: &IndexedCollectionModel) -> Self::Output;
    fn visit_constructed(&mut self, model: &ConstructedModel) -> Self::Output;
    fn visit_nan(&mut self, ty: &TypeId) -> Self::Output;
    fn visit_infinity(&mut self, sign: Sign, ty: &TypeId) -> Self::Output;
    fn visit_complex(&mut self, model: &ComplexModel) -> Self::Output;
}

impl ValueModel {
    pub fn accept<V: ModelVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            ValueModel::Primitive(model) => visitor.visit_primitive(model),
            ValueModel::Null(ty) => visitor.visit_null(ty),
            ValueModel::Void => visitor.visit_void(),
            ValueModel::EnumConstant(model) => visitor.visit_enum_constant(model),
            ValueModel::ClassReference(target) => visitor.visit_class_reference(target),
            ValueModel::Aggregate(model) => visitor.visit_aggregate(model),
            ValueModel::IndexedCollection(model) => visitor.visit_indexed_collection(model),
            ValueModel::Constructed(model) => visitor.visit_constructed(model),
            ValueModel::FloatNaN(ty) => visitor.visit_nan(ty),
            ValueModel::FloatInfinity { sign, ty } => visitor.visit_infinity(*sign, ty),
            ValueModel::Complex(model) => visitor.visit_complex(model),
        }
    }

    /// All enum and constructed-object identities reachable from this model
    pub fn identities(&self) -> BTreeSet<Identity> {
        let mut collector = IdentityCollector::default();
        self.accept(&mut collector);
        collector.identities
    }

    /// Check that every composite's declared type agrees with its children
    pub fn check_consistency(&self) -> ModelResult<()> {
        self.accept(&mut ConsistencyChecker)
    }
}

/// Collects identities of enum constants and constructed objects
#[derive(Debug, Default)]
pub struct IdentityCollector {
    pub identities: BTreeSet<Identity>,
}

impl IdentityCollector {
    fn visit_all<'a>(&mut self, models: impl IntoIterator<Item = &'a ValueModel>) {
        for model in models {
            model.accept(self);
        }
    }
}

impl ModelVisitor for IdentityCollector {
    type Output = ();

    fn visit_primitive(&mut self, _model: &PrimitiveModel) {}

    fn visit_null(&mut self, _ty: &TypeId) {}

    fn visit_void(&mut self) {}

    fn visit_enum_constant(&mut self, model: &EnumConstantModel) {
        self.identities.insert(model.id);
    }

    fn visit_class_reference(&mut self, _target: &TypeId) {}

    fn visit_aggregate(&mut self, model: &AggregateModel) {
        self.visit_all(model.fields.iter().map(|field| &field.value));
    }

    fn visit_indexed_collection(&mut self, model: &IndexedCollectionModel) {
        self.visit_all(model.stores().values());
        model.default_value().accept(self);
    }

    fn visit_constructed(&mut self, model: &ConstructedModel) {
        self.identities.insert(model.id);
        self.visit_all(model.instantiation.arguments());
        for modification in &model.modifications {
            match modification {
                Modification::SetField { value, .. } => value.accept(self),
                Modification::Invoke(call) => self.visit_all(call.arguments()),
            }
        }
    }

    fn visit_nan(&mut self, _ty: &TypeId) {}

    fn visit_infinity(&mut self, _sign: Sign, _ty: &TypeId) {}

    fn visit_complex(&mut self, model: &ComplexModel) {
        model.real.accept(self);
        model.imaginary.accept(self);
    }
}

struct ConsistencyChecker;

impl ConsistencyChecker {
    fn inconsistent(ty: &TypeId, detail: impl Into<String>) -> ModelError {
        ModelError::Inconsistent {
            ty: ty.canonical_name(),
            detail: detail.into(),
        }
    }

    fn expect_floating(ty: &TypeId) -> ModelResult<()> {
        match ty.as_primitive() {
            Some(primitive) if primitive.is_floating() => Ok(()),
            _ => Err(Self::inconsistent(ty, "special float form on a non-float type")),
        }
    }

    fn element_matches(element: &TypeId, model: &ValueModel) -> bool {
        model.is_assignable_to(element)
    }
}

impl ModelVisitor for ConsistencyChecker {
    type Output = ModelResult<()>;

    fn visit_primitive(&mut self, model: &PrimitiveModel) -> ModelResult<()> {
        match model.ty.as_primitive() {
            Some(primitive) if model.value.fits(primitive) => Ok(()),
            _ => Err(Self::inconsistent(&model.ty, format!("literal {} does not fit", model.value))),
        }
    }

    fn visit_null(&mut self, ty: &TypeId) -> ModelResult<()> {
        if ty.accepts_null() {
            Ok(())
        } else {
            Err(Self::inconsistent(ty, "null of a non-nullable type"))
        }
    }

    fn visit_void(&mut self) -> ModelResult<()> {
        Ok(())
    }

    fn visit_enum_constant(&mut self, model: &EnumConstantModel) -> ModelResult<()> {
        match model.ty {
            TypeId::Enum(_) => Ok(()),
            _ => Err(Self::inconsistent(&model.ty, "enum constant of a non-enum type")),
        }
    }

    fn visit_class_reference(&mut self, _target: &TypeId) -> ModelResult<()> {
        Ok(())
    }

    fn visit_aggregate(&mut self, model: &AggregateModel) -> ModelResult<()> {
        let TypeId::Struct(structure) = &model.ty else {
            return Err(Self::inconsistent(&model.ty, "aggregate of a non-struct type"));
        };
        if structure.fields.len() != model.fields.len() {
            return Err(Self::inconsistent(&model.ty, "field count differs from declaration"));
        }
        for (declared, field) in structure.fields.iter().zip(&model.fields) {
            if declared.name != field.name || !field.value.is_assignable_to(&declared.ty) {
                return Err(Self::inconsistent(&model.ty, format!("field {} does not match", field.name)));
            }
            field.value.accept(self)?;
        }
        Ok(())
    }

    fn visit_indexed_collection(&mut self, model: &IndexedCollectionModel) -> ModelResult<()> {
        let TypeId::Array(array) = model.ty() else {
            return Err(Self::inconsistent(model.ty(), "indexed collection of a non-array type"));
        };
        let default = model.default_value();
        if !Self::element_matches(&array.element, default) {
            return Err(Self::inconsistent(model.ty(), "default element type differs"));
        }
        default.accept(self)?;
        for (index, element) in model.stores() {
            if !Self::element_matches(&array.element, element) {
                return Err(Self::inconsistent(model.ty(), format!("element {} type differs", index)));
            }
            element.accept(self)?;
        }
        Ok(())
    }

    fn visit_constructed(&mut self, model: &ConstructedModel) -> ModelResult<()> {
        if !model.instantiation.executable().is_constructor() {
            return Err(Self::inconsistent(&model.ty, "instantiation is not a constructor"));
        }
        for argument in model.instantiation.arguments() {
            argument.accept(self)?;
        }
        for modification in &model.modifications {
            match modification {
                Modification::SetField { field, value } => {
                    if !value.is_assignable_to(&field.ty) {
                        return Err(Self::inconsistent(&model.ty, format!("field {} assigned a mismatched value", field.name)));
                    }
                    value.accept(self)?;
                }
                Modification::Invoke(call) => {
                    for argument in call.arguments() {
                        argument.accept(self)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn visit_nan(&mut self, ty: &TypeId) -> ModelResult<()> {
        Self::expect_floating(ty)
    }

    fn visit_infinity(&mut self, _sign: Sign, ty: &TypeId) -> ModelResult<()> {
        Self::expect_floating(ty)
    }

    fn visit_complex(&mut self, model: &ComplexModel) -> ModelResult<()> {
        let component = model
            .ty
            .as_primitive()
            .and_then(PrimitiveType::complex_component)
            .ok_or_else(|| Self::inconsistent(&model.ty, "complex value of a non-complex type"))?;
        for part in [&model.real, &model.imaginary] {
            if part.declared_type() != &TypeId::Primitive(component) {
                return Err(Self::inconsistent(&model.ty, "complex component has the wrong width"));
            }
            part.accept(self)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{StructField, StructType};
    use crate::model::values::{FieldModel, Literal};

    fn point_type() -> TypeId {
        TypeId::Struct(StructType {
            name: "geo.Point".to_string(),
            fields: vec![
                StructField { name: "x".to_string(), ty: PrimitiveType::Int.into(), exported: true },
                StructField { name: "y".to_string(), ty: PrimitiveType::Int.into(), exported: false },
            ],
        })
    }

    #[test]
    fn test_consistent_aggregate_passes() {
        let model = ValueModel::Aggregate(AggregateModel {
            ty: point_type(),
            fields: vec![
                FieldModel { name: "x".to_string(), value: ValueModel::int(1, PrimitiveType::Int) },
                FieldModel { name: "y".to_string(), value: ValueModel::int(2, PrimitiveType::Int) },
            ],
        });
        assert!(model.check_consistency().is_ok());
    }

    #[test]
    fn test_aggregate_with_swapped_fields_is_inconsistent() {
        let model = ValueModel::Aggregate(AggregateModel {
            ty: point_type(),
            fields: vec![
                FieldModel { name: "y".to_string(), value: ValueModel::int(2, PrimitiveType::Int) },
                FieldModel { name: "x".to_string(), value: ValueModel::int(1, PrimitiveType::Int) },
            ],
        });
        assert!(matches!(model.check_consistency(), Err(ModelError::Inconsistent { .. })));
    }

    #[test]
    fn test_nan_on_integer_type_is_inconsistent() {
        let model = ValueModel::FloatNaN(PrimitiveType::Int64.into());
        assert!(model.check_consistency().is_err());
    }

    #[test]
    fn test_narrow_complex_components_are_required() {
        let model = ValueModel::Complex(ComplexModel {
            real: Box::new(ValueModel::primitive(Literal::Float(1.0), PrimitiveType::Float64)),
            imaginary: Box::new(ValueModel::primitive(Literal::Float(2.0), PrimitiveType::Float64)),
            ty: PrimitiveType::Complex64.into(),
        });
        assert!(model.check_consistency().is_err());
    }
}
