//! Providers for primitive parameters that need no hints
//!
//! `PrimitivesProvider` emits a small canonical set per primitive type: the
//! zero value, unit steps, type boundaries and the special float forms.
//! `PrimitiveDefaultsProvider` emits exactly the zero value and is the
//! terminal provider of the construction planner.

use super::{primitive_parameters, FuzzedParameter, FuzzedValue, ParameterValues, ValueProvider};
use crate::description::CallableDescription;
use crate::model::{ComplexModel, Literal, PrimitiveType, Sign, TypeId, ValueModel};

#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitivesProvider;

impl ValueProvider for PrimitivesProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        Box::new(primitive_parameters(description).flat_map(|(index, primitive)| {
            canonical_values(primitive)
                .into_iter()
                .map(move |value| FuzzedParameter::new(index, value))
        }))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveDefaultsProvider;

impl ValueProvider for PrimitiveDefaultsProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        Box::new(primitive_parameters(description).filter_map(|(index, primitive)| {
            ValueModel::zero_of(&TypeId::Primitive(primitive)).map(|model| {
                FuzzedParameter::new(index, FuzzedValue::with_summary(model, "%var% = default"))
            })
        }))
    }
}

fn named(model: ValueModel, name: &str) -> FuzzedValue {
    FuzzedValue::with_summary(model, format!("%var% = {}", name))
}

/// The canonical candidates for one primitive type
pub fn canonical_values(primitive: PrimitiveType) -> Vec<FuzzedValue> {
    if let Some((min, max)) = primitive.integral_range() {
        let mut values = vec![
            named(ValueModel::int(0, primitive), "0"),
            named(ValueModel::int(1, primitive), "1"),
        ];
        if min < 0 {
            values.push(named(ValueModel::int(-1, primitive), "-1"));
            values.push(named(ValueModel::int(min, primitive), "min"));
        }
        values.push(named(ValueModel::int(max, primitive), "max"));
        return values;
    }

    match primitive {
        PrimitiveType::Bool => vec![
            named(ValueModel::bool(true), "true"),
            named(ValueModel::bool(false), "false"),
        ],
        PrimitiveType::Float32 | PrimitiveType::Float64 => float_values(primitive),
        PrimitiveType::Complex64 | PrimitiveType::Complex128 => complex_values(primitive),
        PrimitiveType::Char => vec![
            named(ValueModel::primitive(Literal::Char('\0'), primitive), "'\\0'"),
            named(ValueModel::primitive(Literal::Char('a'), primitive), "'a'"),
            named(ValueModel::primitive(Literal::Char(char::MAX), primitive), "max"),
        ],
        PrimitiveType::String => vec![
            named(ValueModel::string(""), "\"\""),
            named(ValueModel::string("   "), "blank"),
            named(ValueModel::string("string"), "\"string\""),
            named(ValueModel::string("\n\t\r"), "whitespace"),
        ],
        // Integral types are handled above.
        _ => Vec::new(),
    }
}

fn float_values(primitive: PrimitiveType) -> Vec<FuzzedValue> {
    let ty = TypeId::Primitive(primitive);
    let (max, min_positive) = match primitive {
        PrimitiveType::Float32 => (f32::MAX as f64, f32::MIN_POSITIVE as f64),
        _ => (f64::MAX, f64::MIN_POSITIVE),
    };
    let float = |value: f64| ValueModel::primitive(Literal::Float(value), primitive);
    vec![
        named(float(0.0), "0.0"),
        named(float(1.0), "1.0"),
        named(float(-1.0), "-1.0"),
        named(float(min_positive), "min positive"),
        named(float(max), "max"),
        named(float(-max), "-max"),
        named(ValueModel::FloatNaN(ty.clone()), "NaN"),
        named(ValueModel::FloatInfinity { sign: Sign::Positive, ty: ty.clone() }, "+Inf"),
        named(ValueModel::FloatInfinity { sign: Sign::Negative, ty }, "-Inf"),
    ]
}

fn complex_values(primitive: PrimitiveType) -> Vec<FuzzedValue> {
    let Some(component) = primitive.complex_component() else {
        return Vec::new();
    };
    let complex = |real: f64, imaginary: f64| {
        ValueModel::Complex(ComplexModel {
            real: Box::new(ValueModel::primitive(Literal::Float(real), component)),
            imaginary: Box::new(ValueModel::primitive(Literal::Float(imaginary), component)),
            ty: TypeId::Primitive(primitive),
        })
    };
    vec![
        named(complex(0.0, 0.0), "0"),
        named(complex(1.0, 0.0), "1"),
        named(complex(0.0, 1.0), "i"),
        named(complex(-1.0, -1.0), "-1-i"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::collect;

    #[test]
    fn test_boolean_generates_exactly_true_and_false() {
        let description = CallableDescription::new("f", vec![PrimitiveType::Bool.into()]);
        let models = collect(&PrimitivesProvider, &description);

        assert_eq!(models.len(), 1);
        assert_eq!(models[&0], vec![ValueModel::bool(true), ValueModel::bool(false)]);
    }

    #[test]
    fn test_unsigned_types_have_no_negative_values() {
        for value in canonical_values(PrimitiveType::UInt16) {
            let Some(Literal::Integer(value)) = value.model.as_primitive() else {
                panic!("expected an integer literal");
            };
            assert!(*value >= 0);
        }
    }

    #[test]
    fn test_float_candidates_use_special_forms() {
        let values = canonical_values(PrimitiveType::Float64);
        assert!(values.iter().any(|value| matches!(value.model, ValueModel::FloatNaN(_))));
        assert!(values.iter().all(|value| match value.model.as_primitive() {
            Some(Literal::Float(x)) => x.is_finite(),
            _ => true,
        }));
    }

    #[test]
    fn test_every_canonical_value_is_consistent() {
        for primitive in PrimitiveType::ALL {
            let values = canonical_values(primitive);
            assert!(!values.is_empty(), "{} has no canonical values", primitive);
            for value in values {
                value.model.check_consistency().unwrap();
            }
        }
    }

    #[test]
    fn test_defaults_are_single_zero_values() {
        let description = CallableDescription::new(
            "f",
            vec![PrimitiveType::Int8.into(), PrimitiveType::String.into(), TypeId::object("A")],
        );
        let models = collect(&PrimitiveDefaultsProvider, &description);

        assert_eq!(models.len(), 2);
        assert_eq!(models[&0], vec![ValueModel::int(0, PrimitiveType::Int8)]);
        assert_eq!(models[&1], vec![ValueModel::string("")]);
    }
}
