//! Result decoding
//!
//! [`ResultDecoder`] turns one [`RawExecutionRecord`] into an
//! [`ExecutionOutcome`]. Timeouts and abnormal terminations are outcomes,
//! not errors. For completed executions every raw value is type-checked
//! against its declared result type before any model is built, so a failed
//! decode never yields a partial result.
//!
//! Floats decode the reserved `NaN`, `+Inf` and `-Inf` tokens to their
//! special model forms. Complex values are two float tokens joined by `@`;
//! `complex64` components are marked as needing an explicit narrowing cast.

pub mod outcome;
pub mod raw;

pub use self::outcome::ExecutionOutcome;
pub use self::raw::{RawArray, RawExecutionRecord, RawField, RawPanic, RawPrimitive, RawStruct, RawValue};

use crate::error::{DecodeError, DecodeResult};
use crate::model::{
    AggregateModel, ArrayType, CastMode, ComplexModel, FieldModel, IndexedCollectionModel, Literal,
    PrimitiveModel, PrimitiveType, Sign, StructType, TypeId, ValueModel,
};
use std::collections::BTreeMap;
use std::time::Duration;

const NAN: &str = "NaN";
const POSITIVE_INFINITY: &str = "+Inf";
const NEGATIVE_INFINITY: &str = "-Inf";
const COMPLEX_DELIMITER: char = '@';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultDecoder {
    timeout: Duration,
}

impl ResultDecoder {
    /// `timeout` is the limit the execution ran under; timed-out outcomes report it
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn decode_json(&self, json: &str, result_types: &[TypeId]) -> DecodeResult<ExecutionOutcome> {
        let record = RawExecutionRecord::from_json(json)?;
        self.decode(&record, result_types)
    }

    pub fn decode(&self, record: &RawExecutionRecord, result_types: &[TypeId]) -> DecodeResult<ExecutionOutcome> {
        if record.timeout_exceeded {
            log::debug!("execution timed out after {:?}", self.timeout);
            return Ok(ExecutionOutcome::TimedOut {
                timeout: self.timeout,
                trace: record.trace.clone(),
            });
        }

        if let Some(panic) = &record.panic_message {
            let value = decode_panic_value(&panic.raw_result_value)?;
            log::debug!("execution terminated abnormally with {}", value);
            return Ok(ExecutionOutcome::AbnormalTermination {
                value,
                implements_error: panic.implements_error,
                trace: record.trace.clone(),
            });
        }

        if record.raw_result_values.len() != result_types.len() {
            return Err(DecodeError::ResultShapeMismatch {
                expected: result_types.len(),
                actual: record.raw_result_values.len(),
            });
        }

        for (raw, declared) in record.raw_result_values.iter().zip(result_types) {
            type_check(raw.as_ref(), declared)?;
        }

        let mut non_nil_error = false;
        let mut values = Vec::with_capacity(result_types.len());
        for (raw, declared) in record.raw_result_values.iter().zip(result_types) {
            if declared.is_error_like() && raw.is_some() {
                non_nil_error = true;
            }
            values.push(decode_value(raw.as_ref(), declared)?);
        }

        let trace = record.trace.clone();
        let outcome = if non_nil_error {
            ExecutionOutcome::CompletedWithNonNilError { values, trace }
        } else {
            ExecutionOutcome::Success { values, trace }
        };
        log::debug!("execution decoded as {}", outcome.kind());
        Ok(outcome)
    }
}

fn type_check(raw: Option<&RawValue>, declared: &TypeId) -> DecodeResult<()> {
    let matches = match raw {
        None => declared.is_interface_like(),
        Some(raw) => raw.matches(declared),
    };
    if matches {
        return Ok(());
    }
    let actual = raw.map_or("nil", RawValue::type_name).to_string();
    log::warn!("result of type {} does not match declared {}", actual, declared);
    Err(DecodeError::TypeMismatch {
        expected: declared.canonical_name(),
        actual,
    })
}

fn decode_panic_value(raw: &RawValue) -> DecodeResult<ValueModel> {
    match raw {
        RawValue::Primitive(primitive) => {
            let ty = PrimitiveType::from_simple_name(&primitive.ty)
                .ok_or_else(|| DecodeError::UnsupportedVariant(primitive.ty.clone()))?;
            decode_primitive(&primitive.value, ty)
        }
        other => Err(DecodeError::UnsupportedVariant(format!(
            "abnormal termination with non-primitive value of type {}",
            other.type_name()
        ))),
    }
}

fn decode_value(raw: Option<&RawValue>, declared: &TypeId) -> DecodeResult<ValueModel> {
    match (raw, declared) {
        (None, TypeId::Interface(_)) => Ok(ValueModel::Null(declared.clone())),
        // An error's message is all the worker reports about it.
        (Some(RawValue::Primitive(primitive)), TypeId::Interface(_)) => Ok(ValueModel::string(primitive.value.clone())),
        (Some(RawValue::Primitive(primitive)), TypeId::Primitive(ty)) => decode_primitive(&primitive.value, *ty),
        (Some(RawValue::Struct(structure)), TypeId::Struct(declared_struct)) => {
            decode_struct(structure, declared, declared_struct)
        }
        (Some(RawValue::Array(array)), TypeId::Array(declared_array)) => decode_array(array, declared, declared_array),
        (raw, _) => Err(DecodeError::UnsupportedVariant(format!(
            "{} as {}",
            raw.map_or("nil", RawValue::type_name),
            declared
        ))),
    }
}

fn decode_struct(raw: &RawStruct, declared: &TypeId, structure: &StructType) -> DecodeResult<ValueModel> {
    let fields = raw
        .value
        .iter()
        .zip(&structure.fields)
        .map(|(field, declared_field)| {
            Ok(FieldModel {
                name: declared_field.name.clone(),
                value: decode_value(Some(&field.value), &declared_field.ty)?,
            })
        })
        .collect::<DecodeResult<Vec<_>>>()?;
    Ok(ValueModel::Aggregate(AggregateModel {
        ty: declared.clone(),
        fields,
    }))
}

fn decode_array(raw: &RawArray, declared: &TypeId, array: &ArrayType) -> DecodeResult<ValueModel> {
    let stores = raw
        .value
        .iter()
        .enumerate()
        .map(|(index, element)| Ok((index, decode_value(Some(element), &array.element)?)))
        .collect::<DecodeResult<BTreeMap<_, _>>>()?;
    let default = zero_value(&array.element)
        .ok_or_else(|| DecodeError::UnsupportedVariant(format!("array of {}", array.element)))?;
    let model = IndexedCollectionModel::new(declared.clone(), raw.length, stores, default).map_err(|err| {
        DecodeError::TypeMismatch {
            expected: declared.canonical_name(),
            actual: err.to_string(),
        }
    })?;
    Ok(ValueModel::IndexedCollection(model))
}

/// Zero value of a result type; structs and sized arrays are zeroed field by field
fn zero_value(ty: &TypeId) -> Option<ValueModel> {
    match ty {
        TypeId::Struct(structure) => {
            let fields = structure
                .fields
                .iter()
                .map(|field| {
                    zero_value(&field.ty).map(|value| FieldModel {
                        name: field.name.clone(),
                        value,
                    })
                })
                .collect::<Option<Vec<_>>>()?;
            Some(ValueModel::Aggregate(AggregateModel { ty: ty.clone(), fields }))
        }
        TypeId::Array(ArrayType {
            element,
            length: Some(length),
        }) => {
            let model = IndexedCollectionModel::new(ty.clone(), *length, BTreeMap::new(), zero_value(element)?).ok()?;
            Some(ValueModel::IndexedCollection(model))
        }
        other => ValueModel::zero_of(other),
    }
}

fn malformed(ty: PrimitiveType, text: &str) -> DecodeError {
    DecodeError::MalformedLiteral {
        ty: ty.simple_name().to_string(),
        value: text.to_string(),
    }
}

fn decode_primitive(text: &str, ty: PrimitiveType) -> DecodeResult<ValueModel> {
    if ty.is_floating() {
        return decode_float(text, ty, CastMode::Implicit);
    }
    if let Some(component) = ty.complex_component() {
        let (real, imaginary) = text
            .split_once(COMPLEX_DELIMITER)
            .ok_or_else(|| malformed(ty, text))?;
        // Component literals parse at full width; narrower components need a cast.
        let cast = if component == PrimitiveType::Float32 {
            CastMode::Required
        } else {
            CastMode::Implicit
        };
        return Ok(ValueModel::Complex(ComplexModel {
            real: Box::new(decode_float(real, component, cast)?),
            imaginary: Box::new(decode_float(imaginary, component, cast)?),
            ty: TypeId::Primitive(ty),
        }));
    }

    let literal = match ty {
        PrimitiveType::Bool => Literal::Bool(text.parse().map_err(|_| malformed(ty, text))?),
        PrimitiveType::String => Literal::String(text.to_string()),
        PrimitiveType::Char => Literal::Char(decode_char(text).ok_or_else(|| malformed(ty, text))?),
        integral => {
            let value: i128 = text.parse().map_err(|_| malformed(ty, text))?;
            let literal = Literal::Integer(value);
            if !literal.fits(integral) {
                return Err(malformed(ty, text));
            }
            literal
        }
    };
    Ok(ValueModel::primitive(literal, ty))
}

/// Characters arrive as code points (`int32`) or as the character itself
fn decode_char(text: &str) -> Option<char> {
    if let Ok(code) = text.parse::<u32>() {
        return char::from_u32(code);
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn decode_float(text: &str, ty: PrimitiveType, cast: CastMode) -> DecodeResult<ValueModel> {
    let declared = TypeId::Primitive(ty);
    match text {
        NAN => Ok(ValueModel::FloatNaN(declared)),
        POSITIVE_INFINITY => Ok(ValueModel::FloatInfinity {
            sign: Sign::Positive,
            ty: declared,
        }),
        NEGATIVE_INFINITY => Ok(ValueModel::FloatInfinity {
            sign: Sign::Negative,
            ty: declared,
        }),
        _ => {
            let value = match ty {
                PrimitiveType::Float32 => text.parse::<f32>().map(f64::from),
                _ => text.parse::<f64>(),
            }
            .map_err(|_| malformed(ty, text))?;
            Ok(ValueModel::Primitive(PrimitiveModel {
                value: Literal::Float(value),
                ty: declared,
                cast,
            }))
        }
    }
}
