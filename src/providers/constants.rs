//! Constant hints and boundary mutation
//!
//! Every hint whose type matches a (non-string) primitive parameter is emitted
//! verbatim. Hints observed in a comparison also emit the value on the other
//! side of the boundary: `B - 1` for `<` and `>=`, `B + 1` otherwise, so that
//! both outcomes of the comparison are exercised. Several hints on one
//! parameter contribute the union of their values.

use super::{primitive_parameters, FuzzedParameter, FuzzedValue, ParameterValues, ValueProvider};
use crate::description::{CallableDescription, Comparison, ConstantHint, HintContext};
use crate::model::{Literal, PrimitiveType, TypeId, ValueModel};
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantsProvider;

impl ValueProvider for ConstantsProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        Box::new(
            primitive_parameters(description)
                .filter(|(_, primitive)| *primitive != PrimitiveType::String)
                .flat_map(move |(index, primitive)| {
                    hint_values(description, primitive)
                        .into_iter()
                        .map(move |value| FuzzedParameter::new(index, value))
                }),
        )
    }
}

fn hint_values(description: &CallableDescription, primitive: PrimitiveType) -> Vec<FuzzedValue> {
    let ty = TypeId::from(primitive);
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for hint in description.constants_of(&ty) {
        if !hint.value.fits(primitive) {
            log::debug!(
                "{}: constant {} does not fit {}, skipped",
                description.name,
                hint.value,
                primitive
            );
            continue;
        }
        for literal in boundary_values(hint, primitive) {
            if seen.insert(literal.clone()) {
                let summary = summarize(hint, &literal);
                values.push(FuzzedValue::with_summary(
                    ValueModel::primitive(literal, primitive),
                    summary,
                ));
            }
        }
    }
    values
}

/// The hint value followed by its neighbour across the comparison, if any
pub fn boundary_values(hint: &ConstantHint, primitive: PrimitiveType) -> Vec<Literal> {
    let mut values = vec![hint.value.clone()];
    if let HintContext::Comparison(comparison) = hint.context {
        if let Some(neighbour) = step(&hint.value, comparison.boundary_step(), primitive) {
            values.push(neighbour);
        }
    }
    values
}

/// Move `value` one unit in the direction of `delta`
fn step(value: &Literal, delta: i8, primitive: PrimitiveType) -> Option<Literal> {
    match value {
        Literal::Bool(b) => Some(Literal::Bool(!b)),
        Literal::Integer(i) => {
            let stepped = Literal::Integer(i.checked_add(delta as i128)?);
            // Stepping past the type's range would change the literal's type.
            stepped.fits(primitive).then_some(stepped)
        }
        Literal::Float(x) => Some(Literal::Float(x + delta as f64)),
        Literal::Char(c) => {
            let code = (*c as u32).checked_add_signed(delta as i32)?;
            char::from_u32(code).map(Literal::Char)
        }
        Literal::String(_) => None,
    }
}

fn compare(left: &Literal, right: &Literal) -> Option<Ordering> {
    match (left, right) {
        (Literal::Bool(a), Literal::Bool(b)) => Some(a.cmp(b)),
        (Literal::Integer(a), Literal::Integer(b)) => Some(a.cmp(b)),
        (Literal::Float(a), Literal::Float(b)) => a.partial_cmp(b),
        (Literal::Char(a), Literal::Char(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn holds(comparison: Comparison, ordering: Ordering) -> bool {
    match comparison {
        Comparison::Eq => ordering == Ordering::Equal,
        Comparison::Ne => ordering != Ordering::Equal,
        Comparison::Lt => ordering == Ordering::Less,
        Comparison::Le => ordering != Ordering::Greater,
        Comparison::Gt => ordering == Ordering::Greater,
        Comparison::Ge => ordering != Ordering::Less,
    }
}

fn summarize(hint: &ConstantHint, value: &Literal) -> String {
    let HintContext::Comparison(comparison) = hint.context else {
        return format!("%var% = {}", value);
    };
    match compare(value, &hint.value) {
        Some(ordering) if holds(comparison, ordering) => {
            format!("%var% {} {}", comparison, hint.value)
        }
        Some(_) => format!("%var% {} {}", comparison.negate(), hint.value),
        None => format!("%var% = {}", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::collect;
    use std::collections::BTreeSet;

    fn int_hint(value: i128, comparison: Comparison) -> ConstantHint {
        ConstantHint::compared(PrimitiveType::Int32, Literal::Integer(value), comparison)
    }

    fn ints_for(constants: Vec<ConstantHint>) -> BTreeSet<i128> {
        let description = CallableDescription::new("f", vec![PrimitiveType::Int32.into()])
            .with_constants(constants);
        collect(&ConstantsProvider, &description)
            .remove(&0)
            .unwrap_or_default()
            .iter()
            .map(|model| match model.as_primitive() {
                Some(Literal::Integer(value)) => *value,
                other => panic!("unexpected model {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_less_than_probes_both_sides() {
        let values = ints_for(vec![int_hint(30, Comparison::Lt)]);
        assert_eq!(values, BTreeSet::from([29, 30]));
    }

    #[test]
    fn test_comparison_chain_yields_union_of_boundaries() {
        let values = ints_for(vec![
            int_hint(10, Comparison::Eq),
            int_hint(20, Comparison::Ne),
            int_hint(30, Comparison::Lt),
            int_hint(40, Comparison::Le),
            int_hint(50, Comparison::Gt),
            int_hint(60, Comparison::Ge),
        ]);
        assert_eq!(
            values,
            BTreeSet::from([10, 11, 20, 21, 29, 30, 40, 41, 50, 51, 59, 60])
        );
    }

    #[test]
    fn test_no_constants_no_values() {
        assert!(ints_for(Vec::new()).is_empty());
    }

    #[test]
    fn test_hint_without_context_is_verbatim() {
        let hint = ConstantHint::new(PrimitiveType::Int32, Literal::Integer(7));
        assert_eq!(ints_for(vec![hint]), BTreeSet::from([7]));
    }

    #[test]
    fn test_boundary_never_overflows_declared_type() {
        let hint = ConstantHint::compared(PrimitiveType::UInt8, Literal::Integer(255), Comparison::Gt);
        assert_eq!(boundary_values(&hint, PrimitiveType::UInt8), vec![Literal::Integer(255)]);
    }

    #[test]
    fn test_boolean_boundary_is_negation() {
        let hint = ConstantHint::compared(PrimitiveType::Bool, Literal::Bool(true), Comparison::Eq);
        assert_eq!(
            boundary_values(&hint, PrimitiveType::Bool),
            vec![Literal::Bool(true), Literal::Bool(false)]
        );
    }

    #[test]
    fn test_hints_of_other_types_are_ignored() {
        let hint = ConstantHint::compared(PrimitiveType::Int64, Literal::Integer(3), Comparison::Lt);
        assert!(ints_for(vec![hint]).is_empty());
    }

    #[test]
    fn test_summaries_name_the_side_of_the_comparison() {
        let description = CallableDescription::new("f", vec![PrimitiveType::Int32.into()])
            .with_constants(vec![int_hint(30, Comparison::Ge)]);
        let summaries: Vec<String> = ConstantsProvider
            .generate(&description)
            .filter_map(|parameter| parameter.value.summary)
            .collect();
        assert_eq!(summaries, vec!["%var% >= 30", "%var% < 30"]);
    }
}
