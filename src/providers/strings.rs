//! String parameters from string and character constants

use super::{FuzzedParameter, FuzzedValue, ParameterValues, ValueProvider};
use crate::config::GenerationConfig;
use crate::description::{CallableDescription, ConstantHint, HintContext};
use crate::model::{Literal, PrimitiveType, TypeId, ValueModel};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::rc::Rc;

const STRING_TYPE: &TypeId = &TypeId::Primitive(PrimitiveType::String);

/// Deterministic single-character deletion
#[derive(Debug, Clone)]
pub struct StringMutator {
    rng: ChaCha8Rng,
}

impl StringMutator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// `value` with one randomly chosen character removed, or `None` when
    /// there is nothing to delete
    pub fn delete_char(&mut self, value: &str) -> Option<String> {
        let count = value.chars().count();
        if count == 0 {
            return None;
        }
        let victim = self.rng.gen_range(0..count);
        Some(
            value
                .chars()
                .enumerate()
                .filter(|(position, _)| *position != victim)
                .map(|(_, c)| c)
                .collect(),
        )
    }
}

/// String constants, verbatim, plus a mutated copy for constants passed to a
/// string-mutating operation
pub struct StringConstantProvider {
    config: Rc<GenerationConfig>,
}

impl StringConstantProvider {
    pub fn new(config: Rc<GenerationConfig>) -> Self {
        Self { config }
    }

    fn is_mutation_target(&self, hint: &ConstantHint) -> bool {
        match &hint.context {
            HintContext::Call(executable) => self.config.is_string_mutating(&executable.name),
            _ => false,
        }
    }
}

impl ValueProvider for StringConstantProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        // Reseeded per call so that the same description always mutates alike.
        let mut mutator = StringMutator::new(self.config.mutation_seed);
        Box::new(string_parameters(description).flat_map(move |index| {
            let mut seen = HashSet::new();
            let mut values = Vec::new();
            for hint in description.constants_of(STRING_TYPE) {
                let Literal::String(text) = &hint.value else {
                    continue;
                };
                if seen.insert(text.clone()) {
                    values.push(FuzzedValue::with_summary(
                        ValueModel::string(text.clone()),
                        format!("%var% = {:?}", text),
                    ));
                }
                if text.is_empty() || !self.is_mutation_target(hint) {
                    continue;
                }
                if let Some(mutated) = mutator.delete_char(text) {
                    if seen.insert(mutated.clone()) {
                        values.push(FuzzedValue::with_summary(
                            ValueModel::string(mutated),
                            format!("%var% = mutated {:?}", text),
                        ));
                    }
                }
            }
            values.into_iter().map(move |value| FuzzedParameter::new(index, value))
        }))
    }
}

/// Concatenation of every character constant, offered to string parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct CharToStringProvider;

impl ValueProvider for CharToStringProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        let chars: String = description
            .constants
            .iter()
            .filter_map(|hint| match hint.value {
                Literal::Char(c) => Some(c),
                _ => None,
            })
            .collect();
        if chars.is_empty() {
            return Box::new(std::iter::empty());
        }
        Box::new(string_parameters(description).map(move |index| {
            FuzzedParameter::new(
                index,
                FuzzedValue::with_summary(
                    ValueModel::string(chars.clone()),
                    format!("%var% = {:?}", chars),
                ),
            )
        }))
    }
}

fn string_parameters(description: &CallableDescription) -> impl Iterator<Item = usize> + '_ {
    description
        .parameters
        .iter()
        .enumerate()
        .filter(|(_, ty)| *ty == STRING_TYPE)
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExecutableId;
    use crate::providers::collect;

    fn string_param() -> CallableDescription {
        CallableDescription::new("f", vec![PrimitiveType::String.into()])
    }

    fn substring() -> ExecutableId {
        ExecutableId::method("String", "substring", vec![PrimitiveType::Int32.into()])
    }

    #[test]
    fn test_empty_string_is_never_mutated() {
        let hint = ConstantHint::passed_to(PrimitiveType::String, Literal::String(String::new()), substring());
        let provider = StringConstantProvider::new(Rc::new(GenerationConfig::default()));
        let models = collect(&provider, &string_param().with_constants(vec![hint]));

        assert_eq!(models[&0], vec![ValueModel::string("")]);
    }

    #[test]
    fn test_plain_constant_is_verbatim_only() {
        let hint = ConstantHint::new(PrimitiveType::String, Literal::String("hello".to_string()));
        let provider = StringConstantProvider::new(Rc::new(GenerationConfig::default()));
        let models = collect(&provider, &string_param().with_constants(vec![hint]));

        assert_eq!(models[&0], vec![ValueModel::string("hello")]);
    }

    #[test]
    fn test_mutating_context_offers_deleted_char_variant() {
        let hint = ConstantHint::passed_to(PrimitiveType::String, Literal::String("hello".to_string()), substring());
        let provider = StringConstantProvider::new(Rc::new(GenerationConfig::default()));
        let description = string_param().with_constants(vec![hint]);

        let first = collect(&provider, &description);
        let second = collect(&provider, &description);
        assert_eq!(first, second);

        let models = &first[&0];
        assert_eq!(models.len(), 2);
        assert_eq!(models[0], ValueModel::string("hello"));
        let Some(Literal::String(mutated)) = models[1].as_primitive() else {
            panic!("expected a string literal");
        };
        assert_eq!(mutated.chars().count(), 4);
    }

    #[test]
    fn test_mutator_is_deterministic_per_seed() {
        let a = StringMutator::new(42).delete_char("abcdefgh");
        let b = StringMutator::new(42).delete_char("abcdefgh");
        assert_eq!(a, b);
        assert_eq!(StringMutator::new(1).delete_char(""), None);
    }

    #[test]
    fn test_chars_are_joined_in_hint_order() {
        let hints = ['a', 'b', 'c']
            .iter()
            .map(|c| ConstantHint::new(PrimitiveType::Char, Literal::Char(*c)))
            .collect();
        let description = CallableDescription::new(
            "f",
            vec![PrimitiveType::Int32.into(), PrimitiveType::String.into()],
        )
        .with_constants(hints);
        let models = collect(&CharToStringProvider, &description);

        assert_eq!(models.len(), 1);
        assert_eq!(models[&1], vec![ValueModel::string("abc")]);
    }

    #[test]
    fn test_no_chars_no_strings() {
        assert!(collect(&CharToStringProvider, &string_param()).is_empty());
    }
}
