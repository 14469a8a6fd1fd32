//! Argument lists from per-parameter candidates
//!
//! `CartesianProduct` walks the product of per-parameter candidate lists in
//! odometer order (last parameter varies fastest), one argument list per
//! pull. Nothing is materialized beyond the current index vector, so callers
//! can stop after any prefix.

use crate::cancel::CancellationToken;
use crate::description::CallableDescription;
use crate::model::ValueModel;
use crate::providers::ValueProvider;

#[derive(Debug, Clone)]
pub struct CartesianProduct {
    candidates: Vec<Vec<ValueModel>>,
    indices: Vec<usize>,
    exhausted: bool,
    cancellation: Option<CancellationToken>,
}

impl CartesianProduct {
    pub fn new(candidates: Vec<Vec<ValueModel>>) -> Self {
        let exhausted = candidates.iter().any(Vec::is_empty);
        Self {
            indices: vec![0; candidates.len()],
            candidates,
            exhausted,
            cancellation: None,
        }
    }

    /// Drain `provider` for `description` and combine its values.
    ///
    /// A parameter the provider offers nothing for leaves the product empty.
    pub fn from_provider(provider: &dyn ValueProvider, description: &CallableDescription) -> Self {
        let mut candidates = vec![Vec::new(); description.parameters.len()];
        for parameter in provider.generate(description) {
            if let Some(slot) = candidates.get_mut(parameter.index) {
                slot.push(parameter.value.model);
            }
        }
        for (index, slot) in candidates.iter().enumerate() {
            if slot.is_empty() {
                log::debug!("{}: no candidates for parameter {}", description.name, index);
            }
        }
        Self::new(candidates)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Total number of combinations, saturating on overflow
    pub fn total(&self) -> usize {
        self.candidates
            .iter()
            .fold(1usize, |total, slot| total.saturating_mul(slot.len()))
    }

    fn advance(&mut self) {
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.candidates[position].len() {
                return;
            }
            self.indices[position] = 0;
        }
        self.exhausted = true;
    }
}

impl Iterator for CartesianProduct {
    type Item = Vec<ValueModel>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if let Some(token) = &self.cancellation {
            if token.is_cancelled() {
                self.exhausted = true;
                return None;
            }
        }
        let arguments = self
            .indices
            .iter()
            .zip(&self.candidates)
            .map(|(index, slot)| slot[*index].clone())
            .collect();
        self.advance();
        Some(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelReason;
    use crate::model::PrimitiveType;

    fn ints(values: &[i128]) -> Vec<ValueModel> {
        values.iter().map(|value| ValueModel::int(*value, PrimitiveType::Int32)).collect()
    }

    #[test]
    fn test_last_parameter_varies_fastest() {
        let product: Vec<Vec<ValueModel>> = CartesianProduct::new(vec![ints(&[1, 2]), ints(&[3, 4])]).collect();
        assert_eq!(
            product,
            vec![ints(&[1, 3]), ints(&[1, 4]), ints(&[2, 3]), ints(&[2, 4])]
        );
    }

    #[test]
    fn test_empty_slot_empties_product() {
        let mut product = CartesianProduct::new(vec![ints(&[1]), Vec::new()]);
        assert_eq!(product.total(), 0);
        assert!(product.next().is_none());
    }

    #[test]
    fn test_no_parameters_yield_one_empty_list() {
        let product: Vec<Vec<ValueModel>> = CartesianProduct::new(Vec::new()).collect();
        assert_eq!(product, vec![Vec::new()]);
    }

    #[test]
    fn test_cancellation_stops_iteration() {
        let token = CancellationToken::new();
        let mut product = CartesianProduct::new(vec![ints(&[1, 2, 3])]).with_cancellation(token.clone());

        assert!(product.next().is_some());
        token.cancel(CancelReason::Requested);
        assert!(product.next().is_none());
    }
}
