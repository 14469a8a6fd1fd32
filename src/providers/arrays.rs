//! Arrays and collection interfaces

use super::{FuzzedParameter, FuzzedValue, GenerationContext, ParameterValues, ValueProvider};
use crate::description::CallableDescription;
use crate::error::ModelResult;
use crate::model::{
    ArrayType, Call, ConstructedModel, ExecutableId, IndexedCollectionModel, TypeId, ValueModel,
};
use std::collections::BTreeMap;

/// Empty-store arrays filled with the element type's zero value.
///
/// Arrays with a declared length get exactly one model of that length;
/// unsized arrays get one model per configured length.
#[derive(Debug, Clone)]
pub struct ArrayProvider {
    lengths: Vec<usize>,
}

impl ArrayProvider {
    pub fn new(lengths: Vec<usize>) -> Self {
        Self { lengths }
    }

    fn lengths_for<'s>(&'s self, array: &ArrayType) -> Box<dyn Iterator<Item = usize> + 's> {
        match array.length {
            Some(length) => Box::new(std::iter::once(length)),
            None => Box::new(self.lengths.iter().copied()),
        }
    }
}

impl ValueProvider for ArrayProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        Box::new(
            description
                .parameters
                .iter()
                .enumerate()
                .filter_map(|(index, ty)| match ty {
                    TypeId::Array(array) => Some((index, ty, array)),
                    _ => None,
                })
                .flat_map(move |(index, ty, array)| {
                    self.lengths_for(array).filter_map(move |length| {
                        match empty_array(ty, array, length) {
                            Ok(Some(model)) => Some(FuzzedParameter::new(
                                index,
                                FuzzedValue::with_summary(
                                    model,
                                    format!("%var% = {} of length {}", ty, length),
                                ),
                            )),
                            Ok(None) => {
                                log::debug!("{}: no zero value for elements of {}", description.name, ty);
                                None
                            }
                            Err(err) => {
                                log::debug!("{}: {}", description.name, err);
                                None
                            }
                        }
                    })
                }),
        )
    }
}

fn empty_array(ty: &TypeId, array: &ArrayType, length: usize) -> ModelResult<Option<ValueModel>> {
    let Some(default) = ValueModel::zero_of(&array.element) else {
        return Ok(None);
    };
    let model = IndexedCollectionModel::new(ty.clone(), length, BTreeMap::new(), default)?;
    Ok(Some(ValueModel::IndexedCollection(model)))
}

/// Collection interfaces instantiated through their registered concrete
/// class's no-argument constructor
pub struct CollectionProvider {
    context: GenerationContext,
}

impl CollectionProvider {
    pub fn new(context: GenerationContext) -> Self {
        Self { context }
    }

    fn instantiate(&self, ty: &TypeId, implementation: &str) -> ModelResult<ValueModel> {
        let instantiation = Call::new(ExecutableId::constructor(implementation, Vec::new()), Vec::new())?;
        Ok(ValueModel::Constructed(ConstructedModel {
            ty: ty.clone(),
            id: self.context.identities.borrow_mut().create_id(),
            instantiation,
            modifications: Vec::new(),
        }))
    }
}

impl ValueProvider for CollectionProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        Box::new(
            description
                .parameters
                .iter()
                .enumerate()
                .filter_map(move |(index, ty)| {
                    let TypeId::Object(name) = ty else {
                        return None;
                    };
                    let implementation = self.context.catalog.collection_implementation(name)?;
                    match self.instantiate(ty, implementation) {
                        Ok(model) => Some(FuzzedParameter::new(
                            index,
                            FuzzedValue::with_summary(model, format!("%var% = new {}()", implementation)),
                        )),
                        Err(err) => {
                            log::debug!("{}: {}", description.name, err);
                            None
                        }
                    }
                }),
        )
    }
}
