//! Enum parameters
//!
//! Every constant of the declared enum is offered. Identities come from the
//! shared identity generator keyed by the catalog's constant references, so
//! a constant offered twice (here, or deep inside a constructed object)
//! carries one identity.

use super::{FuzzedParameter, FuzzedValue, GenerationContext, ParameterValues, ValueProvider};
use crate::description::CallableDescription;
use crate::error::GenerationIssue;
use crate::model::{EnumConstantModel, TypeId, ValueModel};

pub struct EnumProvider {
    context: GenerationContext,
}

impl EnumProvider {
    pub fn new(context: GenerationContext) -> Self {
        Self { context }
    }
}

impl ValueProvider for EnumProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        Box::new(
            description
                .parameters
                .iter()
                .enumerate()
                .filter_map(|(index, ty)| match ty {
                    TypeId::Enum(name) => Some((index, name)),
                    _ => None,
                })
                .flat_map(move |(index, name)| {
                    enum_constants(&self.context, name)
                        .unwrap_or_else(|issue| {
                            log::debug!("{}: parameter {}: {}", description.name, index, issue);
                            Vec::new()
                        })
                        .into_iter()
                        .map(move |model| {
                            let summary = format!("%var% = {}", model);
                            FuzzedParameter::new(index, FuzzedValue::with_summary(model, summary))
                        })
                }),
        )
    }
}

/// Models of every constant of enum `name`, in declaration order
pub fn enum_constants(
    context: &GenerationContext,
    name: &str,
) -> Result<Vec<ValueModel>, GenerationIssue> {
    let constants = context
        .catalog
        .enum_constants(name)
        .ok_or_else(|| GenerationIssue::UnsupportedVariant(name.to_string()))?;
    let mut identities = context.identities.borrow_mut();
    Ok(constants
        .iter()
        .map(|constant| {
            ValueModel::EnumConstant(EnumConstantModel {
                ty: TypeId::enumeration(name),
                name: constant.name.clone(),
                ordinal: constant.ordinal,
                id: identities.identity_for(constant),
            })
        })
        .collect())
}
