//! Object construction planner
//!
//! Objects are built from an accessible constructor followed by an optional
//! chain of modifications for the fields the constructor leaves untouched.
//!
//! Planning a type works as follows:
//!
//! 1. Collect the constructors accessible from the requesting package. Inner
//!    (non-static nested) classes, abstract classes and classes without an
//!    accessible constructor produce nothing.
//! 2. Rank constructors by how many parameters the terminal provider cannot
//!    supply, then by arity, and keep the best `fan_out` of them. Nested
//!    requests only ever keep the best one.
//! 3. Resolve each argument. Values the terminal provider supplies are used
//!    directly. Object parameters are constructed recursively with budget
//!    `k - 1`; once the budget is spent (or nothing can be built) nullable
//!    parameters receive `Null` and anything else drops the candidate.
//! 4. Every field that is neither static nor assigned by the constructor is
//!    set directly when it is writable from the requesting package, or
//!    through its `setX` method otherwise, in declaration order.
//!
//! Each constructor yields the fully modified object first and then the bare
//! constructor call. When there is nothing to modify the two coincide and
//! only one object is produced.
//!
//! Termination relies on the budget alone: every recursive step decreases
//! it, so self-referential types bottom out in `Null`.

use super::{
    concat, EnumProvider, FuzzedParameter, FuzzedValue, GenerationContext, ParameterValues,
    PrimitiveDefaultsProvider, ValueProvider, ValueProviderExt,
};
use crate::catalog::{ClassInfo, ConstructorInfo, FieldInfo, Nesting};
use crate::description::CallableDescription;
use crate::error::{GenerationIssue, ModelResult};
use crate::model::{Call, ConstructedModel, Modification, TypeId, ValueModel};
use std::collections::BTreeMap;

pub struct ObjectProvider {
    context: GenerationContext,
    recursion_depth: u32,
    fan_out: usize,
    terminal: Box<dyn ValueProvider>,
}

/// A constructor selected for a class, with the arguments the terminal
/// provider already supplied
struct Plan<'c> {
    class: &'c ClassInfo,
    constructor: &'c ConstructorInfo,
    supplied: BTreeMap<usize, ValueModel>,
}

impl ObjectProvider {
    pub fn new(context: GenerationContext) -> Self {
        let terminal = concat(vec![
            PrimitiveDefaultsProvider.boxed(),
            EnumProvider::new(context.clone()).boxed(),
        ]);
        Self {
            recursion_depth: context.config.recursion_depth,
            fan_out: context.config.constructor_fan_out.max(1),
            terminal: terminal.boxed(),
            context,
        }
    }

    pub fn with_recursion_depth(mut self, depth: u32) -> Self {
        self.recursion_depth = depth;
        self
    }

    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// Replace the provider used for leaf arguments and for ranking
    pub fn with_terminal<P: ValueProvider + 'static>(mut self, terminal: P) -> Self {
        self.terminal = terminal.boxed();
        self
    }

    fn terminal_values(&self, types: &[TypeId], package: Option<&str>) -> BTreeMap<usize, ValueModel> {
        let mut description = CallableDescription::new("<terminal>", types.to_vec());
        description.package = package.map(str::to_string);
        let mut values = BTreeMap::new();
        for parameter in self.terminal.generate(&description) {
            values.entry(parameter.index).or_insert(parameter.value.model);
        }
        values
    }

    fn plan(&self, name: &str, package: Option<&str>, fan_out: usize) -> Result<Vec<Plan<'_>>, GenerationIssue> {
        let class = self
            .context
            .catalog
            .class(name)
            .ok_or_else(|| GenerationIssue::UnsupportedVariant(name.to_string()))?;
        if class.is_abstract
            || class.nesting == Nesting::Inner
            || !class.visibility.is_accessible(&class.package, package)
        {
            return Err(GenerationIssue::NoAccessibleConstructor(name.to_string()));
        }

        let mut ranked: Vec<(usize, Plan<'_>)> = class
            .constructors
            .iter()
            .filter(|constructor| constructor.visibility.is_accessible(&class.package, package))
            .map(|constructor| {
                let supplied = self.terminal_values(&constructor.parameters, package);
                let unsupported = constructor.parameters.len().saturating_sub(supplied.len());
                (unsupported, Plan { class, constructor, supplied })
            })
            .collect();
        if ranked.is_empty() {
            return Err(GenerationIssue::NoAccessibleConstructor(name.to_string()));
        }
        ranked.sort_by_key(|(unsupported, plan)| (*unsupported, plan.constructor.parameters.len()));
        Ok(ranked.into_iter().take(fan_out).map(|(_, plan)| plan).collect())
    }

    /// Construct `name` with the given budget, keeping at most `fan_out` constructors
    fn construct(
        &self,
        name: &str,
        budget: u32,
        package: Option<&str>,
        fan_out: usize,
    ) -> Result<Vec<ValueModel>, GenerationIssue> {
        let mut models = Vec::new();
        for plan in self.plan(name, package, fan_out)? {
            if self.context.cancellation.is_cancelled() {
                return Err(GenerationIssue::Cancelled);
            }
            models.extend(self.build_logged(&plan, budget, package));
        }
        Ok(models)
    }

    fn resolve(
        &self,
        ty: &TypeId,
        supplied: Option<ValueModel>,
        budget: u32,
        package: Option<&str>,
    ) -> Option<ValueModel> {
        if supplied.is_some() {
            return supplied;
        }
        if let TypeId::Object(name) = ty {
            if budget == 0 {
                log::trace!("{}", GenerationIssue::RecursionBudgetExhausted(name.clone()));
            } else {
                match self.construct(name, budget - 1, package, 1) {
                    Ok(models) => {
                        if let Some(model) = models.into_iter().next() {
                            return Some(model);
                        }
                    }
                    Err(issue) => log::debug!("{}", issue),
                }
            }
        }
        ty.accepts_null().then(|| ValueModel::Null(ty.clone()))
    }

    fn build_logged(&self, plan: &Plan<'_>, budget: u32, package: Option<&str>) -> Vec<ValueModel> {
        self.build(plan, budget, package).unwrap_or_else(|err| {
            log::debug!("{}: dropping candidate: {}", plan.class.name, err);
            Vec::new()
        })
    }

    fn build(&self, plan: &Plan<'_>, budget: u32, package: Option<&str>) -> ModelResult<Vec<ValueModel>> {
        let class = plan.class;
        let mut arguments = Vec::with_capacity(plan.constructor.parameters.len());
        for (index, ty) in plan.constructor.parameters.iter().enumerate() {
            match self.resolve(ty, plan.supplied.get(&index).cloned(), budget, package) {
                Some(model) => arguments.push(model),
                None => {
                    log::debug!("{}: no value for constructor parameter {} of type {}", class.name, index, ty);
                    return Ok(Vec::new());
                }
            }
        }
        let instantiation = Call::new(class.constructor_id(plan.constructor), arguments)?;
        let modifications = self.modifications(class, plan.constructor, budget, package)?;

        let mut candidates = Vec::with_capacity(2);
        if !modifications.is_empty() {
            candidates.push(self.constructed(class, instantiation.clone(), modifications));
        }
        candidates.push(self.constructed(class, instantiation, Vec::new()));
        Ok(candidates)
    }

    fn modifications(
        &self,
        class: &ClassInfo,
        constructor: &ConstructorInfo,
        budget: u32,
        package: Option<&str>,
    ) -> ModelResult<Vec<Modification>> {
        let targets: Vec<&FieldInfo> = class
            .fields
            .iter()
            .filter(|field| !field.is_static && !constructor.assigns.contains(&field.name))
            .collect();
        let types: Vec<TypeId> = targets.iter().map(|field| field.ty.clone()).collect();
        let supplied = self.terminal_values(&types, package);

        let mut modifications = Vec::new();
        for (index, field) in targets.into_iter().enumerate() {
            let direct = !field.is_final && field.visibility.is_accessible(&class.package, package);
            let setter = if direct { None } else { class.setter_for(field, package) };
            if !direct && setter.is_none() {
                continue;
            }
            let Some(value) = self.resolve(&field.ty, supplied.get(&index).cloned(), budget, package) else {
                continue;
            };
            modifications.push(match setter {
                Some(method) => Modification::Invoke(Call::new(class.method_id(method), vec![value])?),
                None => Modification::SetField {
                    field: class.field_id(field),
                    value,
                },
            });
        }
        Ok(modifications)
    }

    fn constructed(&self, class: &ClassInfo, instantiation: Call, modifications: Vec<Modification>) -> ValueModel {
        let id = self.context.identities.borrow_mut().create_id();
        ValueModel::Constructed(ConstructedModel {
            ty: class.ty(),
            id,
            instantiation,
            modifications,
        })
    }
}

impl ValueProvider for ObjectProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        let package = description.package.as_deref();
        Box::new(
            description
                .parameters
                .iter()
                .enumerate()
                .filter_map(|(index, ty)| match ty {
                    TypeId::Object(name) => Some((index, name)),
                    _ => None,
                })
                .flat_map(move |(index, name)| {
                    let plans = if self.context.catalog.collection_implementation(name).is_some() {
                        Vec::new()
                    } else {
                        self.plan(name, package, self.fan_out).unwrap_or_else(|issue| {
                            log::debug!("{}: parameter {}: {}", description.name, index, issue);
                            Vec::new()
                        })
                    };
                    plans
                        .into_iter()
                        .take_while(move |_| !self.context.cancellation.is_cancelled())
                        .flat_map(move |plan| self.build_logged(&plan, self.recursion_depth, package))
                        .map(move |model| {
                            let summary = format!("%var% = {}", model);
                            FuzzedParameter::new(index, FuzzedValue::with_summary(model, summary))
                        })
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::{CancelReason, CancellationToken};
    use crate::catalog::{FieldInfo, InMemoryCatalog, MethodInfo, Visibility};
    use crate::config::GenerationConfig;
    use crate::model::PrimitiveType;
    use crate::providers::collect;
    use std::rc::Rc;

    fn int() -> TypeId {
        PrimitiveType::Int32.into()
    }

    fn provider(catalog: InMemoryCatalog) -> ObjectProvider {
        ObjectProvider::new(GenerationContext::new(Rc::new(catalog), GenerationConfig::default()))
    }

    fn generate(provider: &ObjectProvider, ty: &str) -> Vec<ValueModel> {
        let description = CallableDescription::new("f", vec![TypeId::object(ty)]);
        collect(provider, &description).remove(&0).unwrap_or_default()
    }

    #[test]
    fn test_one_object_per_constructor() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_class(
            ClassInfo::new("Point", "geo")
                .constructor(ConstructorInfo::public(vec![int(), int()]))
                .constructor(ConstructorInfo::public(vec![]))
                .constructor(ConstructorInfo::public(vec![int()])),
        );
        let models = generate(&provider(catalog), "Point");

        let arities: Vec<usize> = models
            .iter()
            .map(|model| model.as_constructed().unwrap().instantiation.arguments().len())
            .collect();
        assert_eq!(arities, vec![0, 1, 2]);
    }

    #[test]
    fn test_supported_constructors_rank_first() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_class(
            ClassInfo::new("Box", "pkg")
                .constructor(ConstructorInfo::public(vec![TypeId::object("Unknown")]))
                .constructor(ConstructorInfo::public(vec![int(), int(), int()])),
        );
        let models = generate(&provider(catalog).with_fan_out(1), "Box");

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].as_constructed().unwrap().instantiation.arguments().len(), 3);
    }

    #[test]
    fn test_self_reference_bottoms_out_in_null() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_class(
            ClassInfo::new("Node", "list").constructor(ConstructorInfo::public(vec![TypeId::object("Node")])),
        );
        let models = generate(&provider(catalog).with_recursion_depth(1), "Node");

        assert_eq!(models.len(), 1);
        let outer = models[0].as_constructed().unwrap();
        let inner = outer.instantiation.arguments()[0].as_constructed().unwrap();
        assert_eq!(inner.ty, TypeId::object("Node"));
        assert_eq!(inner.instantiation.arguments(), &[ValueModel::Null(TypeId::object("Node"))]);
    }

    #[test]
    fn test_setter_used_only_when_field_is_not_writable() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_class(
            ClassInfo::new("Account", "bank")
                .constructor(ConstructorInfo::public(vec![]))
                .field(FieldInfo::new("owner", PrimitiveType::String.into(), Visibility::Public))
                .field(FieldInfo::new("balance", int(), Visibility::Private))
                .method(MethodInfo::new("setBalance", vec![int()], TypeId::Void))
                .method(MethodInfo::new("setOwner", vec![PrimitiveType::String.into()], TypeId::Void)),
        );
        let models = generate(&provider(catalog), "Account");

        assert_eq!(models.len(), 2);
        let full = models[0].as_constructed().unwrap();
        assert!(matches!(&full.modifications[0], Modification::SetField { field, .. } if field.name == "owner"));
        assert!(matches!(&full.modifications[1], Modification::Invoke(call) if call.executable().name == "setBalance"));
        assert_eq!(full.modifications.len(), 2);
        assert!(models[1].as_constructed().unwrap().modifications.is_empty());
    }

    #[test]
    fn test_fields_assigned_by_constructor_are_not_modified() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_class(
            ClassInfo::new("Pair", "pkg")
                .constructor(ConstructorInfo::public(vec![int()]).assigning(&["left"]))
                .field(FieldInfo::new("left", int(), Visibility::Public))
                .field(FieldInfo::new("right", int(), Visibility::Public))
                .field(FieldInfo::new("COUNT", int(), Visibility::Public).as_static())
                .field(FieldInfo::new("id", int(), Visibility::Public).as_final()),
        );
        let models = generate(&provider(catalog), "Pair");

        let targets: Vec<&str> = models[0]
            .as_constructed()
            .unwrap()
            .modifications
            .iter()
            .map(Modification::target_name)
            .collect();
        assert_eq!(targets, vec!["right"]);
    }

    #[test]
    fn test_rejected_classes_yield_nothing() {
        let mut catalog = InMemoryCatalog::new();
        catalog
            .register_class(ClassInfo::new("Shape", "pkg").as_abstract().constructor(ConstructorInfo::public(vec![])))
            .register_class(
                ClassInfo::new("Outer.Inner", "pkg")
                    .with_nesting(Nesting::Inner)
                    .constructor(ConstructorInfo::public(vec![])),
            )
            .register_class(
                ClassInfo::new("Hidden", "pkg")
                    .constructor(ConstructorInfo::public(vec![]).with_visibility(Visibility::Private)),
            );
        let provider = provider(catalog);

        assert!(generate(&provider, "Shape").is_empty());
        assert!(generate(&provider, "Outer.Inner").is_empty());
        assert!(generate(&provider, "Hidden").is_empty());
        assert!(generate(&provider, "Missing").is_empty());
    }

    #[test]
    fn test_cancelled_run_builds_nothing() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_class(ClassInfo::new("A", "pkg").constructor(ConstructorInfo::public(vec![])));
        let token = CancellationToken::new();
        let context = GenerationContext::new(Rc::new(catalog), GenerationConfig::default())
            .with_cancellation(token.clone());
        token.cancel(CancelReason::Requested);

        assert!(generate(&ObjectProvider::new(context), "A").is_empty());
    }
}
