//! Value provider system
//!
//! A value provider turns a [`CallableDescription`] into a lazily evaluated,
//! finite sequence of `(parameter index, value)` pairs. Consumers may stop
//! pulling at any point; nothing past the last pulled pair is computed.
//!
//! Providers compose through two combinators:
//! - [`concat`] emits everything every provider emits, without deduplication.
//! - [`ValueProviderExt::with_fallback`] uses the fallback provider only for
//!   the parameter indices the primary provider left empty, decided per index.
//!
//! Providers that need identities or type metadata share a
//! [`GenerationContext`], which is the only mutable state generation touches.

pub mod arrays;
pub mod constants;
pub mod enums;
pub mod objects;
pub mod primitives;
pub mod strings;

pub use self::arrays::{ArrayProvider, CollectionProvider};
pub use self::constants::ConstantsProvider;
pub use self::enums::EnumProvider;
pub use self::objects::ObjectProvider;
pub use self::primitives::{PrimitiveDefaultsProvider, PrimitivesProvider};
pub use self::strings::{CharToStringProvider, StringConstantProvider, StringMutator};

use crate::cancel::CancellationToken;
use crate::catalog::{EnumValue, TypeCatalog};
use crate::config::GenerationConfig;
use crate::description::CallableDescription;
use crate::identity::IdentityGenerator;
use crate::model::{PrimitiveType, ValueModel};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

/// A generated value and an optional description for code emission
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzedValue {
    pub model: ValueModel,
    pub summary: Option<String>,
}

impl FuzzedValue {
    pub fn new(model: ValueModel) -> Self {
        Self { model, summary: None }
    }

    pub fn with_summary(model: ValueModel, summary: impl Into<String>) -> Self {
        Self {
            model,
            summary: Some(summary.into()),
        }
    }
}

/// A value offered for one parameter of the described callable
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzedParameter {
    pub index: usize,
    pub value: FuzzedValue,
}

impl FuzzedParameter {
    pub fn new(index: usize, value: FuzzedValue) -> Self {
        Self { index, value }
    }
}

pub type ParameterValues<'a> = Box<dyn Iterator<Item = FuzzedParameter> + 'a>;

/// A value generation strategy
pub trait ValueProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a>;
}

impl<P: ValueProvider + ?Sized> ValueProvider for Box<P> {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        (**self).generate(description)
    }
}

impl<P: ValueProvider + ?Sized> ValueProvider for Rc<P> {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        (**self).generate(description)
    }
}

pub trait ValueProviderExt: ValueProvider {
    /// Use `fallback` for every parameter this provider yields nothing for
    fn with_fallback<F: ValueProvider>(self, fallback: F) -> WithFallback<Self, F>
    where
        Self: Sized,
    {
        WithFallback { primary: self, fallback }
    }

    fn boxed<'p>(self) -> Box<dyn ValueProvider + 'p>
    where
        Self: Sized + 'p,
    {
        Box::new(self)
    }
}

impl<P: ValueProvider> ValueProviderExt for P {}

/// Emits the pairs of every provider in order
pub struct Concat {
    providers: Vec<Box<dyn ValueProvider>>,
}

pub fn concat(providers: Vec<Box<dyn ValueProvider>>) -> Concat {
    Concat { providers }
}

impl Concat {
    pub fn push(&mut self, provider: Box<dyn ValueProvider>) {
        self.providers.push(provider);
    }
}

impl ValueProvider for Concat {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        Box::new(
            self.providers
                .iter()
                .flat_map(move |provider| provider.generate(description)),
        )
    }
}

/// Per-parameter fallback between two providers
pub struct WithFallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P: ValueProvider, F: ValueProvider> ValueProvider for WithFallback<P, F> {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        let primary = &self.primary;
        let fallback = &self.fallback;
        // Which indices the primary covers is only known once it is drained,
        // so the drain is deferred until the first pull.
        Box::new(std::iter::once(()).flat_map(move |_| {
            let mut provided: BTreeMap<usize, Vec<FuzzedValue>> = BTreeMap::new();
            for parameter in primary.generate(description) {
                provided.entry(parameter.index).or_default().push(parameter.value);
            }
            let missing: HashSet<usize> = (0..description.parameters.len())
                .filter(|index| !provided.contains_key(index))
                .collect();
            log::trace!(
                "{}: primary covers {:?}, falling back for {:?}",
                description.name,
                provided.keys().collect::<Vec<_>>(),
                missing
            );
            let from_primary = provided.into_iter().flat_map(|(index, values)| {
                values.into_iter().map(move |value| FuzzedParameter::new(index, value))
            });
            let from_fallback = (!missing.is_empty())
                .then(move || {
                    fallback
                        .generate(description)
                        .filter(move |parameter| missing.contains(&parameter.index))
                })
                .into_iter()
                .flatten();
            from_primary.chain(from_fallback)
        }))
    }
}

/// Provider yielding a fixed list of pairs; mostly useful to inject
/// hand-picked values in front of other providers
#[derive(Debug, Clone, Default)]
pub struct FixedProvider {
    values: Vec<FuzzedParameter>,
}

impl FixedProvider {
    pub fn new(values: Vec<(usize, ValueModel)>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(index, model)| FuzzedParameter::new(index, FuzzedValue::new(model)))
                .collect(),
        }
    }
}

impl ValueProvider for FixedProvider {
    fn generate<'a>(&'a self, description: &'a CallableDescription) -> ParameterValues<'a> {
        let arity = description.parameters.len();
        Box::new(
            self.values
                .iter()
                .filter(move |parameter| parameter.index < arity)
                .cloned(),
        )
    }
}

/// Stop yielding as soon as `token` is cancelled
pub fn cancellable<'a>(values: ParameterValues<'a>, token: &CancellationToken) -> ParameterValues<'a> {
    let token = token.clone();
    let mut values = values;
    Box::new(std::iter::from_fn(move || {
        if token.is_cancelled() {
            None
        } else {
            values.next()
        }
    }))
}

/// Drain a provider into per-parameter model lists
pub fn collect(
    provider: &dyn ValueProvider,
    description: &CallableDescription,
) -> BTreeMap<usize, Vec<ValueModel>> {
    let mut models: BTreeMap<usize, Vec<ValueModel>> = BTreeMap::new();
    for parameter in provider.generate(description) {
        models.entry(parameter.index).or_default().push(parameter.value.model);
    }
    models
}

/// Indices and types of the primitive parameters of `description`
pub(crate) fn primitive_parameters(
    description: &CallableDescription,
) -> impl Iterator<Item = (usize, PrimitiveType)> + '_ {
    description
        .parameters
        .iter()
        .enumerate()
        .filter_map(|(index, ty)| ty.as_primitive().map(|primitive| (index, primitive)))
}

pub type SharedIdentities = Rc<RefCell<IdentityGenerator<EnumValue>>>;

/// State shared by the providers of one generation run
#[derive(Clone)]
pub struct GenerationContext {
    pub catalog: Rc<dyn TypeCatalog>,
    pub identities: SharedIdentities,
    pub config: Rc<GenerationConfig>,
    pub cancellation: CancellationToken,
}

impl GenerationContext {
    pub fn new(catalog: Rc<dyn TypeCatalog>, config: GenerationConfig) -> Self {
        let identities = IdentityGenerator::new(config.identity_mode, config.identity_offset);
        Self {
            catalog,
            identities: Rc::new(RefCell::new(identities)),
            config: Rc::new(config),
            cancellation: CancellationToken::new(),
        }
    }

    /// Use an identity generator owned by the caller
    pub fn with_identities(mut self, identities: SharedIdentities) -> Self {
        self.identities = identities;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// The full provider stack used for ordinary generation
pub fn default_value_providers(context: &GenerationContext) -> Concat {
    concat(vec![
        ObjectProvider::new(context.clone()).boxed(),
        CollectionProvider::new(context.clone()).boxed(),
        ArrayProvider::new(context.config.array_lengths.clone()).boxed(),
        EnumProvider::new(context.clone()).boxed(),
        ConstantsProvider.boxed(),
        StringConstantProvider::new(context.config.clone()).boxed(),
        CharToStringProvider.boxed(),
        PrimitivesProvider.boxed(),
    ])
}
