//! # Fuzzed Models
//!
//! Value model synthesis and execution result decoding for automated unit
//! test generation.
//!
//! Generation turns a callable's signature and mined constants into lazily
//! produced candidate values for each parameter. Decoding turns the raw
//! record of one concrete execution back into value models together with a
//! classification of how the execution ended.

pub mod cancel;
pub mod catalog;
pub mod combinations;
pub mod config;
pub mod decode;
pub mod description;
pub mod error;
pub mod identity;
pub mod model;
pub mod providers;

// Re-export core types for easy access
pub use cancel::{CancelReason, CancellationToken};
pub use catalog::{ClassInfo, ConstructorInfo, EnumValue, FieldInfo, InMemoryCatalog, MethodInfo, Nesting, TypeCatalog, Visibility};
pub use combinations::CartesianProduct;
pub use config::GenerationConfig;
pub use decode::{ExecutionOutcome, RawExecutionRecord, RawValue, ResultDecoder};
pub use description::{CallableDescription, Comparison, ConstantHint, HintContext};
pub use error::{ConfigError, DecodeError, DecodeResult, GenerationIssue, ModelError, ModelResult};
pub use identity::{IdentityGenerator, IdentityMode};
pub use model::{Identity, Literal, PrimitiveType, TypeId, ValueModel};
pub use providers::{
    concat, default_value_providers, FuzzedParameter, FuzzedValue, GenerationContext, ValueProvider,
    ValueProviderExt,
};
