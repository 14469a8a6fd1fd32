//! Value model system
//!
//! The tagged-variant tree shared by value generation and result decoding.

pub mod types;
pub mod values;
pub mod visitor;

pub use self::types::*;
pub use self::values::*;
pub use self::visitor::{IdentityCollector, ModelVisitor};
