//! Callable descriptions and constant hints
//!
//! A `CallableDescription` is everything value generation knows about a
//! target: its signature plus constant hints mined by an upstream analysis.

use crate::model::{ExecutableId, Literal, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison a constant was used in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    /// The comparison that holds exactly when this one does not
    pub fn negate(self) -> Comparison {
        match self {
            Comparison::Eq => Comparison::Ne,
            Comparison::Ne => Comparison::Eq,
            Comparison::Lt => Comparison::Ge,
            Comparison::Le => Comparison::Gt,
            Comparison::Gt => Comparison::Le,
            Comparison::Ge => Comparison::Lt,
        }
    }

    /// Step from the boundary that crosses to the other side of the comparison
    pub fn boundary_step(self) -> i8 {
        match self {
            Comparison::Lt | Comparison::Ge => -1,
            Comparison::Eq | Comparison::Ne | Comparison::Le | Comparison::Gt => 1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Where a constant was observed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HintContext {
    #[default]
    Unknown,
    Comparison(Comparison),
    /// The constant was passed to this executable
    Call(ExecutableId),
}

/// A typed literal observed in the target, with optional usage context
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstantHint {
    pub ty: TypeId,
    pub value: Literal,
    #[serde(default)]
    pub context: HintContext,
}

impl ConstantHint {
    pub fn new(ty: impl Into<TypeId>, value: Literal) -> Self {
        Self {
            ty: ty.into(),
            value,
            context: HintContext::Unknown,
        }
    }

    pub fn compared(ty: impl Into<TypeId>, value: Literal, comparison: Comparison) -> Self {
        Self {
            ty: ty.into(),
            value,
            context: HintContext::Comparison(comparison),
        }
    }

    pub fn passed_to(ty: impl Into<TypeId>, value: Literal, executable: ExecutableId) -> Self {
        Self {
            ty: ty.into(),
            value,
            context: HintContext::Call(executable),
        }
    }
}

/// Signature and hints of the callable values are generated for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableDescription {
    pub name: String,
    pub return_type: TypeId,
    pub parameters: Vec<TypeId>,
    #[serde(default)]
    pub constants: Vec<ConstantHint>,
    /// Package the generated test lives in; used for accessibility checks
    #[serde(default)]
    pub package: Option<String>,
}

impl CallableDescription {
    pub fn new(name: impl Into<String>, parameters: Vec<TypeId>) -> Self {
        Self {
            name: name.into(),
            return_type: TypeId::Void,
            parameters,
            constants: Vec::new(),
            package: None,
        }
    }

    pub fn with_return_type(mut self, return_type: TypeId) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn with_constants(mut self, constants: Vec<ConstantHint>) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Hints whose declared type is exactly `ty`
    pub fn constants_of<'a>(&'a self, ty: &'a TypeId) -> impl Iterator<Item = &'a ConstantHint> + 'a {
        self.constants.iter().filter(move |hint| &hint.ty == ty)
    }
}
