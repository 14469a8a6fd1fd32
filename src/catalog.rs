//! Type and executable metadata
//!
//! The construction planner and the enum/collection providers consult a
//! `TypeCatalog` for constructors, fields, setters and enum constants. The
//! catalog is a read-only oracle; `InMemoryCatalog` is the implementation
//! drivers populate from whatever reflection facility they have.

use crate::model::{ExecutableId, FieldId, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    /// Whether a member with this visibility declared in `declaring_package`
    /// can be used from `from_package`
    pub fn is_accessible(self, declaring_package: &str, from_package: Option<&str>) -> bool {
        match self {
            Visibility::Public => true,
            Visibility::Protected | Visibility::Package => from_package == Some(declaring_package),
            Visibility::Private => false,
        }
    }
}

/// How a class is nested in its enclosing declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nesting {
    #[default]
    TopLevel,
    StaticNested,
    /// Needs an enclosing instance to be constructed
    Inner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorInfo {
    pub parameters: Vec<TypeId>,
    pub visibility: Visibility,
    /// Fields this constructor initializes from its arguments
    pub assigns: Vec<String>,
}

impl ConstructorInfo {
    pub fn public(parameters: Vec<TypeId>) -> Self {
        Self {
            parameters,
            visibility: Visibility::Public,
            assigns: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn assigning(mut self, fields: &[&str]) -> Self {
        self.assigns = fields.iter().map(|field| field.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: TypeId,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, ty: TypeId, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility,
            is_static: false,
            is_final: false,
        }
    }

    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn as_final(mut self) -> Self {
        self.is_final = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    pub parameters: Vec<TypeId>,
    pub return_type: TypeId,
    pub visibility: Visibility,
    pub is_static: bool,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, parameters: Vec<TypeId>, return_type: TypeId) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type,
            visibility: Visibility::Public,
            is_static: false,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

/// Everything the planner needs to know about one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: String,
    pub package: String,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub nesting: Nesting,
    pub constructors: Vec<ConstructorInfo>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            visibility: Visibility::Public,
            is_abstract: false,
            nesting: Nesting::TopLevel,
            constructors: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_nesting(mut self, nesting: Nesting) -> Self {
        self.nesting = nesting;
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn constructor(mut self, constructor: ConstructorInfo) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn ty(&self) -> TypeId {
        TypeId::Object(self.name.clone())
    }

    pub fn constructor_id(&self, constructor: &ConstructorInfo) -> ExecutableId {
        ExecutableId::constructor(self.name.clone(), constructor.parameters.clone())
    }

    pub fn field_id(&self, field: &FieldInfo) -> FieldId {
        FieldId {
            declaring_type: self.name.clone(),
            name: field.name.clone(),
            ty: field.ty.clone(),
        }
    }

    pub fn method_id(&self, method: &MethodInfo) -> ExecutableId {
        ExecutableId::method(self.name.clone(), method.name.clone(), method.parameters.clone())
    }

    /// Accessible setter for `field` following the `setFoo(value)` convention
    pub fn setter_for(&self, field: &FieldInfo, from_package: Option<&str>) -> Option<&MethodInfo> {
        let expected = setter_name(&field.name);
        self.methods.iter().find(|method| {
            method.name == expected
                && !method.is_static
                && method.parameters.len() == 1
                && method.parameters[0] == field.ty
                && method.visibility.is_accessible(&self.package, from_package)
        })
    }
}

/// `count` becomes `setCount`
pub fn setter_name(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => format!("set{}{}", first.to_uppercase(), chars.as_str()),
        None => "set".to_string(),
    }
}

/// A single enum constant; shared by reference so identities can follow it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub type_name: String,
    pub name: String,
    pub ordinal: u32,
}

/// Read-only metadata oracle for declared types
pub trait TypeCatalog {
    fn class(&self, name: &str) -> Option<&ClassInfo>;

    /// Constants of an enum in declaration order
    fn enum_constants(&self, name: &str) -> Option<&[Rc<EnumValue>]>;

    /// Concrete class used to instantiate a collection interface
    fn collection_implementation(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    classes: HashMap<String, ClassInfo>,
    enums: HashMap<String, Vec<Rc<EnumValue>>>,
    collections: HashMap<String, String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_class(&mut self, class: ClassInfo) -> &mut Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn register_enum(&mut self, name: &str, constants: &[&str]) -> &mut Self {
        let values = constants
            .iter()
            .enumerate()
            .map(|(ordinal, constant)| {
                Rc::new(EnumValue {
                    type_name: name.to_string(),
                    name: constant.to_string(),
                    ordinal: ordinal as u32,
                })
            })
            .collect();
        self.enums.insert(name.to_string(), values);
        self
    }

    pub fn register_collection(&mut self, interface: &str, implementation: &str) -> &mut Self {
        self.collections.insert(interface.to_string(), implementation.to_string());
        self
    }
}

impl TypeCatalog for InMemoryCatalog {
    fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    fn enum_constants(&self, name: &str) -> Option<&[Rc<EnumValue>]> {
        self.enums.get(name).map(Vec::as_slice)
    }

    fn collection_implementation(&self, name: &str) -> Option<&str> {
        self.collections.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrimitiveType;

    #[test]
    fn test_setter_name_convention() {
        assert_eq!(setter_name("count"), "setCount");
        assert_eq!(setter_name("prvFieldWithSetter"), "setPrvFieldWithSetter");
    }

    #[test]
    fn test_package_private_access_requires_same_package() {
        assert!(Visibility::Package.is_accessible("samples", Some("samples")));
        assert!(!Visibility::Package.is_accessible("samples", Some("other")));
        assert!(!Visibility::Package.is_accessible("samples", None));
        assert!(!Visibility::Private.is_accessible("samples", Some("samples")));
    }

    #[test]
    fn test_setter_lookup_requires_matching_parameter() {
        let int: TypeId = PrimitiveType::Int32.into();
        let class = ClassInfo::new("A", "samples")
            .field(FieldInfo::new("size", int.clone(), Visibility::Private))
            .method(MethodInfo::new("setSize", vec![PrimitiveType::Int64.into()], TypeId::Void));
        assert!(class.setter_for(&class.fields[0], None).is_none());

        let class = class.method(MethodInfo::new("setSize", vec![int], TypeId::Void));
        assert!(class.setter_for(&class.fields[0], None).is_some());
    }

    #[test]
    fn test_enum_constants_are_shared_references() {
        let mut catalog = InMemoryCatalog::new();
        catalog.register_enum("Color", &["RED", "GREEN"]);

        let first = catalog.enum_constants("Color").unwrap();
        let second = catalog.enum_constants("Color").unwrap();
        assert!(Rc::ptr_eq(&first[1], &second[1]));
        assert_eq!(first[1].ordinal, 1);
    }
}
