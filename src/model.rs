//! @ai:module:intent Define the canonical data model for extracted packages
//! @ai:module:layer domain
//! @ai:module:public_api Package, Interface, Method, MethodInfo, Variable, TypeInfo, FieldInfo, GenericInfo, ConstantInfo, TypeKind, Position, Annotations
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// @ai:intent Flat key-value annotation map, order-irrelevant
///
/// Values stay strings in the public contract; typed interpretation is a
/// downstream consumer's responsibility.
pub type Annotations = BTreeMap<String, String>;

fn is_false(v: &bool) -> bool {
    !*v
}

fn is_zero(v: &usize) -> bool {
    *v == 0
}

/// @ai:intent Represents a source code location
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

/// @ai:intent Complete extraction result for one analyzed package
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(default)]
    pub module_name: String,
    pub package_path: String,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub types: BTreeMap<String, TypeInfo>,
}

/// @ai:intent An exported service interface and its calling surface
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub name: String,
    /// `<package>.<Name>`, unique within a Package.
    pub id: String,
    pub package: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub import: String,
    #[serde(default)]
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    #[serde(default)]
    pub position: Position,
}

/// @ai:intent Method signature as found on a named type
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Variable>,
    #[serde(default)]
    pub results: Vec<Variable>,
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    #[serde(default)]
    pub position: Position,
}

/// @ai:intent An interface method with its stable identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    #[serde(flatten)]
    pub info: MethodInfo,
    pub id: String,
    pub serializable: bool,
}

/// @ai:intent A parameter or result in a method signature
///
/// `type_name` holds the qualified base reference; decorations live in the
/// flags only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub variadic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pointer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub slice: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub map: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub channel: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub generic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub array: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_len: usize,
}

/// @ai:intent A struct field, including tags and embedding
///
/// Unlike `Variable`, `type_name` keeps the full decorated reference text so
/// generators can reproduce the declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "is_false")]
    pub embedded: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pointer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub slice: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub map: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub channel: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub generic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub array: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_len: usize,
}

/// @ai:intent Classifies a resolved type declaration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Struct,
    Interface,
    Enum,
    Alias,
    Generic,
    Function,
    Channel,
    Map,
    Slice,
    Array,
    Pointer,
    #[default]
    Basic,
}

/// @ai:intent Generic type-parameter metadata for documentation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenericInfo {
    pub type_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bounds: BTreeMap<String, String>,
}

/// @ai:intent A named constant associated with an enumeration-like type
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConstantInfo {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub position: Position,
}

/// @ai:intent A fully resolved entry in the package type graph
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypeInfo {
    pub name: String,
    pub package: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub import: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodInfo>,
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic: Option<GenericInfo>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub underlying: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<ConstantInfo>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pointer: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub slice: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub map: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub channel: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub generic_type: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub array: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_len: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub interface: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub function: bool,
}

impl Method {
    /// @ai:intent Create a method whose ID is its name
    pub fn new(info: MethodInfo) -> Self {
        let id = info.name.clone();
        Self {
            info,
            id,
            serializable: false,
        }
    }
}

impl Interface {
    /// @ai:intent Check if the interface carries any annotations
    pub fn is_annotated(&self) -> bool {
        !self.annotations.is_empty()
    }
}
