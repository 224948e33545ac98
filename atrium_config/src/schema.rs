use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Property declarations of one component or composite type, in declaration
/// order. Order drives default-data construction and the persisted layout.
pub type PropertyMap = IndexMap<String, PropertyDecl>;

/// Closure of composite types produced by the resolver, keyed by type name.
pub type ResolvedTypes = IndexMap<String, TypeDef>;

/// The closed set of kinds a schema property may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Number,
    String,
    Bool,
    Color,
    Vec3,
    NodeRef,
    Array,
}

impl PropertyKind {
    pub const fn name(self) -> &'static str {
        match self {
            PropertyKind::Number => "number",
            PropertyKind::String => "string",
            PropertyKind::Bool => "bool",
            PropertyKind::Color => "color",
            PropertyKind::Vec3 => "vec3",
            PropertyKind::NodeRef => "nodeRef",
            PropertyKind::Array => "array",
        }
    }
}

/// A single property declaration. `array_type` names an entry in the
/// document's `types` table and is only meaningful when `kind` is `Array`.
/// `default` optionally overrides the kind's zero value for scalar kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(
        rename = "arrayType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub array_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
}

impl PropertyDecl {
    pub fn scalar(kind: PropertyKind) -> Self {
        PropertyDecl {
            kind,
            array_type: None,
            default: None,
        }
    }

    pub fn array(array_type: impl Into<String>) -> Self {
        PropertyDecl {
            kind: PropertyKind::Array,
            array_type: Some(array_type.into()),
            default: None,
        }
    }

    pub fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// A component shape as declared in the schema document.
///
/// `multiple` allows several instances of the component on one node (their
/// export names get an index suffix). `node` and `nodes` gate which node
/// kinds may host the component; the core exposes them, the UI enforces them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentDef {
    pub properties: PropertyMap,
    pub multiple: bool,
    pub node: bool,
    pub nodes: Vec<String>,
}

/// Document-side composite type entry. `properties` stays optional so a
/// malformed entry survives parsing and the resolver can name the fault.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDecl {
    pub properties: Option<PropertyMap>,
}

/// A validated composite type as it appears in resolved closures, frozen
/// instance schemas, and persisted component records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub properties: PropertyMap,
}

/// Parsed form of the schema document: named component definitions plus the
/// reusable composite types their `array` properties may reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    pub components: IndexMap<String, ComponentDef>,
    pub types: IndexMap<String, TypeDecl>,
}
