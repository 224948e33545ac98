use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RGB color with components in 0..1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }
}

/// Weak, non-owning pointer to another scene object. Never dereferenced
/// while editing; the export adapter resolves it against caller-supplied
/// lookup scopes. A missing uuid marks the reference as unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    #[serde(default, deserialize_with = "uuid_or_empty")]
    pub uuid: Option<Uuid>,
    #[serde(default)]
    pub object_name: Option<String>,
}

impl NodeRef {
    pub fn unset() -> Self {
        NodeRef::default()
    }

    /// Reference to an object in the live scene.
    pub fn to_object(uuid: Uuid) -> Self {
        NodeRef {
            uuid: Some(uuid),
            object_name: None,
        }
    }

    /// Reference into a model subtree: the anchor object's uuid plus the
    /// name of the descendant the reference points at.
    pub fn into_subtree(uuid: Uuid, object_name: impl Into<String>) -> Self {
        NodeRef {
            uuid: Some(uuid),
            object_name: Some(object_name.into()),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.uuid.is_none()
    }
}

/// Documents written by older editors persist unset references as an empty
/// uuid string rather than null.
fn uuid_or_empty<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => Uuid::parse_str(text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Field values of one composite (array element), keyed by property name.
pub type CompositeValue = IndexMap<String, PropertyValue>;

/// In-memory value of a single component property, one variant per
/// declarable kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    String(String),
    Bool(bool),
    Color(Color),
    Vec3(Vec3),
    NodeRef(NodeRef),
    Array(Vec<CompositeValue>),
}

impl PropertyValue {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Number(_) => "number",
            PropertyValue::String(_) => "string",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Color(_) => "color",
            PropertyValue::Vec3(_) => "vec3",
            PropertyValue::NodeRef(_) => "nodeRef",
            PropertyValue::Array(_) => "array",
        }
    }

    #[inline]
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            PropertyValue::Number(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            PropertyValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_color(&self) -> Option<Color> {
        match *self {
            PropertyValue::Color(c) => Some(c),
            _ => None,
        }
    }

    #[inline]
    pub fn as_vec3(&self) -> Option<Vec3> {
        match *self {
            PropertyValue::Vec3(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_node_ref(&self) -> Option<&NodeRef> {
        match self {
            PropertyValue::NodeRef(r) => Some(r),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[CompositeValue]> {
        match self {
            PropertyValue::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<CompositeValue>> {
        match self {
            PropertyValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    #[inline]
    fn from(v: f64) -> Self {
        PropertyValue::Number(v)
    }
}
impl From<&str> for PropertyValue {
    #[inline]
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_owned())
    }
}
impl From<String> for PropertyValue {
    #[inline]
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}
impl From<bool> for PropertyValue {
    #[inline]
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}
impl From<Color> for PropertyValue {
    #[inline]
    fn from(v: Color) -> Self {
        PropertyValue::Color(v)
    }
}
impl From<Vec3> for PropertyValue {
    #[inline]
    fn from(v: Vec3) -> Self {
        PropertyValue::Vec3(v)
    }
}
impl From<NodeRef> for PropertyValue {
    #[inline]
    fn from(v: NodeRef) -> Self {
        PropertyValue::NodeRef(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ref_unset_roundtrips_through_null() {
        let json = serde_json::to_value(NodeRef::unset()).expect("serialize");
        assert!(json["uuid"].is_null());
        let back: NodeRef = serde_json::from_value(json).expect("deserialize");
        assert!(back.is_unset());
    }

    #[test]
    fn node_ref_accepts_empty_string_uuid() {
        let back: NodeRef =
            serde_json::from_str(r#"{ "uuid": "", "objectName": null }"#).expect("deserialize");
        assert!(back.is_unset());
    }

    #[test]
    fn node_ref_set_roundtrips() {
        let original = NodeRef::into_subtree(Uuid::new_v4(), "Hinge");
        let json = serde_json::to_value(&original).expect("serialize");
        let back: NodeRef = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, original);
    }

    #[test]
    fn accessors_reject_other_kinds() {
        let v = PropertyValue::from(2.5);
        assert_eq!(v.as_number(), Some(2.5));
        assert_eq!(v.as_str(), None);
        assert_eq!(v.as_bool(), None);

        let v = PropertyValue::from("hello");
        assert_eq!(v.as_str(), Some("hello"));
        assert_eq!(v.as_number(), None);
    }

    #[test]
    fn array_mutation_through_accessor() {
        let mut v = PropertyValue::Array(vec![]);
        if let Some(items) = v.as_array_mut() {
            items.push(CompositeValue::new());
        }
        assert_eq!(v.as_array().map(|items| items.len()), Some(1));
    }
}
