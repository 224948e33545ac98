use atrium_config::{PropertyDecl, PropertyKind, PropertyMap, ResolvedTypes, SchemaError};
use serde_json::{Value as JsonValue, json};

use crate::value::{Color, CompositeValue, NodeRef, PropertyValue, Vec3};

/// Default value for a property declaration: the declared `default` when the
/// kind is scalar and the value decodes under it, the kind's zero value
/// otherwise. Arrays always start empty and node references unset.
pub fn default_for(decl: &PropertyDecl) -> PropertyValue {
    if let Some(default) = &decl.default {
        match decl.kind {
            PropertyKind::Array | PropertyKind::NodeRef => {}
            _ => match deserialize_property("default", default, decl, &ResolvedTypes::new()) {
                Ok(value) => return value,
                Err(err) => {
                    log::warn!("ignoring declared default: {err}");
                }
            },
        }
    }
    zero_for(decl.kind)
}

fn zero_for(kind: PropertyKind) -> PropertyValue {
    match kind {
        PropertyKind::Number => PropertyValue::Number(0.0),
        PropertyKind::String => PropertyValue::String(String::new()),
        PropertyKind::Bool => PropertyValue::Bool(false),
        PropertyKind::Color => PropertyValue::Color(Color::WHITE),
        PropertyKind::Vec3 => PropertyValue::Vec3(Vec3::default()),
        PropertyKind::NodeRef => PropertyValue::NodeRef(NodeRef::unset()),
        PropertyKind::Array => PropertyValue::Array(Vec::new()),
    }
}

/// Converts an in-memory value to its document representation.
///
/// Node references serialize as their raw `{uuid, objectName}` pair; turning
/// them into interchange indices is the export adapter's job. Array values
/// recurse element-wise against the named composite type from `types`.
pub fn serialize_property(
    property: &str,
    value: &PropertyValue,
    decl: &PropertyDecl,
    types: &ResolvedTypes,
) -> Result<JsonValue, SchemaError> {
    match (decl.kind, value) {
        (PropertyKind::Number, PropertyValue::Number(n)) => Ok(json!(n)),
        (PropertyKind::String, PropertyValue::String(s)) => Ok(json!(s)),
        (PropertyKind::Bool, PropertyValue::Bool(b)) => Ok(json!(b)),
        (PropertyKind::Color, PropertyValue::Color(c)) => Ok(json!([c.r, c.g, c.b])),
        (PropertyKind::Vec3, PropertyValue::Vec3(v)) => {
            Ok(json!({ "x": v.x, "y": v.y, "z": v.z }))
        }
        (PropertyKind::NodeRef, PropertyValue::NodeRef(r)) => Ok(serde_json::to_value(r)?),
        (PropertyKind::Array, PropertyValue::Array(items)) => {
            let element_props = element_properties(property, decl, types)?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(serialize_composite(item, element_props, types)?);
            }
            Ok(JsonValue::Array(out))
        }
        (kind, value) => Err(SchemaError::UnexpectedValue {
            property: property.to_owned(),
            expected: kind.name(),
            found: value.kind_name().to_owned(),
        }),
    }
}

/// Inverse of [`serialize_property`], same recursive structure.
pub fn deserialize_property(
    property: &str,
    json: &JsonValue,
    decl: &PropertyDecl,
    types: &ResolvedTypes,
) -> Result<PropertyValue, SchemaError> {
    let mismatch = || SchemaError::UnexpectedValue {
        property: property.to_owned(),
        expected: decl.kind.name(),
        found: json_kind_name(json).to_owned(),
    };

    match decl.kind {
        PropertyKind::Number => json
            .as_f64()
            .map(PropertyValue::Number)
            .ok_or_else(mismatch),
        PropertyKind::String => json
            .as_str()
            .map(|s| PropertyValue::String(s.to_owned()))
            .ok_or_else(mismatch),
        PropertyKind::Bool => json.as_bool().map(PropertyValue::Bool).ok_or_else(mismatch),
        PropertyKind::Color => {
            let parts = json.as_array().ok_or_else(mismatch)?;
            let [r, g, b] = parts.as_slice() else {
                return Err(mismatch());
            };
            match (r.as_f64(), g.as_f64(), b.as_f64()) {
                (Some(r), Some(g), Some(b)) => Ok(PropertyValue::Color(Color::new(
                    r as f32, g as f32, b as f32,
                ))),
                _ => Err(mismatch()),
            }
        }
        PropertyKind::Vec3 => {
            let fields = json.as_object().ok_or_else(mismatch)?;
            let component = |key: &str| fields.get(key).and_then(JsonValue::as_f64);
            match (component("x"), component("y"), component("z")) {
                (Some(x), Some(y), Some(z)) => {
                    Ok(PropertyValue::Vec3(Vec3::new(x as f32, y as f32, z as f32)))
                }
                _ => Err(mismatch()),
            }
        }
        PropertyKind::NodeRef => {
            let node_ref: NodeRef = serde_json::from_value(json.clone())?;
            Ok(PropertyValue::NodeRef(node_ref))
        }
        PropertyKind::Array => {
            let element_props = element_properties(property, decl, types)?;
            let items = json.as_array().ok_or_else(mismatch)?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let fields = item.as_object().ok_or_else(mismatch)?;
                let mut composite = CompositeValue::new();
                for (name, element_decl) in element_props {
                    let value = match fields.get(name) {
                        Some(field) => deserialize_property(name, field, element_decl, types)?,
                        None => default_for(element_decl),
                    };
                    composite.insert(name.clone(), value);
                }
                out.push(composite);
            }
            Ok(PropertyValue::Array(out))
        }
    }
}

/// Best-effort coercion used only during migration, when a property's
/// declared kind changed. Number and string convert into each other;
/// everything else, including any structural change, has no safe coercion
/// and returns `None` so the caller falls back to the default.
pub fn cast_property(decl: &PropertyDecl, value: &PropertyValue) -> Option<PropertyValue> {
    match (decl.kind, value) {
        (PropertyKind::String, PropertyValue::Number(n)) => {
            Some(PropertyValue::String(format_number(*n)))
        }
        (PropertyKind::Number, PropertyValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(PropertyValue::Number),
        _ => None,
    }
}

fn serialize_composite(
    item: &CompositeValue,
    properties: &PropertyMap,
    types: &ResolvedTypes,
) -> Result<JsonValue, SchemaError> {
    let mut fields = serde_json::Map::new();
    for (name, decl) in properties {
        // Entries the composite never filled in serialize as their default.
        let serialized = match item.get(name) {
            Some(value) => serialize_property(name, value, decl, types)?,
            None => serialize_property(name, &default_for(decl), decl, types)?,
        };
        fields.insert(name.clone(), serialized);
    }
    Ok(JsonValue::Object(fields))
}

fn element_properties<'a>(
    property: &str,
    decl: &PropertyDecl,
    types: &'a ResolvedTypes,
) -> Result<&'a PropertyMap, SchemaError> {
    let type_name = decl
        .array_type
        .as_deref()
        .ok_or_else(|| SchemaError::MissingArrayType {
            property: property.to_owned(),
        })?;
    types
        .get(type_name)
        .map(|def| &def.properties)
        .ok_or_else(|| SchemaError::MissingTypeDefinition {
            type_name: type_name.to_owned(),
            property: property.to_owned(),
        })
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn json_kind_name(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
