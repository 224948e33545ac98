use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::schema::{PropertyKind, PropertyMap, ResolvedTypes, TypeDecl, TypeDef};

/// Collects every composite type the given properties reference, directly or
/// through other composite types.
///
/// The result is the minimal closure needed to interpret, serialize, and
/// migrate the property set. `visiting` holds the chain of type names
/// currently being expanded; a name that reappears on its own chain is a
/// circular definition and only scalar or array nesting can terminate it, so
/// that is an error. When two branches reach the same type, the first
/// discovery wins.
pub fn resolve_dependent_types(
    properties: &PropertyMap,
    all_types: &IndexMap<String, TypeDecl>,
    visiting: &[String],
) -> Result<ResolvedTypes, SchemaError> {
    let mut referenced = ResolvedTypes::new();

    for (prop_name, decl) in properties {
        if decl.kind != PropertyKind::Array {
            continue;
        }
        let type_name =
            decl.array_type
                .as_deref()
                .ok_or_else(|| SchemaError::MissingArrayType {
                    property: prop_name.clone(),
                })?;
        let entry = all_types
            .get(type_name)
            .ok_or_else(|| SchemaError::MissingTypeDefinition {
                type_name: type_name.to_owned(),
                property: prop_name.clone(),
            })?;
        let Some(type_properties) = &entry.properties else {
            return Err(SchemaError::MalformedTypeDefinition {
                type_name: type_name.to_owned(),
                property: prop_name.clone(),
            });
        };
        if visiting.iter().any(|name| name == type_name) {
            return Err(SchemaError::CircularTypeDependency(type_name.to_owned()));
        }

        referenced
            .entry(type_name.to_owned())
            .or_insert_with(|| TypeDef {
                properties: type_properties.clone(),
            });

        let mut chain = visiting.to_vec();
        chain.push(type_name.to_owned());
        for (name, def) in resolve_dependent_types(type_properties, all_types, &chain)? {
            referenced.entry(name).or_insert(def);
        }
    }

    Ok(referenced)
}
