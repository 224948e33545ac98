use atrium_components::{ComponentInstance, NodeRef};
use atrium_config::{PropertyKind, PropertyMap, ResolvedTypes, SchemaError};
use serde_json::{Map as JsonMap, Value as JsonValue, json};
use uuid::Uuid;

use crate::error::ExportError;
use crate::node::EditorNode;
use crate::object::ObjectScene;
use crate::selector::selector_matches;

/// Placeholder component attached to node-ref targets so the interchange
/// writer materializes them as addressable entities.
pub const NODE_REF_PLACEHOLDER: &str = "__noderef";

/// Marker the interchange writer later rewrites into the target object's
/// node index.
pub fn gltf_index_for_uuid(uuid: Uuid) -> JsonValue {
    json!({ "__gltfIndexForUuid": uuid })
}

/// Writes one component instance's data into `target`'s extension bag,
/// resolving every node reference on the way.
///
/// References that carry an object name point inside a loaded model and
/// resolve against the export scene; plain references resolve in the live
/// scene. The caller supplies both scopes, whose uuids disagree for model
/// subtrees.
pub fn prepare_component_for_export(
    instance: &ComponentInstance,
    target: Uuid,
    export_scene: &mut ObjectScene,
    live_scene: &mut ObjectScene,
) -> Result<(), ExportError> {
    let Some(config) = &instance.config else {
        return Err(ExportError::MissingDefinition(instance.name.clone()));
    };

    let serialized = instance.serialize()?;
    let mut props: JsonMap<String, JsonValue> = serialized.data.into_iter().collect();
    replace_node_refs(
        &instance.name,
        &mut props,
        &config.properties,
        &instance.types,
        export_scene,
        live_scene,
    )?;

    export_scene.add_component(
        target,
        &instance.name,
        JsonValue::Object(props),
        config.multiple,
    )
}

/// Applies every component on `node` to its selector matches inside the
/// node's exported subtree.
pub fn export_node_components(
    node: &EditorNode,
    node_object: Uuid,
    export_scene: &mut ObjectScene,
    live_scene: &mut ObjectScene,
) -> Result<(), ExportError> {
    for instance in &node.components.value {
        for target in selector_matches(&instance.selector, export_scene, node_object) {
            prepare_component_for_export(instance, target, export_scene, live_scene)?;
        }
    }
    Ok(())
}

fn replace_node_refs(
    component: &str,
    data: &mut JsonMap<String, JsonValue>,
    properties: &PropertyMap,
    types: &ResolvedTypes,
    export_scene: &mut ObjectScene,
    live_scene: &mut ObjectScene,
) -> Result<(), ExportError> {
    for (prop, value) in data.iter_mut() {
        let Some(decl) = properties.get(prop) else {
            continue;
        };
        match decl.kind {
            PropertyKind::NodeRef => {
                *value =
                    resolve_node_ref(component, prop, value, export_scene, live_scene)?;
            }
            PropertyKind::Array => {
                let type_name =
                    decl.array_type
                        .as_deref()
                        .ok_or_else(|| SchemaError::MissingArrayType {
                            property: prop.clone(),
                        })?;
                let element_props = types.get(type_name).map(|def| &def.properties).ok_or_else(
                    || SchemaError::MissingTypeDefinition {
                        type_name: type_name.to_owned(),
                        property: prop.clone(),
                    },
                )?;
                if let JsonValue::Array(items) = value {
                    for item in items {
                        if let JsonValue::Object(fields) = item {
                            replace_node_refs(
                                component,
                                fields,
                                element_props,
                                types,
                                export_scene,
                                live_scene,
                            )?;
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn resolve_node_ref(
    component: &str,
    property: &str,
    value: &JsonValue,
    export_scene: &mut ObjectScene,
    live_scene: &mut ObjectScene,
) -> Result<JsonValue, ExportError> {
    let node_ref: NodeRef =
        serde_json::from_value(value.clone()).map_err(SchemaError::from)?;
    let Some(uuid) = node_ref.uuid else {
        return Err(ExportError::UnsetNodeReference {
            component: component.to_owned(),
            property: property.to_owned(),
        });
    };

    let unresolved = || ExportError::UnresolvedNodeReference {
        uuid,
        object_name: node_ref.object_name.clone(),
    };

    let (scene, target) = match &node_ref.object_name {
        Some(object_name) => {
            export_scene.object(uuid).ok_or_else(unresolved)?;
            let found = export_scene
                .descendant_by_name(uuid, object_name)
                .ok_or_else(unresolved)?;
            (&mut *export_scene, found)
        }
        None => {
            let found = live_scene
                .object(uuid)
                .map(|object| object.uuid)
                .ok_or_else(unresolved)?;
            (&mut *live_scene, found)
        }
    };

    scene.tag_for_export(target);
    scene.add_component(target, NODE_REF_PLACEHOLDER, json!({}), false)?;
    Ok(gltf_index_for_uuid(target))
}
