#![forbid(unsafe_code)]

pub mod error;
pub mod export;
pub mod node;
pub mod object;
pub mod selector;

pub use error::ExportError;
pub use export::{
    NODE_REF_PLACEHOLDER, export_node_components, gltf_index_for_uuid,
    prepare_component_for_export,
};
pub use node::{
    ComponentList, EditorNode, MigrationSummary, NodeHooks, NodeKind, migrate_scene_components,
};
pub use object::{ComponentEntry, GltfExtensions, ObjectScene, SceneObject};
pub use selector::selector_matches;

#[cfg(test)]
mod tests {
    use atrium_components::{ComponentInstance, PropertyValue};
    use atrium_config::SchemaDocument;

    use super::*;

    // End-to-end: edit the schema document, watch an existing instance
    // drift, migrate it, and export the result.

    #[test]
    fn schema_edit_drift_migrate_export() {
        let mut document = SchemaDocument::from_text(
            r#"{
                "components": {
                    "light": {
                        "properties": {
                            "color": { "type": "color" }
                        }
                    }
                },
                "types": {}
            }"#,
        )
        .expect("valid document");

        let mut node = EditorNode::new("Lamp", NodeKind::Light);
        node.attach_component("light", document.config())
            .expect("attaches");
        assert_eq!(node.outdated_count(document.config()), 0);

        document
            .set_text(
                r#"{
                    "components": {
                        "light": {
                            "properties": {
                                "color": { "type": "color" },
                                "intensity": { "type": "number" }
                            }
                        }
                    },
                    "types": {}
                }"#,
            )
            .expect("valid document");
        assert_eq!(node.outdated_count(document.config()), 1);

        let summary = node.migrate_components(document.config());
        assert_eq!(summary.migrated, 1);
        let instance = &node.components.value[0];
        assert_eq!(instance.data["intensity"], PropertyValue::Number(0.0));

        let mut export_scene = ObjectScene::new("Export");
        let mut live_scene = ObjectScene::new("Live");
        let lamp = export_scene
            .add_object(export_scene.root(), "Lamp")
            .expect("adds");
        export_node_components(&node, lamp, &mut export_scene, &mut live_scene)
            .expect("exports");

        let bag = &export_scene.object(lamp).expect("lamp").extensions.components;
        assert!(bag.contains_key("light"));
    }

    #[test]
    fn default_document_supports_the_full_attach_flow() {
        let document = SchemaDocument::default();
        let mut node = EditorNode::new("Robot", NodeKind::Model);
        assert!(document.has_components_for_node(node.kind.name()));

        for name in ["spin", "point-light", "patrol"] {
            node.attach_component(name, document.config()).expect("attaches");
        }
        assert_eq!(node.outdated_count(document.config()), 0);

        let records = node.serialize_components().expect("serializes");
        let restored: Vec<ComponentInstance> = records
            .iter()
            .map(|record| {
                ComponentInstance::deserialize(record, document.config()).expect("deserializes")
            })
            .collect();
        assert_eq!(restored.len(), 3);
        assert!(restored.iter().all(|instance| !instance.is_stub()));
    }
}
