use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::ExportError;

/// Extension payload for one component name on an export object: a single
/// value, or a sequence when the component allows multiple instances.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentEntry {
    Single(JsonValue),
    Multiple(Vec<JsonValue>),
}

/// Interchange extension data carried by a scene object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GltfExtensions {
    pub components: IndexMap<String, ComponentEntry>,
    /// Set when something references this object, so it keeps an addressable
    /// identity in the output.
    pub export_uuid: Option<Uuid>,
}

#[derive(Debug)]
pub struct SceneObject {
    pub uuid: Uuid,
    pub name: String,
    pub parent: Option<Uuid>,
    pub children: Vec<Uuid>,
    pub extensions: GltfExtensions,
}

/// Uuid-keyed object arena for one scene scope: the live scene, or the
/// scene assembled for export. The two scopes disagree on uuids for objects
/// inside loaded models, so export callers pass both.
#[derive(Debug)]
pub struct ObjectScene {
    root: Uuid,
    objects: IndexMap<Uuid, SceneObject>,
}

impl ObjectScene {
    pub fn new(root_name: &str) -> Self {
        let root = Uuid::new_v4();
        let mut objects = IndexMap::new();
        objects.insert(
            root,
            SceneObject {
                uuid: root,
                name: root_name.to_owned(),
                parent: None,
                children: Vec::new(),
                extensions: GltfExtensions::default(),
            },
        );
        ObjectScene { root, objects }
    }

    pub fn root(&self) -> Uuid {
        self.root
    }

    pub fn object(&self, uuid: Uuid) -> Option<&SceneObject> {
        self.objects.get(&uuid)
    }

    pub fn object_mut(&mut self, uuid: Uuid) -> Option<&mut SceneObject> {
        self.objects.get_mut(&uuid)
    }

    /// Adds a child object under `parent`. Returns `None` when the parent is
    /// not part of this scene.
    pub fn add_object(&mut self, parent: Uuid, name: &str) -> Option<Uuid> {
        if !self.objects.contains_key(&parent) {
            return None;
        }
        let uuid = Uuid::new_v4();
        self.objects.insert(
            uuid,
            SceneObject {
                uuid,
                name: name.to_owned(),
                parent: Some(parent),
                children: Vec::new(),
                extensions: GltfExtensions::default(),
            },
        );
        if let Some(parent_object) = self.objects.get_mut(&parent) {
            parent_object.children.push(uuid);
        }
        Some(uuid)
    }

    /// First object named `name` inside the subtree under `subtree`,
    /// depth-first. The search never leaves the subtree.
    pub fn descendant_by_name(&self, subtree: Uuid, name: &str) -> Option<Uuid> {
        let object = self.objects.get(&subtree)?;
        for &child in &object.children {
            if let Some(child_object) = self.objects.get(&child) {
                if child_object.name == name {
                    return Some(child);
                }
            }
            if let Some(found) = self.descendant_by_name(child, name) {
                return Some(found);
            }
        }
        None
    }

    /// Every object named `name` inside the subtree under `subtree`.
    pub fn descendants_named(&self, subtree: Uuid, name: &str) -> Vec<Uuid> {
        let mut found = Vec::new();
        self.collect_named(subtree, name, &mut found);
        found
    }

    fn collect_named(&self, subtree: Uuid, name: &str, found: &mut Vec<Uuid>) {
        let Some(object) = self.objects.get(&subtree) else {
            return;
        };
        for &child in &object.children {
            if let Some(child_object) = self.objects.get(&child) {
                if child_object.name == name {
                    found.push(child);
                }
            }
            self.collect_named(child, name, found);
        }
    }

    /// Writes component data into the target's extension bag under the
    /// component's name. `multiple` components accumulate a sequence.
    pub fn add_component(
        &mut self,
        target: Uuid,
        component: &str,
        props: JsonValue,
        multiple: bool,
    ) -> Result<(), ExportError> {
        if !props.is_object() {
            return Err(ExportError::InvalidComponentProps {
                component: component.to_owned(),
            });
        }
        let object = self
            .objects
            .get_mut(&target)
            .ok_or(ExportError::UnresolvedNodeReference {
                uuid: target,
                object_name: None,
            })?;

        let bag = &mut object.extensions.components;
        if multiple {
            match bag.get_mut(component) {
                Some(ComponentEntry::Multiple(list)) => list.push(props),
                _ => {
                    bag.insert(component.to_owned(), ComponentEntry::Multiple(vec![props]));
                }
            }
        } else {
            bag.insert(component.to_owned(), ComponentEntry::Single(props));
        }
        Ok(())
    }

    /// Stamps the object's uuid into its extension data so the exporter
    /// keeps it addressable.
    pub fn tag_for_export(&mut self, target: Uuid) {
        if let Some(object) = self.objects.get_mut(&target) {
            object.extensions.export_uuid = Some(object.uuid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descendant_lookup_stays_inside_the_subtree() {
        let mut scene = ObjectScene::new("Root");
        let left = scene.add_object(scene.root(), "Left").expect("adds");
        let right = scene.add_object(scene.root(), "Right").expect("adds");
        let deep = scene.add_object(left, "Wheel").expect("adds");
        scene.add_object(right, "Wheel").expect("adds");

        assert_eq!(scene.descendant_by_name(left, "Wheel"), Some(deep));
        assert_eq!(scene.descendant_by_name(left, "Door"), None);
        assert_eq!(scene.descendants_named(scene.root(), "Wheel").len(), 2);
    }

    #[test]
    fn single_component_overwrites_previous_entry() {
        let mut scene = ObjectScene::new("Root");
        let root = scene.root();
        scene
            .add_component(root, "spin", json!({ "speed": 1.0 }), false)
            .expect("adds");
        scene
            .add_component(root, "spin", json!({ "speed": 2.0 }), false)
            .expect("adds");

        let entry = &scene.object(root).expect("root").extensions.components["spin"];
        assert_eq!(entry, &ComponentEntry::Single(json!({ "speed": 2.0 })));
    }

    #[test]
    fn multiple_component_accumulates_a_sequence() {
        let mut scene = ObjectScene::new("Root");
        let root = scene.root();
        scene
            .add_component(root, "tag", json!({ "label": "a" }), true)
            .expect("adds");
        scene
            .add_component(root, "tag", json!({ "label": "b" }), true)
            .expect("adds");

        let entry = &scene.object(root).expect("root").extensions.components["tag"];
        assert_eq!(
            entry,
            &ComponentEntry::Multiple(vec![json!({ "label": "a" }), json!({ "label": "b" })])
        );
    }

    #[test]
    fn non_object_props_are_invalid() {
        let mut scene = ObjectScene::new("Root");
        let root = scene.root();
        let err = scene
            .add_component(root, "spin", json!(42), false)
            .unwrap_err();
        assert!(matches!(err, ExportError::InvalidComponentProps { .. }));
    }

    #[test]
    fn tagging_records_the_objects_own_uuid() {
        let mut scene = ObjectScene::new("Root");
        let child = scene.add_object(scene.root(), "Door").expect("adds");
        scene.tag_for_export(child);
        assert_eq!(
            scene.object(child).expect("child").extensions.export_uuid,
            Some(child)
        );
    }
}
