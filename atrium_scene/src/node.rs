use atrium_components::{ComponentInstance, SerializedComponent};
use atrium_config::{ComponentsConfig, SchemaError};
use uuid::Uuid;

/// Editor-facing node kinds. Behavioral differences hang off the hooks
/// table instead of a class hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scene,
    Group,
    Model,
    Light,
}

impl NodeKind {
    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::Scene => "Scene",
            NodeKind::Group => "Group",
            NodeKind::Model => "Model",
            NodeKind::Light => "Light",
        }
    }

    pub fn hooks(self) -> &'static NodeHooks {
        match self {
            NodeKind::Model => &MODEL_HOOKS,
            _ => &DEFAULT_HOOKS,
        }
    }
}

/// Lifecycle hooks dispatched per node kind.
pub struct NodeHooks {
    pub on_add: fn(&mut EditorNode),
    pub on_change: fn(&mut EditorNode),
    pub on_remove: fn(&mut EditorNode),
}

fn noop(_: &mut EditorNode) {}

fn mark_dirty(node: &mut EditorNode) {
    node.dirty = true;
}

fn collapse_components(node: &mut EditorNode) {
    node.components.collapsed = true;
}

static DEFAULT_HOOKS: NodeHooks = NodeHooks {
    on_add: noop,
    on_change: mark_dirty,
    on_remove: noop,
};

static MODEL_HOOKS: NodeHooks = NodeHooks {
    on_add: collapse_components,
    on_change: mark_dirty,
    on_remove: noop,
};

/// Components attached to one node, with the panel's collapsed state.
#[derive(Debug, Default)]
pub struct ComponentList {
    pub value: Vec<ComponentInstance>,
    pub collapsed: bool,
}

impl ComponentList {
    /// Display name for the instance at `index`, disambiguated among
    /// instances sharing a component name.
    pub fn display_name(&self, index: usize) -> Option<String> {
        let instance = self.value.get(index)?;
        let nth = self.value[..index]
            .iter()
            .filter(|other| other.name == instance.name)
            .count();
        Some(instance.display_name(nth))
    }
}

/// A scene-graph node holding its attached components by composition.
#[derive(Debug)]
pub struct EditorNode {
    pub uuid: Uuid,
    pub name: String,
    pub kind: NodeKind,
    pub enabled: bool,
    pub visible: bool,
    pub dirty: bool,
    pub components: ComponentList,
}

/// Outcome of a batched migration pass.
#[derive(Debug, Default, PartialEq)]
pub struct MigrationSummary {
    pub migrated: usize,
    pub deleted: usize,
    pub skipped: usize,
}

impl MigrationSummary {
    pub fn is_clean(&self) -> bool {
        *self == MigrationSummary::default()
    }

    fn absorb(&mut self, other: MigrationSummary) {
        self.migrated += other.migrated;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
    }
}

impl EditorNode {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        let mut node = EditorNode {
            uuid: Uuid::new_v4(),
            name: name.to_owned(),
            kind,
            enabled: true,
            visible: true,
            dirty: false,
            components: ComponentList::default(),
        };
        (kind.hooks().on_add)(&mut node);
        node
    }

    /// Attaches a fresh instance of the named component, built against the
    /// current schema.
    pub fn attach_component(
        &mut self,
        name: &str,
        current: &ComponentsConfig,
    ) -> Result<&mut ComponentInstance, SchemaError> {
        let instance = ComponentInstance::new(name, current)?;
        self.components.value.push(instance);
        (self.kind.hooks().on_change)(self);
        Ok(self
            .components
            .value
            .last_mut()
            .expect("instance was just pushed"))
    }

    pub fn detach_component(&mut self, index: usize) -> Option<ComponentInstance> {
        if index >= self.components.value.len() {
            return None;
        }
        let removed = self.components.value.remove(index);
        (self.kind.hooks().on_change)(self);
        Some(removed)
    }

    /// Dispatched by the owning scene when the node leaves the graph.
    pub fn notify_removed(&mut self) {
        (self.kind.hooks().on_remove)(self);
    }

    pub fn serialize_components(&self) -> Result<Vec<SerializedComponent>, SchemaError> {
        self.components
            .value
            .iter()
            .map(ComponentInstance::serialize)
            .collect()
    }

    pub fn deserialize_components(
        &mut self,
        records: &[SerializedComponent],
        current: &ComponentsConfig,
    ) -> Result<(), SchemaError> {
        let mut value = Vec::with_capacity(records.len());
        for record in records {
            value.push(ComponentInstance::deserialize(record, current)?);
        }
        self.components.value = value;
        Ok(())
    }

    /// How many attached instances have drifted from the current schema.
    pub fn outdated_count(&self, current: &ComponentsConfig) -> usize {
        self.components
            .value
            .iter()
            .filter(|instance| instance.needs_update(current).unwrap_or(true))
            .count()
    }

    /// Brings every attached instance up to the current schema.
    ///
    /// Each instance is one independent, total step: it fully adopts its
    /// migrated data, is dropped when the schema no longer defines it, or is
    /// kept untouched and counted as skipped when its migration fails. One
    /// instance's failure never leaves another partially updated.
    pub fn migrate_components(&mut self, current: &ComponentsConfig) -> MigrationSummary {
        let mut summary = MigrationSummary::default();
        let previous = std::mem::take(&mut self.components.value);

        for mut instance in previous {
            match instance.needs_update(current) {
                Ok(false) => self.components.value.push(instance),
                Ok(true) => match instance.apply_migration(current) {
                    Ok(true) => {
                        summary.migrated += 1;
                        self.components.value.push(instance);
                    }
                    Ok(false) => summary.deleted += 1,
                    Err(err) => {
                        log::warn!(
                            "node \"{}\": skipping migration of component \"{}\": {err}",
                            self.name,
                            instance.name
                        );
                        summary.skipped += 1;
                        self.components.value.push(instance);
                    }
                },
                Err(err) => {
                    log::warn!(
                        "node \"{}\": cannot check component \"{}\" against the schema: {err}",
                        self.name,
                        instance.name
                    );
                    summary.skipped += 1;
                    self.components.value.push(instance);
                }
            }
        }

        if !summary.is_clean() {
            (self.kind.hooks().on_change)(self);
        }
        summary
    }
}

/// Migration pass over every node of a scene.
pub fn migrate_scene_components(
    nodes: &mut [EditorNode],
    current: &ComponentsConfig,
) -> MigrationSummary {
    let mut summary = MigrationSummary::default();
    for node in nodes {
        summary.absorb(node.migrate_components(current));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_components::PropertyValue;

    fn config(text: &str) -> ComponentsConfig {
        serde_json::from_str(text).expect("valid config")
    }

    fn two_component_config() -> ComponentsConfig {
        config(
            r#"{
                "components": {
                    "spin": { "properties": { "speed": { "type": "number" } } },
                    "tag": { "properties": { "label": { "type": "string" } }, "multiple": true }
                },
                "types": {}
            }"#,
        )
    }

    #[test]
    fn attach_builds_defaults_and_marks_dirty() {
        let current = two_component_config();
        let mut node = EditorNode::new("Crate", NodeKind::Group);
        assert!(!node.dirty);

        let instance = node.attach_component("spin", &current).expect("attaches");
        assert_eq!(instance.data["speed"], PropertyValue::Number(0.0));
        assert!(node.dirty);
        assert_eq!(node.components.value.len(), 1);
    }

    #[test]
    fn model_nodes_start_with_a_collapsed_panel() {
        let node = EditorNode::new("Statue", NodeKind::Model);
        assert!(node.components.collapsed);
        assert!(!EditorNode::new("Group", NodeKind::Group).components.collapsed);
    }

    #[test]
    fn display_names_count_same_name_siblings() {
        let current = two_component_config();
        let mut node = EditorNode::new("Crate", NodeKind::Group);
        node.attach_component("tag", &current).expect("attaches");
        node.attach_component("spin", &current).expect("attaches");
        node.attach_component("tag", &current).expect("attaches");

        assert_eq!(node.components.display_name(0).as_deref(), Some("tag__0"));
        assert_eq!(node.components.display_name(1).as_deref(), Some("spin"));
        assert_eq!(node.components.display_name(2).as_deref(), Some("tag__1"));
        assert_eq!(node.components.display_name(3), None);
    }

    #[test]
    fn component_records_roundtrip_through_node_serialization() {
        let current = two_component_config();
        let mut node = EditorNode::new("Crate", NodeKind::Group);
        node.attach_component("spin", &current)
            .expect("attaches")
            .data["speed"] = PropertyValue::Number(2.0);

        let records = node.serialize_components().expect("serializes");

        let mut restored = EditorNode::new("Crate", NodeKind::Group);
        restored
            .deserialize_components(&records, &current)
            .expect("deserializes");
        assert_eq!(
            restored.components.value[0].data["speed"],
            PropertyValue::Number(2.0)
        );
    }

    #[test]
    fn migration_pass_updates_and_deletes_independently() {
        let before = two_component_config();
        let mut node = EditorNode::new("Crate", NodeKind::Group);
        node.attach_component("spin", &before).expect("attaches");
        node.attach_component("tag", &before).expect("attaches");

        // "tag" disappears, "spin" gains a property.
        let after = config(
            r#"{
                "components": {
                    "spin": {
                        "properties": {
                            "speed": { "type": "number" },
                            "axis": { "type": "vec3" }
                        }
                    }
                },
                "types": {}
            }"#,
        );

        assert_eq!(node.outdated_count(&after), 2);
        let summary = node.migrate_components(&after);
        assert_eq!(
            summary,
            MigrationSummary {
                migrated: 1,
                deleted: 1,
                skipped: 0,
            }
        );
        assert_eq!(node.components.value.len(), 1);
        assert_eq!(node.components.value[0].name, "spin");
        assert!(node.components.value[0].data.contains_key("axis"));
        assert_eq!(node.outdated_count(&after), 0);
    }

    #[test]
    fn up_to_date_instances_pass_through_untouched() {
        let current = two_component_config();
        let mut node = EditorNode::new("Crate", NodeKind::Group);
        node.attach_component("spin", &current).expect("attaches");

        let summary = node.migrate_components(&current);
        assert!(summary.is_clean());
        assert_eq!(node.components.value.len(), 1);
    }

    #[test]
    fn scene_wide_migration_sums_node_summaries() {
        let before = two_component_config();
        let mut nodes = vec![
            EditorNode::new("A", NodeKind::Group),
            EditorNode::new("B", NodeKind::Model),
        ];
        for node in &mut nodes {
            node.attach_component("tag", &before).expect("attaches");
        }

        let after = config(r#"{ "components": {}, "types": {} }"#);
        let summary = migrate_scene_components(&mut nodes, &after);
        assert_eq!(summary.deleted, 2);
        assert!(nodes.iter().all(|node| node.components.value.is_empty()));
    }
}
