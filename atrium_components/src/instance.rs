use atrium_config::{
    ComponentDef, ComponentsConfig, PropertyKind, PropertyMap, ResolvedTypes, SchemaError,
    resolve_dependent_types,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::codec::{cast_property, default_for, deserialize_property, serialize_property};
use crate::diff::{diff_properties, diff_types};
use crate::value::PropertyValue;

/// A component's live data, keyed by property name.
pub type ComponentData = IndexMap<String, PropertyValue>;

/// Which object(s) of a node's subtree the component's data applies to at
/// export time. Opaque to the component core; match semantics live with the
/// scene.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selector {
    pub object_name: Option<String>,
}

/// Persisted snapshot of a component instance.
///
/// The record embeds the frozen schema fragment, not a reference to it, so
/// it stays decodable after the live schema document moves on or drops the
/// component entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedComponent {
    pub name: String,
    #[serde(default)]
    pub selector: Selector,
    #[serde(default)]
    pub config: Option<ComponentDef>,
    #[serde(default)]
    pub types: ResolvedTypes,
    #[serde(default)]
    pub data: IndexMap<String, JsonValue>,
}

/// A live component attached to a scene node.
///
/// `config` and `types` are a point-in-time copy of the schema fixed at
/// construction or load time. They never track later document edits; drift
/// against the current schema is detected explicitly through
/// [`needs_update`](ComponentInstance::needs_update), and the current schema
/// is always an explicit parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    pub name: String,
    pub selector: Selector,
    pub config: Option<ComponentDef>,
    pub types: ResolvedTypes,
    pub data: ComponentData,
    pub collapsed: bool,
}

impl ComponentInstance {
    /// Constructs an empty instance against the current schema, with every
    /// property set to its default in declaration order. A name the schema
    /// does not define yields an orphaned stub: displayable, not exportable.
    pub fn new(name: &str, current: &ComponentsConfig) -> Result<Self, SchemaError> {
        let mut instance = ComponentInstance {
            name: name.to_owned(),
            selector: Selector::default(),
            config: None,
            types: ResolvedTypes::new(),
            data: ComponentData::new(),
            collapsed: false,
        };

        if let Some(def) = current.components.get(name) {
            instance.types = resolve_dependent_types(&def.properties, &current.types, &[])?;
            for (prop, decl) in &def.properties {
                instance.data.insert(prop.clone(), default_for(decl));
            }
            instance.config = Some(def.clone());
        }

        Ok(instance)
    }

    /// Full self-contained snapshot, frozen schema fragment included.
    pub fn serialize(&self) -> Result<SerializedComponent, SchemaError> {
        let mut data = IndexMap::new();
        if let Some(config) = &self.config {
            for (prop, value) in &self.data {
                let Some(decl) = config.properties.get(prop) else {
                    log::warn!(
                        "component \"{}\": dropping data entry \"{prop}\" with no declaration",
                        self.name
                    );
                    continue;
                };
                data.insert(
                    prop.clone(),
                    serialize_property(prop, value, decl, &self.types)?,
                );
            }
        }

        Ok(SerializedComponent {
            name: self.name.clone(),
            selector: self.selector.clone(),
            config: self.config.clone(),
            types: self.types.clone(),
            data,
        })
    }

    /// Rebuilds an instance from a persisted record.
    ///
    /// Decoding runs against the record's embedded config and types, never
    /// the current schema, so any previously-written record loads even when
    /// its definitions have since changed or disappeared. The current schema
    /// only seeds construction; its defaults are discarded below.
    pub fn deserialize(
        record: &SerializedComponent,
        current: &ComponentsConfig,
    ) -> Result<Self, SchemaError> {
        let mut instance = ComponentInstance::new(&record.name, current)?;
        instance.selector = record.selector.clone();
        instance.types = record.types.clone();

        let mut data = ComponentData::new();
        if let Some(config) = &record.config {
            for (prop, json) in &record.data {
                match config.properties.get(prop) {
                    Some(decl) => {
                        data.insert(
                            prop.clone(),
                            deserialize_property(prop, json, decl, &record.types)?,
                        );
                    }
                    None => log::warn!(
                        "component \"{}\": skipping data entry \"{prop}\" with no declaration",
                        record.name
                    ),
                }
            }
        }
        instance.data = data;
        instance.config = record.config.clone();

        Ok(instance)
    }

    /// Name as the runtime attaches it. `multiple` components carry an index
    /// suffix so several instances can coexist on one object; `index` is the
    /// instance's position among same-named siblings.
    pub fn display_name(&self, index: usize) -> String {
        match &self.config {
            Some(config) if config.multiple => format!("{}__{index}", self.name),
            _ => self.name.clone(),
        }
    }

    pub fn is_stub(&self) -> bool {
        self.config.is_none()
    }

    fn latest_config<'a>(&self, current: &'a ComponentsConfig) -> Option<&'a ComponentDef> {
        current.components.get(&self.name)
    }

    fn latest_dependent_types(
        &self,
        current: &ComponentsConfig,
    ) -> Result<ResolvedTypes, SchemaError> {
        match self.latest_config(current) {
            Some(def) => resolve_dependent_types(&def.properties, &current.types, &[]),
            None => Ok(ResolvedTypes::new()),
        }
    }

    /// Has the frozen schema diverged from the current one? A removed
    /// component definition diffs as empty-vs-present and reports true.
    pub fn needs_update(&self, current: &ComponentsConfig) -> Result<bool, SchemaError> {
        let empty = PropertyMap::new();
        let frozen_props = self.config.as_ref().map_or(&empty, |c| &c.properties);
        let latest_props = self.latest_config(current).map_or(&empty, |c| &c.properties);
        let latest_types = self.latest_dependent_types(current)?;

        Ok(!diff_properties(frozen_props, latest_props).is_empty()
            || !diff_types(&self.types, &latest_types).is_empty())
    }

    /// Migrates this instance's data to the current schema.
    ///
    /// Returns `Ok(None)` when the schema no longer defines the component:
    /// the instance should be deleted. Otherwise returns a complete new data
    /// map; the caller is responsible for adopting the current config and
    /// types alongside it (see [`apply_migration`](Self::apply_migration)).
    pub fn data_migration(
        &self,
        current: &ComponentsConfig,
    ) -> Result<Option<ComponentData>, SchemaError> {
        let mut new_data = self.data.clone();

        let Some(latest) = self.latest_config(current) else {
            return Ok(None);
        };
        let latest_props = &latest.properties;
        let latest_types = resolve_dependent_types(latest_props, &current.types, &[])?;

        let empty = PropertyMap::new();
        let frozen_props = self.config.as_ref().map_or(&empty, |c| &c.properties);
        let prop_diff = diff_properties(frozen_props, latest_props);
        let type_diff = diff_types(&self.types, &latest_types);

        // Added properties: set default values.
        for name in &prop_diff.added {
            if let Some(decl) = latest_props.get(name) {
                new_data.insert(name.clone(), default_for(decl));
            }
        }

        // Removed properties: delete property data.
        for name in &prop_diff.removed {
            new_data.shift_remove(name);
        }

        // Updated declarations: a kind change casts when possible and falls
        // back to the default. An arrayType change always resets; element
        // data is not migrated across composite types.
        for update in &prop_diff.updated {
            let Some(decl) = latest_props.get(&update.name) else {
                continue;
            };
            if update.kind_changed {
                let cast = self
                    .data
                    .get(&update.name)
                    .and_then(|value| cast_property(decl, value));
                new_data.insert(update.name.clone(), cast.unwrap_or_else(|| default_for(decl)));
            }
            if update.array_type_changed {
                new_data.insert(update.name.clone(), default_for(decl));
            }
        }

        // A composite type that itself changed resets every array property
        // referencing it, whether or not the declaration changed too.
        for name in self.data.keys() {
            let Some(decl) = latest_props.get(name) else {
                continue;
            };
            if decl.kind == PropertyKind::Array {
                if let Some(array_type) = &decl.array_type {
                    if type_diff.updated.iter().any(|t| t == array_type) {
                        new_data.insert(name.clone(), default_for(decl));
                    }
                }
            }
        }

        Ok(Some(new_data))
    }

    /// Runs the data migration and, when the component survives, adopts the
    /// current definition and type closure as the new frozen schema. Returns
    /// `false` when the schema no longer defines the component and the
    /// caller should drop the instance. Nothing is mutated on error.
    pub fn apply_migration(&mut self, current: &ComponentsConfig) -> Result<bool, SchemaError> {
        let Some(new_data) = self.data_migration(current)? else {
            return Ok(false);
        };
        let types = self.latest_dependent_types(current)?;

        self.types = types;
        self.config = self.latest_config(current).cloned();
        self.data = new_data;
        Ok(true)
    }
}
