use std::collections::BTreeSet;

use crate::error::SchemaError;
use crate::resolve::resolve_dependent_types;
use crate::schema::ComponentsConfig;

/// Schema document shipped with the editor, used until a scene provides its
/// own.
pub const DEFAULT_CONFIG: &str = include_str!("default_config.json");

/// The raw schema text and its parsed form, kept together.
///
/// The raw string is preserved so a user's formatting survives persistence;
/// application logic reads the parsed config. Invariant: `config` is always
/// the parse of `text`. Both are replaced atomically, and a text that fails
/// to parse or validate leaves the document untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    text: String,
    config: ComponentsConfig,
}

impl Default for SchemaDocument {
    fn default() -> Self {
        Self::from_text(DEFAULT_CONFIG).expect("built-in default config is valid")
    }
}

impl SchemaDocument {
    pub fn from_text(text: &str) -> Result<Self, SchemaError> {
        let config = parse_and_validate(text)?;
        Ok(SchemaDocument {
            text: text.to_owned(),
            config,
        })
    }

    /// Replaces the document with new text.
    pub fn set_text(&mut self, text: &str) -> Result<(), SchemaError> {
        let config = parse_and_validate(text)?;
        self.text = text.to_owned();
        self.config = config;
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn config(&self) -> &ComponentsConfig {
        &self.config
    }

    /// Unique node kind names across all components' `nodes` fields.
    pub fn node_names(&self) -> BTreeSet<&str> {
        self.config
            .components
            .values()
            .flat_map(|def| def.nodes.iter().map(String::as_str))
            .collect()
    }

    /// Whether any component can attach to a node of the given kind, either
    /// by allowing every node or by listing this kind explicitly.
    pub fn has_components_for_node(&self, node_name: &str) -> bool {
        let any_node = self.config.components.values().any(|def| def.node);
        any_node || self.node_names().contains(node_name)
    }
}

/// Parses the document and checks structural consistency: every composite
/// type reachable from a component or a well-formed type definition must
/// exist, carry a property list, and sit on an acyclic reference graph.
fn parse_and_validate(text: &str) -> Result<ComponentsConfig, SchemaError> {
    let config: ComponentsConfig = serde_json::from_str(text)?;

    for def in config.components.values() {
        resolve_dependent_types(&def.properties, &config.types, &[])?;
    }
    for entry in config.types.values() {
        if let Some(properties) = &entry.properties {
            resolve_dependent_types(properties, &config.types, &[])?;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_parses_and_validates() {
        let doc = SchemaDocument::default();
        assert!(doc.config().components.contains_key("patrol"));
        assert!(doc.config().types.contains_key("waypoint"));
    }

    #[test]
    fn set_text_replaces_text_and_config_together() {
        let mut doc = SchemaDocument::default();
        let text = r#"{ "components": { "only": { "properties": {} } }, "types": {} }"#;
        doc.set_text(text).expect("valid document");

        assert_eq!(doc.text(), text);
        assert_eq!(doc.config().components.len(), 1);
        assert!(doc.config().components.contains_key("only"));
    }

    #[test]
    fn failed_set_text_leaves_document_untouched() {
        let mut doc = SchemaDocument::default();
        let before_text = doc.text().to_owned();
        let before_config = doc.config().clone();

        assert!(doc.set_text("{ not json").is_err());
        assert_eq!(doc.text(), before_text);
        assert_eq!(doc.config(), &before_config);
    }

    #[test]
    fn document_with_missing_type_is_rejected() {
        let text = r#"{
            "components": {
                "broken": {
                    "properties": {
                        "items": { "type": "array", "arrayType": "ghost" }
                    }
                }
            },
            "types": {}
        }"#;
        let err = SchemaDocument::from_text(text).unwrap_err();
        assert!(matches!(err, SchemaError::MissingTypeDefinition { .. }));
    }

    #[test]
    fn document_with_self_referencing_type_is_rejected() {
        let text = r#"{
            "components": {},
            "types": {
                "loop": {
                    "properties": {
                        "inner": { "type": "array", "arrayType": "loop" }
                    }
                }
            }
        }"#;
        let err = SchemaDocument::from_text(text).unwrap_err();
        assert!(matches!(err, SchemaError::CircularTypeDependency(_)));
    }

    #[test]
    fn node_names_collects_unique_names() {
        let doc = SchemaDocument::default();
        let names: Vec<&str> = doc.node_names().into_iter().collect();
        assert_eq!(names, ["Group", "Model"]);
    }

    #[test]
    fn has_components_for_node_checks_both_gates() {
        let doc = SchemaDocument::default();
        // "spin" sets node: true, so every kind qualifies.
        assert!(doc.has_components_for_node("Light"));

        let text = r#"{
            "components": {
                "picky": { "properties": {}, "nodes": ["Model"] }
            },
            "types": {}
        }"#;
        let doc = SchemaDocument::from_text(text).expect("valid document");
        assert!(doc.has_components_for_node("Model"));
        assert!(!doc.has_components_for_node("Light"));
    }
}
