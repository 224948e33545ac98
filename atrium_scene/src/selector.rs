use atrium_components::Selector;
use uuid::Uuid;

use crate::object::ObjectScene;

/// Objects inside `subtree` the selector applies to: the subtree root itself
/// when unset, every descendant with the selected name otherwise.
pub fn selector_matches(selector: &Selector, scene: &ObjectScene, subtree: Uuid) -> Vec<Uuid> {
    match &selector.object_name {
        None => scene
            .object(subtree)
            .map(|object| object.uuid)
            .into_iter()
            .collect(),
        Some(name) => scene.descendants_named(subtree, name),
    }
}
