use atrium_config::SchemaError;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors raised while preparing component data for the interchange
/// document. Fatal to the export of the object in progress.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("component \"{component}\" has empty nodeRef \"{property}\"")]
    UnsetNodeReference { component: String, property: String },

    #[error("nodeRef target {uuid}{} does not resolve to an object", object_scope(.object_name))]
    UnresolvedNodeReference {
        uuid: Uuid,
        object_name: Option<String>,
    },

    #[error("component \"{component}\" props must be an object")]
    InvalidComponentProps { component: String },

    #[error("component \"{0}\" has no definition in its frozen schema")]
    MissingDefinition(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

fn object_scope(object_name: &Option<String>) -> String {
    match object_name {
        Some(name) => format!(" (object \"{name}\")"),
        None => String::new(),
    }
}
