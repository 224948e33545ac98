#![forbid(unsafe_code)]

pub mod document;
pub mod error;
pub mod resolve;
pub mod schema;

pub use document::{DEFAULT_CONFIG, SchemaDocument};
pub use error::SchemaError;
pub use resolve::resolve_dependent_types;
pub use schema::{
    ComponentDef, ComponentsConfig, PropertyDecl, PropertyKind, PropertyMap, ResolvedTypes,
    TypeDecl, TypeDef,
};
