#![forbid(unsafe_code)]

pub mod codec;
pub mod diff;
pub mod instance;
pub mod value;

pub use codec::{cast_property, default_for, deserialize_property, serialize_property};
pub use diff::{PropertyDiff, TypeDiff, UpdatedProperty, diff_properties, diff_types};
pub use instance::{ComponentData, ComponentInstance, Selector, SerializedComponent};
pub use value::{Color, CompositeValue, NodeRef, PropertyValue, Vec3};
