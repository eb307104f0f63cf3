//! Configuration documents: dotted-path access and normalization.
//!
//! A document is a plain [`serde_yaml::Value`] tree. JSON and JSONC sources
//! are read into the same representation so every later stage sees one type.

pub mod normalize;
pub mod path;

pub use normalize::{
    find_reference, resolve_placeholders, resolve_references, resolve_references_against,
    strip_empty, Reference,
};
pub use path::{get, kind_name, overlay, parse_override, set, split_path};

/// A configuration document.
pub type Document = serde_yaml::Value;
