//! Input readers

pub mod metadata;

pub use metadata::{polygon_getter, scene_key, MetadataIndex, ProductRecord, DEFAULT_METADATA_PATH};
