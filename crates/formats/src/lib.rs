pub mod elevation;
pub mod manifest;
pub mod manifest_builder;
pub mod manifest_index;

pub use elevation::*;
pub use manifest::*;
pub use manifest_builder::*;
pub use manifest_index::*;
