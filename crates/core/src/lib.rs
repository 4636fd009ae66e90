//! # Arealis Core
//!
//! Core types for the Arealis spatial analysis library.
//!
//! This crate provides:
//! - `AttrTable`: attribute table keyed by observation identifier
//! - `Feature` / `FeatureCollection`: polygon features with properties
//!   and GeoJSON serialization
//! - `SpatialWeights`: neighbor-list weights and spatial lags
//! - Shared `Error` / `Result` types

pub mod error;
pub mod table;
pub mod vector;
pub mod weights;

pub use error::{Error, Result};
pub use table::{AttrTable, AttributeValue};
pub use vector::{Feature, FeatureCollection};
pub use weights::SpatialWeights;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::table::{AttrTable, AttributeValue};
    pub use crate::vector::{Feature, FeatureCollection};
    pub use crate::weights::SpatialWeights;
}
