//! tigerways - TIGER/Line address ranges to address lines and address points
//!
//! This library provides the conversion engine shared by the convert and
//! centroids binaries.

pub mod address;
pub mod error;
pub mod lookup;
pub mod models;
pub mod project;
pub mod source;
pub mod summary;

pub use error::{Error, Result};
pub use models::{Feature, Point, RawPoint, TigerTags};
