//! # Zone Module
//!
//! - `config` - map document (layers, zones, polygons)
//! - `index` - point to zone classification

pub mod config;
pub mod index;

pub use config::{Layer, Zone, ZoneConfig};
pub use index::{point_in_polygon, ZoneIndex};
