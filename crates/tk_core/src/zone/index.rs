//! # Zone Index
//!
//! Point classification against layered 2D polygons. The first layer whose
//! z band contains the point is the only layer searched, and zones inside it
//! are tried in configured order. Overlapping zones resolve to the earlier entry.

use tracing::debug;

use super::config::{Layer, Zone, ZoneConfig};
use crate::error::Result;

/// Denominator used for horizontal edges in the crossing test.
pub const HORIZONTAL_EDGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
struct LayerZones {
    layer: Layer,
    zones: Vec<ZoneEntry>,
}

#[derive(Debug, Clone)]
struct ZoneEntry {
    zone: Zone,
    centroid: Option<[f64; 2]>,
}

/// Immutable lookup structure built once per map.
#[derive(Debug, Clone)]
pub struct ZoneIndex {
    layers: Vec<LayerZones>,
}

impl ZoneIndex {
    pub fn new(config: ZoneConfig) -> Result<Self> {
        config.validate()?;

        let ZoneConfig { z_layers, zones } = config;
        let mut layers: Vec<LayerZones> = z_layers
            .into_iter()
            .map(|layer| LayerZones {
                layer,
                zones: Vec::new(),
            })
            .collect();

        for zone in zones {
            if let Some(slot) = layers.iter_mut().find(|l| l.layer.name == zone.layer) {
                let centroid = zone.centroid();
                slot.zones.push(ZoneEntry { zone, centroid });
            }
        }

        let index = Self { layers };
        debug!(
            layers = index.layer_count(),
            zones = index.zone_count(),
            "zone index built"
        );

        Ok(index)
    }

    /// Index with no layers; every lookup returns `None`.
    pub fn empty() -> Self {
        Self { layers: Vec::new() }
    }

    fn layer_for(&self, z: f64) -> Option<&LayerZones> {
        self.layers.iter().find(|l| l.layer.contains_z(z))
    }

    /// Zone id containing the point, or `None` for unmapped positions.
    pub fn zone_of(&self, x: f64, y: f64, z: f64) -> Option<&str> {
        self.layer_for(z)?
            .zones
            .iter()
            .find(|e| point_in_polygon(x, y, &e.zone.polygon))
            .map(|e| e.zone.id.as_str())
    }

    /// Closest zone centroid in the point's layer, if within `max_distance`.
    ///
    /// Fallback lookup for positions that land just outside every polygon.
    /// `zone_of` never consults it; the note stage does when
    /// `EngineConfig::nearest_zone_fallback` is set.
    pub fn nearest_zone(&self, x: f64, y: f64, z: f64, max_distance: f64) -> Option<&str> {
        let layer = self.layer_for(z)?;
        let mut best: Option<(&ZoneEntry, f64)> = None;
        for entry in &layer.zones {
            let Some([cx, cy]) = entry.centroid else {
                continue;
            };
            let d2 = (x - cx).powi(2) + (y - cy).powi(2);
            if best.map_or(true, |(_, b)| d2 < b) {
                best = Some((entry, d2));
            }
        }

        best.filter(|(_, d2)| *d2 <= max_distance * max_distance)
            .map(|(e, _)| e.zone.id.as_str())
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn zone_count(&self) -> usize {
        self.layers.iter().map(|l| l.zones.len()).sum()
    }
}

/// Even-odd ray casting. Empty polygons contain nothing.
pub fn point_in_polygon(x: f64, y: f64, polygon: &[[f64; 2]]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    for i in 0..n {
        let [x1, y1] = polygon[i];
        let [x2, y2] = polygon[(i + 1) % n];
        if (y1 > y) != (y2 > y) {
            let dy = if y2 == y1 {
                HORIZONTAL_EDGE_EPSILON
            } else {
                y2 - y1
            };
            let x_cross = (x2 - x1) * (y - y1) / dy + x1;
            if x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square_index() -> ZoneIndex {
        let cfg = ZoneConfig::from_yaml_str(
            r#"
z_layers:
  - { name: ground, z_min: 0, z_max: 100 }
zones:
  - { id: square, layer: ground, site: A, polygon: [[0, 0], [100, 0], [100, 100], [0, 100]] }
"#,
        )
        .unwrap();
        ZoneIndex::new(cfg).unwrap()
    }

    #[test]
    fn test_point_inside_square() {
        let index = square_index();
        assert_eq!(index.zone_of(50.0, 50.0, 50.0), Some("square"));
        assert_eq!(index.layer_count(), 1);
        assert_eq!(index.zone_count(), 1);
    }

    #[test]
    fn test_point_outside_polygon() {
        assert_eq!(square_index().zone_of(-1.0, -1.0, 50.0), None);
    }

    #[test]
    fn test_point_outside_all_layers() {
        assert_eq!(square_index().zone_of(50.0, 50.0, 150.0), None);
    }

    #[test]
    fn test_layer_bounds_are_inclusive() {
        let index = square_index();
        assert_eq!(index.zone_of(50.0, 50.0, 0.0), Some("square"));
        assert_eq!(index.zone_of(50.0, 50.0, 100.0), Some("square"));
    }

    #[test]
    fn test_empty_polygon_never_contains() {
        assert!(!point_in_polygon(0.0, 0.0, &[]));
    }

    #[test]
    fn test_first_zone_wins_on_overlap() {
        let cfg = ZoneConfig::from_yaml_str(
            r#"
z_layers: [{ name: g, z_min: 0, z_max: 10 }]
zones:
  - { id: small, layer: g, polygon: [[0, 0], [10, 0], [10, 10], [0, 10]] }
  - { id: big, layer: g, polygon: [[-50, -50], [50, -50], [50, 50], [-50, 50]] }
"#,
        )
        .unwrap();
        let index = ZoneIndex::new(cfg).unwrap();
        assert_eq!(index.zone_of(5.0, 5.0, 1.0), Some("small"));
        assert_eq!(index.zone_of(30.0, 30.0, 1.0), Some("big"));
    }

    #[test]
    fn test_only_first_matching_layer_is_searched() {
        let cfg = ZoneConfig::from_yaml_str(
            r#"
z_layers:
  - { name: low, z_min: 0, z_max: 50 }
  - { name: wide, z_min: 0, z_max: 500 }
zones:
  - { id: low_box, layer: low, polygon: [[0, 0], [10, 0], [10, 10], [0, 10]] }
  - { id: wide_box, layer: wide, polygon: [[20, 20], [30, 20], [30, 30], [20, 30]] }
"#,
        )
        .unwrap();
        let index = ZoneIndex::new(cfg).unwrap();
        assert_eq!(index.zone_of(25.0, 25.0, 10.0), None);
        assert_eq!(index.zone_of(25.0, 25.0, 100.0), Some("wide_box"));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upward
        let u = [
            [0.0, 0.0],
            [30.0, 0.0],
            [30.0, 30.0],
            [20.0, 30.0],
            [20.0, 10.0],
            [10.0, 10.0],
            [10.0, 30.0],
            [0.0, 30.0],
        ];
        assert!(point_in_polygon(5.0, 20.0, &u));
        assert!(!point_in_polygon(15.0, 20.0, &u));
        assert!(point_in_polygon(15.0, 5.0, &u));
    }

    #[test]
    fn test_nearest_zone_fallback() {
        let index = square_index();
        assert_eq!(index.nearest_zone(120.0, 50.0, 50.0, 200.0), Some("square"));
        assert_eq!(index.nearest_zone(1000.0, 50.0, 50.0, 200.0), None);
        assert_eq!(index.nearest_zone(50.0, 50.0, 500.0, 200.0), None);
        assert_eq!(index.zone_of(120.0, 50.0, 50.0), None);
    }

    #[test]
    fn test_empty_index() {
        let index = ZoneIndex::empty();
        assert_eq!(index.zone_of(0.0, 0.0, 0.0), None);
        assert_eq!(index.zone_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_interior_points_classified(x in 0.5f64..99.5, y in 0.5f64..99.5, z in 0.0f64..=100.0) {
            let index = square_index();
            prop_assert_eq!(index.zone_of(x, y, z), Some("square"));
        }

        #[test]
        fn prop_exterior_points_unclassified(x in 100.5f64..1000.0, y in -1000.0f64..1000.0) {
            let index = square_index();
            prop_assert_eq!(index.zone_of(x, y, 50.0), None);
        }
    }
}
