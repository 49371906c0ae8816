//! Map definition document: z layers and the polygonal zones inside each.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};

/// Vertical band a zone lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub z_min: f64,
    pub z_max: f64,
}

impl Layer {
    pub fn contains_z(&self, z: f64) -> bool {
        self.z_min <= z && z <= self.z_max
    }
}

/// Named region. The polygon closes implicitly from the last vertex to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub layer: String,
    #[serde(default)]
    pub polygon: Vec<[f64; 2]>,
    /// Bombsite grouping ("A", "B", "MID"), when the map author provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

impl Zone {
    /// Shoelace centroid. Degenerate (zero-area) polygons fall back to the vertex mean.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        let n = self.polygon.len();
        if n == 0 {
            return None;
        }

        let (mut area2, mut cx2, mut cy2) = (0.0, 0.0, 0.0);
        for i in 0..n {
            let [xi, yi] = self.polygon[i];
            let [xj, yj] = self.polygon[(i + 1) % n];
            let cross = xi * yj - xj * yi;
            area2 += cross;
            cx2 += (xi + xj) * cross;
            cy2 += (yi + yj) * cross;
        }

        if area2.abs() < 1e-9 {
            let (sx, sy) = self
                .polygon
                .iter()
                .fold((0.0, 0.0), |(sx, sy), [x, y]| (sx + x, sy + y));
            return Some([sx / n as f64, sy / n as f64]);
        }

        Some([cx2 / (3.0 * area2), cy2 / (3.0 * area2)])
    }
}

/// Whole map document: `{z_layers: [...], zones: [...]}`. Order in both lists is precedence order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    #[serde(default)]
    pub z_layers: Vec<Layer>,
    #[serde(default)]
    pub zones: Vec<Zone>,
}

impl ZoneConfig {
    /// Parse a YAML (or JSON) map document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: ZoneConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| AnalyticsError::io(path, e))?;
        Self::from_yaml_str(&text)
    }

    /// Structural checks. Empty polygons are allowed and simply never match.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for layer in &self.z_layers {
            if !layer.z_min.is_finite() || !layer.z_max.is_finite() {
                return Err(AnalyticsError::MapConfig(format!(
                    "layer '{}' has a non-finite z bound",
                    layer.name
                )));
            }
            if layer.z_min > layer.z_max {
                return Err(AnalyticsError::MapConfig(format!(
                    "layer '{}' has z_min {} > z_max {}",
                    layer.name, layer.z_min, layer.z_max
                )));
            }
            if !names.insert(layer.name.as_str()) {
                return Err(AnalyticsError::MapConfig(format!(
                    "layer '{}' is declared twice",
                    layer.name
                )));
            }
        }

        for zone in &self.zones {
            if zone.id.trim().is_empty() {
                return Err(AnalyticsError::MapConfig(
                    "zone with empty id".to_string(),
                ));
            }
            if !names.contains(zone.layer.as_str()) {
                return Err(AnalyticsError::MapConfig(format!(
                    "zone '{}' references unknown layer '{}'",
                    zone.id, zone.layer
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"
z_layers:
  - { name: ground, z_min: -200, z_max: 100 }
  - { name: upper, z_min: 100.5, z_max: 400 }
zones:
  - id: a_site
    layer: ground
    site: A
    polygon: [[0, 0], [100, 0], [100, 100], [0, 100]]
  - id: connector
    layer: upper
    polygon: [[0, 0], [10, 0], [10, 10]]
"#;

    #[test]
    fn test_parse_map_document() {
        let cfg = ZoneConfig::from_yaml_str(MAP).unwrap();
        assert_eq!(cfg.z_layers.len(), 2);
        assert_eq!(cfg.zones[0].site.as_deref(), Some("A"));
        assert_eq!(cfg.zones[1].site, None);
        assert_eq!(cfg.zones[1].polygon[2], [10.0, 10.0]);
    }

    #[test]
    fn test_json_map_document_is_accepted() {
        let json = r#"{"z_layers":[{"name":"g","z_min":0,"z_max":1}],"zones":[]}"#;
        let cfg = ZoneConfig::from_yaml_str(json).unwrap();
        assert_eq!(cfg.z_layers[0].name, "g");
    }

    #[test]
    fn test_inverted_layer_is_rejected() {
        let yaml = "z_layers: [{name: g, z_min: 10, z_max: 0}]\nzones: []\n";
        let err = ZoneConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, AnalyticsError::MapConfig(_)));
    }

    #[test]
    fn test_unknown_layer_reference_is_rejected() {
        let yaml = "z_layers: [{name: g, z_min: 0, z_max: 1}]\nzones: [{id: x, layer: nope, polygon: []}]\n";
        let err = ZoneConfig::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("unknown layer"));
    }

    #[test]
    fn test_missing_layer_fields_are_a_yaml_error() {
        let yaml = "z_layers: [{name: g}]\n";
        assert!(matches!(
            ZoneConfig::from_yaml_str(yaml),
            Err(AnalyticsError::Yaml(_))
        ));
    }

    #[test]
    fn test_mistyped_bound_is_input_contract() {
        let yaml = "z_layers: [{name: g, z_min: abc, z_max: 1}]\n";
        let err = ZoneConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, AnalyticsError::Yaml(_)));
        assert!(err.is_input_contract());
    }

    #[test]
    fn test_square_centroid() {
        let cfg = ZoneConfig::from_yaml_str(MAP).unwrap();
        let c = cfg.zones[0].centroid().unwrap();
        assert!((c[0] - 50.0).abs() < 1e-9);
        assert!((c[1] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_bundled_mirage_map_is_valid() {
        let cfg = ZoneConfig::from_yaml_str(include_str!("../../../../configs/maps/mirage.yml"))
            .unwrap();
        assert_eq!(cfg.z_layers.len(), 2);
        assert!(cfg.zones.iter().any(|z| z.id == "a_site"));
    }

    #[test]
    fn test_centroid_of_empty_polygon() {
        let zone = Zone {
            id: "empty".to_string(),
            layer: "g".to_string(),
            polygon: Vec::new(),
            site: None,
        };
        assert_eq!(zone.centroid(), None);
    }

    #[test]
    fn test_degenerate_centroid_uses_vertex_mean() {
        let zone = Zone {
            id: "line".to_string(),
            layer: "g".to_string(),
            polygon: vec![[0.0, 0.0], [2.0, 0.0], [4.0, 0.0]],
            site: None,
        };
        assert_eq!(zone.centroid(), Some([2.0, 0.0]));
    }
}
