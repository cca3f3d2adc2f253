//! Configuration constants and the persisted defaults store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{CamError, Result};

/// Floating-point comparison epsilon.
pub const EPS: f64 = 0.0001;

/// Conversion factor: mm per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Depth below the lowest reference used when deriving a final depth (mm).
pub const DEFAULT_DEPTH: f64 = 1.0;

/// Chamfer band width used when deriving depths for a chamfering bit (mm).
pub const DEFAULT_CHAMFER_WIDTH: f64 = 1.0;

/// Height added above the start depth when the clearance height is repaired (mm).
pub const CLEARANCE_MARGIN: f64 = 5.0;

/// Fraction of the way from the flat radius to the full radius that a chamfer
/// bit cuts at when no depth is given.
pub const CHAMFER_CUT_PROPORTION: f64 = 0.3;

/// Tolerance for matching a decimal against a fraction.
pub const FRACTION_TOLERANCE: f64 = 0.00001;

/// Largest denominator tried when looking for a fraction.
pub const DEFAULT_MAX_DENOMINATOR: u32 = 64;

/// Declared diameters below this are treated as unset when drawing a tool (mm).
pub const MIN_ENVELOPE_DIAMETER: f64 = 0.01;

/// Diameter used to draw a tool whose declared diameter is unset (mm).
pub const FALLBACK_ENVELOPE_DIAMETER: f64 = 2.0;

/// Circumradius of the triangular insert drawn for turning tools (mm).
pub const TURNING_INSERT_RADIUS: f64 = 8.0;

/// Thickness of the triangular insert drawn for turning tools (mm).
pub const TURNING_INSERT_THICKNESS: f64 = 3.0;

/// Cutter length handed to external 3D toolpath libraries (mm).
pub const CUTTER_LENGTH: f64 = 1000.0;

/// Corner radii at or below this are treated as square corners.
pub const CORNER_RADIUS_EPS: f64 = 0.000000001;

/// Scope under which tool parameter defaults are stored.
pub const TOOL_PARAMS_SCOPE: &str = "ToolParam_";

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    use super::EPS;

    /// Check if two floats are approximately equal.
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// Check if a float is approximately zero.
    #[inline]
    pub fn approx_zero(a: f64) -> bool {
        a.abs() < EPS
    }
}

/// Utility functions for angle operations.
pub mod angle {
    /// Convert degrees to radians.
    #[inline]
    pub fn degrees_to_radians(degrees: f64) -> f64 {
        degrees.to_radians()
    }
}

/// Scoped key/value store of default parameter values.
///
/// Scopes name an operation type or parameter group (for example
/// `"ToolParam_"` or `"Pocket"`). The store does no I/O on its own; the
/// application calls [`DefaultsStore::load`] and [`DefaultsStore::save`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultsStore {
    scopes: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl DefaultsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No defaults file at {}, using built-in defaults", path.display());
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|source| CamError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Save the store as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| CamError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a value, falling back to `default` when missing or mistyped.
    pub fn read<T: DeserializeOwned>(&self, scope: &str, key: &str, default: T) -> T {
        match self.scopes.get(scope).and_then(|values| values.get(key)) {
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::debug!("Ignoring stored {}{}: {}", scope, key, e);
                    default
                }
            },
            None => default,
        }
    }

    /// Read a length or other numeric value.
    pub fn read_f64(&self, scope: &str, key: &str, default: f64) -> f64 {
        self.read(scope, key, default)
    }

    /// Read a string value.
    pub fn read_str(&self, scope: &str, key: &str, default: &str) -> String {
        self.read(scope, key, default.to_string())
    }

    /// Store a value under `scope`/`key`.
    pub fn write<T: Serialize>(&mut self, scope: &str, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.scopes
            .entry(scope.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    /// Whether the store holds a value for `scope`/`key`.
    pub fn contains(&self, scope: &str, key: &str) -> bool {
        self.scopes
            .get(scope)
            .map(|values| values.contains_key(key))
            .unwrap_or(false)
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.scopes.values().all(|values| values.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== float_cmp tests ====================

    #[test]
    fn test_approx_eq() {
        assert!(float_cmp::approx_eq(1.0, 1.00001));
        assert!(!float_cmp::approx_eq(1.0, 1.001));
        assert!(float_cmp::approx_zero(-0.00005));
    }

    #[test]
    fn test_degrees_to_radians() {
        assert!((angle::degrees_to_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(angle::degrees_to_radians(0.0), 0.0);
    }

    // ==================== DefaultsStore tests ====================

    #[test]
    fn test_read_missing_returns_default() {
        let store = DefaultsStore::new();
        assert_eq!(store.read_f64("Pocket", "StepDown", 1.0), 1.0);
        assert_eq!(store.read_str("Pocket", "UserDepths", ""), "");
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let mut store = DefaultsStore::new();
        store.write("Pocket", "StepDown", &2.5).unwrap();
        store.write("Pocket", "UserDepths", &"-1, -2").unwrap();
        assert!(store.contains("Pocket", "StepDown"));
        assert!(!store.contains("Profile", "StepDown"));
        assert_eq!(store.read_f64("Pocket", "StepDown", 1.0), 2.5);
        assert_eq!(store.read_str("Pocket", "UserDepths", ""), "-1, -2");
        // Scopes are independent
        assert_eq!(store.read_f64("Profile", "StepDown", 1.0), 1.0);
    }

    #[test]
    fn test_mistyped_value_falls_back() {
        let mut store = DefaultsStore::new();
        store.write("Pocket", "StepDown", &"deep").unwrap();
        assert_eq!(store.read_f64("Pocket", "StepDown", 1.0), 1.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaults.json");

        let mut store = DefaultsStore::new();
        store.write(TOOL_PARAMS_SCOPE, "diameter", &6.0).unwrap();
        store.save(&path).unwrap();

        let loaded = DefaultsStore::load(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.read_f64(TOOL_PARAMS_SCOPE, "diameter", 12.7), 6.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DefaultsStore::load(&dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(DefaultsStore::load(&path), Err(CamError::Json(_))));
    }
}
