//! Depth parameters of a machining operation.

use serde::{Deserialize, Serialize};

use crate::config::DefaultsStore;
use crate::error::Result;
use crate::planner::depths::{format_user_depths, parse_user_depths};

/// How depths are interpreted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AbsMode {
    #[default]
    Absolute,
    Incremental,
}

/// Heights and depths for one operation, in millimetres.
///
/// Depths go down towards negative Z. Passes are generated from
/// `start_depth` down to `final_depth` in increments of `step_down`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthOpParams {
    /// Height at which rapid moves across the work are safe.
    pub clearance_height: f64,
    pub start_depth: f64,
    /// Distance between passes; positive.
    pub step_down: f64,
    /// Material left for a final finishing pass.
    pub z_finish_depth: f64,
    /// How far to cut below `final_depth` to break through.
    pub z_thru_depth: f64,
    pub final_depth: f64,
    /// Height above the start depth that rapid moves stop at.
    pub rapid_safety_space: f64,
    /// Explicit pass depths overriding the stepped ones.
    pub user_depths: Option<Vec<f64>>,
    pub abs_mode: AbsMode,
}

impl Default for DepthOpParams {
    fn default() -> Self {
        Self {
            clearance_height: 5.0,
            start_depth: 0.0,
            step_down: 1.0,
            z_finish_depth: 0.0,
            z_thru_depth: 0.0,
            final_depth: -1.0,
            rapid_safety_space: 2.0,
            user_depths: None,
            abs_mode: AbsMode::Absolute,
        }
    }
}

impl DepthOpParams {
    /// Whether passes can be generated from these parameters.
    pub fn is_valid(&self) -> bool {
        self.start_depth.is_finite()
            && self.final_depth.is_finite()
            && self.start_depth > self.final_depth
            && self.step_down > 0.0
    }

    /// Read defaults for an operation type, falling back to built-in values.
    pub fn load_defaults(store: &DefaultsStore, scope: &str) -> Self {
        let base = Self::default();

        let user_depths_text = store.read_str(scope, "UserDepths", "");
        let user_depths = match parse_user_depths(&user_depths_text) {
            Ok(depths) if depths.is_empty() => None,
            Ok(depths) => Some(depths),
            Err(e) => {
                tracing::debug!("Ignoring stored {}UserDepths: {}", scope, e);
                None
            }
        };

        Self {
            clearance_height: store.read_f64(scope, "ClearanceHeight", base.clearance_height),
            start_depth: store.read_f64(scope, "StartDepth", base.start_depth),
            step_down: store.read_f64(scope, "StepDown", base.step_down),
            z_finish_depth: store.read_f64(scope, "ZFinish", base.z_finish_depth),
            z_thru_depth: store.read_f64(scope, "ZThru", base.z_thru_depth),
            final_depth: store.read_f64(scope, "FinalDepth", base.final_depth),
            rapid_safety_space: store.read_f64(scope, "RapidDown", base.rapid_safety_space),
            user_depths,
            abs_mode: base.abs_mode,
        }
    }

    /// Write these parameters as the defaults for an operation type.
    pub fn save_defaults(&self, store: &mut DefaultsStore, scope: &str) -> Result<()> {
        store.write(scope, "ClearanceHeight", &self.clearance_height)?;
        store.write(scope, "StartDepth", &self.start_depth)?;
        store.write(scope, "StepDown", &self.step_down)?;
        store.write(scope, "ZFinish", &self.z_finish_depth)?;
        store.write(scope, "ZThru", &self.z_thru_depth)?;
        let user_depths = self
            .user_depths
            .as_deref()
            .map(format_user_depths)
            .unwrap_or_default();
        store.write(scope, "UserDepths", &user_depths)?;
        store.write(scope, "FinalDepth", &self.final_depth)?;
        store.write(scope, "RapidDown", &self.rapid_safety_space)?;
        Ok(())
    }
}
