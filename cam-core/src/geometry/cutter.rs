//! Cutter description for external 3D toolpath libraries.

use serde::Serialize;
use std::f64::consts::PI;

use crate::config::{CORNER_RADIUS_EPS, CUTTER_LENGTH};
use crate::model::tool::{ToolParams, ToolType};

/// Cutter shape handed to a drop-cutter style toolpath library.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cutter")]
pub enum CutterModel {
    Ball {
        diameter: f64,
        length: f64,
    },
    CylCone {
        flat_diameter: f64,
        diameter: f64,
        /// Half the included angle, in radians.
        half_angle: f64,
    },
    Bull {
        diameter: f64,
        corner_radius: f64,
        length: f64,
    },
    Cylindrical {
        diameter: f64,
        length: f64,
    },
}

impl CutterModel {
    /// Describe a tool, growing it by `material_allowance` on each side.
    pub fn from_params(params: &ToolParams, material_allowance: f64) -> Self {
        let diameter = params.diameter + material_allowance * 2.0;
        match params.tool_type {
            ToolType::BallEndMill => CutterModel::Ball {
                diameter,
                length: CUTTER_LENGTH,
            },
            ToolType::Chamfer | ToolType::EngravingTool => CutterModel::CylCone {
                flat_diameter: params.flat_radius * 2.0 + material_allowance,
                diameter,
                half_angle: params.cutting_edge_angle * PI / 360.0,
            },
            _ if params.corner_radius > CORNER_RADIUS_EPS => CutterModel::Bull {
                diameter,
                corner_radius: params.corner_radius,
                length: CUTTER_LENGTH,
            },
            _ => CutterModel::Cylindrical {
                diameter,
                length: CUTTER_LENGTH,
            },
        }
    }
}
