//! Numeric records handed to the program script emitter.
//!
//! All lengths are converted from canonical millimetres into the program's
//! output units here, and only here.

use serde::Serialize;

use crate::model::depth::DepthOpParams;
use crate::model::tool::Tool;
use crate::naming::meaningful_name;
use crate::units::Units;

/// Depth parameters of one operation, in output units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthParamsRecord {
    pub clearance_height: f64,
    pub rapid_safety_space: f64,
    pub start_depth: f64,
    pub step_down: f64,
    pub z_finish_depth: f64,
    pub z_thru_depth: f64,
    pub final_depth: f64,
    pub user_depths: Option<Vec<f64>>,
    /// Twice the tool's cutting radius.
    pub tool_diameter: Option<f64>,
    /// Degrees; not a length, so never converted.
    pub cutting_edge_angle: Option<f64>,
}

impl DepthParamsRecord {
    pub fn new(params: &DepthOpParams, tool: Option<&Tool>, units: Units) -> Self {
        let length = |v: f64| units.to_display(v);
        Self {
            clearance_height: length(params.clearance_height),
            rapid_safety_space: length(params.rapid_safety_space),
            start_depth: length(params.start_depth),
            step_down: length(params.step_down),
            z_finish_depth: length(params.z_finish_depth),
            z_thru_depth: length(params.z_thru_depth),
            final_depth: length(params.final_depth),
            user_depths: params
                .user_depths
                .as_ref()
                .filter(|depths| !depths.is_empty())
                .map(|depths| depths.iter().map(|d| length(*d)).collect()),
            tool_diameter: tool.map(|t| t.cutting_radius_in(units, None) * 2.0),
            cutting_edge_angle: tool.map(|t| t.params().cutting_edge_angle),
        }
    }
}

/// One tool table entry, in output units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinitionRecord {
    pub tool_number: i32,
    pub title: String,
    pub corner_radius: f64,
    pub cutting_edge_angle: f64,
    pub cutting_edge_height: f64,
    pub diameter: f64,
    pub flat_radius: f64,
    /// Numeric material code.
    pub material: i32,
    pub tool_length_offset: f64,
    /// Numeric tool type code.
    pub tool_type: i32,
    pub name: String,
}

impl ToolDefinitionRecord {
    pub fn new(tool: &Tool, units: Units) -> Self {
        let p = tool.params();
        Self {
            tool_number: tool.tool_number(),
            title: tool.title().to_string(),
            corner_radius: units.to_display(p.corner_radius),
            cutting_edge_angle: p.cutting_edge_angle,
            cutting_edge_height: units.to_display(p.cutting_edge_height),
            diameter: units.to_display(p.diameter),
            flat_radius: units.to_display(p.flat_radius),
            material: p.material.code(),
            tool_length_offset: units.to_display(p.tool_length_offset),
            tool_type: p.tool_type.code(),
            name: meaningful_name(p, units),
        }
    }
}
