//! Cutting radius, derived attributes and side profile.

use nalgebra::Point3;

use crate::config::{angle::degrees_to_radians, float_cmp, CHAMFER_CUT_PROPORTION};
use crate::geometry::envelope::EnvelopeDimensions;
use crate::model::tool::{ToolParams, ToolType};

/// Effective cutting radius in millimetres.
///
/// For a chamfering bit without a depth this is a point 30% of the way out
/// from the flat radius, so that a plunge cuts towards the outside without
/// running on the fragile tip. With a depth (measured up from the tip) it is
/// the radius of the cone at that height, never more than the full radius.
pub fn cutting_radius(params: &ToolParams, depth: Option<f64>) -> f64 {
    let full_radius = params.diameter / 2.0;
    match params.tool_type {
        ToolType::Chamfer => match depth {
            Some(depth) if depth >= 0.0 => {
                let radius = params.flat_radius
                    + depth * degrees_to_radians(params.cutting_edge_angle).tan();
                radius.min(full_radius)
            }
            _ => (full_radius - params.flat_radius) * CHAMFER_CUT_PROPORTION + params.flat_radius,
        },
        ToolType::EngravingTool => params.flat_radius,
        _ => full_radius,
    }
}

/// Recompute attributes that follow from diameter, flat radius and angle.
pub fn set_angle_and_radius(params: &mut ToolParams) {
    match params.tool_type {
        ToolType::Chamfer | ToolType::EngravingTool => {
            let tan = degrees_to_radians(params.cutting_edge_angle).tan();
            if float_cmp::approx_zero(tan) {
                tracing::debug!(
                    "Cutting edge angle {} leaves cutting edge height unchanged",
                    params.cutting_edge_angle
                );
                return;
            }
            params.cutting_edge_height = (params.diameter / 2.0 - params.flat_radius) / tan;
        }
        ToolType::Endmill | ToolType::SlotCutter => {
            params.flat_radius = params.diameter / 2.0;
        }
        _ => {}
    }
}

/// Rectangle in the YZ plane covering the cutting part of the tool.
///
/// Corners are top-left, bottom-left, bottom-right, top-right with the tip
/// at the origin.
pub fn side_profile(params: &ToolParams) -> [Point3<f64>; 4] {
    let dims = EnvelopeDimensions::from_params(params);
    let radius = cutting_radius(params, None);
    let height = dims.cutting_edge_height;
    [
        Point3::new(0.0, -radius, height),
        Point3::new(0.0, -radius, 0.0),
        Point3::new(0.0, radius, 0.0),
        Point3::new(0.0, radius, height),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(tool_type: ToolType, diameter: f64, flat_radius: f64, angle: f64) -> ToolParams {
        ToolParams {
            tool_type,
            diameter,
            flat_radius,
            cutting_edge_angle: angle,
            ..ToolParams::default()
        }
    }

    // ==================== cutting_radius tests ====================

    #[test]
    fn test_endmill_radius() {
        let p = params(ToolType::Endmill, 6.0, 3.0, 0.0);
        assert_eq!(cutting_radius(&p, None), 3.0);
        assert_eq!(cutting_radius(&p, Some(2.0)), 3.0);
    }

    #[test]
    fn test_chamfer_radius_without_depth() {
        let p = params(ToolType::Chamfer, 10.0, 1.0, 45.0);
        assert_relative_eq!(cutting_radius(&p, None), 2.2, epsilon = 1e-12);
        // A negative depth means "no depth"
        assert_relative_eq!(cutting_radius(&p, Some(-1.0)), 2.2, epsilon = 1e-12);
    }

    #[test]
    fn test_chamfer_radius_at_depth() {
        let p = params(ToolType::Chamfer, 10.0, 0.0, 45.0);
        assert_relative_eq!(cutting_radius(&p, Some(2.0)), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_chamfer_radius_clamped() {
        let p = params(ToolType::Chamfer, 10.0, 0.0, 45.0);
        assert_eq!(cutting_radius(&p, Some(100.0)), 5.0);
    }

    #[test]
    fn test_chamfer_radius_bounds() {
        let p = params(ToolType::Chamfer, 8.0, 0.5, 30.0);
        for depth in [0.0, 0.5, 1.0, 3.0, 10.0] {
            let r = cutting_radius(&p, Some(depth));
            assert!(r >= p.flat_radius && r <= p.diameter / 2.0);
        }
    }

    #[test]
    fn test_engraving_radius_is_flat_radius() {
        let p = params(ToolType::EngravingTool, 6.0, 0.2, 30.0);
        assert_eq!(cutting_radius(&p, None), 0.2);
    }

    // ==================== set_angle_and_radius tests ====================

    #[test]
    fn test_chamfer_height_derived() {
        let mut p = params(ToolType::Chamfer, 10.0, 1.0, 45.0);
        set_angle_and_radius(&mut p);
        assert_relative_eq!(p.cutting_edge_height, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_angle_keeps_height() {
        let mut p = params(ToolType::EngravingTool, 10.0, 1.0, 0.0);
        p.cutting_edge_height = 7.5;
        set_angle_and_radius(&mut p);
        assert_eq!(p.cutting_edge_height, 7.5);
    }

    #[test]
    fn test_drill_unchanged() {
        let mut p = params(ToolType::Drill, 10.0, 0.0, 59.0);
        let before = p.clone();
        set_angle_and_radius(&mut p);
        assert_eq!(p, before);
    }

    // ==================== side_profile tests ====================

    #[test]
    fn test_side_profile() {
        let p = params(ToolType::Endmill, 6.0, 3.0, 0.0);
        let corners = side_profile(&p);
        assert_eq!(corners[0], Point3::new(0.0, -3.0, 50.8));
        assert_eq!(corners[1], Point3::new(0.0, -3.0, 0.0));
        assert_eq!(corners[2], Point3::new(0.0, 3.0, 0.0));
        assert_eq!(corners[3], Point3::new(0.0, 3.0, 50.8));
    }

    #[test]
    fn test_side_profile_height_floor() {
        let mut p = params(ToolType::Endmill, 6.0, 3.0, 0.0);
        p.cutting_edge_height = 1.0;
        let corners = side_profile(&p);
        assert_eq!(corners[0].z, 12.0);
    }
}
