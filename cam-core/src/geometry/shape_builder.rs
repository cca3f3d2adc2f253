//! Seam to a solid modeller.

use crate::error::{CamError, Result};
use crate::geometry::envelope::Envelope;
use crate::model::bounds::BoundingBox;
use crate::model::tool::Tool;

/// Turns an envelope into a solid of some modelling back end.
pub trait ShapeBuilder {
    type Solid;

    fn build(&mut self, envelope: &Envelope) -> Result<Self::Solid>;
}

/// Builds the axis-aligned bounds of an envelope.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundingBoxBuilder;

impl ShapeBuilder for BoundingBoxBuilder {
    type Solid = BoundingBox;

    fn build(&mut self, envelope: &Envelope) -> Result<BoundingBox> {
        envelope.bounds().ok_or_else(|| CamError::GeometryConstruction {
            primitive: "envelope",
            reason: "no primitives".to_string(),
        })
    }
}

/// Build a solid for a tool, skipping it when the geometry cannot be made.
///
/// Geometry failures come from odd parameter combinations and are logged
/// rather than propagated, so one bad tool does not stop the rest drawing.
pub fn build_tool_solid<B: ShapeBuilder>(builder: &mut B, tool: &mut Tool) -> Option<B::Solid> {
    let number = tool.tool_number();
    let result = tool.envelope().and_then(|envelope| builder.build(envelope));
    match result {
        Ok(solid) => Some(solid),
        Err(e) if e.is_geometry() => {
            tracing::warn!("Skipping shape for tool {}: {}", number, e);
            None
        }
        Err(e) => {
            tracing::error!("Failed to build shape for tool {}: {}", number, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tool::ToolType;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounding_box_builder() {
        let mut tool = Tool::new(None, ToolType::Endmill, 1);
        tool.set_diameter(6.0).unwrap();
        tool.set_tool_length_offset(60.0).unwrap();

        let bbox = build_tool_solid(&mut BoundingBoxBuilder, &mut tool).unwrap();
        assert_relative_eq!(bbox.min.x, -3.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max_z(), 60.0, epsilon = 1e-9);
        assert!(tool.has_cached_envelope());
    }

    #[test]
    fn test_empty_envelope_rejected() {
        let envelope = Envelope {
            primitives: Vec::new(),
        };
        assert!(BoundingBoxBuilder.build(&envelope).is_err());
    }

    #[test]
    fn test_bad_geometry_is_skipped() {
        let mut tool = Tool::new(None, ToolType::Chamfer, 2);
        tool.set_cutting_edge_angle(0.0).unwrap();
        assert!(build_tool_solid(&mut BoundingBoxBuilder, &mut tool).is_none());
        assert!(!tool.has_cached_envelope());
    }
}
