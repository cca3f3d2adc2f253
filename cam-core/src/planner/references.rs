//! Starting depths derived from the geometry an operation works on.

use crate::config::{angle::degrees_to_radians, DEFAULT_CHAMFER_WIDTH, DEFAULT_DEPTH};
use crate::model::bounds::BoundingBox;
use crate::model::depth::DepthOpParams;
use crate::model::tool::{Tool, ToolType};

/// Set start and final depths from the extents of the reference sketches.
///
/// The start depth is the highest top of any reference. The final depth sits
/// one default depth below the first reference, or below the lowest bottom
/// of a later one. A chamfering bit instead gets a final depth that cuts a
/// chamfer of the default width.
pub fn set_depths_from_references(
    params: &mut DepthOpParams,
    references: &[BoundingBox],
    tool: Option<&Tool>,
) {
    for (i, bbox) in references.iter().enumerate() {
        if i == 0 {
            params.start_depth = bbox.max_z();
            params.final_depth = params.start_depth - DEFAULT_DEPTH;
            continue;
        }

        if params.start_depth < bbox.max_z() {
            params.start_depth = bbox.max_z();
        }
        if params.final_depth > bbox.min_z() {
            params.final_depth = bbox.min_z() - DEFAULT_DEPTH;
        }
    }

    if let Some(tool) = tool {
        let p = tool.params();
        if p.tool_type == ToolType::Chamfer && p.cutting_edge_angle > 0.0 {
            params.final_depth = params.start_depth
                - DEFAULT_CHAMFER_WIDTH * degrees_to_radians(90.0 - p.cutting_edge_angle).tan();
        }
    }

    tracing::debug!(
        "Depths from {} reference(s): start {}, final {}",
        references.len(),
        params.start_depth,
        params.final_depth
    );
}
