//! cam-core - Tool geometry and depth pass planning for CNC machining.
//!
//! This library models cutting tools (their cutting radius, derived
//! dimensions and envelope solids), keeps them in a numbered tool table, and
//! plans the depth passes of machining operations against them.
//!
//! # Example
//!
//! ```no_run
//! use cam_core::{plan_operation, DepthOpParams, Tool, ToolRegistry, ToolType, Units};
//!
//! let registry = ToolRegistry::from_tools([Tool::new(None, ToolType::Endmill, 1)]).unwrap();
//! let plan = plan_operation(&registry, 1, DepthOpParams::default(), &[], true, Units::Millimeters);
//! println!("{:?}", plan.passes);
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod naming;
pub mod planner;
pub mod registry;
pub mod units;
pub mod validation;

// Re-exports for convenience
pub use config::DefaultsStore;
pub use error::{CamError, ErrorCode, Result};
pub use export::{DepthParamsRecord, ToolDefinitionRecord};
pub use geometry::{BoundingBoxBuilder, CutterModel, Envelope, Primitive, ShapeBuilder};
pub use model::{
    AbsMode, BoundingBox, DepthOpParams, Tool, ToolMaterial, ToolParams, ToolType,
    TurningOrientation,
};
pub use naming::{fractional_representation, meaningful_name};
pub use planner::{get_depths, pass_depths, set_depths_from_references};
pub use registry::ToolRegistry;
pub use units::Units;
pub use validation::{design_rules_check, ValidationResult};

/// Outcome of planning one operation.
#[derive(Debug, Clone)]
pub struct OperationPlan {
    /// Depth parameters after reference derivation and any corrections.
    pub params: DepthOpParams,
    /// Design rule findings.
    pub validation: ValidationResult,
    /// Depths of the passes to cut, in millimetres.
    pub passes: Vec<f64>,
    /// Record for the script emitter, in output units.
    pub record: DepthParamsRecord,
}

/// Plan the depth passes of an operation.
///
/// This is the main high-level function that performs the full pipeline:
/// 1. Look up the operation's tool
/// 2. Derive start and final depths from the reference boxes, if any
/// 3. Run the design rules, optionally correcting what they can
/// 4. Generate the passes and the export record
pub fn plan_operation(
    registry: &ToolRegistry,
    tool_number: i32,
    mut params: DepthOpParams,
    references: &[BoundingBox],
    apply_changes: bool,
    units: Units,
) -> OperationPlan {
    let tool = registry.find_by_number(tool_number);

    if !references.is_empty() {
        set_depths_from_references(&mut params, references, tool);
    }

    let validation = design_rules_check(&mut params, tool, apply_changes);
    for warning in &validation.warnings {
        tracing::debug!("{}", warning);
    }

    let passes = pass_depths(&params);
    let record = DepthParamsRecord::new(&params, tool, units);

    OperationPlan {
        params,
        validation,
        passes,
        record,
    }
}
