//! Design rule checks for operations and tools.

use crate::config::CLEARANCE_MARGIN;
use crate::model::depth::DepthOpParams;
use crate::model::tool::Tool;
use crate::registry::ToolRegistry;

/// Validation result with warnings.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether validation passed.
    pub passed: bool,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Error messages.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn ok() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    /// Add a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Add an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.passed = false;
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        if !other.passed {
            self.passed = false;
        }
    }
}

/// Check an operation's depths against its tool.
///
/// Findings are warnings only. With `apply_changes` the clearance height and
/// step down are corrected in place; other findings need the operator.
pub fn design_rules_check(
    params: &mut DepthOpParams,
    tool: Option<&Tool>,
    apply_changes: bool,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    match tool {
        None => result.add_warning("No tool assigned; cannot produce output"),
        Some(tool) => {
            let cut_depth = params.start_depth - params.final_depth;
            let flute_length = tool.params().cutting_edge_height;
            if cut_depth > flute_length {
                result.add_warning(format!(
                    "Depth of cut {} is greater than the cutting edge height {} of tool {}",
                    cut_depth, flute_length, tool.tool_number()
                ));
            }
        }
    }

    if params.start_depth <= params.final_depth {
        result.add_warning(format!(
            "Poor start and final depths: start {} is not above final {}",
            params.start_depth, params.final_depth
        ));
    }

    if params.start_depth > params.clearance_height {
        let mut message = format!(
            "Clearance height {} is below the start depth {}",
            params.clearance_height, params.start_depth
        );
        if apply_changes {
            params.clearance_height = params.start_depth + CLEARANCE_MARGIN;
            message.push_str(&format!("; raised to {}", params.clearance_height));
        }
        result.add_warning(message);
    }

    if params.step_down < 0.0 {
        let mut message = format!("Step down {} is negative", params.step_down);
        if apply_changes {
            params.step_down = -params.step_down;
            message.push_str(&format!("; changed to {}", params.step_down));
        }
        result.add_warning(message);
    }

    result
}

/// Validate one tool's dimensions.
pub fn validate_tool(tool: &Tool) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let p = tool.params();

    if tool.tool_number() <= 0 {
        result.add_error(format!("Tool '{}': Invalid tool number {}", tool.title(), tool.tool_number()));
    }

    if p.diameter <= 0.0 {
        result.add_error(format!(
            "Tool {}: Diameter must be positive ({})",
            tool.tool_number(), p.diameter
        ));
    }

    if p.flat_radius > p.diameter / 2.0 {
        result.add_error(format!(
            "Tool {}: Flat radius {} is larger than the tool's radius {}",
            tool.tool_number(),
            p.flat_radius,
            p.diameter / 2.0
        ));
    }

    if p.cutting_edge_angle < 0.0 {
        result.add_error(format!(
            "Tool {}: Cutting edge angle {} is negative",
            tool.tool_number(), p.cutting_edge_angle
        ));
    }

    if p.cutting_edge_height <= 0.0 {
        result.add_error(format!(
            "Tool {}: Cutting edge height must be positive ({})",
            tool.tool_number(), p.cutting_edge_height
        ));
    }

    if p.corner_radius > p.diameter / 2.0 {
        result.add_warning(format!(
            "Tool {}: Corner radius {} is larger than the tool's radius",
            tool.tool_number(), p.corner_radius
        ));
    }

    if p.tool_length_offset < p.diameter {
        result.add_warning(format!(
            "Tool {}: Tool length offset {} is shorter than the diameter",
            tool.tool_number(), p.tool_length_offset
        ));
    }

    result
}

/// Validate every tool in a registry.
pub fn validate_registry(registry: &ToolRegistry) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if registry.is_empty() {
        result.add_warning("Tool table is empty");
    }

    for tool in registry.iter() {
        result.merge(validate_tool(tool));
    }

    result
}
