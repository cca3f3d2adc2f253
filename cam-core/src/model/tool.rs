//! Cutting tool definition.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{DefaultsStore, TOOL_PARAMS_SCOPE};
use crate::error::{CamError, Result};
use crate::geometry::envelope::{build_envelope, Envelope};
use crate::geometry::radius;
use crate::naming::meaningful_name;
use crate::units::Units;

/// Kind of cutting tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolType {
    #[default]
    Drill = 0,
    CentreDrill = 1,
    Endmill = 2,
    SlotCutter = 3,
    BallEndMill = 4,
    Chamfer = 5,
    TurningTool = 6,
    TouchProbe = 7,
    ToolLengthSwitch = 8,
    Extrusion = 9,
    TapTool = 10,
    EngravingTool = 11,
    Undefined = 12,
}

impl ToolType {
    /// All selectable tool types, in menu order.
    pub fn all() -> &'static [ToolType] {
        &[
            ToolType::Drill,
            ToolType::CentreDrill,
            ToolType::Endmill,
            ToolType::SlotCutter,
            ToolType::BallEndMill,
            ToolType::Chamfer,
            ToolType::TurningTool,
            ToolType::TouchProbe,
            ToolType::ToolLengthSwitch,
            ToolType::Extrusion,
            ToolType::TapTool,
            ToolType::EngravingTool,
        ]
    }

    /// Numeric code used by the scripting back end.
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ToolType::Drill => "Drill Bit",
            ToolType::CentreDrill => "Centre Drill Bit",
            ToolType::Endmill => "End Mill",
            ToolType::SlotCutter => "Slot Cutter",
            ToolType::BallEndMill => "Ball End Mill",
            ToolType::Chamfer => "Chamfer",
            ToolType::TurningTool => "Turning Tool",
            ToolType::TouchProbe => "Touch Probe",
            ToolType::ToolLengthSwitch => "Tool Length Switch",
            ToolType::Extrusion => "Extrusion",
            ToolType::TapTool => "Tapping Tool",
            ToolType::EngravingTool => "Engraving Tool",
            ToolType::Undefined => "Undefined",
        }
    }

    /// Whether the tool removes material by milling or drilling.
    pub fn is_milling(&self) -> bool {
        matches!(
            self,
            ToolType::Endmill
                | ToolType::SlotCutter
                | ToolType::BallEndMill
                | ToolType::Drill
                | ToolType::CentreDrill
                | ToolType::Chamfer
        )
    }

    /// Steepest sensible plunge gradient (rise over run) for this kind of tool.
    ///
    /// Zero means a straight plunge.
    pub fn reasonable_gradient(&self) -> f64 {
        match self {
            ToolType::SlotCutter | ToolType::Endmill | ToolType::BallEndMill => -1.0 / 10.0,
            _ => 0.0,
        }
    }

    /// Whether the cutting edge height is derived from the tip angle.
    pub fn has_angled_tip(&self) -> bool {
        matches!(self, ToolType::Chamfer | ToolType::EngravingTool)
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Cutting surface material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMaterial {
    HighSpeedSteel = 0,
    #[default]
    Carbide = 1,
}

impl ToolMaterial {
    /// Numeric code used by the scripting back end.
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl fmt::Display for ToolMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolMaterial::HighSpeedSteel => write!(f, "High Speed Steel"),
            ToolMaterial::Carbide => write!(f, "Carbide"),
        }
    }
}

/// Plastic fed through an extrusion head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtrusionMaterial {
    #[default]
    Abs,
    Pla,
    Hdpe,
}

/// Tapping direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TapDirection {
    #[default]
    RightHand,
    LeftHand,
}

/// How a turning tool is mounted relative to the work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurningOrientation {
    TurningBackFacing = 1,
    TurningFacing = 2,
    BoringFacing = 3,
    BoringBackFacing = 4,
    BackFacing = 5,
    #[default]
    Turning = 6,
    Facing = 7,
    Boring = 8,
    Centre = 9,
}

impl TurningOrientation {
    /// Map a legacy orientation code. Unknown codes fall back to `Centre`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => TurningOrientation::TurningBackFacing,
            2 => TurningOrientation::TurningFacing,
            3 => TurningOrientation::BoringFacing,
            4 => TurningOrientation::BoringBackFacing,
            5 => TurningOrientation::BackFacing,
            6 => TurningOrientation::Turning,
            7 => TurningOrientation::Facing,
            8 => TurningOrientation::Boring,
            _ => TurningOrientation::Centre,
        }
    }
}

/// Parameters describing a tool's cutting geometry and usage.
///
/// The two radii go from the centre of the bit out to the flat radius and then
/// around the corner radius. The cutting edge angle is measured between the
/// tool's centre line and its outside cutting edges: zero for an end mill,
/// 45 degrees for a typical chamfering bit.
///
/// All lengths are in millimetres; angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolParams {
    pub tool_type: ToolType,
    pub material: ToolMaterial,
    pub diameter: f64,
    pub tool_length_offset: f64,
    pub flat_radius: f64,
    pub corner_radius: f64,
    pub cutting_edge_angle: f64,
    /// How far, from the bottom of the cutter, the flutes extend.
    pub cutting_edge_height: f64,
    /// Furthest the tool may advance during one spindle revolution.
    pub max_advance_per_revolution: f64,
    pub automatically_generate_title: bool,
    /// Steepest plunge as rise over run (negative downward); zero is a straight plunge.
    pub gradient: f64,

    // Turning tools
    pub x_offset: f64,
    pub front_angle: f64,
    pub tool_angle: f64,
    pub back_angle: f64,
    pub orientation: TurningOrientation,

    // Touch probes: calibrated error of the probe tip relative to the quill.
    pub probe_offset_x: f64,
    pub probe_offset_y: f64,

    // Extrusion heads
    pub extrusion_material: ExtrusionMaterial,
    pub feedrate: f64,
    pub layer_height: f64,
    pub width_over_thickness: f64,
    pub temperature: f64,
    pub flowrate: f64,
    pub filament_diameter: f64,

    // Taps
    pub direction: TapDirection,
    /// Thread pitch in mm per revolution.
    pub pitch: f64,
}

impl Default for ToolParams {
    fn default() -> Self {
        let diameter = 12.7;
        Self {
            tool_type: ToolType::Drill,
            material: ToolMaterial::Carbide,
            diameter,
            tool_length_offset: 10.0 * diameter,
            flat_radius: 0.0,
            corner_radius: 0.0,
            cutting_edge_angle: 59.0,
            cutting_edge_height: 4.0 * diameter,
            max_advance_per_revolution: 0.12,
            automatically_generate_title: true,
            gradient: 0.0,
            x_offset: 0.0,
            front_angle: 95.0,
            tool_angle: 60.0,
            back_angle: 25.0,
            orientation: TurningOrientation::Turning,
            probe_offset_x: 0.0,
            probe_offset_y: 0.0,
            extrusion_material: ExtrusionMaterial::Abs,
            feedrate: 50.0,
            layer_height: 0.35,
            width_over_thickness: 1.8,
            temperature: 220.0,
            flowrate: 255.0,
            filament_diameter: 3.0,
            direction: TapDirection::RightHand,
            pitch: 1.0,
        }
    }
}

impl ToolParams {
    /// Create parameters for a tool type with default dimensions.
    pub fn new(tool_type: ToolType) -> Self {
        Self {
            tool_type,
            ..Default::default()
        }
    }

    /// Read parameters from the defaults store, falling back to built-in values.
    ///
    /// Length-derived fallbacks (tool length offset, cutting edge height) follow
    /// the stored diameter.
    pub fn load_defaults(store: &DefaultsStore) -> Self {
        let base = Self::default();
        let s = TOOL_PARAMS_SCOPE;
        let diameter = store.read_f64(s, "diameter", base.diameter);

        Self {
            tool_type: store.read(s, "type", base.tool_type),
            material: store.read(s, "material", base.material),
            diameter,
            tool_length_offset: store.read_f64(s, "tool_length_offset", 10.0 * diameter),
            flat_radius: store.read_f64(s, "flat_radius", base.flat_radius),
            corner_radius: store.read_f64(s, "corner_radius", base.corner_radius),
            cutting_edge_angle: store.read_f64(s, "cutting_edge_angle", base.cutting_edge_angle),
            cutting_edge_height: store.read_f64(s, "cutting_edge_height", 4.0 * diameter),
            max_advance_per_revolution: store.read_f64(
                s,
                "max_advance_per_revolution",
                base.max_advance_per_revolution,
            ),
            automatically_generate_title: store.read(
                s,
                "automatically_generate_title",
                base.automatically_generate_title,
            ),
            gradient: store.read_f64(s, "gradient", base.gradient),
            x_offset: store.read_f64(s, "x_offset", base.x_offset),
            front_angle: store.read_f64(s, "front_angle", base.front_angle),
            tool_angle: store.read_f64(s, "tool_angle", base.tool_angle),
            back_angle: store.read_f64(s, "back_angle", base.back_angle),
            orientation: store.read(s, "orientation", base.orientation),
            probe_offset_x: store.read_f64(s, "probe_offset_x", base.probe_offset_x),
            probe_offset_y: store.read_f64(s, "probe_offset_y", base.probe_offset_y),
            extrusion_material: store.read(s, "extrusion_material", base.extrusion_material),
            feedrate: store.read_f64(s, "feedrate", base.feedrate),
            layer_height: store.read_f64(s, "layer_height", base.layer_height),
            width_over_thickness: store.read_f64(
                s,
                "width_over_thickness",
                base.width_over_thickness,
            ),
            temperature: store.read_f64(s, "temperature", base.temperature),
            flowrate: store.read_f64(s, "flowrate", base.flowrate),
            filament_diameter: store.read_f64(s, "filament_diameter", base.filament_diameter),
            direction: store.read(s, "direction", base.direction),
            pitch: store.read_f64(s, "pitch", base.pitch),
        }
    }

    /// Write these parameters into the defaults store (always in millimetres).
    pub fn save_defaults(&self, store: &mut DefaultsStore) -> Result<()> {
        let s = TOOL_PARAMS_SCOPE;
        store.write(s, "type", &self.tool_type)?;
        store.write(s, "material", &self.material)?;
        store.write(s, "diameter", &self.diameter)?;
        store.write(s, "tool_length_offset", &self.tool_length_offset)?;
        store.write(s, "flat_radius", &self.flat_radius)?;
        store.write(s, "corner_radius", &self.corner_radius)?;
        store.write(s, "cutting_edge_angle", &self.cutting_edge_angle)?;
        store.write(s, "cutting_edge_height", &self.cutting_edge_height)?;
        store.write(s, "max_advance_per_revolution", &self.max_advance_per_revolution)?;
        store.write(
            s,
            "automatically_generate_title",
            &self.automatically_generate_title,
        )?;
        store.write(s, "gradient", &self.gradient)?;
        store.write(s, "x_offset", &self.x_offset)?;
        store.write(s, "front_angle", &self.front_angle)?;
        store.write(s, "tool_angle", &self.tool_angle)?;
        store.write(s, "back_angle", &self.back_angle)?;
        store.write(s, "orientation", &self.orientation)?;
        store.write(s, "probe_offset_x", &self.probe_offset_x)?;
        store.write(s, "probe_offset_y", &self.probe_offset_y)?;
        store.write(s, "extrusion_material", &self.extrusion_material)?;
        store.write(s, "feedrate", &self.feedrate)?;
        store.write(s, "layer_height", &self.layer_height)?;
        store.write(s, "width_over_thickness", &self.width_over_thickness)?;
        store.write(s, "temperature", &self.temperature)?;
        store.write(s, "flowrate", &self.flowrate)?;
        store.write(s, "filament_diameter", &self.filament_diameter)?;
        store.write(s, "direction", &self.direction)?;
        store.write(s, "pitch", &self.pitch)?;
        Ok(())
    }
}

/// A physical cutting tool held in a tool table.
///
/// Geometric edits go through the setters so that derived attributes, the
/// generated title and the cached envelope stay consistent with the
/// parameters.
#[derive(Debug, Serialize, Deserialize)]
pub struct Tool {
    /// Zero or negative means "no tool".
    tool_number: i32,
    title: String,
    params: ToolParams,
    /// Units the generated title is expressed in.
    #[serde(default)]
    title_units: Units,
    #[serde(skip)]
    envelope: Option<Envelope>,
}

impl Tool {
    /// Create a tool with default dimensions for its type.
    ///
    /// Without a title, one is generated from the tool's geometry and kept up to
    /// date; an explicit title is treated as set by hand.
    pub fn new(title: Option<&str>, tool_type: ToolType, tool_number: i32) -> Self {
        Self::with_params(title, ToolParams::new(tool_type), tool_number)
    }

    /// Create a tool from explicit parameters.
    pub fn with_params(title: Option<&str>, params: ToolParams, tool_number: i32) -> Self {
        let mut tool = Self {
            tool_number,
            title: String::new(),
            params,
            title_units: Units::Millimeters,
            envelope: None,
        };
        radius::set_angle_and_radius(&mut tool.params);
        match title {
            Some(title) => tool.set_title(title),
            None => tool.title = tool.meaningful_name(),
        }
        tool
    }

    /// Tool number.
    pub fn tool_number(&self) -> i32 {
        self.tool_number
    }

    /// Renumbering goes through the registry, which keeps numbers unique.
    pub(crate) fn set_tool_number(&mut self, tool_number: i32) {
        self.tool_number = tool_number;
    }

    /// Tool parameters.
    pub fn params(&self) -> &ToolParams {
        &self.params
    }

    /// Tool type.
    pub fn tool_type(&self) -> ToolType {
        self.params.tool_type
    }

    /// Title shown in tool lists.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the title by hand. Automatic titling is switched off from then on.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.params.automatically_generate_title = false;
        self.title = title.into();
    }

    /// Name describing the tool's size and type, in the title units.
    pub fn meaningful_name(&self) -> String {
        meaningful_name(&self.params, self.title_units)
    }

    /// Regenerate the title if it is still automatically generated.
    ///
    /// Returns a description of the change, if any, so the caller can tell the
    /// operator.
    pub fn reset_title(&mut self) -> Option<String> {
        if !self.params.automatically_generate_title {
            return None;
        }
        self.title = self.meaningful_name();
        Some(format!("Changing name to {}", self.title))
    }

    /// Re-express the generated title in new display units.
    pub fn on_change_units(&mut self, units: Units) {
        self.title_units = units;
        self.reset_title();
    }

    /// Cutting radius in millimetres, optionally at a depth above the tip.
    pub fn cutting_radius(&self, depth: Option<f64>) -> f64 {
        radius::cutting_radius(&self.params, depth)
    }

    /// Cutting radius expressed in the given display units.
    pub fn cutting_radius_in(&self, units: Units, depth: Option<f64>) -> f64 {
        units.to_display(self.cutting_radius(depth))
    }

    /// Re-derive dependent attributes from diameter, flat radius and angle.
    pub fn set_angle_and_radius(&mut self) {
        self.geometry_changed(true);
    }

    /// Change the tool type.
    pub fn set_tool_type(&mut self, tool_type: ToolType) {
        self.params.tool_type = tool_type;
        self.geometry_changed(true);
    }

    /// Change the diameter.
    pub fn set_diameter(&mut self, diameter: f64) -> Result<()> {
        ensure_finite("diameter", diameter)?;
        self.params.diameter = diameter;
        self.geometry_changed(true);
        Ok(())
    }

    /// Change the flat radius. It may not exceed half the diameter.
    pub fn set_flat_radius(&mut self, flat_radius: f64) -> Result<()> {
        ensure_finite("flat radius", flat_radius)?;
        if flat_radius > self.params.diameter / 2.0 {
            return Err(CamError::invalid_edit(
                "flat radius",
                "flat radius cannot be larger than the tool's radius",
            ));
        }
        self.params.flat_radius = flat_radius;
        self.geometry_changed(true);
        Ok(())
    }

    /// Change the cutting edge angle (degrees). It must not be negative.
    pub fn set_cutting_edge_angle(&mut self, angle: f64) -> Result<()> {
        ensure_finite("cutting edge angle", angle)?;
        if angle < 0.0 {
            return Err(CamError::invalid_edit(
                "cutting edge angle",
                "cutting edge angle must be zero or positive",
            ));
        }
        self.params.cutting_edge_angle = angle;
        self.geometry_changed(true);
        Ok(())
    }

    /// Change the cutting edge height.
    ///
    /// Chamfering and engraving bits derive this from their other dimensions,
    /// so it cannot be set directly for them.
    pub fn set_cutting_edge_height(&mut self, height: f64) -> Result<()> {
        ensure_finite("cutting edge height", height)?;
        if height <= 0.0 {
            return Err(CamError::invalid_edit(
                "cutting edge height",
                "cutting edge height must be positive",
            ));
        }
        if self.params.tool_type.has_angled_tip() {
            return Err(CamError::invalid_edit(
                "cutting edge height",
                "cutting edge height is generated from diameter, flat radius and cutting edge angle for chamfering bits",
            ));
        }
        self.params.cutting_edge_height = height;
        self.geometry_changed(false);
        Ok(())
    }

    /// Change the corner radius.
    pub fn set_corner_radius(&mut self, corner_radius: f64) -> Result<()> {
        ensure_finite("corner radius", corner_radius)?;
        self.params.corner_radius = corner_radius;
        self.geometry_changed(false);
        Ok(())
    }

    /// Change the tool length offset.
    pub fn set_tool_length_offset(&mut self, offset: f64) -> Result<()> {
        ensure_finite("tool length offset", offset)?;
        self.params.tool_length_offset = offset;
        self.geometry_changed(false);
        Ok(())
    }

    /// The tool's envelope, built on first use and cached until the geometry
    /// changes.
    pub fn envelope(&mut self) -> Result<&Envelope> {
        let envelope = match self.envelope.take() {
            Some(envelope) => envelope,
            None => {
                tracing::debug!("Building envelope for tool {}", self.tool_number);
                build_envelope(&self.params)?
            }
        };
        Ok(self.envelope.insert(envelope))
    }

    /// Whether an envelope is currently cached.
    pub fn has_cached_envelope(&self) -> bool {
        self.envelope.is_some()
    }

    fn geometry_changed(&mut self, rederive: bool) {
        if rederive {
            radius::set_angle_and_radius(&mut self.params);
        }
        self.envelope = None;
        self.reset_title();
    }
}

impl Clone for Tool {
    fn clone(&self) -> Self {
        Self {
            tool_number: self.tool_number,
            title: self.title.clone(),
            params: self.params.clone(),
            title_units: self.title_units,
            // The cached envelope belongs to the original.
            envelope: None,
        }
    }
}

impl PartialEq for Tool {
    fn eq(&self, other: &Self) -> bool {
        self.tool_number == other.tool_number
            && self.title == other.title
            && self.params == other.params
    }
}

fn ensure_finite(property: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CamError::invalid_edit(property, "value must be a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chamfer() -> Tool {
        let mut tool = Tool::new(None, ToolType::Chamfer, 1);
        tool.set_diameter(10.0).unwrap();
        tool.set_flat_radius(0.0).unwrap();
        tool.set_cutting_edge_angle(45.0).unwrap();
        tool
    }

    // ==================== ToolType tests ====================

    #[test]
    fn test_tool_type_codes() {
        assert_eq!(ToolType::Drill.code(), 0);
        assert_eq!(ToolType::Chamfer.code(), 5);
        assert_eq!(ToolType::EngravingTool.code(), 11);
        assert_eq!(ToolType::Undefined.code(), 12);
    }

    #[test]
    fn test_tool_type_all_excludes_undefined() {
        assert_eq!(ToolType::all().len(), 12);
        assert!(!ToolType::all().contains(&ToolType::Undefined));
    }

    #[test]
    fn test_is_milling() {
        assert!(ToolType::Endmill.is_milling());
        assert!(ToolType::Chamfer.is_milling());
        assert!(ToolType::CentreDrill.is_milling());
        assert!(!ToolType::TurningTool.is_milling());
        assert!(!ToolType::EngravingTool.is_milling());
        assert!(!ToolType::TouchProbe.is_milling());
    }

    #[test]
    fn test_reasonable_gradient() {
        assert_eq!(ToolType::Endmill.reasonable_gradient(), -0.1);
        assert_eq!(ToolType::BallEndMill.reasonable_gradient(), -0.1);
        assert_eq!(ToolType::Drill.reasonable_gradient(), 0.0);
        assert_eq!(ToolType::Chamfer.reasonable_gradient(), 0.0);
    }

    #[test]
    fn test_orientation_from_code() {
        assert_eq!(TurningOrientation::from_code(6), TurningOrientation::Turning);
        assert_eq!(TurningOrientation::from_code(3), TurningOrientation::BoringFacing);
        assert_eq!(TurningOrientation::from_code(0), TurningOrientation::Centre);
        assert_eq!(TurningOrientation::from_code(42), TurningOrientation::Centre);
    }

    // ==================== ToolParams tests ====================

    #[test]
    fn test_params_defaults() {
        let params = ToolParams::default();
        assert_eq!(params.diameter, 12.7);
        assert_eq!(params.tool_length_offset, 127.0);
        assert_eq!(params.cutting_edge_height, 50.8);
        assert_eq!(params.cutting_edge_angle, 59.0);
        assert_eq!(params.material, ToolMaterial::Carbide);
        assert_eq!(params.orientation, TurningOrientation::Turning);
        assert!(params.automatically_generate_title);
    }

    #[test]
    fn test_params_equality_compares_extrusion_material() {
        let a = ToolParams::default();
        let mut b = ToolParams::default();
        b.extrusion_material = ExtrusionMaterial::Pla;
        assert_ne!(a, b);
    }

    #[test]
    fn test_params_defaults_round_trip() {
        let mut params = ToolParams::new(ToolType::BallEndMill);
        params.diameter = 6.0;
        params.corner_radius = 3.0;
        params.orientation = TurningOrientation::Boring;

        let mut store = DefaultsStore::new();
        params.save_defaults(&mut store).unwrap();
        assert_eq!(ToolParams::load_defaults(&store), params);
    }

    #[test]
    fn test_load_defaults_follows_stored_diameter() {
        let mut store = DefaultsStore::new();
        store.write(TOOL_PARAMS_SCOPE, "diameter", &3.0).unwrap();
        let params = ToolParams::load_defaults(&store);
        assert_eq!(params.diameter, 3.0);
        assert_eq!(params.tool_length_offset, 30.0);
        assert_eq!(params.cutting_edge_height, 12.0);
    }

    // ==================== Derived attribute tests ====================

    #[test]
    fn test_endmill_flat_radius_follows_diameter() {
        let mut tool = Tool::new(None, ToolType::Endmill, 1);
        assert_eq!(tool.params().flat_radius, 6.35);
        for diameter in [3.0, 6.0, 10.5, 0.8] {
            tool.set_diameter(diameter).unwrap();
            assert_eq!(tool.params().flat_radius, diameter / 2.0);
        }
    }

    #[test]
    fn test_slot_cutter_flat_radius_follows_diameter() {
        let mut tool = Tool::new(None, ToolType::SlotCutter, 1);
        tool.set_diameter(8.0).unwrap();
        assert_eq!(tool.params().flat_radius, 4.0);
    }

    #[test]
    fn test_chamfer_cutting_edge_height() {
        let tool = chamfer();
        assert_relative_eq!(tool.params().cutting_edge_height, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_set_angle_and_radius_idempotent() {
        let mut tool = chamfer();
        tool.set_angle_and_radius();
        let first = tool.params().clone();
        tool.set_angle_and_radius();
        assert_eq!(tool.params(), &first);
    }

    #[test]
    fn test_type_change_rederives() {
        let mut tool = Tool::new(None, ToolType::Drill, 1);
        tool.set_diameter(6.0).unwrap();
        assert_eq!(tool.params().flat_radius, 0.0);
        tool.set_tool_type(ToolType::Endmill);
        assert_eq!(tool.params().flat_radius, 3.0);
    }

    // ==================== Edit validation tests ====================

    #[test]
    fn test_flat_radius_too_large_rejected() {
        let mut tool = chamfer();
        let before = tool.clone();
        let err = tool.set_flat_radius(6.0).unwrap_err();
        assert!(matches!(err, CamError::InvalidEdit { .. }));
        assert_eq!(tool, before);
    }

    #[test]
    fn test_negative_angle_rejected() {
        let mut tool = chamfer();
        let before = tool.clone();
        assert!(tool.set_cutting_edge_angle(-1.0).is_err());
        assert_eq!(tool, before);
        assert!(tool.set_cutting_edge_angle(0.0).is_ok());
    }

    #[test]
    fn test_cutting_edge_height_rules() {
        let mut endmill = Tool::new(None, ToolType::Endmill, 2);
        assert!(endmill.set_cutting_edge_height(0.0).is_err());
        assert!(endmill.set_cutting_edge_height(-3.0).is_err());
        endmill.set_cutting_edge_height(20.0).unwrap();
        assert_eq!(endmill.params().cutting_edge_height, 20.0);

        let mut tool = chamfer();
        let err = tool.set_cutting_edge_height(12.0).unwrap_err();
        assert!(err.to_string().contains("generated from diameter"));
        assert_relative_eq!(tool.params().cutting_edge_height, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut tool = Tool::new(None, ToolType::Endmill, 1);
        assert!(tool.set_diameter(f64::NAN).is_err());
        assert_eq!(tool.params().diameter, 12.7);
    }

    // ==================== Title tests ====================

    #[test]
    fn test_generated_title() {
        let tool = Tool::new(None, ToolType::Drill, 1);
        assert_eq!(tool.title(), "12.7 mm Drill Bit");
    }

    #[test]
    fn test_title_follows_edits() {
        let mut tool = Tool::new(None, ToolType::Endmill, 1);
        tool.set_diameter(6.0).unwrap();
        assert_eq!(tool.title(), "6 mm End Mill");
    }

    #[test]
    fn test_manual_title_sticks() {
        let mut tool = Tool::new(None, ToolType::Endmill, 1);
        tool.set_title("Roughing cutter");
        tool.set_diameter(6.0).unwrap();
        assert_eq!(tool.title(), "Roughing cutter");
        assert_eq!(tool.reset_title(), None);
    }

    #[test]
    fn test_title_in_inches() {
        let mut tool = Tool::new(None, ToolType::Endmill, 1);
        tool.set_diameter(6.35).unwrap();
        tool.on_change_units(Units::Inches);
        assert_eq!(tool.title(), "1/4 inch End Mill");
    }

    // ==================== Envelope cache tests ====================

    #[test]
    fn test_envelope_is_cached() {
        let mut tool = Tool::new(None, ToolType::Endmill, 1);
        assert!(!tool.has_cached_envelope());
        tool.envelope().unwrap();
        assert!(tool.has_cached_envelope());
    }

    #[test]
    fn test_geometry_edit_clears_cache() {
        let mut tool = Tool::new(None, ToolType::Endmill, 1);
        tool.envelope().unwrap();
        tool.set_tool_length_offset(50.0).unwrap();
        assert!(!tool.has_cached_envelope());

        tool.envelope().unwrap();
        tool.set_corner_radius(1.0).unwrap();
        assert!(!tool.has_cached_envelope());
    }

    #[test]
    fn test_rejected_edits_leave_tool_unchanged() {
        let mut tool = chamfer();
        let before = tool.clone();

        assert!(tool.set_flat_radius(100.0).is_err());
        assert!(tool.set_cutting_edge_angle(-30.0).is_err());
        assert!(tool.set_diameter(f64::NAN).is_err());
        assert_eq!(tool, before);
        assert_relative_eq!(tool.params().cutting_edge_height, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejected_edit_keeps_cache() {
        let mut tool = chamfer();
        tool.envelope().unwrap();
        assert!(tool.set_flat_radius(100.0).is_err());
        assert!(tool.has_cached_envelope());
    }

    #[test]
    fn test_clone_drops_cache() {
        let mut tool = Tool::new(None, ToolType::BallEndMill, 4);
        tool.envelope().unwrap();
        let copy = tool.clone();
        assert!(tool.has_cached_envelope());
        assert!(!copy.has_cached_envelope());
        assert_eq!(copy, tool);
    }

    #[test]
    fn test_serde_skips_cache() {
        let mut tool = Tool::new(Some("T4"), ToolType::BallEndMill, 4);
        tool.envelope().unwrap();
        let json = serde_json::to_string(&tool).unwrap();
        assert!(!json.contains("envelope"));
        let back: Tool = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tool);
        assert!(!back.has_cached_envelope());
    }
}
