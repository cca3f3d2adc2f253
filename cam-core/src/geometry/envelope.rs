//! Tool envelope: the set of solid primitives whose union is the tool's
//! silhouette.
//!
//! The tip sits at the origin and the tool points up the +Z axis, except for
//! turning tools which are turned into lathe axes.

use nalgebra::{Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::{
    angle::degrees_to_radians, FALLBACK_ENVELOPE_DIAMETER, MIN_ENVELOPE_DIAMETER,
    TURNING_INSERT_RADIUS, TURNING_INSERT_THICKNESS,
};
use crate::error::{CamError, Result};
use crate::model::bounds::BoundingBox;
use crate::model::tool::{ToolParams, ToolType, TurningOrientation};

/// Position and direction of a primitive's base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub origin: Point3<f64>,
    /// Unit direction from the base towards the far end.
    pub axis: Vector3<f64>,
}

impl Placement {
    pub fn new(origin: Point3<f64>, axis: Vector3<f64>) -> Self {
        Self {
            origin,
            axis: axis.normalize(),
        }
    }

    /// Base at `(0, 0, z)` pointing up.
    pub fn up_at(z: f64) -> Self {
        Self::new(Point3::new(0.0, 0.0, z), Vector3::z())
    }

    /// Base at `(0, 0, z)` pointing down.
    pub fn down_at(z: f64) -> Self {
        Self::new(Point3::new(0.0, 0.0, z), -Vector3::z())
    }

    fn rotated(&self, rotation: &Rotation3<f64>) -> Self {
        Self {
            origin: rotation * self.origin,
            axis: rotation * self.axis,
        }
    }
}

/// One solid building block of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    Cylinder {
        placement: Placement,
        radius: f64,
        height: f64,
    },
    /// Frustum with `base_radius` at the placement origin and `top_radius`
    /// at `height` along the axis.
    Cone {
        placement: Placement,
        base_radius: f64,
        top_radius: f64,
        height: f64,
    },
    Sphere {
        center: Point3<f64>,
        radius: f64,
    },
    /// Planar polygon swept along a vector.
    Prism {
        profile: Vec<Point3<f64>>,
        extrusion: Vector3<f64>,
    },
}

impl Primitive {
    pub fn cylinder(placement: Placement, radius: f64, height: f64) -> Result<Self> {
        finite("cylinder", "radius", radius)?;
        finite("cylinder", "height", height)?;
        positive("cylinder", "radius", radius)?;
        positive("cylinder", "height", height)?;
        Ok(Primitive::Cylinder {
            placement,
            radius,
            height,
        })
    }

    pub fn cone(placement: Placement, base_radius: f64, top_radius: f64, height: f64) -> Result<Self> {
        finite("cone", "base radius", base_radius)?;
        finite("cone", "top radius", top_radius)?;
        finite("cone", "height", height)?;
        positive("cone", "height", height)?;
        if base_radius < 0.0 || top_radius < 0.0 {
            return Err(CamError::GeometryConstruction {
                primitive: "cone",
                reason: "radii must not be negative".to_string(),
            });
        }
        if base_radius == 0.0 && top_radius == 0.0 {
            return Err(CamError::GeometryConstruction {
                primitive: "cone",
                reason: "at least one radius must be positive".to_string(),
            });
        }
        Ok(Primitive::Cone {
            placement,
            base_radius,
            top_radius,
            height,
        })
    }

    pub fn sphere(center: Point3<f64>, radius: f64) -> Result<Self> {
        finite("sphere", "radius", radius)?;
        positive("sphere", "radius", radius)?;
        Ok(Primitive::Sphere { center, radius })
    }

    pub fn prism(profile: Vec<Point3<f64>>, extrusion: Vector3<f64>) -> Result<Self> {
        for p in &profile {
            for v in p.iter() {
                finite("prism", "profile point", *v)?;
            }
        }
        for v in extrusion.iter() {
            finite("prism", "extrusion", *v)?;
        }
        if profile.len() < 3 {
            return Err(CamError::GeometryConstruction {
                primitive: "prism",
                reason: format!("profile needs at least 3 points, got {}", profile.len()),
            });
        }
        positive("prism", "extrusion length", extrusion.norm())?;
        Ok(Primitive::Prism { profile, extrusion })
    }

    /// Short name of the primitive kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Cylinder { .. } => "cylinder",
            Primitive::Cone { .. } => "cone",
            Primitive::Sphere { .. } => "sphere",
            Primitive::Prism { .. } => "prism",
        }
    }

    /// Rotate about the origin.
    pub fn rotated(&self, rotation: &Rotation3<f64>) -> Primitive {
        match self {
            Primitive::Cylinder {
                placement,
                radius,
                height,
            } => Primitive::Cylinder {
                placement: placement.rotated(rotation),
                radius: *radius,
                height: *height,
            },
            Primitive::Cone {
                placement,
                base_radius,
                top_radius,
                height,
            } => Primitive::Cone {
                placement: placement.rotated(rotation),
                base_radius: *base_radius,
                top_radius: *top_radius,
                height: *height,
            },
            Primitive::Sphere { center, radius } => Primitive::Sphere {
                center: rotation * center,
                radius: *radius,
            },
            Primitive::Prism { profile, extrusion } => Primitive::Prism {
                profile: profile.iter().map(|p| rotation * p).collect(),
                extrusion: rotation * extrusion,
            },
        }
    }

    /// Axis-aligned bounds of the primitive.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Primitive::Cylinder {
                placement,
                radius,
                height,
            } => {
                let top = placement.origin + placement.axis * *height;
                disk_bounds(&placement.origin, &placement.axis, *radius)
                    .union(&disk_bounds(&top, &placement.axis, *radius))
            }
            Primitive::Cone {
                placement,
                base_radius,
                top_radius,
                height,
            } => {
                let top = placement.origin + placement.axis * *height;
                disk_bounds(&placement.origin, &placement.axis, *base_radius)
                    .union(&disk_bounds(&top, &placement.axis, *top_radius))
            }
            Primitive::Sphere { center, radius } => {
                let r = Vector3::repeat(*radius);
                BoundingBox::new(center - r, center + r)
            }
            Primitive::Prism { profile, extrusion } => {
                let mut bbox = BoundingBox::new(profile[0], profile[0]);
                for p in profile {
                    bbox.include(p);
                    bbox.include(&(p + extrusion));
                }
                bbox
            }
        }
    }
}

/// Bounds of a flat disk of `radius` centred at `center` with normal `axis`.
fn disk_bounds(center: &Point3<f64>, axis: &Vector3<f64>, radius: f64) -> BoundingBox {
    let extent = axis.map(|a| radius * (1.0 - a * a).max(0.0).sqrt());
    BoundingBox::new(center - extent, center + extent)
}

fn finite(primitive: &'static str, dimension: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CamError::GeometryDomain {
            primitive,
            dimension,
            value,
        })
    }
}

fn positive(primitive: &'static str, dimension: &'static str, value: f64) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(CamError::GeometryConstruction {
            primitive,
            reason: format!("{} must be positive, got {}", dimension, value),
        })
    }
}

/// Primitives whose union is the tool silhouette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub primitives: Vec<Primitive>,
}

impl Envelope {
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter()
    }

    /// Axis-aligned bounds of the whole envelope.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.primitives
            .iter()
            .map(Primitive::bounds)
            .reduce(|a, b| a.union(&b))
    }

    fn rotate(&mut self, rotation: &Rotation3<f64>) {
        for primitive in &mut self.primitives {
            *primitive = primitive.rotated(rotation);
        }
    }
}

/// Tool dimensions with floors applied so that unset values still draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeDimensions {
    pub diameter: f64,
    pub tool_length_offset: f64,
    pub cutting_edge_height: f64,
}

impl EnvelopeDimensions {
    pub fn from_params(params: &ToolParams) -> Self {
        let mut diameter = params.diameter;
        if diameter < MIN_ENVELOPE_DIAMETER {
            diameter = FALLBACK_ENVELOPE_DIAMETER;
        }

        let mut tool_length_offset = params.tool_length_offset;
        if tool_length_offset < diameter {
            tool_length_offset = 10.0 * diameter;
        }

        let mut cutting_edge_height = params.cutting_edge_height;
        if cutting_edge_height < 2.0 * diameter {
            cutting_edge_height = 2.0 * diameter;
        }

        Self {
            diameter,
            tool_length_offset,
            cutting_edge_height,
        }
    }
}

/// Build the envelope for a set of tool parameters.
pub fn build_envelope(params: &ToolParams) -> Result<Envelope> {
    let dims = EnvelopeDimensions::from_params(params);
    let d = dims.diameter;
    let tlo = dims.tool_length_offset;
    let ceh = dims.cutting_edge_height;
    let radius = d / 2.0;

    let primitives = match params.tool_type {
        ToolType::CentreDrill => {
            let tip = drill_tip_length(radius, params.cutting_edge_angle);
            vec![
                Primitive::cylinder(Placement::up_at(tip + ceh), d, tlo - tip - ceh)?,
                Primitive::cylinder(Placement::up_at(tip), radius, ceh)?,
                Primitive::cone(Placement::down_at(tip), radius, params.flat_radius, tip)?,
            ]
        }
        ToolType::Drill => {
            let tip = drill_tip_length(radius, params.cutting_edge_angle);
            vec![
                Primitive::cylinder(Placement::up_at(tip), radius, tlo - tip)?,
                Primitive::cone(Placement::down_at(tip), radius, params.flat_radius, tip)?,
            ]
        }
        ToolType::Chamfer | ToolType::EngravingTool => {
            let tan = degrees_to_radians(params.cutting_edge_angle).tan();
            let tip = radius / tan - params.flat_radius / tan;
            let shaft_radius = if params.tool_type == ToolType::EngravingTool {
                radius
            } else {
                radius / 2.0
            };
            vec![
                Primitive::cylinder(Placement::up_at(tip), shaft_radius, tlo - tip)?,
                Primitive::cone(Placement::down_at(tip), radius, params.flat_radius, tip)?,
            ]
        }
        ToolType::BallEndMill => {
            let corner = params.corner_radius;
            vec![
                Primitive::cylinder(Placement::up_at(corner), radius, tlo - corner)?,
                Primitive::sphere(Point3::new(0.0, 0.0, corner), radius)?,
            ]
        }
        ToolType::TouchProbe | ToolType::ToolLengthSwitch => vec![
            Primitive::cone(Placement::up_at(0.0), d / 16.0, radius, tlo - d)?,
            Primitive::sphere(Point3::origin(), radius)?,
        ],
        ToolType::TurningTool => return turning_envelope(params, tlo),
        ToolType::Endmill
        | ToolType::SlotCutter
        | ToolType::Extrusion
        | ToolType::TapTool
        | ToolType::Undefined => {
            vec![Primitive::cylinder(Placement::up_at(0.0), radius, tlo)?]
        }
    };

    Ok(Envelope { primitives })
}

/// Length of a drill's conical point.
fn drill_tip_length(radius: f64, cutting_edge_angle: f64) -> f64 {
    radius * degrees_to_radians(90.0 - cutting_edge_angle).tan()
}

/// Triangular insert on an extruded shank, turned into holder and lathe axes.
fn turning_envelope(params: &ToolParams, tool_length_offset: f64) -> Result<Envelope> {
    let half_sweep = degrees_to_radians((360.0 - params.tool_angle) / 2.0);
    let p1 = Point3::new(0.0, TURNING_INSERT_RADIUS, 0.0);
    let p2 = Rotation3::from_axis_angle(&Vector3::z_axis(), half_sweep) * p1;
    let p3 = Rotation3::from_axis_angle(&Vector3::z_axis(), -half_sweep) * p1;

    let thickness = Vector3::new(0.0, 0.0, TURNING_INSERT_THICKNESS);
    let insert = Primitive::prism(vec![p1, p2, p3], thickness)?;
    let shank = Primitive::prism(
        vec![p2, p3, p3 + thickness, p2 + thickness],
        Vector3::new(0.0, -tool_length_offset, 0.0),
    )?;

    let mut envelope = Envelope {
        primitives: vec![shank, insert],
    };
    envelope.rotate(&holder_rotation(params.orientation));

    let lathe = Rotation3::from_axis_angle(&Vector3::z_axis(), degrees_to_radians(90.0))
        * Rotation3::from_axis_angle(&Vector3::y_axis(), degrees_to_radians(-90.0));
    envelope.rotate(&lathe);
    Ok(envelope)
}

/// Rotation from drawing orientation into the tool holder orientation.
fn holder_rotation(orientation: TurningOrientation) -> Rotation3<f64> {
    let about_z = |degrees: f64| {
        Rotation3::from_axis_angle(&Vector3::z_axis(), degrees_to_radians(degrees - 90.0))
    };
    match orientation {
        TurningOrientation::TurningBackFacing => about_z(45.0),
        TurningOrientation::TurningFacing => about_z(135.0),
        TurningOrientation::BoringFacing => about_z(225.0),
        TurningOrientation::BoringBackFacing => about_z(-45.0),
        TurningOrientation::BackFacing => about_z(0.0),
        TurningOrientation::Turning => about_z(90.0),
        TurningOrientation::Facing => about_z(180.0),
        TurningOrientation::Boring => about_z(-90.0),
        // Straight along the Y axis
        TurningOrientation::Centre => {
            Rotation3::from_axis_angle(&Vector3::x_axis(), degrees_to_radians(90.0))
        }
    }
}
