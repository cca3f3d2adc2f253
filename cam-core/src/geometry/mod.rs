pub mod cutter;
pub mod envelope;
pub mod radius;
pub mod shape_builder;

pub use cutter::CutterModel;
pub use envelope::{build_envelope, Envelope, EnvelopeDimensions, Placement, Primitive};
pub use radius::{cutting_radius, set_angle_and_radius, side_profile};
pub use shape_builder::{build_tool_solid, BoundingBoxBuilder, ShapeBuilder};
