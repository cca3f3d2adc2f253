pub mod bounds;
pub mod depth;
pub mod tool;

pub use bounds::BoundingBox;
pub use depth::{AbsMode, DepthOpParams};
pub use tool::{
    ExtrusionMaterial, TapDirection, Tool, ToolMaterial, ToolParams, ToolType, TurningOrientation,
};
