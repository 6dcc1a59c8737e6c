pub mod camera;
pub mod core;
pub mod math;
pub mod parser;
pub mod sampler;
pub mod scenes;
pub mod shading;
pub mod texture;
pub mod tracer;

pub use math::*;
